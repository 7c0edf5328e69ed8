//! YP Bank Parse - CLI tool for detecting and parsing banking messages.

use clap::Parser;
use serde_json::Value;
use std::fs::File;
use std::io::{self, Read, Write};
use ypbank_parser::{Error, MessageParser, ParserConfig, Result, SwiftProfile};

#[derive(Parser)]
#[command(name = "ypbank_parse")]
#[command(about = "Detect and parse banking messages (SWIFT MT, ISO 20022, BaNCS, FIS, Fiserv, Temenos)", long_about = None)]
struct Cli {
    /// Input file path (or stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Output file path (or stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Format hint, e.g. MT103, BANCS_FLAT, fis (auto-detect if not provided)
    #[arg(short, long)]
    format: Option<String>,

    /// Fail when the payload does not look like --format
    #[arg(long, requires = "format")]
    strict: bool,

    /// Treat the input as a JSON array of payloads
    #[arg(long, conflicts_with = "detect")]
    batch: bool,

    /// Only print the detected format label
    #[arg(long)]
    detect: bool,

    /// Supported SWIFT MT set (base, enhanced)
    #[arg(long = "swift-profile", default_value = "enhanced")]
    swift_profile: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Print parse counters to stderr when done
    #[arg(long)]
    metrics: bool,

    /// Log dispatch decisions (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ypbank_parser={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(io::stderr)
                .compact(),
        )
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let profile = cli.swift_profile.parse::<SwiftProfile>()?;
    let parser = MessageParser::with_config(ParserConfig::default().with_swift_profile(profile));

    // Read input from file or stdin
    let mut input = String::new();
    if let Some(ref input_path) = cli.input {
        File::open(input_path)?.read_to_string(&mut input)?;
    } else {
        io::stdin().read_to_string(&mut input)?;
    }

    let output = if cli.detect {
        format!("{}\n", parser.detect(&input))
    } else if cli.batch {
        let payloads: Vec<Value> = serde_json::from_str(&input)
            .map_err(|e| Error::InvalidInput(format!("batch input must be a JSON array: {}", e)))?;
        let outcomes = parser.batch_parse_values(&payloads);
        to_json(&outcomes, cli.pretty)?
    } else {
        let hint = cli.format.as_deref();
        let record = match hint {
            Some(format) if cli.strict => parser.parse_with_format(&input, format)?,
            _ => parser.parse(&input, hint)?,
        };
        to_json(&record, cli.pretty)?
    };

    // Write to file or stdout
    if let Some(ref output_path) = cli.output {
        File::create(output_path)?.write_all(output.as_bytes())?;
    } else {
        io::stdout().write_all(output.as_bytes())?;
    }

    if cli.metrics {
        eprintln!("{}", serde_json::to_string(&parser.metrics())?);
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let mut json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    json.push('\n');
    Ok(json)
}
