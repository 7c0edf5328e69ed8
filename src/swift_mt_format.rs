//! SWIFT MT (FIN) message parser.
//!
//! A FIN message is a sequence of blocks: `{1:basic header}`,
//! `{2:application header}`, optional `{3:user header}` and the text block
//! `{4:...-}`, which carries the `:tag:content` fields. This module splits
//! the text block on tag boundaries, keeps the tags known for the message
//! type, validates the required ones and assembles semantic sub-records
//! (amounts, dates, parties).

use crate::config::SwiftProfile;
use crate::detector::swift_type_regex;
use crate::error::{Error, Result};
use crate::extract::decimal_value;
use crate::field_tables::{tag_table, TagTable};
use crate::registry::MessageExtractor;
use crate::types::{DebitCredit, FormatLabel, ParsedRecord};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;

const FORMAT: &str = "SWIFT_MT";

/// Parser for SWIFT MT messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwiftMtParser {
    profile: SwiftProfile,
}

impl SwiftMtParser {
    pub fn new(profile: SwiftProfile) -> Self {
        Self { profile }
    }

    /// Parser limited to MT103 and MT202.
    pub fn base() -> Self {
        Self::new(SwiftProfile::Base)
    }

    /// Parser for the extended MT set.
    pub fn enhanced() -> Self {
        Self::new(SwiftProfile::Enhanced)
    }

    pub fn profile(&self) -> SwiftProfile {
        self.profile
    }

    /// Parse a complete FIN message.
    ///
    /// The message type comes from the application header; `assumed_type`
    /// is only used when the header does not carry one.
    ///
    /// # Examples
    ///
    /// ```
    /// use ypbank_parser::swift_mt_format::SwiftMtParser;
    ///
    /// let message = "{1:F01BANKBEBBAXXX0000000000}{2:I103BANKDEFFXXXXN}{4:\n\
    ///     :20:REF1\n:32A:230701USD1000,00\n:50K:/111\nJOHN\n:59:/222\nJANE\n-}";
    /// let record = SwiftMtParser::enhanced().parse(message, None)?;
    /// assert_eq!(record.message_type(), "MT103");
    /// assert_eq!(record.get_f64("amount"), Some(1000.0));
    /// # Ok::<(), ypbank_parser::Error>(())
    /// ```
    pub fn parse(&self, payload: &str, assumed_type: Option<u16>) -> Result<ParsedRecord> {
        let envelope = Envelope::parse(payload)?;
        let code = envelope
            .message_type
            .or(assumed_type)
            .ok_or_else(|| Error::invalid_format(FORMAT, "application header carries no message type"))?;
        let label = format!("MT{:03}", code);

        if !self.profile.supported_types().contains(&code) {
            return Err(Error::UnsupportedType {
                format: FORMAT.to_string(),
                message_type: label,
            });
        }
        let table = tag_table(code).ok_or_else(|| Error::UnsupportedType {
            format: FORMAT.to_string(),
            message_type: label.clone(),
        })?;

        let block = TextBlock::parse(envelope.text, table);
        debug!(message_type = %label, fields = block.entries.len(), "text block split");

        for tag in table.required {
            if block.first(tag).is_none() {
                return Err(Error::missing_field(&label, *tag));
            }
        }

        let record = ParsedRecord::new(label.as_str(), self.profile.parser_name(), "FIN")
            .with_opt("header", envelope.header());

        let record = match code {
            103 => assemble_mt103(record, &block, &label)?,
            202 => assemble_mt202(record, &block, &label)?,
            515 => assemble_mt515(record, &block, &label)?,
            700 => assemble_mt700(record, &block, &label)?,
            798 => assemble_mt798(record, &block, &label)?,
            950 => assemble_mt950(record, &block, &label)?,
            101 => assemble_mt101(record, &block, &label)?,
            _ => record,
        };

        Ok(record.with("fields", block.fields_value()))
    }
}

/// The block structure of a FIN message.
struct Envelope<'a> {
    basic_header: Option<&'a str>,
    application_header: Option<&'a str>,
    text: &'a str,
    message_type: Option<u16>,
}

impl<'a> Envelope<'a> {
    fn parse(payload: &'a str) -> Result<Self> {
        if !(payload.contains("{1:") && payload.contains("{2:") && payload.contains("{4:")) {
            return Err(Error::invalid_format(
                FORMAT,
                "message must contain basic header {1:, application header {2: and text block {4:",
            ));
        }

        let text_start = payload
            .find("{4:")
            .map(|pos| pos + 3)
            .ok_or_else(|| Error::invalid_format(FORMAT, "missing text block {4:"))?;
        let rest = &payload[text_start..];
        let text = match rest.find("-}") {
            Some(end) => &rest[..end],
            None => rest.trim_end().trim_end_matches('}'),
        };

        let message_type = swift_type_regex()
            .captures(payload)
            .and_then(|caps| caps.get(1))
            .and_then(|code| code.as_str().parse().ok());

        Ok(Envelope {
            basic_header: header_block(payload, "{1:"),
            application_header: header_block(payload, "{2:"),
            text,
            message_type,
        })
    }

    /// Sender/receiver details from blocks 1 and 2.
    fn header(&self) -> Option<Value> {
        let mut header = Map::new();
        let mut put = |key: &str, value: Option<&str>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                header.insert(key.to_string(), Value::from(value));
            }
        };

        if let Some(basic) = self.basic_header {
            put("applicationId", basic.get(0..1));
            put("serviceId", basic.get(1..3));
            put("logicalTerminal", basic.get(3..15));
            put("sessionNumber", basic.get(15..19));
            put("sequenceNumber", basic.get(19..25));
        }

        if let Some(app) = self.application_header {
            match app.get(0..1) {
                Some("I") => {
                    put("direction", Some("input"));
                    put("receiverAddress", app.get(4..16));
                    put("priority", app.get(16..17));
                }
                Some("O") => {
                    put("direction", Some("output"));
                    put("senderAddress", app.get(14..26));
                    put("priority", app.get(46..47));
                }
                _ => {}
            }
        }

        (!header.is_empty()).then_some(Value::Object(header))
    }
}

fn header_block<'a>(payload: &'a str, marker: &str) -> Option<&'a str> {
    let start = payload.find(marker)? + marker.len();
    let rest = &payload[start..];
    rest.find('}').map(|end| &rest[..end])
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^:(\d{2}[A-Z]?):").expect("valid SWIFT tag pattern"))
}

struct Entry {
    tag: &'static str,
    name: &'static str,
    content: String,
}

/// Fields of a text block restricted to the tags of one message type.
struct TextBlock {
    entries: Vec<Entry>,
}

impl TextBlock {
    fn parse(text: &str, table: &TagTable) -> Self {
        let text = text.trim_start_matches(&['\r', '\n'][..]);
        let tags: Vec<(usize, usize, &str)> = tag_regex()
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some((whole.start(), whole.end(), caps.get(1)?.as_str()))
            })
            .collect();

        let mut entries = Vec::new();
        for (i, (_, content_start, tag)) in tags.iter().enumerate() {
            let content_end = tags.get(i + 1).map(|next| next.0).unwrap_or(text.len());
            let known = table.fields.iter().find(|field| field.0 == *tag);
            if let Some(&(tag, name)) = known {
                entries.push(Entry {
                    tag,
                    name,
                    content: text[*content_start..content_end].trim().to_string(),
                });
            }
        }

        TextBlock { entries }
    }

    fn first(&self, tag: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.tag == tag)
            .map(|entry| entry.content.as_str())
    }

    fn first_of(&self, tags: &[&str]) -> Option<&str> {
        tags.iter().find_map(|tag| self.first(tag))
    }

    fn all(&self, tag: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.tag == tag)
            .map(|entry| entry.content.as_str())
            .collect()
    }

    fn required(&self, tag: &str, label: &str) -> Result<&str> {
        self.first(tag).ok_or_else(|| Error::missing_field(label, tag))
    }

    /// Semantic name to raw content; repeated names collect into arrays.
    fn fields_value(&self) -> Value {
        let mut fields = Map::new();
        for entry in &self.entries {
            let content = Value::from(entry.content.as_str());
            match fields.get_mut(entry.name) {
                Some(Value::Array(items)) => items.push(content),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, content]);
                }
                None => {
                    fields.insert(entry.name.to_string(), content);
                }
            }
        }
        Value::Object(fields)
    }
}

/// Decomposed `32A` field: value date, currency and amount.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueDateAmount {
    pub value_date: NaiveDate,
    pub currency: String,
    pub amount: Decimal,
}

const AMOUNT: &str = r"\d[\d,]*(?:\.\d*)?";

fn value_date_amount_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^(\d{{6}})([A-Z]{{3}})({})$", AMOUNT)).expect("valid 32A pattern")
    })
}

fn currency_amount_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"^N?([A-Z]{{3}})({})$", AMOUNT)).expect("valid 32B pattern"))
}

fn balance_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^([CD])(\d{{6}})([A-Z]{{3}})({})$", AMOUNT)).expect("valid balance pattern")
    })
}

fn statement_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^(\d{6})(\d{4})?(RC|RD|C|D)([A-Z])?(\d[\d,]*)([NFS][A-Z0-9]{3})?(.*)$")
            .expect("valid statement line pattern")
    })
}

/// Parse a `32A` value: `YYMMDD` + currency + amount.
pub fn parse_value_date_amount(raw: &str) -> Result<ValueDateAmount> {
    let content = raw.trim();
    let caps = value_date_amount_regex()
        .captures(content)
        .ok_or_else(|| Error::malformed("32A", raw))?;

    Ok(ValueDateAmount {
        value_date: parse_swift_date("32A", &caps[1])?,
        currency: caps[2].to_string(),
        amount: parse_swift_amount("32A", &caps[3])?,
    })
}

/// Parse a SWIFT amount.
///
/// A period marks the decimal point and commas are thousands separators.
/// Without a period, a single comma is the SWIFT decimal comma.
pub fn parse_swift_amount(field: &str, raw: &str) -> Result<Decimal> {
    let normalized = if raw.contains('.') || raw.matches(',').count() > 1 {
        raw.replace(',', "")
    } else {
        raw.replace(',', ".")
    };
    let normalized = normalized.trim_end_matches('.');
    Decimal::from_str(normalized).map_err(|_| Error::malformed(field, raw))
}

/// Parse a `YYMMDD` date; two-digit years are promoted to 20YY.
pub fn parse_swift_date(field: &str, raw: &str) -> Result<NaiveDate> {
    let digits = |range: std::ops::Range<usize>| -> Result<u32> {
        raw.get(range)
            .and_then(|part| part.parse::<u32>().ok())
            .ok_or_else(|| Error::malformed(field, raw))
    };
    if raw.len() != 6 {
        return Err(Error::malformed(field, raw));
    }
    let year = 2000 + digits(0..2)? as i32;
    NaiveDate::from_ymd_opt(year, digits(2..4)?, digits(4..6)?).ok_or_else(|| Error::malformed(field, raw))
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn currency_amount_value(field: &str, raw: &str) -> Result<Value> {
    let caps = currency_amount_regex()
        .captures(raw.trim())
        .ok_or_else(|| Error::malformed(field, raw))?;
    Ok(json!({
        "currency": &caps[1],
        "amount": decimal_value(parse_swift_amount(field, &caps[2])?),
    }))
}

fn balance_value(field: &str, raw: &str) -> Result<Value> {
    let caps = balance_regex()
        .captures(raw.trim())
        .ok_or_else(|| Error::malformed(field, raw))?;
    let mark = DebitCredit::from_str(&caps[1]).map_err(|_| Error::malformed(field, raw))?;
    Ok(json!({
        "debitCredit": mark.as_str(),
        "date": iso_date(parse_swift_date(field, &caps[2])?),
        "currency": &caps[3],
        "amount": decimal_value(parse_swift_amount(field, &caps[4])?),
    }))
}

/// Parse a `:61:` statement line.
fn statement_line_value(raw: &str) -> Result<Value> {
    let caps = statement_line_regex()
        .captures(raw.trim())
        .ok_or_else(|| Error::malformed("61", raw))?;

    let value_date = parse_swift_date("61", &caps[1])?;
    let entry_date = match caps.get(2) {
        Some(mmdd) => {
            let entry = format!("{}{}", value_date.format("%y"), mmdd.as_str());
            Some(iso_date(parse_swift_date("61", &entry)?))
        }
        None => None,
    };
    let mark = DebitCredit::from_str(&caps[3]).map_err(|_| Error::malformed("61", raw))?;

    let rest = caps.get(7).map(|m| m.as_str()).unwrap_or("");
    let first_line = rest.lines().next().unwrap_or("");
    let (customer_ref, bank_ref) = match first_line.split_once("//") {
        Some((customer, bank)) => (customer.trim(), Some(bank.trim())),
        None => (first_line.trim(), None),
    };

    let mut line = Map::new();
    line.insert("valueDate".into(), iso_date(value_date).into());
    if let Some(entry_date) = entry_date {
        line.insert("entryDate".into(), entry_date.into());
    }
    line.insert("debitCredit".into(), mark.as_str().into());
    line.insert("amount".into(), decimal_value(parse_swift_amount("61", &caps[5])?));
    if let Some(code) = caps.get(6) {
        line.insert("transactionType".into(), code.as_str().into());
    }
    if !customer_ref.is_empty() {
        line.insert("customerReference".into(), customer_ref.into());
    }
    if let Some(bank_ref) = bank_ref.filter(|r| !r.is_empty()) {
        line.insert("bankReference".into(), bank_ref.into());
    }
    Ok(Value::Object(line))
}

fn content_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Customer details from a free-text party field (`50K`, `59`).
///
/// Line 1 is the account, line 2 the name, the remaining lines the
/// address. A single line yields only the account.
pub fn customer_info(content: &str) -> Option<Value> {
    let lines = content_lines(content);
    let (account, rest) = lines.split_first()?;
    let name = rest.first().copied();
    let address = (rest.len() > 1).then(|| rest[1..].join(", "));
    Some(json!({
        "account": account,
        "name": name,
        "address": address,
    }))
}

fn customer_value(content: Option<&str>) -> Value {
    content.and_then(customer_info).unwrap_or(Value::Null)
}

/// Name and address party without an account line (MT700 applicant).
fn party_value(content: Option<&str>) -> Value {
    let lines = content.map(content_lines).unwrap_or_default();
    match lines.split_first() {
        Some((name, rest)) => json!({
            "name": name,
            "address": (!rest.is_empty()).then(|| rest.join(", ")),
        }),
        None => Value::Null,
    }
}

/// Financial institution field (`52A`, `57A`, `58A`): optional account
/// line, BIC, or free-text name.
fn institution_value(content: &str) -> Value {
    let lines = content_lines(content);
    let account = lines.iter().find(|line| line.starts_with('/')).copied();
    let bic = lines.iter().find(|line| is_valid_bic(line)).copied();
    let name: Vec<&str> = lines
        .iter()
        .filter(|line| !line.starts_with('/') && !is_valid_bic(line))
        .copied()
        .collect();
    json!({
        "account": account,
        "bic": bic,
        "name": (!name.is_empty()).then(|| name.join(", ")),
    })
}

/// Value after a `:QUAL//` qualifier, as used by MT5xx fields.
fn qualified_value(content: &str) -> &str {
    content
        .trim_start_matches(':')
        .split_once("//")
        .map(|(_, value)| value)
        .unwrap_or(content)
        .trim()
}

fn bic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^[A-Z]{4}[A-Z]{2}[A-Z0-9]{2}(?:[A-Z0-9]{3})?$").expect("valid BIC pattern"))
}

/// Validate a Bank Identifier Code.
///
/// Accepts 8 or 11 characters: institution (4 letters), country
/// (2 letters), location (2 alphanumerics) and an optional branch
/// (3 alphanumerics). Case-insensitive.
pub fn is_valid_bic(code: &str) -> bool {
    bic_regex().is_match(code)
}

fn with_settlement(record: ParsedRecord, settlement: &ValueDateAmount) -> ParsedRecord {
    record
        .with("valueDate", iso_date(settlement.value_date))
        .with("currency", settlement.currency.as_str())
        .with("amount", decimal_value(settlement.amount))
}

fn assemble_mt103(record: ParsedRecord, block: &TextBlock, label: &str) -> Result<ParsedRecord> {
    let settlement = parse_value_date_amount(block.required("32A", label)?)?;
    let instructed = block
        .first("33B")
        .map(|raw| currency_amount_value("33B", raw))
        .transpose()?;

    let record = record
        .with("transactionReference", block.required("20", label)?)
        .with_opt("bankOperationCode", block.first("23B"));
    Ok(with_settlement(record, &settlement)
        .with_opt("instructedAmount", instructed)
        .with("sender", customer_value(block.first_of(&["50K", "50A", "50F"])))
        .with("receiver", customer_value(block.first_of(&["59", "59A", "59F"])))
        .with_opt("orderingInstitution", block.first_of(&["52A", "52D"]).map(institution_value))
        .with_opt("accountWithInstitution", block.first_of(&["57A", "57D"]).map(institution_value))
        .with_opt("remittanceInformation", block.first("70"))
        .with_opt("detailsOfCharges", block.first("71A"))
        .with_opt("senderToReceiverInformation", block.first("72")))
}

fn assemble_mt202(record: ParsedRecord, block: &TextBlock, label: &str) -> Result<ParsedRecord> {
    let settlement = parse_value_date_amount(block.required("32A", label)?)?;
    let record = record
        .with("transactionReference", block.required("20", label)?)
        .with("relatedReference", block.required("21", label)?);
    Ok(with_settlement(record, &settlement)
        .with_opt("orderingInstitution", block.first_of(&["52A", "52D"]).map(institution_value))
        .with_opt("intermediary", block.first("56A").map(institution_value))
        .with_opt("accountWithInstitution", block.first_of(&["57A", "57D"]).map(institution_value))
        .with("beneficiaryInstitution", institution_value(block.required("58A", label)?))
        .with_opt("senderToReceiverInformation", block.first("72")))
}

fn assemble_mt515(record: ParsedRecord, block: &TextBlock, label: &str) -> Result<ParsedRecord> {
    let trade_date = block.first_of(&["98A", "98C"]).map(|raw| {
        let value = qualified_value(raw);
        NaiveDate::parse_from_str(value.get(0..8).unwrap_or(value), "%Y%m%d")
            .map(iso_date)
            .unwrap_or_else(|_| value.to_string())
    });
    let settlement = block
        .first("19A")
        .map(|raw| currency_amount_value("19A", qualified_value(raw)))
        .transpose()?;

    Ok(record
        .with("senderReference", qualified_value(block.required("20C", label)?))
        .with("functionOfMessage", block.required("23G", label)?)
        .with_opt("tradeDate", trade_date)
        .with("security", block.required("35B", label)?)
        .with_opt("quantity", block.first("36B").map(qualified_value))
        .with_opt("dealPrice", block.first_of(&["90A", "90B"]).map(qualified_value))
        .with_opt("settlementAmount", settlement)
        .with_opt("safekeepingAccount", block.first("97A").map(qualified_value)))
}

fn assemble_mt700(record: ParsedRecord, block: &TextBlock, label: &str) -> Result<ParsedRecord> {
    let issued = parse_swift_date("31C", block.required("31C", label)?)?;
    let expiry_raw = block.required("31D", label)?;
    let expiry_date = parse_swift_date("31D", expiry_raw.get(0..6).unwrap_or(expiry_raw))?;
    let expiry_place = expiry_raw.get(6..).map(str::trim).filter(|place| !place.is_empty());
    let credit_amount = currency_amount_value("32B", block.required("32B", label)?)?;

    Ok(record
        .with("documentaryCreditNumber", block.required("20", label)?)
        .with("sequenceOfTotal", block.required("27", label)?)
        .with("formOfCredit", block.required("40A", label)?)
        .with("dateOfIssue", iso_date(issued))
        .with("expiry", json!({ "date": iso_date(expiry_date), "place": expiry_place }))
        .with("applicant", party_value(block.first("50")))
        .with("beneficiary", customer_value(block.first("59")))
        .with("currency", credit_amount["currency"].clone())
        .with("amount", credit_amount["amount"].clone())
        .with_opt("availableWith", block.first_of(&["41A", "41D"]))
        .with_opt("applicableRules", block.first("40E"))
        .with_opt("descriptionOfGoods", block.first("45A")))
}

fn assemble_mt798(record: ParsedRecord, block: &TextBlock, label: &str) -> Result<ParsedRecord> {
    Ok(record
        .with("transactionReference", block.required("20", label)?)
        .with("subMessageType", block.required("12", label)?)
        .with_opt("sequenceOfTotal", block.first("27"))
        .with("proprietaryMessage", block.required("77E", label)?))
}

fn assemble_mt950(record: ParsedRecord, block: &TextBlock, label: &str) -> Result<ParsedRecord> {
    let lines = block
        .all("61")
        .into_iter()
        .map(statement_line_value)
        .collect::<Result<Vec<_>>>()?;
    let available = block.first("64").map(|raw| balance_value("64", raw)).transpose()?;

    Ok(record
        .with("transactionReference", block.required("20", label)?)
        .with("accountIdentification", block.required("25", label)?)
        .with("statementNumber", block.required("28C", label)?)
        .with("openingBalance", balance_value("60F", block.required("60F", label)?)?)
        .with("statementLines", lines)
        .with("closingBalance", balance_value("62F", block.required("62F", label)?)?)
        .with_opt("closingAvailableBalance", available))
}

fn assemble_mt101(record: ParsedRecord, block: &TextBlock, label: &str) -> Result<ParsedRecord> {
    let execution = parse_swift_date("30", block.required("30", label)?)?;
    let transfer = currency_amount_value("32B", block.required("32B", label)?)?;

    Ok(record
        .with("senderReference", block.required("20", label)?)
        .with_opt("customerSpecifiedReference", block.first("21R"))
        .with("messageIndex", block.required("28D", label)?)
        .with("requestedExecutionDate", iso_date(execution))
        .with("transactionReference", block.required("21", label)?)
        .with("currency", transfer["currency"].clone())
        .with("amount", transfer["amount"].clone())
        .with_opt("orderingCustomer", block.first("50H").and_then(customer_info))
        .with("beneficiary", customer_value(block.first_of(&["59", "59A"])))
        .with_opt("accountWithInstitution", block.first("57A").map(institution_value))
        .with_opt("remittanceInformation", block.first("70"))
        .with_opt("detailsOfCharges", block.first("71A")))
}

impl MessageExtractor for SwiftMtParser {
    fn name(&self) -> &'static str {
        self.profile.parser_name()
    }

    fn handles(&self, label: &str) -> bool {
        label.starts_with("MT") || label.contains("SWIFT")
    }

    fn extract(&self, payload: &str, label: &str) -> Result<ParsedRecord> {
        let assumed_type = match label.parse::<FormatLabel>() {
            Ok(FormatLabel::SwiftMt(code)) => Some(code),
            _ => None,
        };
        self.parse(payload, assumed_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wrap(code: &str, text: &str) -> String {
        format!(
            "{{1:F01BANKBEBBAXXX0000000000}}{{2:I{}BANKDEFFXXXXN}}{{3:{{108:MUR}}}}{{4:\n{}\n-}}",
            code, text
        )
    }

    const MT103_TEXT: &str = ":20:123456789\n:23B:CRED\n:32A:230101USD1000,00\n:50K:/12345678\n    SENDER BANK\n:59:/98765432\n    BENEFICIARY NAME\n:71A:SHA";

    #[test]
    fn test_parse_mt103() {
        let record = SwiftMtParser::enhanced().parse(&wrap("103", MT103_TEXT), None).unwrap();
        assert_eq!(record.message_type(), "MT103");
        assert_eq!(record.get_str("transactionReference"), Some("123456789"));
        assert_eq!(record.get_f64("amount"), Some(1000.0));
        assert_eq!(record.get_str("currency"), Some("USD"));
        assert_eq!(record.get_str("valueDate"), Some("2023-01-01"));
        assert_eq!(record.get_str("sender.account"), Some("/12345678"));
        assert_eq!(record.get_str("sender.name"), Some("SENDER BANK"));
        assert_eq!(record.get_str("receiver.account"), Some("/98765432"));
        assert_eq!(record.get_str("detailsOfCharges"), Some("SHA"));
        assert_eq!(record.get_str("header.receiverAddress"), Some("BANKDEFFXXXX"));
        assert_eq!(record.get_str("fields.bankOperationCode"), Some("CRED"));
    }

    #[test]
    fn test_missing_required_tag() {
        let text = ":20:REF\n:32A:230101USD1000,00\n:59:/98765432";
        let err = SwiftMtParser::enhanced().parse(&wrap("103", text), None).unwrap_err();
        assert!(matches!(err, Error::MissingField { ref field, .. } if field == "50K"));
    }

    #[test]
    fn test_missing_blocks() {
        let err = SwiftMtParser::enhanced().parse(":20:REF\n:32A:230101USD1,00", None).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[test]
    fn test_base_profile_rejects_extended_types() {
        let text = ":20:STMT\n:25:123\n:28C:1/1\n:60F:C230701USD100,00\n:62F:C230701USD100,00";
        let err = SwiftMtParser::base().parse(&wrap("950", text), None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType { ref message_type, .. } if message_type == "MT950"));
        assert!(SwiftMtParser::enhanced().parse(&wrap("950", text), None).is_ok());

        let err = SwiftMtParser::enhanced().parse(&wrap("999", ":20:X"), None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType { .. }));
    }

    #[test]
    fn test_value_date_amount() {
        let parsed = parse_value_date_amount("230701USD1000,00").unwrap();
        assert_eq!(parsed.value_date, NaiveDate::from_ymd_opt(2023, 7, 1).unwrap());
        assert_eq!(parsed.currency, "USD");
        assert_eq!(parsed.amount, Decimal::from_str("1000.00").unwrap());

        let parsed = parse_value_date_amount("240229EUR1,250,000.50").unwrap();
        assert_eq!(parsed.amount, Decimal::from_str("1250000.50").unwrap());
        assert_eq!(parsed.value_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        assert!(matches!(parse_value_date_amount("23071USD1000"), Err(Error::MalformedValue { .. })));
        assert!(matches!(parse_value_date_amount("230701US1000"), Err(Error::MalformedValue { .. })));
        assert!(parse_value_date_amount("231301USD1000,00").is_err());
    }

    #[test]
    fn test_customer_info() {
        assert_eq!(customer_info(""), None);
        assert_eq!(
            customer_info("/123").unwrap(),
            json!({"account": "/123", "name": null, "address": null})
        );
        assert_eq!(
            customer_info("/123\nJOHN DOE\n1 MAIN ST\nLONDON").unwrap(),
            json!({"account": "/123", "name": "JOHN DOE", "address": "1 MAIN ST, LONDON"})
        );
    }

    #[test]
    fn test_bic_validation() {
        assert!(is_valid_bic("DEUTDEFF"));
        assert!(is_valid_bic("DEUTDEFF500"));
        assert!(is_valid_bic("deutdeff"));
        assert!(!is_valid_bic("DEUT"));
        assert!(!is_valid_bic("12345678"));
        assert!(!is_valid_bic("DEUTDEFF5"));
    }

    #[test]
    fn test_mt202_institutions() {
        let text = ":20:FI-REF\n:21:REL-REF\n:32A:230315EUR50000,\n:58A:/DE89370400440532013000\nDEUTDEFF";
        let record = SwiftMtParser::base().parse(&wrap("202", text), None).unwrap();
        assert_eq!(record.get_str("relatedReference"), Some("REL-REF"));
        assert_eq!(record.get_f64("amount"), Some(50000.0));
        assert_eq!(record.get_str("beneficiaryInstitution.bic"), Some("DEUTDEFF"));
        assert_eq!(
            record.get_str("beneficiaryInstitution.account"),
            Some("/DE89370400440532013000")
        );
    }

    #[test]
    fn test_mt950_statement_lines() {
        let text = ":20:STMT1\n:25:12345678\n:28C:00001/001\n:60F:C230701USD1000,00\n\
                    :61:2307010701D250,00NTRFINV-1//BANKREF1\n:61:230702C75,5NCHKREF2\n\
                    :62F:C230702USD825,50";
        let record = SwiftMtParser::enhanced().parse(&wrap("950", text), None).unwrap();
        assert_eq!(record.get_str("openingBalance.debitCredit"), Some("credit"));
        assert_eq!(record.get_f64("closingBalance.amount"), Some(825.5));

        let lines = record.get("statementLines").and_then(Value::as_array).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["debitCredit"], "debit");
        assert_eq!(lines[0]["entryDate"], "2023-07-01");
        assert_eq!(lines[0]["customerReference"], "INV-1");
        assert_eq!(lines[0]["bankReference"], "BANKREF1");
        assert_eq!(lines[1]["amount"], 75.5);
        assert_eq!(lines[1]["transactionType"], "NCHK");

        assert!(record.get_path("fields.statementLine").unwrap().is_array());
    }

    #[test]
    fn test_mt515_qualified_fields() {
        let text = ":16R:GENL\n:20C::SEME//TRADE-42\n:23G:NEWM\n:16S:GENL\n:16R:CONFDET\n\
                    :98A::TRAD//20230705\n:19A::SETT//USD15000,\n:35B:ISIN US0378331005\n:16S:CONFDET";
        let record = SwiftMtParser::enhanced().parse(&wrap("515", text), None).unwrap();
        assert_eq!(record.get_str("senderReference"), Some("TRADE-42"));
        assert_eq!(record.get_str("tradeDate"), Some("2023-07-05"));
        assert_eq!(record.get_f64("settlementAmount.amount"), Some(15000.0));
        assert_eq!(record.get_str("security"), Some("ISIN US0378331005"));
    }

    #[test]
    fn test_mt700_and_mt101() {
        let text = ":27:1/1\n:40A:IRREVOCABLE\n:20:LC-1\n:31C:230601\n:31D:230930LONDON\n\
                    :50:ACME CORP\n1 MAIN ST\n:59:/GB123\nGLOBEX LTD\n:32B:USD250000,00";
        let record = SwiftMtParser::enhanced().parse(&wrap("700", text), None).unwrap();
        assert_eq!(record.get_str("dateOfIssue"), Some("2023-06-01"));
        assert_eq!(record.get_str("expiry.place"), Some("LONDON"));
        assert_eq!(record.get_str("applicant.name"), Some("ACME CORP"));
        assert_eq!(record.get_f64("amount"), Some(250000.0));

        let text = ":20:BATCH-1\n:28D:1/1\n:30:230710\n:21:PAY-1\n:32B:EUR1200,50\n:59:/FR7630006000011234567890189\nDUPONT SA";
        let record = SwiftMtParser::enhanced().parse(&wrap("101", text), None).unwrap();
        assert_eq!(record.get_str("requestedExecutionDate"), Some("2023-07-10"));
        assert_eq!(record.get_f64("amount"), Some(1200.5));
        assert_eq!(record.get_str("beneficiary.name"), Some("DUPONT SA"));
    }

    #[test]
    fn test_assumed_type_only_without_header_code() {
        let payload = format!("{{1:F01BANK}}{{2:}}{{4:\n{}\n-}}", MT103_TEXT);
        let record = SwiftMtParser::base().parse(&payload, Some(103)).unwrap();
        assert_eq!(record.message_type(), "MT103");
        assert!(SwiftMtParser::base().parse(&payload, None).is_err());
    }
}
