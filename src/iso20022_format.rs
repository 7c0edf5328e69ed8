//! ISO 20022 XML parser.
//!
//! Only the pacs.008 FI-to-FI customer credit transfer is extracted. The
//! pacs.009, camt.053 and camt.052 entry points recognise their namespace
//! and report the message as unsupported.

use crate::error::{Error, Result};
use crate::extract::{decimal_value, parse_decimal};
use crate::registry::MessageExtractor;
use crate::types::ParsedRecord;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::OnceLock;

const FORMAT: &str = "ISO20022";
const PARSER: &str = "iso20022";

/// Message definitions this module knows about.
pub const KNOWN_MESSAGES: [&str; 4] = ["pacs.008", "pacs.009", "camt.053", "camt.052"];

/// Parser for ISO 20022 documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Iso20022Parser;

impl Iso20022Parser {
    pub fn new() -> Self {
        Self
    }

    /// Message definition (`pacs.008`, `camt.053`, ...) named in the payload.
    pub fn detect_message(payload: &str) -> Option<&'static str> {
        KNOWN_MESSAGES.iter().copied().find(|id| payload.contains(id))
    }

    /// Parse whichever known message definition the payload declares.
    pub fn parse(&self, payload: &str) -> Result<ParsedRecord> {
        match Self::detect_message(payload) {
            Some("pacs.008") => self.parse_pacs008(payload),
            Some("pacs.009") => self.parse_pacs009(payload),
            Some("camt.053") => self.parse_camt053(payload),
            Some("camt.052") => self.parse_camt052(payload),
            _ => Err(Error::UnsupportedType {
                format: FORMAT.to_string(),
                message_type: full_identifier(payload).unwrap_or("unrecognised namespace").to_string(),
            }),
        }
    }

    /// Parse a pacs.008 FI-to-FI customer credit transfer.
    ///
    /// The first `CdtTrfTxInf` block is extracted alongside the group header.
    pub fn parse_pacs008(&self, xml: &str) -> Result<ParsedRecord> {
        require_namespace(xml, "pacs.008")?;

        let document: Pacs008Document = serde_xml_rs::from_str(xml.trim())?;
        let transfer = document.transfer;
        let header = transfer.grp_hdr;
        let tx = transfer
            .cdt_trf_tx_inf
            .into_iter()
            .next()
            .ok_or_else(|| Error::missing_field(FORMAT, "CdtTrfTxInf"))?;

        let message_id = header.msg_id.ok_or_else(|| Error::missing_field(FORMAT, "GrpHdr/MsgId"))?;
        let definition = full_identifier(xml).unwrap_or("pacs.008");

        let total = header
            .ttl_intr_bk_sttlm_amt
            .as_ref()
            .map(|a| amount_value("TtlIntrBkSttlmAmt", a))
            .transpose()?;
        let group_header = json!({
            "messageId": message_id,
            "creationDateTime": header.cre_dt_tm,
            "numberOfTransactions": header.nb_of_txs.as_deref().map(count_value),
            "totalSettlementAmount": total,
            "settlementDate": header.intr_bk_sttlm_dt,
            "settlementMethod": header.sttlm_inf.and_then(|s| s.sttlm_mtd),
        });

        let settlement = tx
            .intr_bk_sttlm_amt
            .as_ref()
            .map(|a| amount_value("IntrBkSttlmAmt", a))
            .transpose()?;
        let instructed = match tx.instd_amt.as_ref() {
            Some(amount) => Some(amount_value("InstdAmt", amount)?),
            None => settlement.clone(),
        };

        let credit_transfer = json!({
            "paymentId": {
                "instructionId": tx.pmt_id.instr_id,
                "endToEndId": tx.pmt_id.end_to_end_id,
                "transactionId": tx.pmt_id.tx_id,
            },
            "settlementAmount": settlement,
            "instructedAmount": instructed,
            "chargeBearer": tx.chrg_br,
            "debtor": party_value(tx.dbtr.as_ref(), tx.dbtr_acct.as_ref(), tx.dbtr_agt.as_ref()),
            "creditor": party_value(tx.cdtr.as_ref(), tx.cdtr_acct.as_ref(), tx.cdtr_agt.as_ref()),
            "remittanceInformation": tx.rmt_inf.and_then(|r| r.ustrd),
        });

        Ok(ParsedRecord::new(FORMAT, PARSER, definition)
            .with("messageDefinition", definition)
            .with("groupHeader", group_header)
            .with("creditTransfer", credit_transfer))
    }

    /// pacs.009 is recognised but not extracted.
    pub fn parse_pacs009(&self, xml: &str) -> Result<ParsedRecord> {
        unimplemented_message(xml, "pacs.009")
    }

    /// camt.053 is recognised but not extracted.
    pub fn parse_camt053(&self, xml: &str) -> Result<ParsedRecord> {
        unimplemented_message(xml, "camt.053")
    }

    /// camt.052 is recognised but not extracted.
    pub fn parse_camt052(&self, xml: &str) -> Result<ParsedRecord> {
        unimplemented_message(xml, "camt.052")
    }
}

fn require_namespace(xml: &str, id: &str) -> Result<()> {
    if xml.contains(id) {
        Ok(())
    } else {
        Err(Error::invalid_format(FORMAT, format!("document does not declare the {} namespace", id)))
    }
}

fn unimplemented_message(xml: &str, id: &str) -> Result<ParsedRecord> {
    require_namespace(xml, id)?;
    Err(Error::UnsupportedType {
        format: FORMAT.to_string(),
        message_type: format!("{} extraction is not implemented", id),
    })
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:pacs|camt|pain)\.\d{3}\.\d{3}\.\d{2}").expect("valid ISO 20022 identifier pattern"))
}

/// Full dotted identifier, e.g. `pacs.008.001.10`.
fn full_identifier(xml: &str) -> Option<&str> {
    identifier_regex().find(xml).map(|m| m.as_str())
}

fn count_value(raw: &str) -> Value {
    raw.trim()
        .parse::<u64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw))
}

fn amount_value(field: &str, amount: &AmountXml) -> Result<Value> {
    Ok(json!({
        "amount": decimal_value(parse_decimal(field, &amount.value)?),
        "currency": amount.ccy(),
    }))
}

fn party_value(party: Option<&PartyXml>, account: Option<&AccountXml>, agent: Option<&AgentXml>) -> Value {
    json!({
        "name": party.and_then(|p| p.nm.clone()),
        "account": account.and_then(|a| {
            a.id.iban.clone().or_else(|| a.id.othr.as_ref().map(|o| o.id.clone()))
        }),
        "agentBic": agent.and_then(|a| a.fin_instn_id.bicfi.clone().or_else(|| a.fin_instn_id.bic.clone())),
    })
}

// XML structure definitions
#[derive(Debug, Deserialize)]
#[serde(rename = "Document")]
struct Pacs008Document {
    #[serde(rename = "FIToFICstmrCdtTrf")]
    transfer: CreditTransferXml,
}

#[derive(Debug, Deserialize)]
struct CreditTransferXml {
    #[serde(rename = "GrpHdr")]
    grp_hdr: GroupHeaderXml,
    #[serde(rename = "CdtTrfTxInf", default)]
    cdt_trf_tx_inf: Vec<TransactionXml>,
}

#[derive(Debug, Deserialize)]
struct GroupHeaderXml {
    #[serde(rename = "MsgId")]
    msg_id: Option<String>,
    #[serde(rename = "CreDtTm")]
    cre_dt_tm: Option<String>,
    #[serde(rename = "NbOfTxs")]
    nb_of_txs: Option<String>,
    #[serde(rename = "TtlIntrBkSttlmAmt")]
    ttl_intr_bk_sttlm_amt: Option<AmountXml>,
    #[serde(rename = "IntrBkSttlmDt")]
    intr_bk_sttlm_dt: Option<String>,
    #[serde(rename = "SttlmInf")]
    sttlm_inf: Option<SettlementInfoXml>,
}

#[derive(Debug, Deserialize)]
struct SettlementInfoXml {
    #[serde(rename = "SttlmMtd")]
    sttlm_mtd: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionXml {
    #[serde(rename = "PmtId")]
    pmt_id: PaymentIdXml,
    #[serde(rename = "IntrBkSttlmAmt")]
    intr_bk_sttlm_amt: Option<AmountXml>,
    #[serde(rename = "InstdAmt")]
    instd_amt: Option<AmountXml>,
    #[serde(rename = "ChrgBr")]
    chrg_br: Option<String>,
    #[serde(rename = "Dbtr")]
    dbtr: Option<PartyXml>,
    #[serde(rename = "DbtrAcct")]
    dbtr_acct: Option<AccountXml>,
    #[serde(rename = "DbtrAgt")]
    dbtr_agt: Option<AgentXml>,
    #[serde(rename = "CdtrAgt")]
    cdtr_agt: Option<AgentXml>,
    #[serde(rename = "Cdtr")]
    cdtr: Option<PartyXml>,
    #[serde(rename = "CdtrAcct")]
    cdtr_acct: Option<AccountXml>,
    #[serde(rename = "RmtInf")]
    rmt_inf: Option<RemittanceInformationXml>,
}

#[derive(Debug, Deserialize)]
struct PaymentIdXml {
    #[serde(rename = "InstrId")]
    instr_id: Option<String>,
    #[serde(rename = "EndToEndId")]
    end_to_end_id: Option<String>,
    #[serde(rename = "TxId")]
    tx_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AmountXml {
    #[serde(rename = "$value")]
    value: String,
    #[serde(rename = "@Ccy")]
    ccy: Option<String>,
    #[serde(rename = "Ccy")]
    ccy_alt: Option<String>,
}

impl AmountXml {
    fn ccy(&self) -> Option<String> {
        self.ccy.clone().or_else(|| self.ccy_alt.clone())
    }
}

#[derive(Debug, Deserialize)]
struct PartyXml {
    #[serde(rename = "Nm")]
    nm: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountXml {
    #[serde(rename = "Id")]
    id: AccountIdXml,
}

#[derive(Debug, Deserialize)]
struct AccountIdXml {
    #[serde(rename = "IBAN")]
    iban: Option<String>,
    #[serde(rename = "Othr")]
    othr: Option<OtherAccountIdXml>,
}

#[derive(Debug, Deserialize)]
struct OtherAccountIdXml {
    #[serde(rename = "Id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct AgentXml {
    #[serde(rename = "FinInstnId")]
    fin_instn_id: FinancialInstitutionIdXml,
}

#[derive(Debug, Deserialize)]
struct FinancialInstitutionIdXml {
    #[serde(rename = "BICFI")]
    bicfi: Option<String>,
    #[serde(rename = "BIC")]
    bic: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemittanceInformationXml {
    #[serde(rename = "Ustrd")]
    ustrd: Option<String>,
}

impl MessageExtractor for Iso20022Parser {
    fn name(&self) -> &'static str {
        PARSER
    }

    fn handles(&self, label: &str) -> bool {
        ["ISO", "PACS", "CAMT"].iter().any(|system| label.contains(system))
    }

    /// A label naming a message definition (`PACS.008`) selects that
    /// extractor; otherwise the payload's namespace decides.
    fn extract(&self, payload: &str, label: &str) -> Result<ParsedRecord> {
        let named = KNOWN_MESSAGES
            .iter()
            .copied()
            .find(|id| label.contains(id.to_uppercase().as_str()));
        match named {
            Some("pacs.008") => self.parse_pacs008(payload),
            Some("pacs.009") => self.parse_pacs009(payload),
            Some("camt.053") => self.parse_camt053(payload),
            Some("camt.052") => self.parse_camt052(payload),
            _ => self.parse(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACS008: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Document xmlns="urn:iso:std:iso:20022:tech:xsd:pacs.008.001.10">
  <FIToFICstmrCdtTrf>
    <GrpHdr>
      <MsgId>MSG-20230701-001</MsgId>
      <CreDtTm>2023-07-01T10:30:00</CreDtTm>
      <NbOfTxs>1</NbOfTxs>
      <TtlIntrBkSttlmAmt Ccy="EUR">1500.75</TtlIntrBkSttlmAmt>
      <IntrBkSttlmDt>2023-07-01</IntrBkSttlmDt>
      <SttlmInf>
        <SttlmMtd>CLRG</SttlmMtd>
      </SttlmInf>
    </GrpHdr>
    <CdtTrfTxInf>
      <PmtId>
        <InstrId>INSTR-1</InstrId>
        <EndToEndId>E2E-1</EndToEndId>
        <TxId>TX-1</TxId>
      </PmtId>
      <IntrBkSttlmAmt Ccy="EUR">1500.75</IntrBkSttlmAmt>
      <ChrgBr>SLEV</ChrgBr>
      <Dbtr>
        <Nm>Alice Debtor</Nm>
      </Dbtr>
      <DbtrAcct>
        <Id>
          <IBAN>DE89370400440532013000</IBAN>
        </Id>
      </DbtrAcct>
      <DbtrAgt>
        <FinInstnId>
          <BICFI>DEUTDEFF</BICFI>
        </FinInstnId>
      </DbtrAgt>
      <CdtrAgt>
        <FinInstnId>
          <BICFI>BNPAFRPP</BICFI>
        </FinInstnId>
      </CdtrAgt>
      <Cdtr>
        <Nm>Bob Creditor</Nm>
      </Cdtr>
      <CdtrAcct>
        <Id>
          <Othr>
            <Id>FR-ACC-42</Id>
          </Othr>
        </Id>
      </CdtrAcct>
      <RmtInf>
        <Ustrd>Invoice 42</Ustrd>
      </RmtInf>
    </CdtTrfTxInf>
  </FIToFICstmrCdtTrf>
</Document>"#;

    #[test]
    fn test_parse_pacs008() {
        let record = Iso20022Parser::new().parse_pacs008(PACS008).unwrap();
        assert_eq!(record.message_type(), "ISO20022");
        assert_eq!(record.metadata().format, "pacs.008.001.10");
        assert_eq!(record.get_str("groupHeader.messageId"), Some("MSG-20230701-001"));
        assert_eq!(record.get_f64("groupHeader.numberOfTransactions"), Some(1.0));
        assert_eq!(record.get_f64("groupHeader.totalSettlementAmount.amount"), Some(1500.75));
        assert_eq!(record.get_str("groupHeader.settlementMethod"), Some("CLRG"));
        assert_eq!(record.get_str("creditTransfer.paymentId.endToEndId"), Some("E2E-1"));
        assert_eq!(record.get_f64("creditTransfer.instructedAmount.amount"), Some(1500.75));
        assert_eq!(record.get_str("creditTransfer.chargeBearer"), Some("SLEV"));
        assert_eq!(record.get_str("creditTransfer.debtor.account"), Some("DE89370400440532013000"));
        assert_eq!(record.get_str("creditTransfer.debtor.agentBic"), Some("DEUTDEFF"));
        assert_eq!(record.get_str("creditTransfer.creditor.account"), Some("FR-ACC-42"));
        assert_eq!(record.get_str("creditTransfer.remittanceInformation"), Some("Invoice 42"));
    }

    #[test]
    fn test_pacs008_requires_namespace() {
        let err = Iso20022Parser::new().parse_pacs008("<Document/>").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[test]
    fn test_sibling_messages_are_unimplemented() {
        let parser = Iso20022Parser::new();
        let camt = r#"<?xml version="1.0"?><Document xmlns="urn:iso:std:iso:20022:tech:xsd:camt.053.001.08"/>"#;
        assert!(matches!(parser.parse_camt053(camt), Err(Error::UnsupportedType { .. })));
        assert!(matches!(parser.parse(camt), Err(Error::UnsupportedType { .. })));
        assert!(matches!(parser.parse_pacs009(camt), Err(Error::InvalidFormat { .. })));
        assert!(matches!(parser.parse_camt052(camt), Err(Error::InvalidFormat { .. })));
    }
}
