//! Static grammar tables: SWIFT MT field tags and fixed-width offsets.
//!
//! These are read-only lookup tables. Nothing in the crate mutates them.

/// Recognized tags for one SWIFT MT message type.
#[derive(Debug)]
pub struct TagTable {
    /// Three-digit message type code.
    pub code: u16,
    /// Tag to semantic field name, in message order.
    pub fields: &'static [(&'static str, &'static str)],
    /// Tags that must be present.
    pub required: &'static [&'static str],
}

impl TagTable {
    /// Semantic name for a tag, if the tag belongs to this message type.
    pub fn field_name(&self, tag: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, name)| *name)
    }
}

/// MT types handled by the base SWIFT profile.
pub const BASE_MT_TYPES: &[u16] = &[103, 202];

/// MT types handled by the enhanced SWIFT profile.
pub const ENHANCED_MT_TYPES: &[u16] = &[103, 202, 515, 700, 798, 950, 101];

/// Single customer credit transfer.
pub const MT103: TagTable = TagTable {
    code: 103,
    fields: &[
        ("20", "transactionReference"),
        ("13C", "timeIndication"),
        ("23B", "bankOperationCode"),
        ("23E", "instructionCode"),
        ("26T", "transactionTypeCode"),
        ("32A", "valueDateCurrencyAmount"),
        ("33B", "currencyInstructedAmount"),
        ("36", "exchangeRate"),
        ("50A", "orderingCustomer"),
        ("50F", "orderingCustomer"),
        ("50K", "orderingCustomer"),
        ("51A", "sendingInstitution"),
        ("52A", "orderingInstitution"),
        ("52D", "orderingInstitution"),
        ("53A", "sendersCorrespondent"),
        ("53B", "sendersCorrespondent"),
        ("54A", "receiversCorrespondent"),
        ("56A", "intermediaryInstitution"),
        ("57A", "accountWithInstitution"),
        ("57D", "accountWithInstitution"),
        ("59", "beneficiaryCustomer"),
        ("59A", "beneficiaryCustomer"),
        ("59F", "beneficiaryCustomer"),
        ("70", "remittanceInformation"),
        ("71A", "detailsOfCharges"),
        ("71F", "sendersCharges"),
        ("71G", "receiversCharges"),
        ("72", "senderToReceiverInformation"),
        ("77B", "regulatoryReporting"),
    ],
    required: &["20", "32A", "50K", "59"],
};

/// General financial institution transfer.
pub const MT202: TagTable = TagTable {
    code: 202,
    fields: &[
        ("20", "transactionReference"),
        ("21", "relatedReference"),
        ("13C", "timeIndication"),
        ("32A", "valueDateCurrencyAmount"),
        ("52A", "orderingInstitution"),
        ("52D", "orderingInstitution"),
        ("53A", "sendersCorrespondent"),
        ("53B", "sendersCorrespondent"),
        ("54A", "receiversCorrespondent"),
        ("56A", "intermediary"),
        ("57A", "accountWithInstitution"),
        ("57D", "accountWithInstitution"),
        ("58A", "beneficiaryInstitution"),
        ("58D", "beneficiaryInstitution"),
        ("72", "senderToReceiverInformation"),
    ],
    required: &["20", "21", "32A", "58A"],
};

/// Client confirmation of purchase or sale.
pub const MT515: TagTable = TagTable {
    code: 515,
    fields: &[
        ("16R", "startOfBlock"),
        ("20C", "senderReference"),
        ("23G", "functionOfMessage"),
        ("22F", "indicator"),
        ("22H", "indicatorCode"),
        ("98A", "tradeDate"),
        ("98C", "tradeDateTime"),
        ("90A", "dealPrice"),
        ("90B", "dealPriceAmount"),
        ("35B", "identificationOfSecurity"),
        ("36B", "quantityOfFinancialInstrument"),
        ("19A", "settlementAmount"),
        ("95P", "party"),
        ("95Q", "partyName"),
        ("97A", "safekeepingAccount"),
        ("16S", "endOfBlock"),
    ],
    required: &["20C", "23G", "35B"],
};

/// Issue of a documentary credit.
pub const MT700: TagTable = TagTable {
    code: 700,
    fields: &[
        ("27", "sequenceOfTotal"),
        ("40A", "formOfDocumentaryCredit"),
        ("20", "documentaryCreditNumber"),
        ("23", "referenceToPreAdvice"),
        ("31C", "dateOfIssue"),
        ("40E", "applicableRules"),
        ("31D", "dateAndPlaceOfExpiry"),
        ("51A", "applicantBank"),
        ("50", "applicant"),
        ("59", "beneficiary"),
        ("32B", "currencyCodeAmount"),
        ("39A", "percentageCreditAmountTolerance"),
        ("41A", "availableWithBy"),
        ("41D", "availableWithBy"),
        ("42C", "draftsAt"),
        ("43P", "partialShipments"),
        ("43T", "transhipment"),
        ("44A", "placeOfDispatch"),
        ("44B", "placeOfFinalDestination"),
        ("44C", "latestDateOfShipment"),
        ("45A", "descriptionOfGoods"),
        ("46A", "documentsRequired"),
        ("47A", "additionalConditions"),
        ("71B", "charges"),
        ("48", "periodForPresentation"),
        ("49", "confirmationInstructions"),
        ("78", "instructionsToBank"),
    ],
    required: &["27", "40A", "20", "31C", "31D", "50", "59", "32B"],
};

/// Proprietary trade-finance message.
pub const MT798: TagTable = TagTable {
    code: 798,
    fields: &[
        ("27", "sequenceOfTotal"),
        ("20", "transactionReference"),
        ("12", "subMessageType"),
        ("77E", "proprietaryMessage"),
    ],
    required: &["20", "12", "77E"],
};

/// Customer statement message.
pub const MT950: TagTable = TagTable {
    code: 950,
    fields: &[
        ("20", "transactionReference"),
        ("25", "accountIdentification"),
        ("28C", "statementNumber"),
        ("60F", "openingBalance"),
        ("60M", "openingBalance"),
        ("61", "statementLine"),
        ("62F", "closingBalance"),
        ("62M", "closingBalance"),
        ("64", "closingAvailableBalance"),
    ],
    required: &["20", "25", "28C", "60F", "62F"],
};

/// Request for transfer.
pub const MT101: TagTable = TagTable {
    code: 101,
    fields: &[
        ("20", "senderReference"),
        ("21R", "customerSpecifiedReference"),
        ("28D", "messageIndex"),
        ("50C", "instructingParty"),
        ("50H", "orderingCustomer"),
        ("52A", "accountServicingInstitution"),
        ("30", "requestedExecutionDate"),
        ("21", "transactionReference"),
        ("32B", "currencyTransactionAmount"),
        ("56A", "intermediary"),
        ("57A", "accountWithInstitution"),
        ("59", "beneficiary"),
        ("59A", "beneficiary"),
        ("70", "remittanceInformation"),
        ("77B", "regulatoryReporting"),
        ("71A", "detailsOfCharges"),
    ],
    required: &["20", "28D", "30", "21", "32B", "59"],
};

const SWIFT_TABLES: &[&TagTable] = &[&MT103, &MT202, &MT515, &MT700, &MT798, &MT950, &MT101];

/// Tag table for a message type code.
pub fn tag_table(code: u16) -> Option<&'static TagTable> {
    SWIFT_TABLES.iter().copied().find(|table| table.code == code)
}

/// One field of a fixed-width record, as a half-open character range.
#[derive(Debug, Clone, Copy)]
pub struct FixedField {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
}

const fn field(name: &'static str, start: usize, end: usize) -> FixedField {
    FixedField { name, start, end }
}

/// Offset table for a fixed-width record.
#[derive(Debug)]
pub struct FixedLayout {
    /// Format label the layout belongs to.
    pub format: &'static str,
    /// Shortest payload accepted before slicing.
    pub min_length: usize,
    pub fields: &'static [FixedField],
}

/// BaNCS flat transaction record. The description column is optional.
pub const BANCS_FLAT_LAYOUT: FixedLayout = FixedLayout {
    format: "BANCS_FLAT",
    min_length: 72,
    fields: &[
        field("transactionId", 0, 16),
        field("accountNumber", 16, 36),
        field("transactionType", 36, 40),
        field("amount", 40, 55),
        field("currency", 55, 58),
        field("transactionDate", 58, 66),
        field("branchCode", 66, 72),
        field("description", 72, 112),
    ],
};

/// FIS fixed-width record. Amount is integer cents.
pub const FIS_FIXED_LAYOUT: FixedLayout = FixedLayout {
    format: "FIS_FIXED",
    min_length: 100,
    fields: &[
        field("transactionId", 0, 12),
        field("accountNumber", 12, 32),
        field("transactionType", 32, 36),
        field("amount", 36, 51),
        field("currency", 51, 54),
        field("effectiveDate", 54, 62),
        field("branchCode", 62, 68),
        field("customerName", 68, 98),
        field("status", 98, 100),
    ],
};

/// Positional columns of an FIS pipe-delimited record.
pub const FIS_DELIMITED_COLUMNS: [&str; 8] = [
    "transactionId",
    "accountNumber",
    "transactionType",
    "amount",
    "currency",
    "effectiveDate",
    "branchCode",
    "description",
];

/// Positional columns of a Fiserv Premier comma-delimited record.
pub const FISERV_PREMIER_COLUMNS: [&str; 7] = [
    "transactionId",
    "accountNumber",
    "transactionCode",
    "amount",
    "currency",
    "postingDate",
    "description",
];
