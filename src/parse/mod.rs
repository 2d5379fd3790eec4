// src/parse/mod.rs

mod fields;

use serde::{Deserialize, Serialize};

/// The fields every invoice is probed for, in extraction-attempt order.
/// `notes` is tracked on the record but excluded from scoring.
pub const EXPECTED_FIELDS: [&str; 10] = [
    "invoice_number",
    "service_date",
    "customer_name",
    "customer_address",
    "phone",
    "trap_size",
    "gallons_pumped",
    "technician",
    "disposal_facility",
    "invoice_total",
];

/// A structured view of one grease-trap service invoice. Values are the raw
/// substrings matched from the source text (plus minimal formatting such as
/// a re-appended unit); every field is either `None` or non-empty trimmed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub invoice_number: Option<String>,
    pub service_date: Option<String>,
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
    pub phone: Option<String>,
    pub trap_size: Option<String>,
    pub gallons_pumped: Option<String>,
    pub technician: Option<String>,
    pub disposal_facility: Option<String>,
    pub invoice_total: Option<String>,
    pub notes: Option<String>,
}

impl ServiceRecord {
    /// Look up a field slot by its name from `EXPECTED_FIELDS` (or `notes`).
    pub fn field(&self, name: &str) -> Option<&str> {
        let slot = match name {
            "invoice_number" => &self.invoice_number,
            "service_date" => &self.service_date,
            "customer_name" => &self.customer_name,
            "customer_address" => &self.customer_address,
            "phone" => &self.phone,
            "trap_size" => &self.trap_size,
            "gallons_pumped" => &self.gallons_pumped,
            "technician" => &self.technician,
            "disposal_facility" => &self.disposal_facility,
            "invoice_total" => &self.invoice_total,
            "notes" => &self.notes,
            _ => return None,
        };
        slot.as_deref()
    }
}

/// Full result of parsing one invoice: the record plus which fields were
/// found, which are missing, and a coverage-based confidence score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub record: ServiceRecord,
    pub extracted_fields: Vec<String>,
    pub missing_fields: Vec<String>,
    pub confidence_score: u8,
}

/// Parse raw invoice/manifest text into a scored `ParseResult`.
///
/// Each of the ten recognizers runs independently against the whole text;
/// a miss leaves the field `None` and lands it in `missing_fields`. The
/// confidence score is the percentage of expected fields found, floored.
pub fn extract_and_score(text: &str) -> ParseResult {
    if text.trim().is_empty() {
        return ParseResult {
            record: ServiceRecord::default(),
            extracted_fields: Vec::new(),
            missing_fields: EXPECTED_FIELDS.iter().map(|f| f.to_string()).collect(),
            confidence_score: 0,
        };
    }

    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let record = fields::extract(&text);

    let extracted: Vec<String> = EXPECTED_FIELDS
        .iter()
        .copied()
        .filter(|&name| record.field(name).is_some())
        .map(str::to_string)
        .collect();
    let missing: Vec<String> = EXPECTED_FIELDS
        .iter()
        .copied()
        .filter(|&name| record.field(name).is_none())
        .map(str::to_string)
        .collect();
    let confidence = (extracted.len() * 100 / EXPECTED_FIELDS.len()) as u8;

    ParseResult {
        record,
        extracted_fields: extracted,
        missing_fields: missing,
        confidence_score: confidence,
    }
}
