use super::ServiceRecord;
use regex::Regex;

/// Runs every field recognizer against the full text. Recognizers are
/// independent — one miss never stops the others.
pub fn extract(text: &str) -> ServiceRecord {
    ServiceRecord {
        invoice_number: extract_invoice_number(text),
        service_date: extract_service_date(text),
        customer_name: extract_customer_name(text),
        customer_address: extract_customer_address(text),
        phone: extract_phone(text),
        trap_size: extract_trap_size(text),
        gallons_pumped: extract_gallons_pumped(text),
        technician: extract_technician(text),
        disposal_facility: extract_disposal_facility(text),
        invoice_total: extract_invoice_total(text),
        notes: None,
    }
}

/// Trimmed, non-empty capture or nothing. Keeps the record invariant that a
/// present field is never blank.
fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn extract_invoice_number(text: &str) -> Option<String> {
    // "INVOICE #: XXX", "Invoice No: XXX", "Inv #XXX"
    let re = Regex::new(r"(?i)(?:INVOICE|INV)(?:\s*(?:NO|#|\.)|:|\s)+[:\s]*([A-Z0-9\-]+)").ok()?;
    re.captures(text).and_then(|c| non_empty(&c[1]))
}

fn extract_service_date(text: &str) -> Option<String> {
    // "Service Date: January 8, 2026", "DATE: 03/15/2026" — stored verbatim,
    // typed parsing happens later in normalize.
    let re = Regex::new(
        r"(?i)(?:Service Date|DATE)[\s:]+([A-Za-z]+\s+\d{1,2},?\s+\d{4}|\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})",
    )
    .ok()?;
    re.captures(text).and_then(|c| non_empty(&c[1]))
}

fn extract_customer_name(text: &str) -> Option<String> {
    // First non-empty line after "BILL TO:"
    let re = Regex::new(r"(?i)BILL TO[:\s]*\n\s*(.+?)(?:\n|$)").ok()?;
    let name = re.captures(text).and_then(|c| non_empty(&c[1]))?;
    // An "Attn:" line is a contact person, not the business name
    if name.to_lowercase().starts_with("attn") {
        return None;
    }
    Some(name)
}

fn extract_customer_address(text: &str) -> Option<String> {
    // Street number + recognized street suffix + trailing STATE ZIP
    let re = Regex::new(
        r"(?i)(\d+\s+[\w\s]+(?:Avenue|Ave|Street|St|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Way|Parkway|Pkwy)[\s,]+[\w\s]+,?\s*[A-Z]{2}\s*\d{5})",
    )
    .ok()?;
    re.captures(text).and_then(|c| non_empty(&c[1]))
}

fn extract_phone(text: &str) -> Option<String> {
    // (XXX) XXX-XXXX or XXX-XXX-XXXX, first occurrence anywhere
    let re = Regex::new(r"\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]?\d{4}").ok()?;
    re.find(text).and_then(|m| non_empty(m.as_str()))
}

fn extract_trap_size(text: &str) -> Option<String> {
    let re = Regex::new(r"(?i)(?:Trap Size|Trap Capacity)[\s:]+([0-9,]+\s*(?:gallons?|gal))").ok()?;
    re.captures(text).and_then(|c| non_empty(&c[1]))
}

fn extract_gallons_pumped(text: &str) -> Option<String> {
    // Unit spelling varies in source text; output is always "<n> gallons"
    let re = Regex::new(r"(?i)(?:Gallons? Pumped|Pumped)[\s:]+([0-9,]+)\s*(?:gallons?|gal)?").ok()?;
    let amount = re.captures(text).and_then(|c| non_empty(&c[1]))?;
    Some(format!("{amount} gallons"))
}

fn extract_technician(text: &str) -> Option<String> {
    // Stop at newline, end of text, or a following "Truck" field
    let re = Regex::new(r"(?i)(?:Technician|Tech)[\s:]+([A-Za-z\s.]+?)(?:\n|$|Truck)").ok()?;
    re.captures(text).and_then(|c| non_empty(&c[1]))
}

fn extract_disposal_facility(text: &str) -> Option<String> {
    let re = Regex::new(r"(?i)(?:Disposal (?:Facility|Site)|Disposed at)[\s:]+(.+?)(?:\n|$)").ok()?;
    re.captures(text).and_then(|c| non_empty(&c[1]))
}

fn extract_invoice_total(text: &str) -> Option<String> {
    let re = Regex::new(r"(?i)(?:TOTAL(?: DUE)?|Amount Due|Grand Total)[\s:]+\$?([\d,]+\.?\d*)").ok()?;
    let amount = re.captures(text).and_then(|c| non_empty(&c[1]))?;
    Some(format!("${amount}"))
}
