// src/normalize.rs

use chrono::NaiveDate;

/// Date formats tried in order when parsing a service date string.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%B %d, %Y", "%b %d, %Y"];

/// Parse a money string ("$1,234.56", "1234", "$ 500") into integer cents.
///
/// The dollar and cent digits are parsed as integers, so two-decimal values
/// round-trip exactly; anything past two fraction digits is truncated.
/// Returns `None` on any non-numeric remainder.
pub fn money_to_cents(value: &str) -> Option<i64> {
    let cleaned = value.replace(['$', ','], "");
    let cleaned = cleaned.trim();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned),
    };

    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let dollars: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut frac = frac.to_string();
    frac.truncate(2);
    while frac.len() < 2 {
        frac.push('0');
    }
    let cents: i64 = frac.parse().ok()?;

    let total = dollars.checked_mul(100)?.checked_add(cents)?;
    Some(if negative { -total } else { total })
}

/// Format cents as a display string: `56840` -> `"$568.40"`.
pub fn cents_to_display(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", group_thousands(abs / 100), abs % 100)
}

/// Parse a gallons string ("1,320 gallons", "850 gal", "1200") into a float.
/// Unit words and commas are stripped; returns `None` if the rest is not a
/// number.
pub fn gallons_from_str(value: &str) -> Option<f64> {
    let cleaned = value
        .to_lowercase()
        .replace("gallons", "")
        .replace("gal", "")
        .replace(',', "");
    cleaned.trim().parse::<f64>().ok()
}

/// Format gallons for display: `1320.0` -> `"1,320 gallons"`.
pub fn gallons_to_display(gallons: f64) -> String {
    let rounded = gallons.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{} gallons", group_thousands(rounded.abs() as u64))
}

/// Parse a date string against the known formats, first match wins.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// ISO-8601 storage form: `2026-01-08`.
pub fn date_to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Locale display form: `Jan 08, 2026`.
pub fn date_to_display(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
