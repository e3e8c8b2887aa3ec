//! Field normalizers
//!
//! Model output is untrusted: each value is validated independently and
//! anything malformed becomes [`Field::Unavailable`].

use crate::extractor::field::{Field, Price};
use crate::extractor::VehicleData;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"20\d{2}").unwrap());
static RE_VIN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z0-9]{17}").unwrap());
static RE_CODE_FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```(?:json)?\s*").unwrap());
static RE_CODE_FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*```$").unwrap());

/// Placeholder strings models use instead of leaving a value empty
const PLACEHOLDERS: &[&str] = &["not available", "n/a", "null", "none", "unknown"];

/// Renders a JSON value as text; `null` and containers become empty
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn is_placeholder(text: &str) -> bool {
    text.is_empty() || PLACEHOLDERS.contains(&text.to_lowercase().as_str())
}

/// Upper-cases, strips everything but letters and digits, requires 17 chars
pub fn clean_vin(raw: &str) -> Field<String> {
    let vin: String = raw
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if vin.len() == 17 {
        Field::Present(vin)
    } else {
        Field::Unavailable
    }
}

/// Takes the first `20xx` year mentioned
pub fn clean_year(raw: &str) -> Field<u16> {
    RE_YEAR
        .find(raw)
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .into()
}

/// Keeps digits and the decimal point; the rest must be a positive amount
/// no larger than 10,000,000
///
/// # Examples
///
/// ```
/// use vdp_scout::extractor::{clean_price, Field};
///
/// assert_eq!(clean_price("$31,499").to_string(), "31499.00");
/// assert_eq!(clean_price("Price Available on Request"), Field::Unavailable);
/// ```
pub fn clean_price(raw: &str) -> Field<Price> {
    const MAX_PRICE: f64 = 10_000_000.0;

    if is_placeholder(raw.trim()) {
        return Field::Unavailable;
    }

    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if digits.is_empty() || digits.matches('.').count() > 1 || digits == "." {
        return Field::Unavailable;
    }

    digits
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount <= MAX_PRICE)
        .and_then(|amount| Price::from_cents((amount * 100.0).round() as u64))
        .into()
}

/// Trims free text; placeholders and empty strings are unavailable
pub fn clean_text(raw: &str) -> Field<String> {
    let text = raw.trim();
    if is_placeholder(text) {
        Field::Unavailable
    } else {
        Field::Present(text.to_string())
    }
}

/// Removes Markdown code fences around a model reply
pub fn strip_code_fences(content: &str) -> String {
    let content = content.trim();
    let content = RE_CODE_FENCE_OPEN.replace(content, "");
    RE_CODE_FENCE_CLOSE.replace(&content, "").into_owned()
}

/// Normalizes the JSON object returned by the model
pub fn normalize(data: &Value, default_make: &str) -> VehicleData {
    let make = match clean_text(&value_text(data.get("make"))) {
        Field::Present(make) => make,
        Field::Unavailable => default_make.to_string(),
    };

    VehicleData {
        vin: clean_vin(&value_text(data.get("vin"))),
        year: clean_year(&value_text(data.get("year"))),
        make: Field::Present(make),
        model: clean_text(&value_text(data.get("model"))),
        trim: clean_text(&value_text(data.get("trim"))),
        msrp: clean_price(&value_text(data.get("msrp"))),
        sale_price: clean_price(&value_text(data.get("sale_price"))),
    }
}

/// Salvages what it can from a reply that is not valid JSON
///
/// Only the VIN (first run of 17 upper-case letters or digits) and the year
/// are recovered; the make falls back to the default.
pub fn fallback_extraction(content: &str, default_make: &str) -> VehicleData {
    VehicleData {
        vin: RE_VIN_RUN
            .find(content)
            .map(|m| m.as_str().to_string())
            .into(),
        year: clean_year(content),
        ..VehicleData::unavailable(default_make)
    }
}
