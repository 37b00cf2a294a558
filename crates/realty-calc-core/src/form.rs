//! Validation of raw form text into typed calculator inputs.
//!
//! Web forms and CLI flags hand over strings such as `"500,000,000"` or
//! `"3.5"`. Every parser here either returns a typed value or a tagged
//! [`RealtyCalcError`]: `MissingField` for blank input, `NonNumeric` for text
//! that is not a number, `OutOfRange` for numbers outside the field's domain.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::RealtyCalcError;
use crate::types::{Money, Rate};
use crate::RealtyCalcResult;

/// Raw field values of one submitted form, keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: BTreeMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn amount(&self, field: &str) -> RealtyCalcResult<Money> {
        parse_amount(field, self.get(field))
    }

    pub fn optional_amount(&self, field: &str) -> RealtyCalcResult<Money> {
        parse_optional_amount(field, self.get(field))
    }

    pub fn percent(&self, field: &str) -> RealtyCalcResult<Rate> {
        parse_percent(field, self.get(field))
    }

    pub fn years(&self, field: &str) -> RealtyCalcResult<u32> {
        parse_years(field, self.get(field))
    }

    pub fn count(&self, field: &str) -> RealtyCalcResult<u32> {
        parse_count(field, self.get(field))
    }

    pub fn flag(&self, field: &str) -> RealtyCalcResult<bool> {
        parse_flag(field, self.get(field))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormData {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Required non-negative amount; thousands separators are ignored.
pub fn parse_amount(field: &str, raw: Option<&str>) -> RealtyCalcResult<Money> {
    let cleaned = clean(raw).ok_or_else(|| RealtyCalcError::MissingField {
        field: field.into(),
    })?;
    let value = parse_decimal(field, raw.unwrap_or_default(), &cleaned)?;
    if value < Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(field, "Amount cannot be negative"));
    }
    Ok(value)
}

/// Like [`parse_amount`] but a blank field means zero.
pub fn parse_optional_amount(field: &str, raw: Option<&str>) -> RealtyCalcResult<Money> {
    match clean(raw) {
        None => Ok(Decimal::ZERO),
        Some(_) => parse_amount(field, raw),
    }
}

/// Percentage text ("3.5" or "3.5%") to a fraction (0.035).
pub fn parse_percent(field: &str, raw: Option<&str>) -> RealtyCalcResult<Rate> {
    let cleaned = clean(raw).ok_or_else(|| RealtyCalcError::MissingField {
        field: field.into(),
    })?;
    let cleaned = cleaned.trim_end_matches('%').to_string();
    let value = parse_decimal(field, raw.unwrap_or_default(), &cleaned)?;
    if value < Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(field, "Rate cannot be negative"));
    }
    if value > dec!(100) {
        return Err(RealtyCalcError::out_of_range(field, "Rate cannot exceed 100%"));
    }
    Ok(value / dec!(100))
}

/// Loan term in whole years, at least one.
pub fn parse_years(field: &str, raw: Option<&str>) -> RealtyCalcResult<u32> {
    let years = parse_count(field, raw)?;
    if years == 0 {
        return Err(RealtyCalcError::out_of_range(field, "Term must be at least 1 year"));
    }
    Ok(years)
}

/// Non-negative whole number (age, number of children).
pub fn parse_count(field: &str, raw: Option<&str>) -> RealtyCalcResult<u32> {
    let cleaned = clean(raw).ok_or_else(|| RealtyCalcError::MissingField {
        field: field.into(),
    })?;
    if cleaned.starts_with('-') && cleaned[1..].chars().all(|c| c.is_ascii_digit()) {
        return Err(RealtyCalcError::out_of_range(field, "Value cannot be negative"));
    }
    cleaned.parse::<u32>().map_err(|_| RealtyCalcError::NonNumeric {
        field: field.into(),
        value: raw.unwrap_or_default().to_string(),
    })
}

/// Checkbox-style flag. Absent or blank means false.
pub fn parse_flag(field: &str, raw: Option<&str>) -> RealtyCalcResult<bool> {
    let Some(cleaned) = clean(raw) else {
        return Ok(false);
    };
    match cleaned.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "y" | "1" => Ok(true),
        "false" | "off" | "no" | "n" | "0" => Ok(false),
        _ => Err(RealtyCalcError::out_of_range(
            field,
            format!("expected true/false, got {cleaned:?}"),
        )),
    }
}

fn clean(raw: Option<&str>) -> Option<String> {
    let cleaned: String = raw?
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' ' | '\t'))
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn parse_decimal(field: &str, raw: &str, cleaned: &str) -> RealtyCalcResult<Decimal> {
    Decimal::from_str(cleaned).map_err(|_| RealtyCalcError::NonNumeric {
        field: field.into(),
        value: raw.to_string(),
    })
}
