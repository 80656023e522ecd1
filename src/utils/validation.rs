use rust_decimal::Decimal;
use std::str::FromStr;
use validator::{Validate, ValidationErrors};

use crate::error::{Error, Result};

pub fn validate<T: Validate>(val: &T) -> Result<()> {
    val.validate().map_err(Error::from)
}

/// Flattens validator output into one sentence for a flash message.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("Invalid value for {}", field.replace('_', " ")),
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    if messages.is_empty() {
        "Invalid form submission.".to_string()
    } else {
        messages.join(" ")
    }
}

/// Largest value a `NUMERIC(10,2)` price column holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

pub fn parse_price(raw: &str) -> Result<Decimal> {
    let price = Decimal::from_str(raw.trim())
        .map_err(|_| Error::Validation("Base price must be a number.".into()))?;
    check_price(price.round_dp(2))
}

pub fn check_price(price: Decimal) -> Result<Decimal> {
    if price.is_sign_negative() {
        return Err(Error::Validation("Base price cannot be negative.".into()));
    }
    if price > MAX_PRICE {
        return Err(Error::Validation(format!(
            "Base price cannot exceed {}.",
            MAX_PRICE
        )));
    }
    Ok(price)
}

pub fn parse_id(raw: &str, field: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::Validation(format!("Please choose a valid {}.", field)))
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Substring pattern for `LIKE`/`ILIKE`; `%`, `_` and `\` in user text match literally.
pub fn like_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

pub fn like_prefix(term: &str) -> String {
    format!("{}%", escape_like(term))
}
