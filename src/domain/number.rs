//! Loose numeric extraction from free text.
//!
//! Accepts forms such as `$4,340`, `106.05 USD/T` and `3.91`. The first
//! candidate in reading order wins; there is no attempt to tell a price apart
//! from a year or a percentage sitting earlier in the fragment.

use crate::domain::error::EtlError;
use regex::Regex;
use std::sync::LazyLock;

/// ASCII digits, optionally grouped with commas, with an optional decimal part.
/// Other Unicode digits are not matched since `f64::from_str` rejects them.
pub const NUMBER_PATTERN: &str = r"[0-9][0-9,]*\.?[0-9]*";

static NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NUMBER_PATTERN).expect("invalid number regex"));

/// Returns the first number in `text`, with thousands separators removed.
pub fn extract_number(text: &str) -> Result<f64, EtlError> {
    let m = NUMBER_REGEX
        .find(text)
        .ok_or(EtlError::NoNumericValue { context: None })?;
    parse_grouped(m.as_str())
}

fn parse_grouped(raw: &str) -> Result<f64, EtlError> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    // "12." is a valid match; f64::from_str accepts it.
    cleaned
        .parse::<f64>()
        .map_err(|_| EtlError::NoNumericValue { context: None })
}
