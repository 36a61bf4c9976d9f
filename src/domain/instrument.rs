//! Tracked instruments and instrument code lists.

use crate::domain::payload::RESERVED_KEYS;
use std::collections::HashSet;

/// One tracked commodity and the page its quote is scraped from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub code: String,
    pub url: String,
}

impl Instrument {
    pub fn new(code: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            url: url.into(),
        }
    }

    /// Key used for this instrument in the raw payload and in config keys.
    pub fn payload_key(&self) -> String {
        self.code.to_lowercase()
    }
}

pub const DEFAULT_INSTRUMENTS: &[(&str, &str)] = &[
    ("GOLD", "https://tradingeconomics.com/commodity/gold"),
    ("IRON", "https://tradingeconomics.com/commodity/iron-ore"),
    ("COPPER", "https://tradingeconomics.com/commodity/copper"),
];

pub fn default_url(code: &str) -> Option<&'static str> {
    DEFAULT_INSTRUMENTS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, url)| *url)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeListError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),

    #[error("reserved code: {0}")]
    ReservedCode(String),
}

/// Parse a comma-separated code list, uppercasing and rejecting duplicates and
/// codes that clash with the raw payload's own keys.
pub fn parse_codes(input: &str) -> Result<Vec<String>, CodeListError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(CodeListError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if RESERVED_KEYS.iter().any(|k| k.eq_ignore_ascii_case(&code)) {
            return Err(CodeListError::ReservedCode(code));
        }
        if !seen.insert(code.clone()) {
            return Err(CodeListError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}
