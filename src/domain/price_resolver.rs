//! Price resolution over loosely structured quote pages.
//!
//! Pages are reduced to visible text, then an ordered list of matchers is
//! tried. The first matcher that hits anywhere in the text decides the
//! fragment; position across matchers does not matter, list order does. If
//! nothing hits, the number extractor runs on the whole text.

use crate::domain::error::EtlError;
use crate::domain::number::{extract_number, NUMBER_PATTERN};
use crate::domain::visible_text::visible_text;
use regex::Regex;
use std::sync::LazyLock;

/// Outcome of a single matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match<'t> {
    NotFound,
    Found(&'t str),
}

impl<'t> Match<'t> {
    /// Keep `self` if found, otherwise evaluate `next`.
    pub fn or_else(self, next: impl FnOnce() -> Match<'t>) -> Match<'t> {
        match self {
            Match::Found(_) => self,
            Match::NotFound => next(),
        }
    }

    pub fn found(self) -> Option<&'t str> {
        match self {
            Match::Found(s) => Some(s),
            Match::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherKind {
    /// `$4,340`
    CurrencyPrefix,
    /// `106.05 USD/T`
    PerUnitSuffix,
    /// `3.91 USD`
    CurrencySuffix,
    /// Any number at all.
    AnyNumber,
}

pub struct Matcher {
    pub kind: MatcherKind,
    regex: Regex,
}

impl Matcher {
    fn new(kind: MatcherKind, pattern: &str) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).expect("invalid matcher regex"),
        }
    }

    pub fn apply<'t>(&self, text: &'t str) -> Match<'t> {
        match self.regex.find(text) {
            Some(m) => Match::Found(m.as_str()),
            None => Match::NotFound,
        }
    }
}

/// Matchers in priority order.
pub static MATCHERS: LazyLock<Vec<Matcher>> = LazyLock::new(|| {
    vec![
        Matcher::new(MatcherKind::CurrencyPrefix, &format!(r"\$\s?{NUMBER_PATTERN}")),
        Matcher::new(MatcherKind::PerUnitSuffix, &format!(r"{NUMBER_PATTERN}\s?USD/T")),
        Matcher::new(MatcherKind::CurrencySuffix, &format!(r"{NUMBER_PATTERN}\s?USD")),
        Matcher::new(MatcherKind::AnyNumber, NUMBER_PATTERN),
    ]
});

/// First fragment found by the highest-priority matcher that hits.
pub fn first_match<'t>(matchers: &[Matcher], text: &'t str) -> Match<'t> {
    matchers
        .iter()
        .fold(Match::NotFound, |acc, m| acc.or_else(|| m.apply(text)))
}

/// Resolve a USD price from an instrument's HTML page.
pub fn resolve_price(html: &str) -> Result<f64, EtlError> {
    let text = visible_text(html);
    match first_match(&MATCHERS, &text).found() {
        Some(fragment) => extract_number(fragment),
        None => extract_number(&text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dollar_prefixed_amount() {
        assert_relative_eq!(resolve_price("$4,340").unwrap(), 4340.0);
    }

    #[test]
    fn dollar_prefix_with_space() {
        assert_relative_eq!(resolve_price("Gold $ 4,340.50 per oz").unwrap(), 4340.5);
    }

    #[test]
    fn per_unit_suffix() {
        assert_relative_eq!(resolve_price("106.05 USD/T").unwrap(), 106.05);
    }

    #[test]
    fn currency_suffix() {
        assert_relative_eq!(resolve_price("3.91 USD").unwrap(), 3.91);
    }

    #[test]
    fn no_digits_fails() {
        match resolve_price("<html><body>Price unavailable</body></html>") {
            Err(EtlError::NoNumericValue { .. }) => {}
            other => panic!("expected NoNumericValue, got: {other:?}"),
        }
    }

    #[test]
    fn list_order_beats_position() {
        // The suffix form appears first, but the dollar form has priority.
        let html = "<p>Iron 106.05 USD/T</p><p>Gold $4,340</p>";
        assert_relative_eq!(resolve_price(html).unwrap(), 4340.0);
    }

    #[test]
    fn per_unit_beats_bare_currency_suffix() {
        let html = "<p>Copper 3.91 USD</p><p>Iron 106.05 USD/T</p>";
        assert_relative_eq!(resolve_price(html).unwrap(), 106.05);
    }

    #[test]
    fn falls_back_to_first_number() {
        let html = "<div>Updated 2024</div><div>Price 4340</div>";
        assert_relative_eq!(resolve_price(html).unwrap(), 2024.0);
    }

    #[test]
    fn non_ascii_digits_are_skipped() {
        let html = "<p>Updated \u{662}\u{660}\u{662}\u{664}</p><p>Price 4340</p>";
        assert_relative_eq!(resolve_price(html).unwrap(), 4340.0);
    }

    #[test]
    fn script_numbers_are_ignored() {
        let html = "<script>var x = $99;</script><span>Copper</span><span>3.91 USD</span>";
        assert_relative_eq!(resolve_price(html).unwrap(), 3.91);
    }

    #[test]
    fn markup_split_number_is_joined_by_space() {
        // Tokens are joined with a single space, so the suffix matcher still sees it.
        let html = "<span>106.05</span><span>USD/T</span>";
        assert_relative_eq!(resolve_price(html).unwrap(), 106.05);
    }

    #[test]
    fn first_match_reports_not_found() {
        assert_eq!(first_match(&MATCHERS, "nothing"), Match::NotFound);
    }

    #[test]
    fn first_match_returns_fragment() {
        assert_eq!(
            first_match(&MATCHERS, "close 3.91 USD"),
            Match::Found("3.91 USD")
        );
    }

    #[test]
    fn or_else_short_circuits() {
        let mut called = false;
        let m = Match::Found("1").or_else(|| {
            called = true;
            Match::NotFound
        });
        assert_eq!(m, Match::Found("1"));
        assert!(!called);
    }

    #[test]
    fn matchers_are_in_priority_order() {
        let kinds: Vec<MatcherKind> = MATCHERS.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MatcherKind::CurrencyPrefix,
                MatcherKind::PerUnitSuffix,
                MatcherKind::CurrencySuffix,
                MatcherKind::AnyNumber,
            ]
        );
    }
}
