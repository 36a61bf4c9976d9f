//! Reduces an HTML document to its visible text.
//!
//! Text nodes are trimmed, empty ones dropped, and the rest joined with single
//! spaces, so numbers and labels keep the order they are rendered in.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Tag body up to the closing `>`, skipping `>` inside quoted attribute values.
const TAG_BODY: &str = r#"(?:"[^"]*"|'[^']*'|[^'">])*"#;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("invalid comment regex"));

/// Elements whose contents are never rendered as text.
static HIDDEN_ELEMENTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "template"]
        .iter()
        .map(|name| {
            Regex::new(&format!(r"(?is)<{name}\b{TAG_BODY}>.*?</{name}\s*>"))
                .expect("invalid hidden element regex")
        })
        .collect()
});

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"<[!/?a-zA-Z]{TAG_BODY}>")).expect("invalid tag regex")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("invalid entity regex")
});

/// Visible text tokens of `html`, each trimmed, in document order.
pub fn text_tokens(html: &str) -> Vec<String> {
    let mut doc = COMMENT.replace_all(html, " ").into_owned();
    for hidden in HIDDEN_ELEMENTS.iter() {
        doc = hidden.replace_all(&doc, " ").into_owned();
    }

    TAG.split(&doc)
        .map(decode_entities)
        .filter_map(|segment| {
            let trimmed = segment.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect()
}

/// All visible text tokens joined by single spaces.
pub fn visible_text(html: &str) -> String {
    text_tokens(html).join(" ")
}

fn decode_entities(segment: &str) -> String {
    ENTITY
        .replace_all(segment, |caps: &Captures| {
            let body = &caps[1];
            decode_entity(body).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    let ch = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "dollar" => '$',
        "euro" => '€',
        "pound" => '£',
        "yen" => '¥',
        "cent" => '¢',
        "percnt" => '%',
        "comma" => ',',
        "period" => '.',
        "sol" => '/',
        _ => return None,
    };
    Some(ch.to_string())
}
