//! Info string parsing.
//!
//! The info string is the text after the opening backticks of a fence, e.g.
//! `tsx file="src/app/page.tsx"`. Two things are read from it:
//!
//! - a `file=` or `filename=` attribute (bare, single- or double-quoted);
//! - the language token: the leading alphanumeric run of the first word,
//!   unless that word is itself an attribute.

use regex::Regex;
use std::sync::LazyLock;

static PATH_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s{,])(?:file|filename)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"',}]+))"#)
        .expect("path attribute pattern is valid")
});

/// What an info string declares.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InfoString {
    pub language: Option<String>,
    pub path: Option<String>,
}

/// Parse an info string.
pub fn parse_info(info: &str) -> InfoString {
    InfoString {
        language: language_token(info),
        path: path_attribute(info),
    }
}

fn path_attribute(info: &str) -> Option<String> {
    let captures = PATH_ATTR.captures(info)?;
    let value = captures
        .get(1)
        .or_else(|| captures.get(2))
        .or_else(|| captures.get(3))?
        .as_str();
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn language_token(info: &str) -> Option<String> {
    let first = info.split_whitespace().next()?;
    if first.contains('=') {
        return None;
    }
    let token: String = first
        .trim_start_matches(['{', '.'])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if token.is_empty() { None } else { Some(token) }
}
