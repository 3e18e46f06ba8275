//! Directive stripping for MDX prompt documents.
//!
//! Removal rules only ever see prose segments produced by
//! [`split_segments`](super::segment::split_segments); fenced code is copied to the
//! output verbatim, and no removal may create a new fence. Rules:
//!
//! - a paired reasoning directive (`<Thinking>` … `</Thinking>` by default) is
//!   removed together with its prose content; an unterminated one removes prose
//!   up to end of document;
//! - self-closing or empty-body tags of allow-listed UI components are removed;
//! - `$$` … `$$` math segments are removed.

use super::segment::{Segment, parse_opening, split_segments};
use crate::config::Config;
use crate::error::{GenError, Result};
use regex::Regex;

/// Compiled directive-stripping rules.
#[derive(Debug, Clone)]
pub struct MdxPreprocessor {
    reasoning_open: Regex,
    reasoning_close: Regex,
    components: Option<Regex>,
    math: Regex,
}

impl MdxPreprocessor {
    /// Compile the rules for a reasoning tag and a component allow-list.
    pub fn new(reasoning_tag: &str, components: &[String]) -> Result<Self> {
        validate_tag_name(reasoning_tag)?;
        for name in components {
            validate_tag_name(name)?;
        }

        let tag = regex::escape(reasoning_tag);
        let reasoning_open = compile(&format!(r"<{}(?:\s[^<>]*)?/?>", tag))?;
        let reasoning_close = compile(&format!(r"</{}\s*>", tag))?;

        let components = if components.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = components
                .iter()
                .map(|name| {
                    let name = regex::escape(name);
                    format!(r"<{0}\b[^<>]*/>|<{0}\b[^<>]*>\s*</{0}\s*>", name)
                })
                .collect();
            Some(compile(&alternatives.join("|"))?)
        };

        let math = compile(r"(?s)\$\$.*?\$\$")?;

        Ok(Self {
            reasoning_open,
            reasoning_close,
            components,
            math,
        })
    }

    /// Build the rules configured in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.reasoning_tag, &config.strip_components)
    }

    /// Strip directives from `text`.
    ///
    /// The document is split into prose and fences once. A single pass can
    /// expose new directive text by joining what surrounded a removed span, so
    /// passes over the prose repeat until nothing changes. A removal that would
    /// turn its line into a fence opening is skipped, which keeps the fence
    /// layout of the output identical to the input.
    pub fn clean(&self, text: &str) -> String {
        let mut pieces: Vec<Piece<'_>> = split_segments(text)
            .into_iter()
            .map(|segment| match segment {
                Segment::Text(prose) => Piece::Prose(prose.to_string()),
                Segment::Fence(fence) => Piece::Fence(fence.raw),
            })
            .collect();

        while self.clean_pass(&mut pieces) {}

        pieces.iter().map(Piece::as_str).collect()
    }

    /// Run every rule once over the prose pieces; returns whether any changed.
    fn clean_pass(&self, pieces: &mut [Piece<'_>]) -> bool {
        let mut out = String::new();
        let mut in_reasoning = false;
        let mut changed = false;

        for i in 0..pieces.len() {
            let fence_follows = matches!(pieces.get(i + 1), Some(Piece::Fence(_)));
            match &mut pieces[i] {
                Piece::Fence(raw) => out.push_str(raw),
                Piece::Prose(prose) => {
                    let start = out.len();
                    in_reasoning = self.clean_prose(prose, in_reasoning, &mut out);
                    // A fence must start on its own line.
                    if fence_follows && !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    if out[start..] != **prose {
                        *prose = out[start..].to_string();
                        changed = true;
                    }
                }
            }
        }

        changed
    }

    /// Append the cleaned form of `prose` to `out`.
    ///
    /// `out` ends at a line start whenever `prose` begins. Returns whether a
    /// reasoning region is still open at the end of the span.
    fn clean_prose(&self, prose: &str, in_reasoning: bool, out: &mut String) -> bool {
        let mut rest = prose;

        if in_reasoning {
            let Some(close) = self.reasoning_close.find(rest) else {
                return true;
            };
            let tail = &rest[close.end()..];
            if opens_fence(&[out.as_str()], &[tail]) {
                out.push_str(close.as_str());
            }
            rest = tail;
        }

        loop {
            let Some(open) = self.reasoning_open.find(rest) else {
                self.strip_inline(rest, "", out);
                return false;
            };
            self.strip_inline(&rest[..open.start()], &rest[open.start()..], out);
            let after_open = &rest[open.end()..];

            // A self-closing reasoning tag has no region to remove.
            if open.as_str().ends_with("/>") {
                if opens_fence(&[out.as_str()], &[after_open]) {
                    out.push_str(open.as_str());
                }
                rest = after_open;
                continue;
            }

            match self.reasoning_close.find(after_open) {
                Some(close) => {
                    let tail = &after_open[close.end()..];
                    if !opens_fence(&[out.as_str()], &[tail]) {
                        rest = tail;
                    } else if !opens_fence(&[out.as_str()], &[close.as_str(), tail]) {
                        out.push_str(close.as_str());
                        rest = tail;
                    } else {
                        out.push_str(open.as_str());
                        rest = after_open;
                    }
                }
                None => {
                    if !opens_fence(&[out.as_str()], &[]) {
                        return true;
                    }
                    out.push_str(open.as_str());
                    rest = after_open;
                }
            }
        }
    }

    /// Append `prose` to `out` without math or allow-listed components.
    ///
    /// `tail` is the unprocessed text following `prose` in the same span.
    fn strip_inline(&self, prose: &str, tail: &str, out: &mut String) {
        let without_math = remove_matches(&self.math, prose, out, tail);
        let stripped = match &self.components {
            Some(components) => remove_matches(components, &without_math, out, tail),
            None => without_math,
        };
        out.push_str(&stripped);
    }
}

/// A piece of the document: prose being cleaned, or a fence copied verbatim.
enum Piece<'a> {
    Prose(String),
    Fence(&'a str),
}

impl Piece<'_> {
    fn as_str(&self) -> &str {
        match self {
            Piece::Prose(prose) => prose,
            Piece::Fence(raw) => raw,
        }
    }
}

/// Remove every match of `re` from `text`, except a match whose removal would
/// leave a fence opening line behind.
///
/// `head` is the output preceding `text`; `tail` is the input following it.
fn remove_matches(re: &Regex, text: &str, head: &str, tail: &str) -> String {
    let mut kept = String::with_capacity(text.len());
    let mut last = 0;

    for found in re.find_iter(text) {
        kept.push_str(&text[last..found.start()]);
        if opens_fence(&[head, &kept], &[&text[found.end()..], tail]) {
            kept.push_str(found.as_str());
        }
        last = found.end();
    }
    kept.push_str(&text[last..]);

    kept
}

/// Whether the line made of the end of `before` joined to the start of
/// `after` parses as a fence opening line.
fn opens_fence(before: &[&str], after: &[&str]) -> bool {
    let mut head = String::new();
    for part in before.iter().rev() {
        match part.rfind('\n') {
            Some(i) => {
                head.insert_str(0, &part[i + 1..]);
                break;
            }
            None => head.insert_str(0, part),
        }
    }

    let mut line = head;
    for part in after {
        match part.find('\n') {
            Some(i) => {
                line.push_str(&part[..=i]);
                break;
            }
            None => line.push_str(part),
        }
    }

    parse_opening(&line).is_some()
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        GenError::UserError(format!("invalid directive pattern '{}': {}", pattern, e))
    })
}

fn validate_tag_name(name: &str) -> Result<()> {
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(GenError::UserError(format!(
            "invalid directive tag name '{}'\n\
             Fix: use a component name such as 'Thinking' or 'QuickEdit' in mdxgen.yaml.",
            name
        )))
    }
}
