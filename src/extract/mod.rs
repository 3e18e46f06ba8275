//! Fenced code block extraction.
//!
//! [`extract_blocks`] is pure: it turns model output into an ordered list of
//! [`CodeBlock`]s plus the fences it refused. [`write_blocks`] materializes
//! the list under an output root.
//!
//! Path resolution per fence, in order:
//!
//! 1. `file=` / `filename=` attribute in the info string, used verbatim;
//! 2. otherwise `file_<N>.<language>`, where `N` is the number of blocks
//!    accepted so far;
//! 3. otherwise (no language token) the fence is skipped.
//!
//! Absolute paths and paths with `..` components are skipped as unsafe.

mod info;
mod writer;


pub use info::{InfoString, parse_info};
pub use writer::{WrittenTree, write_blocks};

use crate::error::{GenError, Result};
use crate::mdx::{Segment, split_segments};
use std::fmt;
use std::path::{Component, Path};

/// A file to write, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub path: String,
    pub content: String,
    /// The fence ran to end of input without a closing line.
    pub unterminated: bool,
}

/// Why a fence did not become a [`CodeBlock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoLanguage,
    UnsafePath(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoLanguage => write!(f, "no file attribute and no language token"),
            SkipReason::UnsafePath(path) => write!(f, "unsafe path '{}'", path),
        }
    }
}

/// A refused fence. `ordinal` counts all fences of the input, 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBlock {
    pub ordinal: usize,
    pub info: String,
    pub reason: SkipReason,
}

/// Everything found in one model response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub blocks: Vec<CodeBlock>,
    pub skipped: Vec<SkippedBlock>,
}

impl Extraction {
    pub fn has_unterminated(&self) -> bool {
        self.blocks.iter().any(|b| b.unterminated)
    }

    /// Fails with [`GenError::EmptyOutput`] when there is nothing to write.
    pub fn require_blocks(&self) -> Result<()> {
        if self.blocks.is_empty() {
            return Err(GenError::EmptyOutput {
                skipped: self.skipped.len(),
            });
        }
        Ok(())
    }
}

/// Extract code blocks from model output, in order of appearance.
pub fn extract_blocks(text: &str) -> Extraction {
    let mut extraction = Extraction::default();

    let fences = split_segments(text).into_iter().filter_map(|segment| match segment {
        Segment::Fence(fence) => Some(fence),
        Segment::Text(_) => None,
    });

    for (ordinal, fence) in fences.enumerate() {
        let declared = parse_info(fence.info);

        let path = match (declared.path, declared.language) {
            (Some(path), _) => path,
            (None, Some(language)) => format!("file_{}.{}", extraction.blocks.len(), language),
            (None, None) => {
                extraction.skipped.push(SkippedBlock {
                    ordinal,
                    info: fence.info.to_string(),
                    reason: SkipReason::NoLanguage,
                });
                continue;
            }
        };

        let Some(path) = normalize_relative(&path) else {
            extraction.skipped.push(SkippedBlock {
                ordinal,
                info: fence.info.to_string(),
                reason: SkipReason::UnsafePath(path),
            });
            continue;
        };

        extraction.blocks.push(CodeBlock {
            path,
            content: trim_blank_lines(fence.body).to_string(),
            unterminated: !fence.closed,
        });
    }

    extraction
}

/// Normalize a path that stays inside the output root and names a file.
///
/// `.` segments and repeated separators are dropped and names are joined with
/// `/`, so `./src//a.ts` and `src/a.ts` are the same path. `None` if the path
/// is absolute, climbs with `..`, or names a directory.
fn normalize_relative(path: &str) -> Option<String> {
    if path.ends_with('/') || path.ends_with('\\') {
        return None;
    }
    let mut names = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(name) => names.push(name.to_str()?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if names.is_empty() {
        None
    } else {
        Some(names.join("/"))
    }
}

/// Drop leading and trailing blank lines. Interior text and the indentation
/// of the first non-blank line are kept.
fn trim_blank_lines(body: &str) -> &str {
    let mut start = 0;
    for line in body.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        start += line.len();
    }
    let rest = &body[start..];

    let mut end = rest.len();
    while end > 0 {
        let head = &rest[..end];
        let line_start = head.trim_end_matches(['\n', '\r']).rfind('\n').map_or(0, |i| i + 1);
        let last = &head[line_start..];
        if last.trim().is_empty() {
            end = line_start;
        } else {
            end = line_start + last.trim_end_matches(['\n', '\r']).len();
            break;
        }
    }
    &rest[..end]
}
