//! Fence-aware segmentation of Markdown/MDX text.
//!
//! Text is split into alternating prose and fenced-code segments. Concatenating
//! the `raw` text of every segment reproduces the input exactly, so a consumer
//! that passes segments through untouched is a no-op.
//!
//! Fences are line based:
//! - an opening line has at most three spaces of indentation, a run of three or
//!   more backticks, and an info string containing no backtick;
//! - a closing line has at most three spaces of indentation, a run of at least
//!   as many backticks, and nothing else but whitespace;
//! - a fence with no closing line runs to end of text.

/// A prose or fenced-code span of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Fence(Fence<'a>),
}

impl<'a> Segment<'a> {
    /// The exact input text covered by this segment.
    pub fn raw(&self) -> &'a str {
        match self {
            Segment::Text(text) => text,
            Segment::Fence(fence) => fence.raw,
        }
    }
}

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence<'a> {
    /// Opening line through closing line, including line terminators.
    pub raw: &'a str,
    /// Info string of the opening line, trimmed.
    pub info: &'a str,
    /// Lines between the delimiters, untouched.
    pub body: &'a str,
    /// False when the text ended before a closing delimiter.
    pub closed: bool,
}

/// Split `text` into prose and fence segments in document order.
///
/// Empty prose segments are never emitted.
pub fn split_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut offset = 0;
    let mut open: Option<OpenFence> = None;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        match &open {
            None => {
                if let Some((ticks, info)) = parse_opening(line) {
                    if text_start < line_start {
                        segments.push(Segment::Text(&text[text_start..line_start]));
                    }
                    let info_start = line_start + (info.as_ptr() as usize - line.as_ptr() as usize);
                    open = Some(OpenFence {
                        start: line_start,
                        ticks,
                        info: (info_start, info_start + info.len()),
                        body_start: offset,
                    });
                }
            }
            Some(fence) => {
                if is_closing(line, fence.ticks) {
                    segments.push(Segment::Fence(Fence {
                        raw: &text[fence.start..offset],
                        info: &text[fence.info.0..fence.info.1],
                        body: &text[fence.body_start..line_start],
                        closed: true,
                    }));
                    open = None;
                    text_start = offset;
                }
            }
        }
    }

    match open {
        Some(fence) => segments.push(Segment::Fence(Fence {
            raw: &text[fence.start..],
            info: &text[fence.info.0..fence.info.1],
            body: &text[fence.body_start.min(text.len())..],
            closed: false,
        })),
        None => {
            if text_start < text.len() {
                segments.push(Segment::Text(&text[text_start..]));
            }
        }
    }

    segments
}

struct OpenFence {
    start: usize,
    ticks: usize,
    info: (usize, usize),
    body_start: usize,
}

/// Strip up to three leading spaces; `None` if the line is indented further.
fn strip_indent(line: &str) -> Option<&str> {
    let spaces = line.bytes().take_while(|&b| b == b' ').count();
    if spaces > 3 {
        None
    } else {
        Some(&line[spaces..])
    }
}

fn backtick_run(s: &str) -> usize {
    s.bytes().take_while(|&b| b == b'`').count()
}

/// Returns the backtick count and trimmed info string of an opening line.
pub(super) fn parse_opening(line: &str) -> Option<(usize, &str)> {
    let rest = strip_indent(line)?;
    let ticks = backtick_run(rest);
    if ticks < 3 {
        return None;
    }
    let info = rest[ticks..].trim();
    if info.contains('`') {
        return None;
    }
    Some((ticks, info))
}

fn is_closing(line: &str, open_ticks: usize) -> bool {
    let Some(rest) = strip_indent(line) else {
        return false;
    };
    let ticks = backtick_run(rest);
    ticks >= open_ticks && rest[ticks..].trim().is_empty()
}
