//! Line Tools
//!
//! Sorting and de-duplication over whole lines. Input is split on `\r\n`,
//! `\r` or `\n`; trailing empty lines are dropped and every output line is
//! terminated with `\n`.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\r|\n").expect("line break pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTool {
    Sort(SortOrder),
    Unique,
}

impl LineTool {
    pub fn apply(self, text: &str) -> String {
        match self {
            LineTool::Sort(order) => sort_lines(text, order),
            LineTool::Unique => unique_lines(text),
        }
    }
}

/// Split text into lines, dropping trailing empty ones
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = LINE_BREAK.split(text).collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

pub fn sort_lines(text: &str, order: SortOrder) -> String {
    let mut lines = split_lines(text);
    match order {
        SortOrder::Ascending => lines.sort_unstable(),
        SortOrder::Descending => lines.sort_unstable_by(|a, b| b.cmp(a)),
    }
    join_lines(&lines)
}

/// Keep the first occurrence of every line, in order
pub fn unique_lines(text: &str) -> String {
    let mut seen = HashSet::new();
    let lines: Vec<&str> = split_lines(text)
        .into_iter()
        .filter(|line| seen.insert(*line))
        .collect();
    join_lines(&lines)
}

fn join_lines(lines: &[&str]) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Expand a byte range to the whole lines it touches, terminators included.
///
/// A non-empty range that ends right after a line break does not pull in the
/// following line. A range starting inside a `\r\n` pair belongs to the line
/// the pair terminates.
pub fn line_span(text: &str, range: Range<usize>) -> Range<usize> {
    let bytes = text.as_bytes();
    let mut head = range.start;
    if head > 0 && bytes[head - 1] == b'\r' && bytes.get(head) == Some(&b'\n') {
        head -= 1;
    }
    let start = text[..head].rfind(['\n', '\r']).map_or(0, |i| i + 1);

    let ends_on_break = range.end > range.start
        && matches!(bytes.get(range.end - 1), Some(b'\n' | b'\r'))
        && !(bytes[range.end - 1] == b'\r' && bytes.get(range.end) == Some(&b'\n'));
    if ends_on_break {
        return start..range.end;
    }

    let end = match text[range.end..].find(['\n', '\r']) {
        Some(offset) => {
            let brk = range.end + offset;
            if bytes[brk] == b'\r' && bytes.get(brk + 1) == Some(&b'\n') {
                brk + 2
            } else {
                brk + 1
            }
        }
        None => text.len(),
    };
    start..end
}
