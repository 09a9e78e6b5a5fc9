//! Document statistics and caret status.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::core::document::Selection;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Summary counts for a whole document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub characters: usize,
    pub non_blank_characters: usize,
    pub lines: usize,
}

impl DocumentStats {
    pub fn of(text: &str) -> Self {
        Self {
            characters: text.chars().count(),
            non_blank_characters: WHITESPACE.replace_all(text, "").chars().count(),
            lines: text.matches('\n').count() + 1,
        }
    }

    /// Multi-line report in the form shown by the statistics dialog
    pub fn report(&self, name: &str) -> String {
        format!(
            "File: {}\n- Number of characters: {}\n- Number of non-blank characters: {}\n- Number of lines: {}",
            name, self.characters, self.non_blank_characters, self.lines
        )
    }
}

/// Caret position and selection size, all counted in chars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusInfo {
    pub length: usize,
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
    pub selection: usize,
}

impl StatusInfo {
    pub fn of(text: &str, selection: Selection) -> Self {
        let mut line = 1;
        let mut line_start = 0;
        let mut length = 0;
        for (index, c) in text.chars().enumerate() {
            length += 1;
            if index < selection.dot && c == '\n' {
                line += 1;
                line_start = index + 1;
            }
        }

        Self {
            length,
            line,
            column: selection.dot.saturating_sub(line_start) + 1,
            selection: selection.len(),
        }
    }

    /// Status bar text, e.g. `length: 12  Ln: 2  Col: 3  Sel: 0`
    pub fn status_line(&self) -> String {
        format!(
            "length: {}  Ln: {}  Col: {}  Sel: {}",
            self.length, self.line, self.column, self.selection
        )
    }
}
