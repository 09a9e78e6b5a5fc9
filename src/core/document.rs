//! Document Model
//!
//! A single open text buffer: its content, on-disk identity, dirty flag,
//! caret/selection and a private listener list.

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::error::{DocumentError, Result};
use super::listener::{ListenerId, Listeners};
use crate::tools::lines::line_span;
use crate::tools::{CaseTransform, DocumentStats, LineTool, StatusInfo};

/// Name shown for a document that has never been saved
pub const UNTITLED_NAME: &str = "new";

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable handle of an open document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Caret (`dot`) and anchor (`mark`) as char offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub dot: usize,
    pub mark: usize,
}

impl Selection {
    pub fn new(dot: usize, mark: usize) -> Self {
        Self { dot, mark }
    }

    /// Empty selection at `offset`
    pub fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn start(&self) -> usize {
        self.dot.min(self.mark)
    }

    pub fn end(&self) -> usize {
        self.dot.max(self.mark)
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.dot == self.mark
    }

    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}

/// Observer of a single document
pub trait DocumentListener: Send + Sync {
    /// The dirty flag was set, or explicitly re-announced after a save
    fn document_modify_status_updated(&self, document: &Document);

    fn document_file_path_updated(&self, document: &Document);

    fn document_selection_updated(&self, _document: &Document) {}
}

/// One open text buffer
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    path: Option<PathBuf>,
    text: String,
    modified: bool,
    selection: Selection,
    listeners: Listeners<dyn DocumentListener>,
}

impl Document {
    /// Create a document whose initial text is the saved baseline
    pub fn new(path: Option<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            id: DocumentId::next(),
            path,
            text: text.into(),
            modified: false,
            selection: Selection::default(),
            listeners: Listeners::new(),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// File name of the document, if it has a path
    pub fn display_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Full path for title bars, or `untitled` for unsaved documents
    pub fn title(&self, untitled: &str) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => untitled.to_string(),
        }
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats::of(&self.text)
    }

    pub fn status(&self) -> StatusInfo {
        StatusInfo::of(&self.text, self.selection)
    }

    /// Set the dirty flag and notify listeners, even if already dirty
    pub fn mark_modified(&mut self) {
        self.modified = true;
        self.notify_modify_status();
    }

    /// Set the dirty flag without notifying anyone
    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Change the file identity. The dirty flag is left alone.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(DocumentError::invalid("path must not be empty"));
        }
        self.path = Some(path);
        self.listeners
            .fire(|l| l.document_file_path_updated(self));
        Ok(())
    }

    pub fn add_listener(&self, listener: Arc<dyn DocumentListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn notify_modify_status(&self) {
        self.listeners
            .fire(|l| l.document_modify_status_updated(self));
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
        let len = self.char_len();
        if selection.dot > len || selection.mark > len {
            return Err(DocumentError::invalid(format!(
                "selection {}..{} outside document of {} chars",
                selection.mark, selection.dot, len
            )));
        }
        self.selection = selection;
        self.listeners
            .fire(|l| l.document_selection_updated(self));
        Ok(())
    }

    /// Insert `text` at a char offset; the caret ends up after it
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        let at = self.byte_offset(offset)?;
        if text.is_empty() {
            return Ok(());
        }
        self.text.insert_str(at, text);
        self.selection = Selection::caret(offset + text.chars().count());
        self.mark_modified();
        Ok(())
    }

    /// Remove a char range and return the removed text
    pub fn remove(&mut self, range: Range<usize>) -> Result<String> {
        let bytes = self.byte_range(range.clone())?;
        if bytes.is_empty() {
            return Ok(String::new());
        }
        let removed: String = self.text.drain(bytes).collect();
        self.selection = Selection::caret(range.start);
        self.mark_modified();
        Ok(removed)
    }

    /// Replace a char range with `text`; the new text ends up selected
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<()> {
        let bytes = self.byte_range(range.clone())?;
        if self.text[bytes.clone()] == *text {
            return Ok(());
        }
        self.text.replace_range(bytes, text);
        self.selection = Selection::new(range.start + text.chars().count(), range.start);
        self.mark_modified();
        Ok(())
    }

    /// Replace the whole content
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.text {
            return;
        }
        self.text = text;
        self.selection = Selection::caret(0);
        self.mark_modified();
    }

    /// Apply a case change to the selected text. Returns whether anything
    /// was selected.
    pub fn transform_selection(&mut self, transform: CaseTransform) -> Result<bool> {
        if self.selection.is_empty() {
            return Ok(false);
        }
        let range = self.selection.range();
        let bytes = self.byte_range(range.clone())?;
        let changed = transform.apply(&self.text[bytes]);
        self.replace(range, &changed)?;
        Ok(true)
    }

    /// Apply a line tool to every line the selection touches. Returns whether
    /// anything was selected.
    pub fn apply_line_tool(&mut self, tool: LineTool) -> Result<bool> {
        if self.selection.is_empty() {
            return Ok(false);
        }
        let bytes = self.byte_range(self.selection.range())?;
        let span = line_span(&self.text, bytes);
        let changed = tool.apply(&self.text[span.clone()]);
        let start = self.text[..span.start].chars().count();
        let end = start + self.text[span].chars().count();
        self.replace(start..end, &changed)?;
        Ok(true)
    }

    fn byte_offset(&self, offset: usize) -> Result<usize> {
        self.text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(self.text.len()))
            .nth(offset)
            .ok_or_else(|| {
                DocumentError::invalid(format!(
                    "offset {} outside document of {} chars",
                    offset,
                    self.char_len()
                ))
            })
    }

    fn byte_range(&self, range: Range<usize>) -> Result<Range<usize>> {
        if range.start > range.end {
            return Err(DocumentError::invalid(format!(
                "reversed range {}..{}",
                range.start, range.end
            )));
        }
        Ok(self.byte_offset(range.start)?..self.byte_offset(range.end)?)
    }
}
