//! Document Registry
//!
//! Owns every open document, keeps exactly one of them current while any
//! are open, and guarantees that no two open documents share a path.
//! Per-document notifications are re-broadcast as registry events.

use std::io;
use std::ops::Deref;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use super::document::{Document, DocumentId, DocumentListener, Selection};
use super::error::{DocumentError, Result};
use super::listener::{ListenerId, Listeners};
use super::storage::{FileStorage, Storage};
use crate::tools::{CaseTransform, LineTool};

/// Registry behind one coarse lock, for hosts that share it across threads
pub type SharedRegistry = Arc<Mutex<DocumentRegistry>>;

/// Observer of the registry. Listeners only get shared borrows, so they
/// react by reading state, never by changing it.
pub trait RegistryListener: Send + Sync {
    fn document_added(&self, document: &Document);

    fn document_removed(&self, document: &Document);

    /// At most one side is `None`: adding to an empty registry has no
    /// previous, closing the last document has no current
    fn current_document_changed(&self, previous: Option<&Document>, current: Option<&Document>);

    fn document_modify_status_updated(&self, _document: &Document) {}

    fn document_path_updated(&self, _document: &Document) {}

    fn caret_updated(&self, _document: &Document) {}
}

/// Installed on every registered document to re-broadcast its events
struct Forwarder {
    listeners: Listeners<dyn RegistryListener>,
}

impl DocumentListener for Forwarder {
    fn document_modify_status_updated(&self, document: &Document) {
        self.listeners
            .fire(|l| l.document_modify_status_updated(document));
    }

    fn document_file_path_updated(&self, document: &Document) {
        self.listeners.fire(|l| l.document_path_updated(document));
    }

    fn document_selection_updated(&self, document: &Document) {
        self.listeners.fire(|l| l.caret_updated(document));
    }
}

#[derive(Debug)]
struct Entry {
    document: Document,
    forwarder: ListenerId,
}

/// Ordered collection of open documents
pub struct DocumentRegistry {
    entries: Vec<Entry>,
    current: Option<DocumentId>,
    listeners: Listeners<dyn RegistryListener>,
    forwarder: Arc<Forwarder>,
    storage: Box<dyn Storage>,
}

impl std::fmt::Debug for DocumentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRegistry")
            .field("entries", &self.entries)
            .field("current", &self.current)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl Default for DocumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRegistry {
    /// Registry backed by the local filesystem
    pub fn new() -> Self {
        Self::with_storage(FileStorage)
    }

    pub fn with_storage(storage: impl Storage + 'static) -> Self {
        let listeners = Listeners::new();
        Self {
            entries: Vec::new(),
            current: None,
            forwarder: Arc::new(Forwarder {
                listeners: listeners.clone(),
            }),
            listeners,
            storage: Box::new(storage),
        }
    }

    /// Move the registry behind a single lock
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(Mutex::new(self))
    }

    pub fn add_listener(&self, listener: Arc<dyn RegistryListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Shared handle to the registry's listener set. Listeners that need to
    /// register or unregister others during dispatch keep one of these.
    pub fn listener_handle(&self) -> Listeners<dyn RegistryListener> {
        self.listeners.clone()
    }

    /// Open a new untitled, clean document and make it current
    pub fn create_new_document(&mut self) -> DocumentId {
        self.adopt(Document::new(None, String::new()))
    }

    /// Open the file at `path` and make it current.
    ///
    /// If the path is already open, that document is selected and returned
    /// instead. A failed read leaves the registry untouched.
    pub fn load_document(&mut self, path: impl AsRef<Path>) -> Result<DocumentId> {
        let path = absolute_path(path.as_ref())?;

        if let Some(id) = self.find_by_path(&path) {
            debug!("{} already open as {}", path.display(), id);
            self.select(id);
            return Ok(id);
        }

        let bytes = self.storage.read_all(&path).map_err(|source| {
            warn!("Failed to read {}: {}", path.display(), source);
            DocumentError::io(&path, source)
        })?;
        let text = String::from_utf8(bytes).map_err(|e| {
            warn!("{} is not valid UTF-8", path.display());
            DocumentError::io(&path, io::Error::new(io::ErrorKind::InvalidData, e))
        })?;

        Ok(self.adopt(Document::new(Some(path), text)))
    }

    /// Write a document to `new_path`, or to its own path when `None`.
    ///
    /// Fails with `PathConflict` before touching disk if another open
    /// document already uses `new_path`. On success the document takes the
    /// new path and becomes clean; on failure nothing changes.
    pub fn save_document(&mut self, id: DocumentId, new_path: Option<&Path>) -> Result<()> {
        let index = self.require(id)?;

        let target = match new_path {
            Some(path) => {
                let path = absolute_path(path)?;
                if self
                    .entries
                    .iter()
                    .any(|e| e.document.id() != id && e.document.path() == Some(path.as_path()))
                {
                    warn!("Refusing to save {} over open {}", id, path.display());
                    return Err(DocumentError::PathConflict(path));
                }
                path
            }
            None => self.entries[index]
                .document
                .path()
                .map(Path::to_path_buf)
                .ok_or_else(|| DocumentError::invalid("document has no path to save to"))?,
        };

        let document = &mut self.entries[index].document;
        self.storage
            .write_all(&target, document.text().as_bytes())
            .map_err(|source| {
                warn!("Failed to write {}: {}", target.display(), source);
                DocumentError::io(&target, source)
            })?;

        if document.path() != Some(target.as_path()) {
            document.set_path(target)?;
        }
        document.set_modified(false);
        document.notify_modify_status();
        debug!("Saved {} to {:?}", id, document.path());
        Ok(())
    }

    /// Remove a document. Prompting about unsaved changes is the caller's
    /// job and must happen before this.
    pub fn close_document(&mut self, id: DocumentId) -> Result<()> {
        let index = self.require(id)?;
        let entry = self.entries.remove(index);
        entry.document.remove_listener(entry.forwarder);

        let was_current = self.current == Some(id);
        if was_current {
            self.current = match self.entries.len() {
                0 => None,
                len => Some(self.entries[index.min(len - 1)].document.id()),
            };
        }
        debug!("Closed {}, current is now {:?}", id, self.current);

        let removed = &entry.document;
        self.listeners.fire(|l| l.document_removed(removed));
        if was_current {
            let current = self.current_document();
            self.listeners
                .fire(|l| l.current_document_changed(Some(removed), current));
        }
        Ok(())
    }

    /// Make `id` the current document
    pub fn set_current_document(&mut self, id: DocumentId) -> Result<()> {
        self.require(id)?;
        self.select(id);
        Ok(())
    }

    pub fn current_document(&self) -> Option<&Document> {
        self.current.and_then(|id| self.document(id))
    }

    pub fn current_id(&self) -> Option<DocumentId> {
        self.current
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Document at `index` in opening order
    pub fn get_document(&self, index: usize) -> Result<&Document> {
        self.entries
            .get(index)
            .map(|e| &e.document)
            .ok_or(DocumentError::IndexOutOfRange {
                index,
                count: self.entries.len(),
            })
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.entries
            .iter()
            .find(|e| e.document.id() == id)
            .map(|e| &e.document)
    }

    pub fn index_of(&self, id: DocumentId) -> Option<usize> {
        self.entries.iter().position(|e| e.document.id() == id)
    }

    /// Open document with this path, compared in absolute form
    pub fn find_by_path(&self, path: &Path) -> Option<DocumentId> {
        let path = absolute_path(path).ok()?;
        self.entries
            .iter()
            .find(|e| e.document.path() == Some(path.as_path()))
            .map(|e| e.document.id())
    }

    /// Documents with unsaved changes, in opening order
    pub fn dirty_documents(&self) -> Vec<DocumentId> {
        self.iter()
            .filter(|d| d.is_modified())
            .map(Document::id)
            .collect()
    }

    /// Borrowing iterator in opening order. The registry cannot be changed
    /// while it is alive; use [`document_ids`](Self::document_ids) to walk
    /// and mutate.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Snapshot of the open document ids in opening order
    pub fn document_ids(&self) -> Vec<DocumentId> {
        self.iter().map(Document::id).collect()
    }

    /// Scoped write access to a document's content and selection
    pub fn edit_document(&mut self, id: DocumentId) -> Result<DocumentEdit<'_>> {
        let index = self.require(id)?;
        Ok(DocumentEdit {
            document: &mut self.entries[index].document,
        })
    }

    /// Record the caret/selection reported by the presentation layer
    pub fn set_selection(&mut self, id: DocumentId, selection: Selection) -> Result<()> {
        self.edit_document(id)?.set_selection(selection)
    }

    fn require(&self, id: DocumentId) -> Result<usize> {
        self.index_of(id).ok_or(DocumentError::UnknownDocument(id))
    }

    fn adopt(&mut self, document: Document) -> DocumentId {
        let id = document.id();
        let forwarder = document.add_listener(self.forwarder.clone());
        self.entries.push(Entry {
            document,
            forwarder,
        });
        let previous = self.current.replace(id);
        debug!("Added {} ({} open)", id, self.entries.len());

        let added = &self.entries[self.entries.len() - 1].document;
        self.listeners.fire(|l| l.document_added(added));
        let previous = previous.and_then(|p| self.document(p));
        self.listeners
            .fire(|l| l.current_document_changed(previous, Some(added)));
        id
    }

    /// Caller guarantees `id` is a member
    fn select(&mut self, id: DocumentId) {
        if self.current == Some(id) {
            return;
        }
        let previous = self.current.replace(id);
        debug!("Current document {:?} -> {}", previous, id);

        let previous = previous.and_then(|p| self.document(p));
        let current = self.document(id);
        self.listeners
            .fire(|l| l.current_document_changed(previous, current));
    }
}

impl<'a> IntoIterator for &'a DocumentRegistry {
    type Item = &'a Document;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Iterator over open documents
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Document;

    fn next(&mut self) -> Option<&'a Document> {
        self.inner.next().map(|e| &e.document)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Editing handle for one registered document. Path and dirty-flag changes
/// stay with the registry.
#[derive(Debug)]
pub struct DocumentEdit<'a> {
    document: &'a mut Document,
}

impl Deref for DocumentEdit<'_> {
    type Target = Document;

    fn deref(&self) -> &Document {
        self.document
    }
}

impl DocumentEdit<'_> {
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        self.document.insert(offset, text)
    }

    pub fn remove(&mut self, range: std::ops::Range<usize>) -> Result<String> {
        self.document.remove(range)
    }

    pub fn replace(&mut self, range: std::ops::Range<usize>, text: &str) -> Result<()> {
        self.document.replace(range, text)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.document.set_text(text)
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
        self.document.set_selection(selection)
    }

    pub fn mark_modified(&mut self) {
        self.document.mark_modified()
    }

    pub fn transform_selection(&mut self, transform: CaseTransform) -> Result<bool> {
        self.document.transform_selection(transform)
    }

    pub fn apply_line_tool(&mut self, tool: LineTool) -> Result<bool> {
        self.document.apply_line_tool(tool)
    }
}

/// Absolute form with `.` and `..` folded lexically. Symlinks are not resolved.
fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(DocumentError::invalid("path must not be empty"));
    }
    let absolute = std::path::absolute(path).map_err(|source| DocumentError::io(path, source))?;

    let mut normal = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normal.pop();
            }
            other => normal.push(other),
        }
    }
    Ok(normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStorage;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    fn name(document: Option<&Document>) -> String {
        document
            .map(|d| d.display_name().unwrap_or_else(|| "new".to_string()))
            .unwrap_or_else(|| "-".to_string())
    }

    impl RegistryListener for Recorder {
        fn document_added(&self, document: &Document) {
            self.push(format!("added:{}", name(Some(document))));
        }

        fn document_removed(&self, document: &Document) {
            self.push(format!("removed:{}", name(Some(document))));
        }

        fn current_document_changed(&self, previous: Option<&Document>, current: Option<&Document>) {
            assert!(previous.is_some() || current.is_some());
            self.push(format!("current:{}->{}", name(previous), name(current)));
        }

        fn document_modify_status_updated(&self, document: &Document) {
            self.push(format!("modified:{}", document.is_modified()));
        }

        fn document_path_updated(&self, document: &Document) {
            self.push(format!("path:{}", name(Some(document))));
        }
    }

    /// Records how many listeners a removed document still carries
    struct ForwarderCount(Arc<Mutex<Option<usize>>>);

    impl RegistryListener for ForwarderCount {
        fn document_added(&self, _document: &Document) {}

        fn document_removed(&self, document: &Document) {
            *self.0.lock().unwrap() = Some(document.listener_count());
        }

        fn current_document_changed(&self, _previous: Option<&Document>, _current: Option<&Document>) {}
    }

    fn registry_with(files: &[(&str, &str)]) -> (DocumentRegistry, Arc<Recorder>) {
        let storage = MemoryStorage::new();
        for (path, content) in files {
            storage.insert(*path, *content);
        }
        let registry = DocumentRegistry::with_storage(storage);
        let recorder = Arc::new(Recorder::default());
        registry.add_listener(recorder.clone());
        (registry, recorder)
    }

    #[test]
    fn test_create_new_document() {
        let (mut registry, recorder) = registry_with(&[]);
        let id = registry.create_new_document();

        assert_eq!(registry.count(), 1);
        assert_eq!(registry.current_id(), Some(id));
        let doc = registry.document(id).unwrap();
        assert!(doc.path().is_none());
        assert!(!doc.is_modified());
        assert_eq!(recorder.take(), vec!["added:new", "current:-->new"]);
    }

    #[test]
    fn test_load_missing_file_changes_nothing() {
        let (mut registry, recorder) = registry_with(&[]);
        let err = registry.load_document("/mem/missing.txt").unwrap_err();

        assert!(matches!(err, DocumentError::Io { .. }));
        assert!(registry.is_empty());
        assert!(registry.current_document().is_none());
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_load_invalid_utf8_is_io_error() {
        let storage = MemoryStorage::new();
        storage.insert("/mem/bin.dat", vec![0xff, 0xfe, 0x00]);
        let mut registry = DocumentRegistry::with_storage(storage);

        match registry.load_document("/mem/bin.dat") {
            Err(DocumentError::Io { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::InvalidData)
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_same_path_twice_selects_existing() {
        let (mut registry, recorder) = registry_with(&[("/mem/a.txt", "A"), ("/mem/b.txt", "B")]);
        let a = registry.load_document("/mem/a.txt").unwrap();
        let b = registry.load_document("/mem/b.txt").unwrap();
        recorder.take();

        let again = registry.load_document("/mem/a.txt").unwrap();
        assert_eq!(again, a);
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.current_id(), Some(a));
        assert_eq!(recorder.take(), vec!["current:b.txt->a.txt"]);

        // Already current: no events at all
        registry.load_document("/mem/a.txt").unwrap();
        assert!(recorder.take().is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_path_is_invalid() {
        let (mut registry, _) = registry_with(&[]);
        let id = registry.create_new_document();
        assert!(matches!(
            registry.load_document(""),
            Err(DocumentError::InvalidArgument(_))
        ));
        assert!(matches!(
            registry.save_document(id, Some(Path::new(""))),
            Err(DocumentError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_save_untitled_without_path_is_invalid() {
        let (mut registry, _) = registry_with(&[]);
        let id = registry.create_new_document();
        registry.edit_document(id).unwrap().insert(0, "x").unwrap();

        assert!(matches!(
            registry.save_document(id, None),
            Err(DocumentError::InvalidArgument(_))
        ));
        assert!(registry.document(id).unwrap().is_modified());
    }

    #[test]
    fn test_save_as_sets_path_and_clears_dirty() {
        let (mut registry, recorder) = registry_with(&[]);
        let id = registry.create_new_document();
        registry.edit_document(id).unwrap().insert(0, "text").unwrap();
        recorder.take();

        registry.save_document(id, Some(Path::new("/mem/out.txt"))).unwrap();
        let doc = registry.document(id).unwrap();
        assert!(!doc.is_modified());
        assert_eq!(doc.path(), Some(Path::new("/mem/out.txt")));
        assert_eq!(recorder.take(), vec!["path:out.txt", "modified:false"]);
    }

    #[test]
    fn test_save_conflict_leaves_everything_alone() {
        let (mut registry, recorder) = registry_with(&[("/mem/a.txt", "A")]);
        let a = registry.load_document("/mem/a.txt").unwrap();
        registry.edit_document(a).unwrap().insert(1, "!").unwrap();
        let b = registry.create_new_document();
        registry.edit_document(b).unwrap().insert(0, "B").unwrap();
        recorder.take();

        let err = registry
            .save_document(b, Some(Path::new("/mem/a.txt")))
            .unwrap_err();
        assert!(matches!(err, DocumentError::PathConflict(_)));
        assert!(registry.document(a).unwrap().is_modified());
        assert!(registry.document(b).unwrap().is_modified());
        assert!(registry.document(b).unwrap().path().is_none());
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_save_to_own_path_is_not_a_conflict() {
        let (mut registry, _) = registry_with(&[("/mem/a.txt", "A")]);
        let a = registry.load_document("/mem/a.txt").unwrap();
        registry.save_document(a, Some(Path::new("/mem/a.txt"))).unwrap();
        // Clean save to the same path still writes
        registry.save_document(a, None).unwrap();
        assert!(!registry.document(a).unwrap().is_modified());
    }

    #[test]
    fn test_failed_write_keeps_dirty_flag() {
        let storage = MemoryStorage::new();
        storage.insert("/mem/ro.txt", "old");
        storage.deny_writes("/mem/ro.txt");
        let mut registry = DocumentRegistry::with_storage(storage);

        let id = registry.load_document("/mem/ro.txt").unwrap();
        registry.edit_document(id).unwrap().set_text("new");
        let err = registry.save_document(id, None).unwrap_err();

        assert!(matches!(err, DocumentError::Io { .. }));
        assert!(registry.document(id).unwrap().is_modified());
    }

    #[test]
    fn test_failed_save_as_keeps_path_and_dirty_flag() {
        let storage = MemoryStorage::new();
        storage.insert("/mem/a.txt", "A");
        storage.deny_writes("/mem/new.txt");
        let mut registry = DocumentRegistry::with_storage(storage);
        let recorder = Arc::new(Recorder::default());
        registry.add_listener(recorder.clone());

        let id = registry.load_document("/mem/a.txt").unwrap();
        registry.edit_document(id).unwrap().insert(1, "!").unwrap();
        recorder.take();

        let err = registry
            .save_document(id, Some(Path::new("/mem/new.txt")))
            .unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
        let doc = registry.document(id).unwrap();
        assert_eq!(doc.path(), Some(Path::new("/mem/a.txt")));
        assert!(doc.is_modified());
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_parent_dir_spelling_is_same_identity() {
        let (mut registry, _) = registry_with(&[("/mem/a.txt", "A")]);
        let a = registry.load_document("/mem/a.txt").unwrap();

        assert_eq!(registry.load_document("/mem/sub/../a.txt").unwrap(), a);
        assert_eq!(registry.load_document("/mem/./a.txt").unwrap(), a);
        assert_eq!(registry.count(), 1);

        let b = registry.create_new_document();
        assert!(matches!(
            registry.save_document(b, Some(Path::new("/mem/sub/../a.txt"))),
            Err(DocumentError::PathConflict(_))
        ));
    }

    #[test]
    fn test_find_by_path_normalizes_argument() {
        let relative = Path::new("notes.txt");
        let absolute = std::path::absolute(relative).unwrap();
        let storage = MemoryStorage::new();
        storage.insert(absolute.clone(), "n");
        let mut registry = DocumentRegistry::with_storage(storage);

        let id = registry.load_document(relative).unwrap();
        assert_eq!(registry.find_by_path(relative), Some(id));
        assert_eq!(registry.find_by_path(&absolute), Some(id));
        assert_eq!(registry.find_by_path(Path::new("")), None);
    }

    #[test]
    fn test_close_recomputes_current() {
        let (mut registry, recorder) =
            registry_with(&[("/mem/a.txt", ""), ("/mem/b.txt", ""), ("/mem/c.txt", "")]);
        let a = registry.load_document("/mem/a.txt").unwrap();
        let b = registry.load_document("/mem/b.txt").unwrap();
        let c = registry.load_document("/mem/c.txt").unwrap();

        // Closing the middle, current document selects its successor
        registry.set_current_document(b).unwrap();
        recorder.take();
        registry.close_document(b).unwrap();
        assert_eq!(registry.current_id(), Some(c));
        assert_eq!(recorder.take(), vec!["removed:b.txt", "current:b.txt->c.txt"]);

        // Closing the last one falls back to the one before it
        registry.close_document(c).unwrap();
        assert_eq!(registry.current_id(), Some(a));

        registry.close_document(a).unwrap();
        assert!(registry.current_document().is_none());
        assert_eq!(
            recorder.take(),
            vec![
                "removed:c.txt",
                "current:c.txt->a.txt",
                "removed:a.txt",
                "current:a.txt->-"
            ]
        );
    }

    #[test]
    fn test_close_non_current_keeps_selection() {
        let (mut registry, recorder) = registry_with(&[]);
        let first = registry.create_new_document();
        let second = registry.create_new_document();
        recorder.take();

        registry.close_document(first).unwrap();
        assert_eq!(registry.current_id(), Some(second));
        assert_eq!(recorder.take(), vec!["removed:new"]);
    }

    #[test]
    fn test_close_unknown_document_is_rejected() {
        let (mut registry, _) = registry_with(&[]);
        let id = registry.create_new_document();
        registry.close_document(id).unwrap();

        assert!(matches!(
            registry.close_document(id),
            Err(DocumentError::UnknownDocument(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_get_document_out_of_range() {
        let (mut registry, _) = registry_with(&[]);
        registry.create_new_document();
        assert!(registry.get_document(0).is_ok());
        assert!(matches!(
            registry.get_document(1),
            Err(DocumentError::IndexOutOfRange { index: 1, count: 1 })
        ));
    }

    #[test]
    fn test_close_detaches_forwarder() {
        let (mut registry, recorder) = registry_with(&[]);
        let id = registry.create_new_document();
        registry.edit_document(id).unwrap().insert(0, "a").unwrap();
        assert_eq!(recorder.take().last().map(String::as_str), Some("modified:true"));

        let forwarders = Arc::new(Mutex::new(None));
        registry.add_listener(Arc::new(ForwarderCount(forwarders.clone())));
        registry.close_document(id).unwrap();

        // The removed document reaches listeners with no registry listener left on it
        assert_eq!(*forwarders.lock().unwrap(), Some(0));
        assert!(registry.edit_document(id).is_err());
    }

    #[test]
    fn test_iteration_in_opening_order() {
        let (mut registry, _) = registry_with(&[("/mem/1", ""), ("/mem/2", "")]);
        let ids = vec![
            registry.load_document("/mem/1").unwrap(),
            registry.create_new_document(),
            registry.load_document("/mem/2").unwrap(),
        ];

        let seen: Vec<DocumentId> = registry.iter().map(Document::id).collect();
        assert_eq!(seen, ids);
        // Restartable
        assert_eq!((&registry).into_iter().len(), 3);

        for id in registry.document_ids() {
            registry.close_document(id).unwrap();
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_shared_registry_across_threads() {
        let shared = DocumentRegistry::with_storage(MemoryStorage::new()).into_shared();
        let worker = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || shared.lock().unwrap().create_new_document())
        };
        let id = worker.join().unwrap();
        assert_eq!(shared.lock().unwrap().current_id(), Some(id));
    }
}
