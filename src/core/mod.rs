//! Core Document Management
//!
//! Documents, the registry that owns them and the listener fan-out both
//! use to announce state changes.

pub mod document;
pub mod error;
pub mod listener;
pub mod registry;
pub mod storage;

pub use document::{Document, DocumentId, DocumentListener, Selection, UNTITLED_NAME};
pub use error::{DocumentError, Result};
pub use listener::{ListenerId, Listeners};
pub use registry::{DocumentEdit, DocumentRegistry, RegistryListener, SharedRegistry};
pub use storage::{FileStorage, MemoryStorage, Storage};
