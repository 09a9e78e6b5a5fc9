//! textpad
//!
//! Multi-document core of a plain-text editor.
//!
//! This library provides:
//! - Documents with dirty tracking and change notification
//! - A registry that owns open documents and keeps one of them current
//! - Unsaved-changes handling for close and exit
//! - Text tools (case changes, line sorting, statistics)
//! - Configuration and a small command-line host

pub mod app;
pub mod config;
pub mod core;
pub mod session;
pub mod tools;

// Re-exports for clean public API
pub use config::Config;
pub use core::{
    Document, DocumentError, DocumentId, DocumentListener, DocumentRegistry, RegistryListener,
    Selection,
};
pub use session::{CloseDecision, CloseOutcome, ShutdownOutcome};
