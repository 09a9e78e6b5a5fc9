//! Unsaved-changes policy
//!
//! The registry never prompts. These helpers take a decision obtained by
//! the host (a dialog, a CLI flag) and carry out close and exit with it.

use log::{info, warn};
use serde::Deserialize;

use crate::core::{Document, DocumentError, DocumentId, DocumentRegistry, Result};

/// Answer to "this document has unsaved changes"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CloseDecision {
    #[value(name = "save")]
    #[serde(rename = "save")]
    SaveFirst,
    Discard,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    Kept,
}

#[derive(Debug)]
pub enum ShutdownOutcome {
    /// Nothing was closed
    Cancelled,
    /// Every document that could be closed was; `unsaved` lists the ones
    /// left open because saving them failed
    Completed {
        closed: usize,
        unsaved: Vec<(DocumentId, DocumentError)>,
    },
}

/// Close one document, asking `decide` only if it has unsaved changes.
///
/// `SaveFirst` saves to the document's own path and closes only if that
/// worked; the save error is returned otherwise.
pub fn close_with_decision(
    registry: &mut DocumentRegistry,
    id: DocumentId,
    decide: impl FnOnce(&Document) -> CloseDecision,
) -> Result<CloseOutcome> {
    let document = registry
        .document(id)
        .ok_or(DocumentError::UnknownDocument(id))?;

    if document.is_modified() {
        match decide(document) {
            CloseDecision::Cancel => return Ok(CloseOutcome::Kept),
            CloseDecision::Discard => {}
            CloseDecision::SaveFirst => registry.save_document(id, None)?,
        }
    }

    registry.close_document(id)?;
    Ok(CloseOutcome::Closed)
}

/// Close everything at exit. One decision covers all dirty documents and is
/// asked only if there are any.
pub fn shutdown(
    registry: &mut DocumentRegistry,
    decide: impl FnOnce(&[&Document]) -> CloseDecision,
) -> ShutdownOutcome {
    let dirty: Vec<&Document> = registry.iter().filter(|d| d.is_modified()).collect();
    let decision = if dirty.is_empty() {
        CloseDecision::Discard
    } else {
        decide(&dirty)
    };

    if decision == CloseDecision::Cancel {
        info!("Exit cancelled with {} unsaved document(s)", dirty.len());
        return ShutdownOutcome::Cancelled;
    }

    let mut closed = 0;
    let mut unsaved = Vec::new();
    for id in registry.document_ids() {
        let is_dirty = registry.document(id).is_some_and(Document::is_modified);
        if is_dirty && decision == CloseDecision::SaveFirst {
            if let Err(e) = registry.save_document(id, None) {
                warn!("Keeping {} open: {}", id, e);
                unsaved.push((id, e));
                continue;
            }
        }
        if registry.close_document(id).is_ok() {
            closed += 1;
        }
    }

    ShutdownOutcome::Completed { closed, unsaved }
}
