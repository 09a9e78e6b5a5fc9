//! Persistence Boundary
//!
//! Whole-file byte access used by the registry for loads and saves.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Byte-level file access
pub trait Storage: Send + Sync {
    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn write_all(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Local filesystem storage
#[derive(Debug, Default, Clone, Copy)]
pub struct FileStorage;

impl Storage for FileStorage {
    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write_all(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        fs::write(path, bytes)
    }
}

/// In-memory storage keyed by path
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    read_only: Mutex<Vec<PathBuf>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file
    pub fn insert(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), bytes.into());
    }

    /// Current bytes stored at `path`
    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Make every later write to `path` fail with `PermissionDenied`
    pub fn deny_writes(&self, path: impl Into<PathBuf>) {
        self.read_only
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.into());
    }
}

impl Storage for MemoryStorage {
    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    fn write_all(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let denied = self
            .read_only
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|p| p == path);
        if denied {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("read-only: {}", path.display()),
            ));
        }
        self.insert(path, bytes);
        Ok(())
    }
}
