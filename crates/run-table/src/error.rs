//! Errors raised while reading an export file.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while loading a BehaviorSpace table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file is readable but does not have the expected table shape.
    #[error("malformed input in {}: {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        LoadError::MalformedInput {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns true for shape errors, as opposed to I/O failures.
    pub fn is_malformed(&self) -> bool {
        matches!(self, LoadError::MalformedInput { .. })
    }

    /// Path of the file that failed to load.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::MalformedInput { path, .. } | LoadError::Io { path, .. } => path,
        }
    }
}
