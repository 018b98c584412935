//! Errors surfaced by the note and config stores.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NoteError {
    /// A note with this name already exists (create or rename target).
    #[error("A note named \"{0}\" already exists")]
    DuplicateName(String),

    #[error("Note \"{0}\" not found")]
    NotFound(String),

    #[error("Invalid note name: {0}")]
    InvalidName(String),

    #[error("Invalid tag: {0:?}")]
    InvalidTag(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed settings file. `ConfigStore::load` recovers from this.
    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Screenshot failed: {0}")]
    Screenshot(String),
}

pub type Result<T> = std::result::Result<T, NoteError>;
