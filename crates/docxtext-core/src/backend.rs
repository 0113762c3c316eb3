use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    Open(String),
    #[error("unsupported document format: {0}")]
    Format(String),
    #[error("malformed document XML: {0}")]
    Xml(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A document parsed into its paragraphs, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub paragraphs: Vec<String>,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, paragraphs: Vec<String>) -> Self {
        Self {
            path: path.into(),
            paragraphs,
        }
    }

    /// Whole-document text: paragraphs joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }
}

/// Trait for document parsing backends.
///
/// Implementors turn a file on disk into an ordered list of paragraph
/// strings; record shaping and queue handling live in the readers.
pub trait DocumentBackend: Send + Sync {
    /// Open and parse the document at `path`.
    fn open(&self, path: &Path) -> Result<Document, BackendError>;
}
