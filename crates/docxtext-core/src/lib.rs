use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod pipeline;

// Re-export for convenience
pub use backend::{BackendError, Document, DocumentBackend};
pub use pipeline::{JsonLinesSink, PipelineError, RecordSink, RunStats};

/// Metadata attached to a record. Keys are strings, values are JSON.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// Metadata key holding the source path of a record.
pub const META_FILE: &str = "file";
/// Metadata key holding the zero-based paragraph index of a record.
pub const META_PARAGRAPH: &str = "paragraph";

/// A unit of pretraining text handed to the downstream pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PretrainData {
    content: String,
    meta: Meta,
}

impl PretrainData {
    pub fn new(content: impl Into<String>, meta: Meta) -> Self {
        Self {
            content: content.into(),
            meta,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// The `file` metadata entry, if present.
    pub fn file(&self) -> Option<&str> {
        self.meta.get(META_FILE).and_then(|v| v.as_str())
    }

    /// The `paragraph` metadata entry, if present.
    pub fn paragraph(&self) -> Option<usize> {
        self.meta
            .get(META_PARAGRAPH)
            .and_then(|v| v.as_u64())
            .map(|i| i as usize)
    }
}

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("configuration error: {0}")]
    Configuration(String),
}

enum RecordsKind {
    Paragraphs(std::iter::Enumerate<std::vec::IntoIter<String>>),
    Whole(Option<String>),
    Failed(bool),
    Empty,
}

/// The records produced by a single [`Reader::read`] call.
///
/// Items are `None` when the file could not be read: exactly one absent
/// record stands in for the whole file. Callers must skip such entries
/// rather than treat them as the end of the stream.
pub struct Records {
    file: String,
    kind: RecordsKind,
}

impl Records {
    /// One record per paragraph, tagged with its zero-based index.
    pub fn paragraphs(file: impl Into<String>, paragraphs: Vec<String>) -> Self {
        Self {
            file: file.into(),
            kind: RecordsKind::Paragraphs(paragraphs.into_iter().enumerate()),
        }
    }

    /// A single record carrying the whole document.
    pub fn document(file: impl Into<String>, content: String) -> Self {
        Self {
            file: file.into(),
            kind: RecordsKind::Whole(Some(content)),
        }
    }

    /// A single absent record signalling that `file` failed.
    pub fn failed(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            kind: RecordsKind::Failed(true),
        }
    }

    /// No records at all.
    pub fn empty() -> Self {
        Self {
            file: String::new(),
            kind: RecordsKind::Empty,
        }
    }

    /// Source path the records belong to (empty for [`Records::empty`]).
    pub fn file(&self) -> &str {
        &self.file
    }
}

fn base_meta(file: &str) -> Meta {
    let mut meta = Meta::new();
    meta.insert(META_FILE.to_string(), file.into());
    meta
}

impl Iterator for Records {
    type Item = Option<PretrainData>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.kind {
            RecordsKind::Paragraphs(iter) => {
                let (i, text) = iter.next()?;
                let mut meta = base_meta(&self.file);
                meta.insert(META_PARAGRAPH.to_string(), i.into());
                Some(Some(PretrainData::new(text, meta)))
            }
            RecordsKind::Whole(content) => {
                let content = content.take()?;
                Some(Some(PretrainData::new(content, base_meta(&self.file))))
            }
            RecordsKind::Failed(pending) => {
                if std::mem::take(pending) {
                    Some(None)
                } else {
                    None
                }
            }
            RecordsKind::Empty => None,
        }
    }
}

/// A source of pretraining records, driven by [`pipeline::run`].
///
/// Call [`initialize`](Reader::initialize) once, then
/// [`read`](Reader::read) until [`has_finished`](Reader::has_finished)
/// returns true, then [`finalize`](Reader::finalize).
pub trait Reader {
    /// Command-line name of the reader.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Resolve inputs and reset cursor state.
    fn initialize(&mut self) -> Result<(), ReaderError>;

    /// Process the next input and return its records.
    fn read(&mut self) -> Records;

    fn has_finished(&self) -> bool;

    /// Release any open input. Safe to call repeatedly.
    fn finalize(&mut self);
}
