use docxtext_core::DocumentBackend;

pub mod locate;
pub mod reader;

// Re-export domain types for convenience
pub use docxtext_core::{PretrainData, Reader, ReaderError, Records};
pub use locate::{LocateError, LocateOptions, expand_glob, is_glob, locate_files};
pub use reader::DocxPretrainReader;

/// Backend used by readers unless another one is injected.
#[cfg(feature = "docx")]
pub fn default_backend() -> Box<dyn DocumentBackend> {
    Box::new(docxtext_docx::DocxBackend::default())
}

#[cfg(not(feature = "docx"))]
pub fn default_backend() -> Box<dyn DocumentBackend> {
    Box::new(NoDocxSupport)
}

#[cfg(not(feature = "docx"))]
struct NoDocxSupport;

#[cfg(not(feature = "docx"))]
impl DocumentBackend for NoDocxSupport {
    fn open(
        &self,
        _path: &std::path::Path,
    ) -> Result<docxtext_core::Document, docxtext_core::BackendError> {
        Err(docxtext_core::BackendError::Format(
            ".docx support not compiled in (enable the `docx` feature of docxtext-ingest)".into(),
        ))
    }
}
