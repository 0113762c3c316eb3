use std::path::Path;

use docxtext_core::{BackendError, Document, DocumentBackend};

pub mod package;
pub mod paragraphs;
mod xml;

pub use package::{Package, WML_DOCUMENT_MAIN};
pub use paragraphs::extract_paragraphs;

/// Office Open XML implementation of [`DocumentBackend`].
///
/// Reads the package's main document part and returns the text of each
/// body paragraph. By default the main part must be declared as a Word
/// document; macro-enabled documents, templates and other Office formats are
/// rejected the same way a Word DOM library rejects them.
pub struct DocxBackend {
    /// Require the main part's content type to be a WordprocessingML main
    /// document. Default `true`.
    check_content_type: bool,
}

impl Default for DocxBackend {
    fn default() -> Self {
        Self {
            check_content_type: true,
        }
    }
}

impl DocxBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept any main part regardless of its declared content type.
    pub fn with_content_type_check(mut self, check: bool) -> Self {
        self.check_content_type = check;
        self
    }
}

impl DocumentBackend for DocxBackend {
    fn open(&self, path: &Path) -> Result<Document, BackendError> {
        let mut package = Package::open(path)?;
        let xml = package.main_document_xml(self.check_content_type)?;
        let paragraphs = extract_paragraphs(&xml)?;

        tracing::debug!(
            path = %path.display(),
            paragraphs = paragraphs.len(),
            "parsed document"
        );

        Ok(Document::new(path, paragraphs))
    }
}
