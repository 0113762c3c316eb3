use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use docxtext_core::{Document, DocumentBackend, Reader, ReaderError, Records};

use crate::locate::{LocateOptions, locate_files};

/// Extracts text from MS Word .docx files to use for pretraining.
///
/// Each [`read`](Reader::read) call processes one file: either one record
/// holding the whole document (paragraphs joined by newlines) or, with
/// `output_paragraphs`, one record per paragraph tagged with its index. A
/// file that fails to open yields a single absent record and the reader moves
/// on to the next file.
pub struct DocxPretrainReader {
    source: Vec<String>,
    source_list: Vec<PathBuf>,
    output_paragraphs: bool,
    backend: Box<dyn DocumentBackend>,
    inputs: VecDeque<PathBuf>,
    current_input: Option<PathBuf>,
    current_doc: Option<Document>,
}

impl DocxPretrainReader {
    pub const NAME: &'static str = "from-docx-pt";
    pub const DESCRIPTION: &'static str =
        "Extracts text from MS Word .docx files to use for pretraining.";

    /// `source` holds file paths or glob patterns, `source_list` text files
    /// listing further paths.
    pub fn new(source: Vec<String>, source_list: Vec<PathBuf>) -> Self {
        Self {
            source,
            source_list,
            output_paragraphs: false,
            backend: crate::default_backend(),
            inputs: VecDeque::new(),
            current_input: None,
            current_doc: None,
        }
    }

    /// Emit one record per paragraph instead of one per document.
    pub fn with_output_paragraphs(mut self, output_paragraphs: bool) -> Self {
        self.output_paragraphs = output_paragraphs;
        self
    }

    pub fn with_backend(mut self, backend: impl DocumentBackend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    pub fn output_paragraphs(&self) -> bool {
        self.output_paragraphs
    }

    /// The file being (or last) processed, until the next `finalize()`.
    pub fn current_input(&self) -> Option<&Path> {
        self.current_input.as_deref()
    }

    /// Files still waiting in the queue.
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl Reader for DocxPretrainReader {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    fn initialize(&mut self) -> Result<(), ReaderError> {
        let files = locate_files(
            &self.source,
            &self.source_list,
            LocateOptions {
                fail_if_empty: true,
            },
        )
        .map_err(|e| ReaderError::Configuration(e.to_string()))?;

        tracing::debug!(files = files.len(), "located input files");

        self.inputs = files.into();
        self.current_input = None;
        self.current_doc = None;
        Ok(())
    }

    fn read(&mut self) -> Records {
        self.finalize();

        let Some(path) = self.inputs.pop_front() else {
            tracing::debug!("no inputs left to read");
            return Records::empty();
        };
        let file = path.to_string_lossy().into_owned();
        tracing::info!(path = %path.display(), "Reading from: {}", file);
        self.current_input = Some(path.clone());

        match self.backend.open(&path) {
            Ok(doc) => {
                let doc = self.current_doc.insert(doc);
                let records = if self.output_paragraphs {
                    Records::paragraphs(file, std::mem::take(&mut doc.paragraphs))
                } else {
                    Records::document(file, doc.text())
                };
                self.current_doc = None;
                records
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to read from: {}", file);
                self.current_doc = None;
                Records::failed(file)
            }
        }
    }

    fn has_finished(&self) -> bool {
        self.inputs.is_empty() && self.current_doc.is_none()
    }

    fn finalize(&mut self) {
        if let Some(path) = self.current_input.take() {
            tracing::trace!(path = %path.display(), "released input");
            self.current_doc = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use docxtext_core::BackendError;

    use super::*;

    /// Backend serving canned paragraphs by file name; unknown names fail.
    struct CannedBackend(HashMap<String, Vec<String>>);

    impl CannedBackend {
        fn new(entries: &[(&str, &[&str])]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(name, paras)| {
                        (
                            name.to_string(),
                            paras.iter().map(|p| p.to_string()).collect(),
                        )
                    })
                    .collect(),
            )
        }
    }

    impl DocumentBackend for CannedBackend {
        fn open(&self, path: &Path) -> Result<Document, BackendError> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            self.0
                .get(&name)
                .map(|paras| Document::new(path, paras.clone()))
                .ok_or_else(|| BackendError::Open(format!("cannot open {}", name)))
        }
    }

    fn setup(names: &[&str]) -> (tempfile::TempDir, Vec<String>) {
        let dir = tempfile::tempdir().unwrap();
        let paths = names
            .iter()
            .map(|n| {
                let p = dir.path().join(n);
                std::fs::write(&p, b"").unwrap();
                p.display().to_string()
            })
            .collect();
        (dir, paths)
    }

    fn abc_backend() -> CannedBackend {
        CannedBackend::new(&[("abc.docx", &["A", "B", "C"][..]), ("d.docx", &["D"][..])])
    }

    #[test]
    fn whole_document_yields_one_joined_record() {
        let (_dir, paths) = setup(&["abc.docx"]);
        let mut reader = DocxPretrainReader::new(paths.clone(), vec![]).with_backend(abc_backend());
        reader.initialize().unwrap();

        let records: Vec<_> = reader.read().collect();
        assert_eq!(records.len(), 1);
        let record = records[0].as_ref().unwrap();
        assert_eq!(record.content(), "A\nB\nC");
        assert_eq!(record.file(), Some(paths[0].as_str()));
        assert_eq!(record.meta().len(), 1);
        assert!(reader.has_finished());
    }

    #[test]
    fn paragraph_mode_yields_indexed_records() {
        let (_dir, paths) = setup(&["abc.docx"]);
        let mut reader = DocxPretrainReader::new(paths.clone(), vec![])
            .with_output_paragraphs(true)
            .with_backend(abc_backend());
        reader.initialize().unwrap();

        let records: Vec<_> = reader.read().map(|r| r.unwrap()).collect();
        let contents: Vec<_> = records.iter().map(|r| r.content()).collect();
        let indices: Vec<_> = records.iter().map(|r| r.paragraph()).collect();
        assert_eq!(contents, vec!["A", "B", "C"]);
        assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);
        assert!(records.iter().all(|r| r.file() == Some(paths[0].as_str())));
    }

    #[test]
    fn failed_file_yields_absent_record_and_reader_advances() {
        let (_dir, paths) = setup(&["broken.docx", "d.docx"]);
        let mut reader = DocxPretrainReader::new(paths.clone(), vec![]).with_backend(abc_backend());
        reader.initialize().unwrap();

        let first: Vec<_> = reader.read().collect();
        assert_eq!(first.len(), 1);
        assert!(first[0].is_none());
        assert!(!reader.has_finished());

        let second: Vec<_> = reader.read().collect();
        assert_eq!(second[0].as_ref().unwrap().content(), "D");
        assert_eq!(reader.current_input(), Some(Path::new(&paths[1])));
        assert!(reader.has_finished());
    }

    #[test]
    fn has_finished_only_after_every_file() {
        let (_dir, paths) = setup(&["abc.docx", "d.docx", "broken.docx"]);
        let mut reader = DocxPretrainReader::new(paths, vec![]).with_backend(abc_backend());
        reader.initialize().unwrap();

        let mut reads = 0;
        while !reader.has_finished() {
            assert_eq!(reader.remaining(), 3 - reads);
            reader.read().for_each(drop);
            reads += 1;
        }
        assert_eq!(reads, 3);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn initialize_without_files_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = DocxPretrainReader::new(
            vec![format!("{}/*.docx", dir.path().display())],
            vec![],
        )
        .with_backend(abc_backend());
        assert!(matches!(
            reader.initialize(),
            Err(ReaderError::Configuration(_))
        ));
    }

    #[test]
    fn finalize_is_idempotent() {
        let (_dir, paths) = setup(&["d.docx"]);
        let mut reader = DocxPretrainReader::new(paths, vec![]).with_backend(abc_backend());

        reader.finalize();
        reader.initialize().unwrap();
        reader.finalize();
        reader.finalize();
        assert_eq!(reader.remaining(), 1);
        assert!(reader.current_input().is_none());
        assert!(!reader.has_finished());

        reader.read().for_each(drop);
        assert!(reader.current_input().is_some());
        reader.finalize();
        reader.finalize();
        assert!(reader.current_input().is_none());
        assert!(reader.has_finished());
    }

    #[test]
    fn read_past_the_end_yields_nothing() {
        let (_dir, paths) = setup(&["d.docx"]);
        let mut reader = DocxPretrainReader::new(paths, vec![]).with_backend(abc_backend());
        reader.initialize().unwrap();
        reader.read().for_each(drop);
        assert_eq!(reader.read().count(), 0);
        assert!(reader.has_finished());
    }

    #[test]
    fn name_and_description() {
        let reader = DocxPretrainReader::new(vec![], vec![]);
        assert_eq!(reader.name(), "from-docx-pt");
        assert!(reader.description().contains(".docx"));
        assert!(!reader.output_paragraphs());
    }
}
