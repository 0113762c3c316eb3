//! Minimal Open Packaging Conventions access: a ZIP archive whose package
//! relationships point at the main document part and whose
//! `[Content_Types].xml` declares each part's media type.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;
use zip::result::ZipError;

use docxtext_core::BackendError;

use crate::xml::{attr_value, xml_error};

/// Content type of a WordprocessingML main document part.
pub const WML_DOCUMENT_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const PACKAGE_RELS_PART: &str = "_rels/.rels";
const OFFICE_DOCUMENT_REL_SUFFIX: &str = "/officeDocument";
const DEFAULT_MAIN_PART: &str = "word/document.xml";

pub struct Package<R> {
    archive: ZipArchive<R>,
}

impl Package<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        let file = File::open(path)
            .map_err(|e| BackendError::Open(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> Package<R> {
    pub fn from_reader(reader: R) -> Result<Self, BackendError> {
        let archive = ZipArchive::new(reader)
            .map_err(|e| BackendError::Open(format!("not a ZIP package: {}", e)))?;
        Ok(Self { archive })
    }

    /// Read a part as UTF-8 text. Returns `None` if the part doesn't exist.
    pub fn read_part(&mut self, name: &str) -> Result<Option<String>, BackendError> {
        let mut part = match self.archive.by_name(name) {
            Ok(part) => part,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(BackendError::Open(format!(
                    "failed to read part {}: {}",
                    name, e
                )));
            }
        };
        let mut content = String::new();
        part.read_to_string(&mut content)?;
        Ok(Some(content))
    }

    /// Name of the main document part, from the package relationships.
    ///
    /// Falls back to `word/document.xml` when the package has no
    /// relationships part or no `officeDocument` relationship.
    pub fn main_part_name(&mut self) -> Result<String, BackendError> {
        let Some(rels) = self.read_part(PACKAGE_RELS_PART)? else {
            tracing::debug!("package has no {}, assuming {}", PACKAGE_RELS_PART, DEFAULT_MAIN_PART);
            return Ok(DEFAULT_MAIN_PART.to_string());
        };
        Ok(office_document_target(&rels)?.unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()))
    }

    /// Content type declared for `part_name` in `[Content_Types].xml`.
    pub fn content_type(&mut self, part_name: &str) -> Result<Option<String>, BackendError> {
        let types = self.read_part(CONTENT_TYPES_PART)?.ok_or_else(|| {
            BackendError::Format(format!("package has no {}", CONTENT_TYPES_PART))
        })?;
        lookup_content_type(&types, part_name)
    }

    /// XML of the main document part. When `check_content_type` is set, the
    /// part must be declared as a WordprocessingML main document.
    pub fn main_document_xml(&mut self, check_content_type: bool) -> Result<String, BackendError> {
        let part_name = self.main_part_name()?;

        if check_content_type {
            let content_type = self.content_type(&part_name)?.unwrap_or_default();
            if content_type != WML_DOCUMENT_MAIN {
                return Err(BackendError::Format(format!(
                    "not a Word file, content type is '{}'",
                    content_type
                )));
            }
        }

        self.read_part(&part_name)?.ok_or_else(|| {
            BackendError::Format(format!("main document part {} is missing", part_name))
        })
    }
}

/// Normalize a relationship target or part name to a ZIP entry name.
fn entry_name(target: &str) -> &str {
    target.trim_start_matches("./").trim_start_matches('/')
}

fn office_document_target(rels_xml: &str) -> Result<Option<String>, BackendError> {
    let mut reader = Reader::from_str(rels_xml);
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let is_office_document = attr_value(&e, b"Type")?
                    .is_some_and(|t| t.ends_with(OFFICE_DOCUMENT_REL_SUFFIX));
                if is_office_document {
                    return Ok(attr_value(&e, b"Target")?.map(|t| entry_name(&t).to_string()));
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn lookup_content_type(types_xml: &str, part_name: &str) -> Result<Option<String>, BackendError> {
    let wanted = entry_name(part_name);
    let extension = wanted.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");

    let mut default = None;
    let mut reader = Reader::from_str(types_xml);
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                // Overrides win over defaults regardless of order
                b"Override" => {
                    let matches = attr_value(&e, b"PartName")?
                        .is_some_and(|p| entry_name(&p).eq_ignore_ascii_case(wanted));
                    if matches {
                        return attr_value(&e, b"ContentType");
                    }
                }
                b"Default" if default.is_none() => {
                    let matches = attr_value(&e, b"Extension")?
                        .is_some_and(|x| x.eq_ignore_ascii_case(extension));
                    if matches {
                        default = attr_value(&e, b"ContentType")?;
                    }
                }
                _ => {}
            },
            Event::Eof => return Ok(default),
            _ => {}
        }
    }
}
