use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use docxtext_core::BackendError;

use crate::xml::{attr_value, xml_error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Body,
    Paragraph,
    Hyperlink,
    Run,
    Text,
    Other,
}

impl Tag {
    fn of(e: &BytesStart<'_>) -> Self {
        match e.local_name().as_ref() {
            b"body" => Tag::Body,
            b"p" => Tag::Paragraph,
            b"hyperlink" => Tag::Hyperlink,
            b"r" => Tag::Run,
            b"t" => Tag::Text,
            _ => Tag::Other,
        }
    }
}

/// Open-element stack, used to decide which text belongs to a body paragraph.
struct Scope(Vec<Tag>);

impl Scope {
    fn ends_with(&self, suffix: &[Tag]) -> bool {
        self.0.ends_with(suffix)
    }

    /// Directly inside `w:body`.
    fn at_body(&self) -> bool {
        self.0.last() == Some(&Tag::Body)
    }

    /// Inside a run that contributes to a body paragraph: a direct child run,
    /// or a run of a direct child hyperlink.
    fn in_paragraph_run(&self) -> bool {
        self.ends_with(&[Tag::Body, Tag::Paragraph, Tag::Run])
            || self.ends_with(&[Tag::Body, Tag::Paragraph, Tag::Hyperlink, Tag::Run])
    }

    fn in_paragraph_text(&self) -> bool {
        self.ends_with(&[Tag::Body, Tag::Paragraph, Tag::Run, Tag::Text])
            || self.ends_with(&[Tag::Body, Tag::Paragraph, Tag::Hyperlink, Tag::Run, Tag::Text])
    }
}

/// Text contributed by a non-`w:t` run child such as `w:tab` or `w:br`.
fn run_child_text(e: &BytesStart<'_>) -> Result<Option<&'static str>, BackendError> {
    let text = match e.local_name().as_ref() {
        b"tab" | b"ptab" => Some("\t"),
        b"cr" => Some("\n"),
        b"noBreakHyphen" => Some("-"),
        b"br" => match attr_value(e, b"type")?.as_deref() {
            None | Some("textWrapping") => Some("\n"),
            _ => None,
        },
        _ => None,
    };
    Ok(text)
}

/// Extract the text of each body paragraph from a WordprocessingML main
/// document part, in document order.
///
/// Only `w:p` elements that are direct children of `w:body` count; paragraphs
/// in tables, text boxes and content controls are skipped. Empty paragraphs
/// are kept as empty strings.
pub fn extract_paragraphs(xml: &str) -> Result<Vec<String>, BackendError> {
    let mut reader = Reader::from_str(xml);

    let mut scope = Scope(Vec::new());
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            BackendError::Xml(format!(
                "error at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => {
                let tag = Tag::of(&e);
                if tag == Tag::Paragraph && scope.at_body() {
                    current = Some(String::new());
                } else if tag == Tag::Other && scope.in_paragraph_run() {
                    if let (Some(text), Some(buf)) = (run_child_text(&e)?, current.as_mut()) {
                        buf.push_str(text);
                    }
                }
                scope.0.push(tag);
            }
            Event::Empty(e) => {
                let tag = Tag::of(&e);
                if tag == Tag::Paragraph && scope.at_body() {
                    paragraphs.push(String::new());
                } else if tag == Tag::Other && scope.in_paragraph_run() {
                    if let (Some(text), Some(buf)) = (run_child_text(&e)?, current.as_mut()) {
                        buf.push_str(text);
                    }
                }
            }
            Event::Text(e) if scope.in_paragraph_text() => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&e.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(e) if scope.in_paragraph_text() => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                let closed = scope.0.pop();
                if closed == Some(Tag::Paragraph) && scope.at_body() {
                    if let Some(text) = current.take() {
                        paragraphs.push(text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !scope.0.is_empty() {
        return Err(BackendError::Xml("unexpected end of document".to_string()));
    }

    Ok(paragraphs)
}
