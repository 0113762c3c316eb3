use quick_xml::escape::unescape;
use quick_xml::events::BytesStart;

use docxtext_core::BackendError;

pub(crate) fn xml_error(err: impl std::fmt::Display) -> BackendError {
    BackendError::Xml(err.to_string())
}

/// Value of the attribute whose local name is `local`, ignoring its prefix.
pub(crate) fn attr_value(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>, BackendError> {
    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.local_name().as_ref() == local {
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw).map_err(xml_error)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
