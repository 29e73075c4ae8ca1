//! DOCX document body operations.
//!
//! A `.docx` file is a ZIP container whose main body lives in the
//! `word/document.xml` entry. These functions wire the generic container
//! engine to that one entry: read the body XML, replace it, or fill its
//! placeholders in one call.

use crate::error::Result;
use crate::template;
use crate::zip::{parse_archive, read_entry_text, replace_entry};

/// Path of the document body inside a `.docx` container.
pub const DOCUMENT_XML_PATH: &str = "word/document.xml";

/// Read the document body XML from a `.docx` buffer.
///
/// # Errors
///
/// [`Error::EntryNotFound`](crate::Error::EntryNotFound) if the archive has
/// no `word/document.xml` - i.e., the file is not a DOCX.
pub fn read_document_xml(docx: &[u8]) -> Result<String> {
    let descriptor = parse_archive(docx)?;
    read_entry_text(docx, &descriptor, DOCUMENT_XML_PATH)
}

/// Produce a new `.docx` buffer with the document body replaced by
/// `new_xml`. Every byte outside the body entry and the metadata that
/// depends on it is preserved exactly.
pub fn replace_document_xml(docx: &[u8], new_xml: &str) -> Result<Vec<u8>> {
    let descriptor = parse_archive(docx)?;
    replace_entry(docx, &descriptor, DOCUMENT_XML_PATH, new_xml)
}

/// Fill a `.docx` template: extract the body XML, substitute `{{key}}`
/// placeholders with XML-escaped values, and repack.
///
/// One parse serves both the read and the write path.
pub fn fill_document_xml(docx: &[u8], values: &[(&str, &str)]) -> Result<Vec<u8>> {
    let descriptor = parse_archive(docx)?;
    let body = read_entry_text(docx, &descriptor, DOCUMENT_XML_PATH)?;
    let filled = template::render(&body, values);
    log::debug!(
        "filled document body: {} placeholders requested, {} -> {} chars",
        values.len(),
        body.len(),
        filled.len()
    );
    replace_entry(docx, &descriptor, DOCUMENT_XML_PATH, &filled)
}
