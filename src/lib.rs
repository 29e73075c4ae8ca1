//! # docxfill
//!
//! Fill DOCX templates by replacing `word/document.xml` inside the ZIP
//! container while leaving every other byte untouched.
//!
//! OOXML documents are ZIP archives whose local file headers, central
//! directory, and end-of-central-directory record carry offsets, sizes,
//! and CRC-32 checksums that must stay internally consistent after any
//! entry's content changes size. This crate parses that structural
//! metadata once, decompresses and recompresses exactly one entry, and
//! rewrites the dependent metadata - nothing else. Non-target entries are
//! copied bit-for-bit, so a filled document is byte-identical to its
//! template except for the replaced body and the offsets/sizes/checksums
//! that structurally had to follow.
//!
//! ## Features
//!
//! - Read the document body XML out of a `.docx` buffer
//! - Replace the body with new XML, preserving all other entries exactly
//! - Fill `{{placeholder}}` tokens with XML-escaped values in one call
//! - Typed errors: a malformed result is worse than no result for a legal
//!   document, so every failure aborts before any output exists
//!
//! ## Example
//!
//! ```no_run
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let template = std::fs::read("right_to_represent.docx")?;
//!
//!     let filled = docxfill::fill_document_xml(
//!         &template,
//!         &[
//!             ("candidate_name", "Ada Lovelace"),
//!             ("organization", "Analytical Engines Ltd."),
//!             ("rate", "$120/hr"),
//!         ],
//!     )?;
//!
//!     std::fs::write("filled.docx", filled)?;
//!     Ok(())
//! }
//! ```
//!
//! The lower-level container operations are exported from [`zip`] for
//! callers that work with entries other than the document body.

pub mod docx;
pub mod error;
pub mod template;
pub mod zip;

pub use docx::{DOCUMENT_XML_PATH, fill_document_xml, read_document_xml, replace_document_xml};
pub use error::{Error, Result};
pub use zip::{ArchiveDescriptor, ZipFileEntry, parse_archive, read_entry_text, replace_entry};
