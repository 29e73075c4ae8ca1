//! ZIP container parsing and selective entry replacement.
//!
//! This module implements the container half of DOCX filling: reading one
//! entry out of a ZIP archive and writing a new archive with that one
//! entry's content swapped, all other bytes untouched.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements
//!   (EOCD, entry descriptors, signatures)
//! - [`parser`]: Low-level parsing of ZIP structures from the raw buffer
//! - [`extractor`]: The read path - decompress one named entry
//! - [`repacker`]: The write path - re-serialize with one entry replaced
//! - [`crc`]: Table-driven CRC-32 used when entry content changes
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! All metadata is trailer-anchored: the EOCD is found by backward scan,
//! it locates the Central Directory, and the directory's records locate
//! each local header. Replacing one entry's content changes its sizes and
//! checksum, which cascades into every later entry's recorded offset -
//! the repacker exists to rewrite exactly that dependent metadata and
//! nothing else.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - STORED (no compression) method
//! - DEFLATE compression method
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk or ZIP64 archive support (rejected, never misparsed)
//! - No entry addition or removal - content replacement only

mod crc;
mod extractor;
mod parser;
mod repacker;
mod structures;

pub use crc::{crc32, crc32_seeded};
pub use extractor::{read_entry_bytes, read_entry_text};
pub use parser::{local_header_len, parse_archive};
pub use repacker::replace_entry;
pub use structures::*;
