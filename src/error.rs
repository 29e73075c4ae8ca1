//! Error types for DOCX container processing.
//!
//! Every failure is terminal for the current operation: the engine never
//! produces a partially rewritten archive, so callers either get a complete
//! output buffer or one of these errors.

/// Errors produced while parsing, reading, or rewriting a DOCX container.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The archive's structural metadata is invalid or inconsistent:
    /// missing EOCD record, central directory entry count mismatch,
    /// bad record signature, out-of-bounds offsets, or a corrupt
    /// deflate stream.
    #[error("malformed archive: {0}")]
    MalformedArchive(String),

    /// The requested entry name does not exist in the archive
    /// (e.g., asking for `word/document.xml` in a file that is not a DOCX).
    #[error("entry not found in archive: {0}")]
    EntryNotFound(String),

    /// An entry uses a compression method other than stored (0) or
    /// deflate (8). The engine fails rather than guessing.
    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
