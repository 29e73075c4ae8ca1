use std::io::Read;

use flate2::read::DeflateDecoder;

use crate::error::{Error, Result};

use super::parser::{local_header_len, slice_checked};
use super::structures::{ArchiveDescriptor, CompressionMethod, ZipFileEntry};

/// Read one entry's decompressed bytes.
///
/// # Errors
///
/// [`Error::EntryNotFound`] if `name` is absent from the descriptor,
/// [`Error::UnsupportedCompression`] for any method other than
/// stored/deflate, [`Error::MalformedArchive`] if the payload lies outside
/// the buffer or the deflate stream is corrupt.
pub fn read_entry_bytes(
    archive: &[u8],
    descriptor: &ArchiveDescriptor,
    name: &str,
) -> Result<Vec<u8>> {
    let entry = descriptor
        .entry(name)
        .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
    decompress_entry(archive, entry)
}

/// Read one entry as text, decoding leniently as UTF-8.
///
/// OOXML producers always emit valid UTF-8 XML, so lossy decoding only
/// matters for archives that were never valid documents to begin with.
pub fn read_entry_text(
    archive: &[u8],
    descriptor: &ArchiveDescriptor,
    name: &str,
) -> Result<String> {
    let bytes = read_entry_bytes(archive, descriptor, name)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Slice an entry's compressed payload: it begins immediately after the
/// local header's variable-length fields.
pub(crate) fn compressed_payload<'a>(
    archive: &'a [u8],
    entry: &ZipFileEntry,
) -> Result<&'a [u8]> {
    let header_len = local_header_len(archive, entry)?;
    slice_checked(
        archive,
        entry.lfh_offset as usize + header_len,
        entry.compressed_size as usize,
    )
}

pub(crate) fn decompress_entry(archive: &[u8], entry: &ZipFileEntry) -> Result<Vec<u8>> {
    let payload = compressed_payload(archive, entry)?;

    match entry.compression_method {
        CompressionMethod::Stored => Ok(payload.to_vec()),
        CompressionMethod::Deflate => {
            // ZIP payloads are raw DEFLATE streams, no zlib/gzip wrapper.
            let mut decoded = Vec::with_capacity(entry.uncompressed_size as usize);
            DeflateDecoder::new(payload)
                .read_to_end(&mut decoded)
                .map_err(|e| {
                    Error::MalformedArchive(format!(
                        "corrupt deflate stream in {}: {e}",
                        entry.file_name
                    ))
                })?;
            log::trace!(
                "inflated {}: {} -> {} bytes",
                entry.file_name,
                entry.compressed_size,
                decoded.len()
            );
            Ok(decoded)
        }
        CompressionMethod::Unknown(method) => Err(Error::UnsupportedCompression(method)),
    }
}
