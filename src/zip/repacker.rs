//! Selective entry replacement.
//!
//! Re-serializes an archive with exactly one entry's content swapped.
//! Every other entry's local header and compressed payload are copied
//! byte-for-byte from the source; the central directory is rebuilt from
//! the captured raw records with only the structurally necessary fields
//! patched (local-header offsets for everyone, crc/sizes for the target),
//! and a fresh EOCD closes the archive.
//!
//! The whole output is constructed in memory and returned atomically: a
//! failure anywhere leaves no partial archive behind, which matters when
//! the result is a legal document.

use byteorder::{ByteOrder, LittleEndian};
use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;

use crate::error::{Error, Result};

use super::crc::crc32;
use super::parser::{local_header_len, slice_checked};
use super::structures::{ArchiveDescriptor, CompressionMethod, EndOfCentralDirectory};

/// Replacement content is always deflated at this fixed level, regardless
/// of how the original producer compressed the entry. Compressed bytes are
/// therefore not guaranteed to match what Word would emit for the same
/// content; decompressed content and structural validity are the
/// guarantees.
const REPLACEMENT_DEFLATE_LEVEL: u32 = 6;

/// Replace one entry's content and re-serialize the archive.
///
/// Entries are streamed in ascending local-header-offset order (physical
/// layout, which not every producer keeps aligned with central-directory
/// order), so output local headers stay contiguous while the rebuilt
/// directory preserves the original declaration order.
///
/// Adding entries is unsupported by design: this is a pure in-place
/// content swap, and a `name` that does not already exist in the archive
/// is an error.
///
/// # Errors
///
/// [`Error::EntryNotFound`] if `name` is absent;
/// [`Error::UnsupportedCompression`] if any entry - target or copied -
/// uses a method other than stored/deflate;
/// [`Error::MalformedArchive`] for structural inconsistencies discovered
/// while slicing, or if a size/offset no longer fits its 32-bit field.
pub fn replace_entry(
    archive: &[u8],
    descriptor: &ArchiveDescriptor,
    name: &str,
    new_content: &str,
) -> Result<Vec<u8>> {
    let target_idx = descriptor
        .entry_index(name)
        .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;

    // Fail before any output work if some entry uses a method the engine
    // cannot carry over.
    for entry in &descriptor.entries {
        if let CompressionMethod::Unknown(method) = entry.compression_method {
            return Err(Error::UnsupportedCompression(method));
        }
    }

    let new_uncompressed = new_content.as_bytes();
    let new_compressed = deflate_raw(new_uncompressed)?;
    let new_crc = crc32(new_uncompressed);
    let new_compressed_len = to_u32(new_compressed.len(), "compressed replacement payload")?;
    let new_uncompressed_len = to_u32(new_uncompressed.len(), "replacement payload")?;

    // Physical layout order for the streaming pass.
    let mut order: Vec<usize> = (0..descriptor.entries.len()).collect();
    order.sort_by_key(|&i| descriptor.entries[i].lfh_offset);

    let mut out = Vec::with_capacity(archive.len() + new_compressed.len());
    let mut new_offsets = vec![0u32; descriptor.entries.len()];

    for &i in &order {
        let entry = &descriptor.entries[i];
        let header_len = local_header_len(archive, entry)?;
        new_offsets[i] = to_u32(out.len(), "local header offset")?;

        if i != target_idx {
            // Verbatim copy: local header and compressed payload together.
            let chunk = slice_checked(
                archive,
                entry.lfh_offset as usize,
                header_len + entry.compressed_size as usize,
            )?;
            out.extend_from_slice(chunk);
            continue;
        }

        // The original local header with only the fields that must change
        // rewritten; the header's own filename and extra bytes ride along
        // verbatim. Sizes are known up front, so the general-purpose flag
        // word is zeroed to guarantee no data-descriptor bit survives.
        let original = slice_checked(archive, entry.lfh_offset as usize, header_len)?;
        let mut header = original.to_vec();
        LittleEndian::write_u16(&mut header[6..8], 0);
        LittleEndian::write_u32(&mut header[14..18], new_crc);
        LittleEndian::write_u32(&mut header[18..22], new_compressed_len);
        LittleEndian::write_u32(&mut header[22..26], new_uncompressed_len);
        out.extend_from_slice(&header);
        out.extend_from_slice(&new_compressed);
    }

    // Rebuild the central directory in original declaration order; readers
    // trust only the directory, and its order is part of output fidelity.
    let cd_offset = to_u32(out.len(), "central directory offset")?;
    for (i, entry) in descriptor.entries.iter().enumerate() {
        let mut record = entry.raw_header.clone();
        LittleEndian::write_u32(&mut record[42..46], new_offsets[i]);
        if i == target_idx {
            LittleEndian::write_u32(&mut record[16..20], new_crc);
            LittleEndian::write_u32(&mut record[20..24], new_compressed_len);
            LittleEndian::write_u32(&mut record[24..28], new_uncompressed_len);
        }
        out.extend_from_slice(&record);
        out.extend_from_slice(&entry.raw_file_name);
        out.extend_from_slice(&entry.raw_extra_and_comment);
    }
    let cd_size = to_u32(out.len() - cd_offset as usize, "central directory size")?;

    EndOfCentralDirectory {
        disk_number: 0,
        disk_with_cd: 0,
        disk_entries: descriptor.total_entries,
        total_entries: descriptor.total_entries,
        cd_size,
        cd_offset,
        comment_len: descriptor.comment_len,
    }
    .write_to(&mut out)?;

    // Trailing comment bytes, verbatim from the source.
    let comment = slice_checked(
        archive,
        descriptor.eocd_offset + EndOfCentralDirectory::SIZE,
        descriptor.comment_len as usize,
    )?;
    out.extend_from_slice(comment);

    log::debug!(
        "replaced {name}: {} -> {} uncompressed bytes, archive {} -> {} bytes",
        descriptor.entries[target_idx].uncompressed_size,
        new_uncompressed_len,
        archive.len(),
        out.len()
    );

    Ok(out)
}

/// Raw DEFLATE (no zlib/gzip wrapper) at the fixed replacement level.
fn deflate_raw(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(
        Vec::new(),
        Compression::new(REPLACEMENT_DEFLATE_LEVEL),
    );
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::MalformedArchive(format!("{what} exceeds the zip32 limit")))
}
