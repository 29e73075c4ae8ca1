//! Low-level ZIP archive parser.
//!
//! This module handles the binary parsing of ZIP file structures from a
//! fully in-memory archive buffer.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. Read the Central Directory to get metadata for all files
//! 3. For each entry, the Local File Header locates the actual payload
//!
//! The result is an [`ArchiveDescriptor`]: one parsed snapshot of the
//! archive's structure that both the read path ([`read_entry_text`]) and
//! the write path ([`replace_entry`]) consume, so offset arithmetic is
//! never duplicated.
//!
//! [`read_entry_text`]: super::read_entry_text
//! [`replace_entry`]: super::replace_entry

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{Error, Result};

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: usize = 65535;

/// Bounds-checked slice of the archive buffer.
///
/// Every offset and length read from the format goes through here before
/// being dereferenced; offsets from a corrupted or hand-edited archive must
/// never cause an out-of-bounds read.
pub(crate) fn slice_checked(archive: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset.checked_add(len).ok_or_else(|| {
        Error::MalformedArchive(format!("offset overflow at {offset} + {len}"))
    })?;
    archive.get(offset..end).ok_or_else(|| {
        Error::MalformedArchive(format!(
            "range {offset}..{end} exceeds archive size {}",
            archive.len()
        ))
    })
}

/// Parse an archive's structural metadata.
///
/// Scans backward for the EOCD record, validates it, and walks the central
/// directory into an ordered entry list. Pure function over the input
/// buffer; nothing is decompressed.
///
/// # Errors
///
/// Returns [`Error::MalformedArchive`] if the EOCD signature is absent from
/// the trailer window, the central directory does not sit immediately
/// before the EOCD, a record signature is wrong, a record runs past the
/// directory bounds, or the walked entry count disagrees with the EOCD's
/// declared count. ZIP64 archives are rejected rather than misread.
pub fn parse_archive(archive: &[u8]) -> Result<ArchiveDescriptor> {
    let eocd_offset = find_eocd_offset(archive)?;
    let eocd = EndOfCentralDirectory::from_bytes(&archive[eocd_offset..])?;

    if eocd.is_zip64() {
        return Err(Error::MalformedArchive(
            "zip64 archives are not supported".into(),
        ));
    }

    // The trailing comment must actually be present in the buffer; the
    // repacker copies it verbatim later.
    slice_checked(
        archive,
        eocd_offset + EndOfCentralDirectory::SIZE,
        eocd.comment_len as usize,
    )?;

    let cd_offset = eocd.cd_offset as usize;
    let cd_size = eocd.cd_size as usize;

    // For a well-formed, non-split archive the central directory ends
    // exactly where the EOCD begins. This also guarantees the directory
    // lies inside the buffer.
    if cd_offset.checked_add(cd_size) != Some(eocd_offset) {
        return Err(Error::MalformedArchive(format!(
            "central directory at {cd_offset}+{cd_size} does not abut EOCD at {eocd_offset}"
        )));
    }

    let cd = &archive[cd_offset..cd_offset + cd_size];
    let mut entries = Vec::with_capacity(eocd.total_entries as usize);
    let mut pos = 0usize;

    for _ in 0..eocd.total_entries {
        let (entry, next) = parse_cdfh(cd, pos)?;
        pos = next;
        entries.push(entry);
    }

    // Guards against truncated or hand-edited archives where the declared
    // count and the records actually present disagree.
    if pos != cd.len() {
        return Err(Error::MalformedArchive(
            "central directory entry count mismatch".into(),
        ));
    }

    log::debug!(
        "parsed archive: {} entries, central directory {} bytes at offset {}",
        entries.len(),
        cd_size,
        cd_offset
    );

    Ok(ArchiveDescriptor {
        eocd_offset,
        cd_offset: eocd.cd_offset,
        cd_size: eocd.cd_size,
        total_entries: eocd.total_entries,
        comment_len: eocd.comment_len,
        entries,
    })
}

/// Find the EOCD signature by backward scan.
///
/// The EOCD sits at EOF-22 unless a trailing comment (up to 65535 bytes)
/// pushes it earlier, so the scan covers the trailing
/// `min(len, 65557)` bytes. The first match scanning backward wins; a
/// comment crafted to embed a fake earlier EOCD is out of scope, as this
/// is not a security boundary.
fn find_eocd_offset(archive: &[u8]) -> Result<usize> {
    if archive.len() < EndOfCentralDirectory::SIZE {
        return Err(Error::MalformedArchive(
            "buffer too small to hold an archive".into(),
        ));
    }

    let scan_floor = archive
        .len()
        .saturating_sub(MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE);

    for i in (scan_floor..=archive.len() - EndOfCentralDirectory::SIZE).rev() {
        if &archive[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
            return Ok(i);
        }
    }

    Err(Error::MalformedArchive(
        "no end of central directory signature in trailer".into(),
    ))
}

/// Parse one Central Directory File Header at `pos` within the directory
/// slice. Returns the entry and the offset of the next record.
fn parse_cdfh(cd: &[u8], pos: usize) -> Result<(ZipFileEntry, usize)> {
    if pos + CDFH_MIN_SIZE > cd.len() {
        return Err(Error::MalformedArchive(
            "central directory truncated mid-record".into(),
        ));
    }

    let record = &cd[pos..];

    // Read and verify the signature (PK\x01\x02)
    if &record[0..4] != CDFH_SIGNATURE {
        return Err(Error::MalformedArchive(
            "central directory record signature missing".into(),
        ));
    }

    // Read fixed-size header fields
    let mut cursor = Cursor::new(&record[4..CDFH_MIN_SIZE]);
    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let _flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let compressed_size = cursor.read_u32::<LittleEndian>()?;
    let uncompressed_size = cursor.read_u32::<LittleEndian>()?;
    let file_name_len = cursor.read_u16::<LittleEndian>()?;
    let extra_field_len = cursor.read_u16::<LittleEndian>()?;
    let comment_len = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let lfh_offset = cursor.read_u32::<LittleEndian>()?;

    let name_end = pos + CDFH_MIN_SIZE + file_name_len as usize;
    let record_end =
        name_end + extra_field_len as usize + comment_len as usize;
    if record_end > cd.len() {
        return Err(Error::MalformedArchive(
            "central directory record runs past directory end".into(),
        ));
    }

    // Capture the raw bytes alongside the parsed fields: the repacker
    // reproduces the directory from these, patching only offset/size/crc.
    let raw_header = cd[pos..pos + CDFH_MIN_SIZE].to_vec();
    let raw_file_name = cd[pos + CDFH_MIN_SIZE..name_end].to_vec();
    let raw_extra_and_comment = cd[name_end..record_end].to_vec();

    // Use lossy conversion to handle non-UTF8 filenames gracefully
    let file_name = String::from_utf8_lossy(&raw_file_name).into_owned();

    let entry = ZipFileEntry {
        file_name,
        compression_method: CompressionMethod::from_u16(compression_method),
        compressed_size,
        uncompressed_size,
        crc32,
        lfh_offset,
        file_name_len,
        extra_field_len,
        comment_len,
        raw_header,
        raw_file_name,
        raw_extra_and_comment,
    };

    Ok((entry, record_end))
}

/// Length of an entry's local file header: the fixed 30 bytes plus the
/// header's own trailing filename and extra fields.
///
/// The local header's copies of the variable-field lengths are
/// authoritative here; producers may store a different extra field in the
/// local header than in the central directory, so the central directory's
/// lengths must not be trusted for payload arithmetic.
///
/// # Errors
///
/// Returns [`Error::MalformedArchive`] if the recorded offset does not
/// point at a local header signature or the header lies outside the buffer.
pub fn local_header_len(archive: &[u8], entry: &ZipFileEntry) -> Result<usize> {
    let header = slice_checked(archive, entry.lfh_offset as usize, LFH_SIZE)?;

    // Verify LFH signature (PK\x03\x04)
    if &header[0..4] != LFH_SIGNATURE {
        return Err(Error::MalformedArchive(format!(
            "no local file header at offset {} for {}",
            entry.lfh_offset, entry.file_name
        )));
    }

    // Filename and extra lengths sit at offsets 26 and 28 of the LFH
    let mut cursor = Cursor::new(&header[26..30]);
    let file_name_len = cursor.read_u16::<LittleEndian>()? as usize;
    let extra_field_len = cursor.read_u16::<LittleEndian>()? as usize;

    Ok(LFH_SIZE + file_name_len + extra_field_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_buffer_without_eocd() {
        let garbage = vec![0xABu8; 128];
        match parse_archive(&garbage) {
            Err(Error::MalformedArchive(_)) => {}
            other => panic!("expected MalformedArchive, got {other:?}"),
        }
    }

    #[test]
    fn rejects_tiny_buffer() {
        assert!(parse_archive(b"PK").is_err());
    }

    #[test]
    fn parses_empty_archive() {
        // A valid archive with zero entries: just an EOCD.
        let mut buf = Vec::new();
        EndOfCentralDirectory {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: 0,
            total_entries: 0,
            cd_size: 0,
            cd_offset: 0,
            comment_len: 0,
        }
        .write_to(&mut buf)
        .unwrap();

        let desc = parse_archive(&buf).unwrap();
        assert_eq!(desc.entries.len(), 0);
        assert_eq!(desc.eocd_offset, 0);
    }

    #[test]
    fn finds_eocd_behind_trailing_comment() {
        let comment = b"generated by docxfill tests";
        let mut buf = Vec::new();
        EndOfCentralDirectory {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: 0,
            total_entries: 0,
            cd_size: 0,
            cd_offset: 0,
            comment_len: comment.len() as u16,
        }
        .write_to(&mut buf)
        .unwrap();
        buf.extend_from_slice(comment);

        let desc = parse_archive(&buf).unwrap();
        assert_eq!(desc.eocd_offset, 0);
        assert_eq!(desc.comment_len as usize, comment.len());
    }

    #[test]
    fn rejects_comment_len_past_buffer_end() {
        let mut buf = Vec::new();
        EndOfCentralDirectory {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: 0,
            total_entries: 0,
            cd_size: 0,
            cd_offset: 0,
            comment_len: 400,
        }
        .write_to(&mut buf)
        .unwrap();
        // Comment bytes absent entirely.
        assert!(parse_archive(&buf).is_err());
    }

    #[test]
    fn rejects_zip64_markers() {
        let mut buf = Vec::new();
        EndOfCentralDirectory {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: 0xFFFF,
            total_entries: 0xFFFF,
            cd_size: 0,
            cd_offset: 0,
            comment_len: 0,
        }
        .write_to(&mut buf)
        .unwrap();
        match parse_archive(&buf) {
            Err(Error::MalformedArchive(msg)) => assert!(msg.contains("zip64")),
            other => panic!("expected MalformedArchive, got {other:?}"),
        }
    }

    #[test]
    fn rejects_detached_central_directory() {
        // cd_offset + cd_size != eocd_offset
        let mut buf = vec![0u8; 10];
        let mut eocd = Vec::new();
        EndOfCentralDirectory {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: 0,
            total_entries: 0,
            cd_size: 0,
            cd_offset: 4,
            comment_len: 0,
        }
        .write_to(&mut eocd)
        .unwrap();
        buf.extend_from_slice(&eocd);
        match parse_archive(&buf) {
            Err(Error::MalformedArchive(msg)) => assert!(msg.contains("abut")),
            other => panic!("expected MalformedArchive, got {other:?}"),
        }
    }

    #[test]
    fn slice_checked_bounds() {
        let buf = [1u8, 2, 3, 4];
        assert_eq!(slice_checked(&buf, 1, 2).unwrap(), &[2, 3]);
        assert!(slice_checked(&buf, 3, 2).is_err());
        assert!(slice_checked(&buf, usize::MAX, 2).is_err());
    }
}
