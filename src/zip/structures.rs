use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Write};

use crate::error::{Error, Result};

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::MalformedArchive(
                "end of central directory record truncated".into(),
            ));
        }

        // Verify signature
        if &data[0..4] != Self::SIGNATURE {
            return Err(Error::MalformedArchive(
                "end of central directory signature missing".into(),
            ));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    /// Serialize the 22 fixed bytes (signature included, comment excluded).
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(Self::SIGNATURE)?;
        out.write_u16::<LittleEndian>(self.disk_number)?;
        out.write_u16::<LittleEndian>(self.disk_with_cd)?;
        out.write_u16::<LittleEndian>(self.disk_entries)?;
        out.write_u16::<LittleEndian>(self.total_entries)?;
        out.write_u32::<LittleEndian>(self.cd_size)?;
        out.write_u32::<LittleEndian>(self.cd_offset)?;
        out.write_u16::<LittleEndian>(self.comment_len)?;
        Ok(())
    }

    /// ZIP64 archives mark the 16/32-bit EOCD fields with all-ones values.
    /// Office documents never need ZIP64; the parser rejects these rather
    /// than misreading the 32-bit fields.
    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }
}

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// One entry from the central directory.
///
/// Carries both the parsed fields the engine computes with and the raw
/// central-record bytes, so the repacker can reproduce the directory
/// byte-for-byte and patch only the fields that structurally must change.
#[derive(Debug, Clone)]
pub struct ZipFileEntry {
    pub file_name: String,
    pub compression_method: CompressionMethod,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub crc32: u32,
    /// Offset of this entry's local file header in the source buffer.
    pub lfh_offset: u32,
    pub file_name_len: u16,
    pub extra_field_len: u16,
    pub comment_len: u16,
    /// The fixed 46-byte central directory record as read.
    pub raw_header: Vec<u8>,
    /// File name bytes exactly as stored (not re-encoded).
    pub raw_file_name: Vec<u8>,
    /// Extra field and comment bytes, concatenated, exactly as stored.
    pub raw_extra_and_comment: Vec<u8>,
}

/// Parsed structural metadata of one archive.
///
/// Immutable value type produced by [`parse_archive`](super::parse_archive)
/// and consumed by both the read path and the write path, so offset/size
/// arithmetic lives in exactly one place. Owns no reference to the source
/// buffer; all fields are offsets and sizes into it.
#[derive(Debug, Clone)]
pub struct ArchiveDescriptor {
    /// Offset of the EOCD signature in the source buffer.
    pub eocd_offset: usize,
    pub cd_offset: u32,
    pub cd_size: u32,
    pub total_entries: u16,
    pub comment_len: u16,
    /// Entries in central-directory declaration order.
    pub entries: Vec<ZipFileEntry>,
}

impl ArchiveDescriptor {
    /// Look up an entry by exact name.
    pub fn entry(&self, name: &str) -> Option<&ZipFileEntry> {
        self.entries.iter().find(|e| e.file_name == name)
    }

    /// Index of an entry by exact name, for callers that need to identify
    /// the record rather than hold a borrow.
    pub(crate) fn entry_index(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.file_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_method_round_trips() {
        assert_eq!(CompressionMethod::from_u16(0), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from_u16(8), CompressionMethod::Deflate);
        assert_eq!(
            CompressionMethod::from_u16(12),
            CompressionMethod::Unknown(12)
        );
        assert_eq!(CompressionMethod::Deflate.as_u16(), 8);
        assert_eq!(CompressionMethod::Unknown(99).as_u16(), 99);
    }

    #[test]
    fn eocd_round_trips_through_bytes() {
        let eocd = EndOfCentralDirectory {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: 3,
            total_entries: 3,
            cd_size: 0x1234,
            cd_offset: 0x5678,
            comment_len: 0,
        };
        let mut buf = Vec::new();
        eocd.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), EndOfCentralDirectory::SIZE);

        let parsed = EndOfCentralDirectory::from_bytes(&buf).unwrap();
        assert_eq!(parsed.total_entries, 3);
        assert_eq!(parsed.cd_size, 0x1234);
        assert_eq!(parsed.cd_offset, 0x5678);
        assert!(!parsed.is_zip64());
    }

    #[test]
    fn eocd_rejects_bad_signature() {
        let buf = [0u8; EndOfCentralDirectory::SIZE];
        assert!(EndOfCentralDirectory::from_bytes(&buf).is_err());
    }

    #[test]
    fn eocd_detects_zip64_markers() {
        let mut buf = Vec::new();
        EndOfCentralDirectory {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: 0xFFFF,
            total_entries: 0xFFFF,
            cd_size: 0xFFFFFFFF,
            cd_offset: 0xFFFFFFFF,
            comment_len: 0,
        }
        .write_to(&mut buf)
        .unwrap();
        assert!(EndOfCentralDirectory::from_bytes(&buf).unwrap().is_zip64());
    }
}
