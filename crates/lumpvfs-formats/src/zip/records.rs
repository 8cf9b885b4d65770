//! Fixed-layout zip records
//!
//! All three records are little-endian and start with a 4-byte signature,
//! which binrw checks as the struct magic.

use binrw::BinRead;

/// Local file header signature (`PK\x03\x04`)
pub const LOCAL_HEADER_SIGNATURE: u32 = 0x04034b50;

/// Central directory entry signature (`PK\x01\x02`)
pub const CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x02014b50;

/// End of central directory signature (`PK\x05\x06`)
pub const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x06054b50;

/// Fixed part of the end of central directory record
pub const EOCD_SIZE: usize = 22;

/// Fixed part of a central directory entry
pub const CENTRAL_DIRECTORY_ENTRY_SIZE: usize = 46;

/// Fixed part of a local file header
pub const LOCAL_HEADER_SIZE: usize = 30;

/// End of central directory record, without the trailing comment
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little, magic = 0x06054b50u32)]
pub struct EndOfCentralDirectory {
    /// Number of this disk
    pub disk_number: u16,
    /// Disk where the central directory starts
    pub directory_disk: u16,
    /// Central directory entries on this disk
    pub entries_on_disk: u16,
    /// Total central directory entries
    pub total_entries: u16,
    /// Central directory size in bytes
    pub directory_size: u32,
    /// Central directory offset from the start of the archive
    pub directory_offset: u32,
    /// Length of the trailing comment
    pub comment_len: u16,
}

/// Central directory file header
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little, magic = 0x02014b50u32)]
pub struct CentralDirectoryEntry {
    /// Version made by
    pub version_made_by: u16,
    /// Version needed to extract
    pub version_needed: u16,
    /// General purpose bit flags
    pub flags: u16,
    /// Compression method
    pub method: u16,
    /// DOS modification time
    pub modified_time: u16,
    /// DOS modification date
    pub modified_date: u16,
    /// CRC-32 of the uncompressed data
    pub crc32: u32,
    /// Compressed size
    pub compressed_size: u32,
    /// Uncompressed size
    pub uncompressed_size: u32,
    /// File name length
    pub name_len: u16,
    /// Extra field length
    pub extra_len: u16,
    /// File comment length
    pub comment_len: u16,
    /// Disk number where the file starts
    pub disk_start: u16,
    /// Internal file attributes
    pub internal_attributes: u16,
    /// External file attributes
    pub external_attributes: u32,
    /// Offset of the local file header
    pub local_header_offset: u32,
    /// Raw file name
    #[br(count = name_len)]
    pub name: Vec<u8>,
    /// Extra field
    #[br(count = extra_len)]
    pub extra: Vec<u8>,
    /// File comment
    #[br(count = comment_len)]
    pub comment: Vec<u8>,
}

/// Local file header, without the variable-length fields
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little, magic = 0x04034b50u32)]
pub struct LocalFileHeader {
    /// Version needed to extract
    pub version_needed: u16,
    /// General purpose bit flags
    pub flags: u16,
    /// Compression method
    pub method: u16,
    /// DOS modification time
    pub modified_time: u16,
    /// DOS modification date
    pub modified_date: u16,
    /// CRC-32 of the uncompressed data
    pub crc32: u32,
    /// Compressed size
    pub compressed_size: u32,
    /// Uncompressed size
    pub uncompressed_size: u32,
    /// File name length
    pub name_len: u16,
    /// Extra field length
    pub extra_len: u16,
}

impl LocalFileHeader {
    /// Bytes between the header start and the entry data
    pub fn total_len(&self) -> u64 {
        LOCAL_HEADER_SIZE as u64 + u64::from(self.name_len) + u64::from(self.extra_len)
    }
}
