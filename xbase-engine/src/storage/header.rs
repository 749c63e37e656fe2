//! Table header - the fixed 32-byte region at the start of a DBF file
//!
//! All multi-byte integers are little-endian. Layout:
//! - Offset 0x00: file type (u8)
//! - Offset 0x01: last update as YY MM DD (3 x u8, year since 1900)
//! - Offset 0x04: row count (u32)
//! - Offset 0x08: offset of the first row (u16)
//! - Offset 0x0A: row length including the deletion flag (u16)
//! - Offset 0x0C: reserved (16 bytes)
//! - Offset 0x1C: table flags (u8)
//! - Offset 0x1D: code page mark (u8)
//! - Offset 0x1E: reserved (2 bytes)

use byteorder::{LittleEndian, ReadBytesExt};
use chrono::NaiveDate;
use std::io::{Cursor, Read, Seek, SeekFrom};
use tracing::debug;

use super::read_full;
use crate::error::{DbfError, DbfResult};

/// Size of the fixed header fields
pub const HEADER_SIZE: usize = 32;

/// Bytes read in one go when opening a table; covers the header and
/// usually the whole column directory
pub const HEADER_READ_SIZE: usize = 1024;

/// Table file versions this reader has been tested against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FileType {
    /// Visual FoxPro
    FoxPro = 0x30,
    /// Visual FoxPro with autoincrement columns
    FoxProAutoincrement = 0x31,
}

impl FileType {
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0x30 => Some(FileType::FoxPro),
            0x31 => Some(FileType::FoxProAutoincrement),
            _ => None,
        }
    }
}

bitflags::bitflags! {
    /// Table-level flags stored at offset 0x1C
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TableFlags: u8 {
        /// Table has a structural index (.CDX)
        const STRUCTURAL_INDEX = 0x01;
        /// Table has a memo file (.FPT)
        const MEMO = 0x02;
        /// Table belongs to a database container (.DBC)
        const DATABASE = 0x04;
    }
}

/// Decoded table header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Raw file type byte
    pub file_type: u8,
    /// Last update, years since 1900
    pub year: u8,
    pub month: u8,
    pub day: u8,
    /// Number of rows in the table
    pub row_count: u32,
    /// Absolute offset of the first row
    pub first_row: u16,
    /// Length of one row, deletion flag included
    pub row_length: u16,
    pub flags: TableFlags,
    pub code_page: u8,
}

impl Header {
    /// Decode the header from the leading bytes of a table
    pub fn from_bytes(data: &[u8]) -> DbfResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(DbfError::format(
                data.len() as u64,
                format!("header needs {} bytes, found {}", HEADER_SIZE, data.len()),
            ));
        }

        let mut cursor = Cursor::new(&data[..HEADER_SIZE]);
        let field = |e: std::io::Error| DbfError::decode("table header", 0, e);

        let file_type = cursor.read_u8().map_err(field)?;
        let year = cursor.read_u8().map_err(field)?;
        let month = cursor.read_u8().map_err(field)?;
        let day = cursor.read_u8().map_err(field)?;
        let row_count = cursor.read_u32::<LittleEndian>().map_err(field)?;
        let first_row = cursor.read_u16::<LittleEndian>().map_err(field)?;
        let row_length = cursor.read_u16::<LittleEndian>().map_err(field)?;
        cursor.set_position(0x1C);
        let flags = TableFlags::from_bits_retain(cursor.read_u8().map_err(field)?);
        let code_page = cursor.read_u8().map_err(field)?;

        Ok(Header {
            file_type,
            year,
            month,
            day,
            row_count,
            first_row,
            row_length,
            flags,
            code_page,
        })
    }

    /// Read and validate the header from the start of the storage
    pub fn read_from<S: Read + Seek>(storage: &mut S) -> DbfResult<Self> {
        storage.seek(SeekFrom::Start(0))?;
        let mut buf = vec![0u8; HEADER_READ_SIZE];
        let n = read_full(storage, &mut buf)?;

        let header = Self::from_bytes(&buf[..n])?;
        header.file_version()?;

        debug!(
            file_type = header.file_type,
            rows = header.row_count,
            first_row = header.first_row,
            row_length = header.row_length,
            flags = header.flags.bits(),
            "read table header"
        );
        Ok(header)
    }

    /// Check the file type byte against the tested versions
    pub fn file_version(&self) -> DbfResult<FileType> {
        FileType::from_raw(self.file_type).ok_or(DbfError::UnsupportedVersion(self.file_type))
    }

    /// Check if the table declares a memo file
    pub fn has_memo(&self) -> bool {
        self.flags.contains(TableFlags::MEMO)
    }

    /// Date of the last update, if the stored bytes form a valid date
    pub fn last_update(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(1900 + self.year as i32, self.month as u32, self.day as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testutil::TableBuilder;

    fn raw_header() -> Vec<u8> {
        let mut buf = vec![0u8; 32];
        buf[0] = 0x30;
        buf[1] = 124;
        buf[2] = 3;
        buf[3] = 15;
        buf[4..8].copy_from_slice(&3u32.to_le_bytes());
        buf[8..10].copy_from_slice(&40u16.to_le_bytes());
        buf[10..12].copy_from_slice(&10u16.to_le_bytes());
        buf[28] = 0x03;
        buf[29] = 0x03;
        buf
    }

    #[test]
    fn test_header_fields() {
        let header = Header::from_bytes(&raw_header()).unwrap();
        assert_eq!(header.file_type, 0x30);
        assert_eq!(header.row_count, 3);
        assert_eq!(header.first_row, 40);
        assert_eq!(header.row_length, 10);
        assert!(header.has_memo());
        assert!(header.flags.contains(TableFlags::STRUCTURAL_INDEX));
        assert!(!header.flags.contains(TableFlags::DATABASE));
        assert_eq!(header.code_page, 0x03);
        assert_eq!(header.last_update(), NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_header_too_short() {
        let err = Header::from_bytes(&raw_header()[..31]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_short_source_is_accepted() {
        // Exactly 32 bytes: shorter than the 1024-byte read, still a header
        let mut storage = Cursor::new(raw_header());
        let header = Header::read_from(&mut storage).unwrap();
        assert_eq!(header.row_count, 3);
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = raw_header();
        bytes[0] = 0x03;
        let err = Header::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, DbfError::UnsupportedVersion(0x03)));
    }

    #[test]
    fn test_autoincrement_version() {
        let table = TableBuilder::new()
            .file_type(0x31)
            .column("ID", b'I', 4, 0);
        let header = Header::read_from(&mut table.storage()).unwrap();
        assert_eq!(header.file_version().unwrap(), FileType::FoxProAutoincrement);
        assert_eq!(header.first_row, table.first_row());
        assert_eq!(header.row_length, 5);
    }

    #[test]
    fn test_invalid_date() {
        let mut bytes = raw_header();
        bytes[2] = 13;
        let header = Header::from_bytes(&bytes).unwrap();
        assert_eq!(header.last_update(), None);
    }
}
