//! Column directory - field descriptors following the table header
//!
//! The directory starts at offset 32 and holds one 32-byte entry per column,
//! terminated by a single 0x0D byte where the next entry would begin.
//!
//! Entry layout:
//! - Bytes 0-10: name (NUL padded)
//! - Byte 11: type tag
//! - Bytes 12-15: displacement within the row (u32 LE, informational)
//! - Byte 16: length
//! - Byte 17: decimal count
//! - Byte 18: column flags
//! - Bytes 19-22: next autoincrement value (u32 LE)
//! - Byte 23: autoincrement step
//! - Bytes 24-31: reserved

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom};
use tracing::{debug, trace};

use super::read_full;
use crate::error::{DbfError, DbfResult};

/// Offset of the first directory entry
pub const COLUMN_DIRECTORY_START: u64 = 32;

/// Size of one directory entry
pub const COLUMN_ENTRY_SIZE: usize = 32;

/// Byte that ends the column directory
pub const COLUMN_TERMINATOR: u8 = 0x0D;

/// Name of the system column tracking NULL values
pub const NULL_FLAGS_COLUMN: &str = "_NullFlags";

/// Every row starts with the deletion flag, so the first column sits at 1
pub const DELETION_FLAG_SIZE: u32 = 1;

const NAME_LENGTH: usize = 11;

/// Column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// `C` - fixed-width text
    Character,
    /// `Y` - 64-bit integer scaled by 10 000
    Currency,
    /// `N` - numeric text
    Numeric,
    /// `F` - floating point text
    Float,
    /// `D` - date as `YYYYMMDD`
    Date,
    /// `T` - Julian day plus milliseconds
    DateTime,
    /// `B` - IEEE double
    Double,
    /// `I` - 32-bit integer
    Integer,
    /// `L` - logical
    Logical,
    /// `M` - memo block reference
    Memo,
    /// `G` - general (OLE) memo block reference
    General,
    /// `P` - picture memo block reference
    Picture,
    /// `V` - varchar
    Varchar,
    /// `Q` - varbinary
    Varbinary,
    /// `0` - null flags bitmap
    NullFlags,
}

impl ColumnType {
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            b'C' => Some(ColumnType::Character),
            b'Y' => Some(ColumnType::Currency),
            b'N' => Some(ColumnType::Numeric),
            b'F' => Some(ColumnType::Float),
            b'D' => Some(ColumnType::Date),
            b'T' => Some(ColumnType::DateTime),
            b'B' => Some(ColumnType::Double),
            b'I' => Some(ColumnType::Integer),
            b'L' => Some(ColumnType::Logical),
            b'M' => Some(ColumnType::Memo),
            b'G' => Some(ColumnType::General),
            b'P' => Some(ColumnType::Picture),
            b'V' => Some(ColumnType::Varchar),
            b'Q' => Some(ColumnType::Varbinary),
            b'0' => Some(ColumnType::NullFlags),
            _ => None,
        }
    }

    /// Check if the field holds a memo block index instead of the value
    pub fn is_memo(&self) -> bool {
        matches!(self, ColumnType::Memo | ColumnType::General | ColumnType::Picture)
    }
}

bitflags::bitflags! {
    /// Per-column flags at byte 18 of a directory entry
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ColumnFlags: u8 {
        /// System column, hidden from the user
        const SYSTEM = 0x01;
        /// Column can store NULL
        const NULLABLE = 0x02;
        /// Binary column (no code page translation)
        const BINARY = 0x04;
        /// Autoincrementing column
        const AUTOINCREMENT = 0x0C;
    }
}

/// A column descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Raw type tag
    pub data_type: u8,
    /// Displacement as stored in the directory
    pub displacement: u32,
    /// Length of the field in bytes
    pub length: u8,
    pub decimals: u8,
    pub flags: ColumnFlags,
    pub next_autoincrement: u32,
    pub autoincrement_step: u8,
    /// Byte offset within a row, computed while reading the directory
    pub offset: u32,
}

impl Column {
    /// Decode a 32-byte directory entry located at `at`
    ///
    /// The row offset is left at zero; [`read_columns`] assigns it.
    pub fn from_entry(entry: &[u8], at: u64) -> DbfResult<Self> {
        if entry.len() < COLUMN_ENTRY_SIZE {
            return Err(DbfError::decode(
                "column entry",
                at,
                format!("need {} bytes, found {}", COLUMN_ENTRY_SIZE, entry.len()),
            ));
        }

        let name = decode_name(&entry[..NAME_LENGTH])
            .map_err(|e| DbfError::decode("column name", at, e))?;

        let mut cursor = Cursor::new(&entry[NAME_LENGTH..COLUMN_ENTRY_SIZE]);
        let field = |e: std::io::Error| DbfError::decode("column entry", at, e);

        let data_type = cursor.read_u8().map_err(field)?;
        let displacement = cursor.read_u32::<LittleEndian>().map_err(field)?;
        let length = cursor.read_u8().map_err(field)?;
        let decimals = cursor.read_u8().map_err(field)?;
        let flags = ColumnFlags::from_bits_retain(cursor.read_u8().map_err(field)?);
        let next_autoincrement = cursor.read_u32::<LittleEndian>().map_err(field)?;
        let autoincrement_step = cursor.read_u8().map_err(field)?;

        Ok(Column {
            name,
            data_type,
            displacement,
            length,
            decimals,
            flags,
            next_autoincrement,
            autoincrement_step,
            offset: 0,
        })
    }

    /// Decoded column type, `None` for tags this reader does not know
    pub fn column_type(&self) -> Option<ColumnType> {
        ColumnType::from_raw(self.data_type)
    }

    /// Check if this is the null-tracking system column
    pub fn is_null_flags(&self) -> bool {
        self.name == NULL_FLAGS_COLUMN
    }
}

/// Names are NUL padded; some writers pad with spaces instead
fn decode_name(raw: &[u8]) -> Result<String, std::str::Utf8Error> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let name = std::str::from_utf8(&raw[..end])?;
    Ok(name.trim_end_matches(' ').to_string())
}

/// Read the column directory from a table storage
///
/// Scans one byte ahead for the terminator before each entry. The
/// `_NullFlags` entry is consumed but not returned, and does not shift the
/// row offsets of the other columns.
pub fn read_columns<S: Read + Seek>(storage: &mut S) -> DbfResult<Vec<Column>> {
    let mut columns = Vec::new();
    let mut offset = COLUMN_DIRECTORY_START;
    let mut row_offset = DELETION_FLAG_SIZE;
    let mut probe = [0u8; 1];

    loop {
        storage.seek(SeekFrom::Start(offset))?;
        if read_full(storage, &mut probe)? == 0 {
            return Err(DbfError::format(
                offset,
                "column directory terminator 0x0D not found",
            ));
        }
        if probe[0] == COLUMN_TERMINATOR {
            break;
        }

        // Step back over the probe byte and read the full entry
        storage.seek(SeekFrom::Current(-1))?;
        let mut entry = [0u8; COLUMN_ENTRY_SIZE];
        let n = read_full(storage, &mut entry)?;
        if n < COLUMN_ENTRY_SIZE {
            return Err(DbfError::format(
                offset,
                format!(
                    "column entry truncated to {} bytes before directory terminator",
                    n
                ),
            ));
        }

        let mut column = Column::from_entry(&entry, offset)?;
        offset += COLUMN_ENTRY_SIZE as u64;

        if column.is_null_flags() {
            trace!(length = column.length, "skipping null flags column");
            continue;
        }

        column.offset = row_offset;
        row_offset += column.length as u32;
        trace!(
            name = %column.name,
            data_type = %(column.data_type as char),
            offset = column.offset,
            length = column.length,
            "read column"
        );
        columns.push(column);
    }

    debug!(columns = columns.len(), "read column directory");
    Ok(columns)
}
