//! Error kinds and error handling for table and memo decoding
//!
//! Every failure carries the offending offset, index or byte so the caller
//! can diagnose a damaged file. Nothing is retried internally.

use thiserror::Error;

/// Coarse error kinds, usable without destructuring a [`DbfError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    /// Structural expectation violated (missing terminator, truncated header)
    Format = 1,
    /// Bytes present but not interpretable as the expected layout
    Decode = 2,
    /// Known structure with an untested version tag
    UnsupportedVersion = 3,
    /// Row index outside the table
    OutOfRange = 4,
    /// Column index or name outside the column list
    InvalidColumn = 5,
    /// Storage returned fewer bytes than the format guarantees
    IncompleteRead = 6,
    /// Memo requested without an attached memo store
    NoMemoFile = 7,
    /// Text decoding failed
    Encoding = 8,
    /// Navigation or query at or past the last row
    EndOfFile = 9,
    /// Underlying storage error
    Io = 10,
}

impl ErrorKind {
    /// Create an ErrorKind from a raw value
    pub fn from_raw(code: u8) -> Option<Self> {
        match code {
            1 => Some(ErrorKind::Format),
            2 => Some(ErrorKind::Decode),
            3 => Some(ErrorKind::UnsupportedVersion),
            4 => Some(ErrorKind::OutOfRange),
            5 => Some(ErrorKind::InvalidColumn),
            6 => Some(ErrorKind::IncompleteRead),
            7 => Some(ErrorKind::NoMemoFile),
            8 => Some(ErrorKind::Encoding),
            9 => Some(ErrorKind::EndOfFile),
            10 => Some(ErrorKind::Io),
            _ => None,
        }
    }

    /// Get the raw value
    pub fn as_raw(&self) -> u8 {
        *self as u8
    }

    /// Check if this indicates the end of the row space
    pub fn is_eof(&self) -> bool {
        matches!(self, ErrorKind::EndOfFile | ErrorKind::OutOfRange)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ErrorKind::Format => "format",
            ErrorKind::Decode => "decode",
            ErrorKind::UnsupportedVersion => "unsupported version",
            ErrorKind::OutOfRange => "out of range",
            ErrorKind::InvalidColumn => "invalid column",
            ErrorKind::IncompleteRead => "incomplete read",
            ErrorKind::NoMemoFile => "no memo file",
            ErrorKind::Encoding => "encoding",
            ErrorKind::EndOfFile => "end of file",
            ErrorKind::Io => "I/O",
        })
    }
}

/// Main error type for the table reader
#[derive(Error, Debug)]
pub enum DbfError {
    #[error("invalid table format at offset {offset}: {reason}")]
    Format { offset: u64, reason: String },

    #[error("cannot decode {what} at offset {offset}: {reason}")]
    Decode {
        what: &'static str,
        offset: u64,
        reason: String,
    },

    #[error("untested table file version: {0} (0x{0:02x})")]
    UnsupportedVersion(u8),

    #[error("row {row} out of range (table has {row_count} rows)")]
    OutOfRange { row: u32, row_count: u32 },

    #[error("invalid column index {index} (table has {count} columns)")]
    InvalidColumn { index: usize, count: usize },

    #[error("unknown column name {0:?}")]
    UnknownColumn(String),

    #[error("incomplete read at offset {offset}: expected {expected} bytes, got {actual}")]
    IncompleteRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("memo field requested but no memo file is attached")]
    NoMemoFile,

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("end of file at row {position} (table has {row_count} rows)")]
    EndOfFile { position: u32, row_count: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbfError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbfError::Format { .. } => ErrorKind::Format,
            DbfError::Decode { .. } => ErrorKind::Decode,
            DbfError::UnsupportedVersion(_) => ErrorKind::UnsupportedVersion,
            DbfError::OutOfRange { .. } => ErrorKind::OutOfRange,
            DbfError::InvalidColumn { .. } | DbfError::UnknownColumn(_) => {
                ErrorKind::InvalidColumn
            }
            DbfError::IncompleteRead { .. } => ErrorKind::IncompleteRead,
            DbfError::NoMemoFile => ErrorKind::NoMemoFile,
            DbfError::Encoding(_) => ErrorKind::Encoding,
            DbfError::EndOfFile { .. } => ErrorKind::EndOfFile,
            DbfError::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn format(offset: u64, reason: impl Into<String>) -> Self {
        DbfError::Format {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(what: &'static str, offset: u64, reason: impl ToString) -> Self {
        DbfError::Decode {
            what,
            offset,
            reason: reason.to_string(),
        }
    }
}

/// Result type for table operations
pub type DbfResult<T> = Result<T, DbfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for code in 1..=10 {
            let kind = ErrorKind::from_raw(code).unwrap();
            assert_eq!(kind.as_raw(), code);
        }
        assert_eq!(ErrorKind::from_raw(0), None);
        assert_eq!(ErrorKind::from_raw(11), None);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(DbfError::UnsupportedVersion(0x03).kind(), ErrorKind::UnsupportedVersion);
        assert_eq!(DbfError::UnknownColumn("X".into()).kind(), ErrorKind::InvalidColumn);
        assert_eq!(DbfError::NoMemoFile.kind(), ErrorKind::NoMemoFile);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(DbfError::from(io).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_eof_check() {
        assert!(ErrorKind::EndOfFile.is_eof());
        assert!(ErrorKind::OutOfRange.is_eof());
        assert!(!ErrorKind::Format.is_eof());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = DbfError::UnsupportedVersion(0x8b);
        assert_eq!(err.to_string(), "untested table file version: 139 (0x8b)");

        let err = DbfError::IncompleteRead {
            offset: 50,
            expected: 10,
            actual: 4,
        };
        assert!(err.to_string().contains("offset 50"));
    }
}
