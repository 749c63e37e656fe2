//! Storage layer for the DBF/FPT file format
//!
//! This module handles the low-level binary format of FoxPro tables:
//! - Table header parsing
//! - Column directory parsing
//! - Memo (FPT) header and block reads
//! - Row and field addressing
//!
//! Every reader here works against any `Read + Seek` storage, so files and
//! in-memory buffers are handled the same way.

pub mod header;
pub mod column;
pub mod memo;
pub mod addressing;

pub use header::{FileType, Header, TableFlags};
pub use column::{Column, ColumnFlags, ColumnType};
pub use memo::{MemoBlock, MemoHeader, MemoStore};
pub use addressing::Addressor;

use std::io::{self, Read, Seek, SeekFrom};

use crate::error::{DbfError, DbfResult};

/// Read into `buf` until it is full or the storage is exhausted.
///
/// Returns the number of bytes read. A single `read` call may legally return
/// fewer bytes than requested, so a short count here means end of storage.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Seek to `offset` and read exactly `len` bytes.
///
/// A short read is reported as [`DbfError::IncompleteRead`].
pub(crate) fn read_exact_at<S: Read + Seek>(
    storage: &mut S,
    offset: u64,
    len: usize,
) -> DbfResult<Vec<u8>> {
    storage.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len];
    let read = read_full(storage, &mut buf)?;
    if read != len {
        return Err(DbfError::IncompleteRead {
            offset,
            expected: len,
            actual: read,
        });
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that hands out at most 3 bytes per call
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.0.len()).min(3);
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_read_full_gathers_partial_reads() {
        let data = [7u8; 10];
        let mut reader = Trickle(&data);
        let mut buf = [0u8; 8];
        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 8);
        assert_eq!(buf, [7u8; 8]);

        let mut rest = [0u8; 8];
        assert_eq!(read_full(&mut reader, &mut rest).unwrap(), 2);
    }

    #[test]
    fn test_read_exact_at_short() {
        let mut storage = Cursor::new(vec![1u8, 2, 3, 4, 5]);
        assert_eq!(read_exact_at(&mut storage, 1, 3).unwrap(), vec![2, 3, 4]);

        match read_exact_at(&mut storage, 3, 4) {
            Err(DbfError::IncompleteRead { offset, expected, actual }) => {
                assert_eq!((offset, expected, actual), (3, 4, 2));
            }
            other => panic!("expected IncompleteRead, got {:?}", other),
        }
    }
}
