//! Memo store - the FPT side file holding oversized field values
//!
//! Unlike the table itself, the memo file is big-endian throughout.
//!
//! Header layout:
//! - Offset 0x00: next free block (u32 BE)
//! - Offset 0x04: unused (2 bytes)
//! - Offset 0x06: block size in bytes (u16 BE)
//!
//! Every block starts with an 8-byte mini-header:
//! - Bytes 0-3: signature (u32 BE, 1 = text, anything else binary)
//! - Bytes 4-7: payload length (u32 BE)
//!
//! followed by `length` payload bytes.

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom};
use tracing::{debug, trace, warn};

use super::{read_exact_at, read_full};
use crate::error::{DbfError, DbfResult};

/// Bytes read in one go when opening the memo file
pub const MEMO_HEADER_READ_SIZE: usize = 1024;

/// Size of the fixed memo header fields
pub const MEMO_HEADER_SIZE: usize = 8;

/// Size of the per-block mini-header
pub const BLOCK_HEADER_SIZE: usize = 8;

/// Block signature for text content
pub const TEXT_SIGNATURE: u32 = 1;

/// Size of the block index stored in a memo field
pub const BLOCK_REFERENCE_SIZE: usize = 4;

/// Decoded memo file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoHeader {
    /// Next free block for appends
    pub next_free: u32,
    /// Bytes per block
    pub block_size: u16,
}

impl MemoHeader {
    /// Decode the header from the leading bytes of a memo file
    pub fn from_bytes(data: &[u8]) -> DbfResult<Self> {
        if data.len() < MEMO_HEADER_SIZE {
            return Err(DbfError::format(
                data.len() as u64,
                format!("memo header needs {} bytes, found {}", MEMO_HEADER_SIZE, data.len()),
            ));
        }

        let mut cursor = Cursor::new(&data[..MEMO_HEADER_SIZE]);
        let field = |e: std::io::Error| DbfError::decode("memo header", 0, e);

        let next_free = cursor.read_u32::<BigEndian>().map_err(field)?;
        let _unused = cursor.read_u16::<BigEndian>().map_err(field)?;
        let block_size = cursor.read_u16::<BigEndian>().map_err(field)?;

        Ok(MemoHeader {
            next_free,
            block_size,
        })
    }

    /// Read the header from the start of a memo storage
    pub fn read_from<S: Read + Seek>(storage: &mut S) -> DbfResult<Self> {
        storage.seek(SeekFrom::Start(0))?;
        let mut buf = vec![0u8; MEMO_HEADER_READ_SIZE];
        let n = read_full(storage, &mut buf)?;
        let header = Self::from_bytes(&buf[..n])?;

        if header.block_size == 0 {
            warn!("memo header declares a block size of zero");
        }
        debug!(
            next_free = header.next_free,
            block_size = header.block_size,
            "read memo header"
        );
        Ok(header)
    }

    /// Absolute offset of a block
    pub fn block_offset(&self, block: u32) -> u64 {
        block as u64 * self.block_size as u64
    }
}

/// One memo value as read from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoBlock {
    pub signature: u32,
    pub data: Vec<u8>,
}

impl MemoBlock {
    /// Check if the block holds text rather than binary data
    pub fn is_text(&self) -> bool {
        self.signature == TEXT_SIGNATURE
    }
}

/// Extract the little-endian block index stored inline in a memo field
pub fn block_number(field: &[u8]) -> DbfResult<u32> {
    if field.len() < BLOCK_REFERENCE_SIZE {
        return Err(DbfError::decode(
            "memo block reference",
            0,
            format!("need {} bytes, found {}", BLOCK_REFERENCE_SIZE, field.len()),
        ));
    }
    Ok(LittleEndian::read_u32(&field[..BLOCK_REFERENCE_SIZE]))
}

/// An open memo store: storage plus its decoded header
pub struct MemoStore<S> {
    storage: S,
    header: MemoHeader,
}

impl<S: Read + Seek> MemoStore<S> {
    /// Read the memo header and wrap the storage
    pub fn open(mut storage: S) -> DbfResult<Self> {
        let header = MemoHeader::read_from(&mut storage)?;
        Ok(MemoStore { storage, header })
    }

    pub fn header(&self) -> &MemoHeader {
        &self.header
    }

    /// Read the block referenced by a memo field
    pub fn read_block(&mut self, field: &[u8]) -> DbfResult<MemoBlock> {
        let block = block_number(field)?;
        self.read_block_at(block)
    }

    /// Read the block with the given index
    pub fn read_block_at(&mut self, block: u32) -> DbfResult<MemoBlock> {
        let offset = self.header.block_offset(block);

        // Plain 8-byte read, the mini-header is decoded by hand
        let mini = read_exact_at(&mut self.storage, offset, BLOCK_HEADER_SIZE)?;
        let signature = BigEndian::read_u32(&mini[..4]);
        let length = BigEndian::read_u32(&mini[4..]);
        trace!(block, offset, signature, length, "read memo block header");

        if length == 0 {
            return Ok(MemoBlock {
                signature,
                data: Vec::new(),
            });
        }

        // The declared length is untrusted, so the buffer only grows with
        // what the storage actually holds
        let payload_offset = offset + BLOCK_HEADER_SIZE as u64;
        let mut data = Vec::new();
        let read = (&mut self.storage).take(length as u64).read_to_end(&mut data)?;
        if read != length as usize {
            return Err(DbfError::IncompleteRead {
                offset: payload_offset,
                expected: length as usize,
                actual: read,
            });
        }

        Ok(MemoBlock { signature, data })
    }

    /// Give back the underlying storage
    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<S> std::fmt::Debug for MemoStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoStore")
            .field("header", &self.header)
            .finish()
    }
}
