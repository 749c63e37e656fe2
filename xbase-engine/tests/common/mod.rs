//! Shared helpers for building table and memo images

#![allow(dead_code)]

pub const MEMO_FLAG: u8 = 0x02;

/// Build a FoxPro table image; rows are given as complete row bytes
/// without the deletion flag
pub fn table_image(columns: &[(&str, u8, u8)], rows: &[(bool, Vec<u8>)], flags: u8) -> Vec<u8> {
    let row_length: u16 = 1 + columns.iter().map(|c| c.2 as u16).sum::<u16>();
    let first_row = (32 + 32 * columns.len() + 1) as u16;

    let mut buf = vec![0u8; 32];
    buf[0] = 0x30;
    buf[4..8].copy_from_slice(&(rows.len() as u32).to_le_bytes());
    buf[8..10].copy_from_slice(&first_row.to_le_bytes());
    buf[10..12].copy_from_slice(&row_length.to_le_bytes());
    buf[28] = flags;

    for (name, data_type, length) in columns {
        let mut entry = [0u8; 32];
        entry[..name.len()].copy_from_slice(name.as_bytes());
        entry[11] = *data_type;
        entry[16] = *length;
        buf.extend_from_slice(&entry);
    }
    buf.push(0x0D);

    for (deleted, data) in rows {
        assert_eq!(data.len() + 1, row_length as usize);
        buf.push(if *deleted { b'*' } else { b' ' });
        buf.extend_from_slice(data);
    }
    buf
}

/// Build a memo image with the given block size; `blocks` are placed at
/// the given block indexes
pub fn memo_image(block_size: u16, blocks: &[(u32, u32, &[u8])]) -> Vec<u8> {
    let mut buf = vec![0u8; 512];
    for (index, signature, payload) in blocks {
        let start = *index as usize * block_size as usize;
        let end = start + 8 + payload.len();
        if buf.len() < end {
            buf.resize(end, 0);
        }
        buf[start..start + 4].copy_from_slice(&signature.to_be_bytes());
        buf[start + 4..start + 8].copy_from_slice(&(payload.len() as u32).to_be_bytes());
        buf[start + 8..end].copy_from_slice(payload);
    }
    let next_free = buf.len().div_ceil(block_size as usize) as u32;
    buf[0..4].copy_from_slice(&next_free.to_be_bytes());
    buf[6..8].copy_from_slice(&block_size.to_be_bytes());
    buf
}
