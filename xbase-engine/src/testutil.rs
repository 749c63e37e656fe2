//! Byte-level builders for DBF and FPT fixtures used by the unit tests

use std::io::Cursor;

pub(crate) struct FixtureColumn {
    pub name: String,
    pub data_type: u8,
    pub length: u8,
    pub decimals: u8,
}

/// Builds a FoxPro table image in memory
pub(crate) struct TableBuilder {
    pub file_type: u8,
    pub flags: u8,
    pub columns: Vec<FixtureColumn>,
    pub rows: Vec<(bool, Vec<Vec<u8>>)>,
    pub row_count_override: Option<u32>,
}

impl TableBuilder {
    pub fn new() -> Self {
        TableBuilder {
            file_type: 0x30,
            flags: 0,
            columns: Vec::new(),
            rows: Vec::new(),
            row_count_override: None,
        }
    }

    pub fn column(mut self, name: &str, data_type: u8, length: u8, decimals: u8) -> Self {
        self.columns.push(FixtureColumn {
            name: name.to_string(),
            data_type,
            length,
            decimals,
        });
        self
    }

    pub fn null_flags(self, length: u8) -> Self {
        self.column("_NullFlags", b'0', length, 0)
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn file_type(mut self, file_type: u8) -> Self {
        self.file_type = file_type;
        self
    }

    pub fn row(mut self, fields: &[&[u8]]) -> Self {
        self.rows.push((false, fields.iter().map(|f| f.to_vec()).collect()));
        self
    }

    pub fn deleted_row(mut self, fields: &[&[u8]]) -> Self {
        self.rows.push((true, fields.iter().map(|f| f.to_vec()).collect()));
        self
    }

    fn data_columns(&self) -> impl Iterator<Item = &FixtureColumn> {
        self.columns.iter().filter(|c| c.name != "_NullFlags")
    }

    pub fn first_row(&self) -> u16 {
        (32 + 32 * self.columns.len() + 1) as u16
    }

    pub fn row_length(&self) -> u16 {
        1 + self.columns.iter().map(|c| c.length as u16).sum::<u16>()
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = vec![0u8; 32];
        buf[0] = self.file_type;
        buf[1] = 124;
        buf[2] = 3;
        buf[3] = 15;
        let row_count = self.row_count_override.unwrap_or(self.rows.len() as u32);
        buf[4..8].copy_from_slice(&row_count.to_le_bytes());
        buf[8..10].copy_from_slice(&self.first_row().to_le_bytes());
        buf[10..12].copy_from_slice(&self.row_length().to_le_bytes());
        buf[28] = self.flags;
        buf[29] = 0x03;

        let mut displacement = 1u32;
        for column in &self.columns {
            let mut entry = [0u8; 32];
            let name = column.name.as_bytes();
            entry[..name.len()].copy_from_slice(name);
            entry[11] = column.data_type;
            entry[12..16].copy_from_slice(&displacement.to_le_bytes());
            entry[16] = column.length;
            entry[17] = column.decimals;
            if column.name == "_NullFlags" {
                entry[18] = 0x05;
            }
            buf.extend_from_slice(&entry);
            displacement += column.length as u32;
        }
        buf.push(0x0D);

        let null_len: usize = self
            .columns
            .iter()
            .filter(|c| c.name == "_NullFlags")
            .map(|c| c.length as usize)
            .sum();

        for (deleted, fields) in &self.rows {
            buf.push(if *deleted { b'*' } else { b' ' });
            for (column, value) in self.data_columns().zip(fields) {
                let mut field = vec![b' '; column.length as usize];
                let n = value.len().min(field.len());
                field[..n].copy_from_slice(&value[..n]);
                buf.extend_from_slice(&field);
            }
            buf.extend(std::iter::repeat(0u8).take(null_len));
        }
        buf.push(0x1A);
        buf
    }

    pub fn storage(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.build())
    }
}

/// Builds an FPT memo image in memory
pub(crate) struct MemoBuilder {
    pub block_size: u16,
    data: Vec<u8>,
}

impl MemoBuilder {
    pub fn new(block_size: u16) -> Self {
        let header_blocks = 512usize.div_ceil(block_size as usize);
        MemoBuilder {
            block_size,
            data: vec![0u8; header_blocks * block_size as usize],
        }
    }

    /// Append a block and return its block index
    pub fn block(&mut self, signature: u32, payload: &[u8]) -> u32 {
        let index = (self.data.len() / self.block_size as usize) as u32;
        self.data.extend_from_slice(&signature.to_be_bytes());
        self.data.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        self.data.extend_from_slice(payload);
        let rem = self.data.len() % self.block_size as usize;
        if rem != 0 {
            let pad = self.block_size as usize - rem;
            self.data.extend(std::iter::repeat(0u8).take(pad));
        }
        index
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = self.data.clone();
        let next_free = (buf.len() / self.block_size as usize) as u32;
        buf[0..4].copy_from_slice(&next_free.to_be_bytes());
        buf[6..8].copy_from_slice(&self.block_size.to_be_bytes());
        buf
    }

    pub fn storage(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.build())
    }
}
