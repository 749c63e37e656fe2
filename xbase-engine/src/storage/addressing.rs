//! Row and field addressing
//!
//! Rows are a flat array of `row_length` byte records starting at
//! `first_row`. Each row begins with the deletion flag, followed by one
//! span per column at the column's computed offset.

use std::io::{Read, Seek};

use super::column::Column;
use super::header::Header;
use super::read_exact_at;
use crate::error::{DbfError, DbfResult};

/// Maps (row, column) pairs to absolute offsets in the table storage
#[derive(Debug, Clone, Copy)]
pub struct Addressor<'a> {
    header: &'a Header,
    columns: &'a [Column],
}

impl<'a> Addressor<'a> {
    pub fn new(header: &'a Header, columns: &'a [Column]) -> Self {
        Addressor { header, columns }
    }

    /// Absolute offset of a row
    pub fn row_offset(&self, row: u32) -> u64 {
        self.header.first_row as u64 + row as u64 * self.header.row_length as u64
    }

    /// Absolute offset of a field
    pub fn field_offset(&self, row: u32, column: usize) -> DbfResult<u64> {
        let column = self.column(column)?;
        Ok(self.row_offset(row) + column.offset as u64)
    }

    fn column(&self, index: usize) -> DbfResult<&'a Column> {
        self.columns.get(index).ok_or(DbfError::InvalidColumn {
            index,
            count: self.columns.len(),
        })
    }

    fn check_row(&self, row: u32) -> DbfResult<()> {
        if row >= self.header.row_count {
            return Err(DbfError::OutOfRange {
                row,
                row_count: self.header.row_count,
            });
        }
        Ok(())
    }

    /// Read the raw bytes of a whole row, deletion flag included
    pub fn read_row<S: Read + Seek>(&self, storage: &mut S, row: u32) -> DbfResult<Vec<u8>> {
        self.check_row(row)?;
        read_exact_at(storage, self.row_offset(row), self.header.row_length as usize)
    }

    /// Read the raw bytes of a single field
    pub fn read_field<S: Read + Seek>(
        &self,
        storage: &mut S,
        row: u32,
        column: usize,
    ) -> DbfResult<Vec<u8>> {
        self.check_row(row)?;
        let length = self.column(column)?.length as usize;
        let offset = self.field_offset(row, column)?;
        read_exact_at(storage, offset, length)
    }

    /// Read the deletion flag byte of a row
    pub fn read_deletion_flag<S: Read + Seek>(&self, storage: &mut S, row: u32) -> DbfResult<u8> {
        self.check_row(row)?;
        let flag = read_exact_at(storage, self.row_offset(row), 1)?;
        Ok(flag[0])
    }

    /// Slice a field out of an already read row
    pub fn slice_field<'r>(&self, row: &'r [u8], column: usize) -> DbfResult<&'r [u8]> {
        let col = self.column(column)?;
        let start = col.offset as usize;
        let end = start + col.length as usize;
        row.get(start..end).ok_or(DbfError::IncompleteRead {
            offset: start as u64,
            expected: col.length as usize,
            actual: row.len().saturating_sub(start),
        })
    }
}
