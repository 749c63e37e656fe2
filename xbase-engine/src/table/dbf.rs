//! Table handle tying the decoders together
//!
//! A [`Dbf`] owns the table storage, the optional memo store, the decoded
//! header and column directory, and the row cursor. The cursor is the only
//! state that changes after open.

use std::io::{Read, Seek};
use tracing::{debug, warn};

use super::cursor::{RowCursor, DELETED_MARKER};
use crate::encoding::EncodingConverter;
use crate::error::{DbfError, DbfResult};
use crate::storage::addressing::Addressor;
use crate::storage::column::{read_columns, Column, DELETION_FLAG_SIZE};
use crate::storage::header::Header;
use crate::storage::memo::{block_number, MemoHeader, MemoStore};
use crate::value::{decode_text, interpret, Value};

/// Pending edit for one column, owned by a write path this crate does not
/// provide. The reader only reserves the slot.
#[derive(Debug)]
pub struct Modification {
    _private: (),
}

/// Column list, per-column modification slots and the row cursor
#[derive(Debug)]
pub struct Table {
    columns: Vec<Column>,
    mods: Vec<Option<Modification>>,
    cursor: RowCursor,
}

impl Table {
    fn new(columns: Vec<Column>) -> Self {
        let mods = std::iter::repeat_with(|| None).take(columns.len()).collect();
        Table {
            columns,
            mods,
            cursor: RowCursor::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Pending modification slot of a column
    pub fn modification(&self, column: usize) -> Option<&Modification> {
        self.mods.get(column).and_then(Option::as_ref)
    }

    pub fn cursor(&self) -> RowCursor {
        self.cursor
    }
}

/// One row read at the cursor
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Row index
    pub position: u32,
    /// Deletion flag was set
    pub deleted: bool,
    /// One value per column, in column order
    pub values: Vec<Value>,
}

impl Row {
    pub fn value(&self, column: usize) -> Option<&Value> {
        self.values.get(column)
    }
}

/// An open FoxPro table
pub struct Dbf<S> {
    converter: Box<dyn EncodingConverter>,
    data: S,
    memo: Option<MemoStore<S>>,
    header: Header,
    table: Table,
}

impl<S: Read + Seek> Dbf<S> {
    /// Open a table from its storage and, if the header asks for one, a
    /// memo store
    ///
    /// A memo store is only attached when the header carries the memo flag.
    /// Without one, memo reads fail with [`DbfError::NoMemoFile`].
    pub fn open(
        mut data: S,
        memo: Option<S>,
        converter: Box<dyn EncodingConverter>,
    ) -> DbfResult<Self> {
        let header = Header::read_from(&mut data)?;
        Self::from_header(data, header, memo, converter)
    }

    /// Open a table whose header was already decoded from `data`
    ///
    /// Lets a caller inspect the header (for instance to decide whether a
    /// memo file is needed) without reading it twice.
    pub fn from_header(
        mut data: S,
        header: Header,
        memo: Option<S>,
        converter: Box<dyn EncodingConverter>,
    ) -> DbfResult<Self> {
        header.file_version()?;
        let columns = read_columns(&mut data)?;
        check_row_layout(&header, &columns)?;

        let memo = match memo {
            Some(storage) if header.has_memo() => Some(MemoStore::open(storage)?),
            Some(_) => {
                debug!("table has no memo flag, ignoring memo storage");
                None
            }
            None => {
                if header.has_memo() {
                    warn!("table declares a memo file but none was attached");
                }
                None
            }
        };

        debug!(
            rows = header.row_count,
            columns = columns.len(),
            memo = memo.is_some(),
            encoding = converter.name(),
            "opened table"
        );

        Ok(Dbf {
            converter,
            data,
            memo,
            header,
            table: Table::new(columns),
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn memo_header(&self) -> Option<&MemoHeader> {
        self.memo.as_ref().map(MemoStore::header)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn converter(&self) -> &dyn EncodingConverter {
        self.converter.as_ref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.table.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.table.columns.get(index)
    }

    pub fn column_count(&self) -> usize {
        self.table.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.table.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Date of the last update recorded in the header
    pub fn last_update(&self) -> Option<chrono::NaiveDate> {
        self.header.last_update()
    }

    /// Position of a column by exact (case-sensitive) name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.table.columns.iter().position(|c| c.name == name)
    }

    pub fn row_count(&self) -> u32 {
        self.header.row_count
    }

    fn addressor(&self) -> Addressor<'_> {
        Addressor::new(&self.header, &self.table.columns)
    }

    pub fn row_offset(&self, row: u32) -> u64 {
        self.addressor().row_offset(row)
    }

    pub fn field_offset(&self, row: u32, column: usize) -> DbfResult<u64> {
        self.addressor().field_offset(row, column)
    }

    /// Raw bytes of a row, deletion flag included
    pub fn read_row(&mut self, row: u32) -> DbfResult<Vec<u8>> {
        let addressor = Addressor::new(&self.header, &self.table.columns);
        addressor.read_row(&mut self.data, row)
    }

    /// Raw bytes of one field
    pub fn read_field(&mut self, row: u32, column: usize) -> DbfResult<Vec<u8>> {
        let addressor = Addressor::new(&self.header, &self.table.columns);
        addressor.read_field(&mut self.data, row, column)
    }

    /// Read the memo referenced by a memo field, undecoded
    ///
    /// Returns the payload and whether the block is flagged as text.
    pub fn read_memo(&mut self, field: &[u8]) -> DbfResult<(Vec<u8>, bool)> {
        let store = self.memo.as_mut().ok_or(DbfError::NoMemoFile)?;
        let block = store.read_block(field)?;
        let is_text = block.is_text();
        Ok((block.data, is_text))
    }

    /// Read the memo referenced by a memo field, decoding text blocks
    pub fn parse_memo(&mut self, field: &[u8]) -> DbfResult<(Vec<u8>, bool)> {
        let (data, is_text) = self.read_memo(field)?;
        if is_text {
            return Ok((self.converter.decode(&data)?, true));
        }
        Ok((data, false))
    }

    /// Decoded value of one field
    pub fn value(&mut self, row: u32, column: usize) -> DbfResult<Value> {
        let raw = self.read_field(row, column)?;
        self.decode_field(column, &raw)
    }

    fn decode_field(&mut self, column: usize, raw: &[u8]) -> DbfResult<Value> {
        let col = self.column(column).ok_or(DbfError::InvalidColumn {
            index: column,
            count: self.column_count(),
        })?;

        if !col.column_type().is_some_and(|t| t.is_memo()) {
            return interpret(col, raw, self.converter.as_ref());
        }

        // Block 0 is the memo header, so it never holds a value
        if block_number(raw)? == 0 {
            return Ok(Value::Null);
        }
        let (data, is_text) = self.read_memo(raw)?;
        if is_text {
            Ok(Value::Text(decode_text(self.converter.as_ref(), &data)?))
        } else {
            Ok(Value::Binary(data))
        }
    }

    /// Current cursor position
    pub fn position(&self) -> u32 {
        self.table.cursor.position()
    }

    /// Check if the cursor is past the last row
    pub fn eof(&self) -> bool {
        self.table.cursor.at_end(self.header.row_count)
    }

    /// Check if the cursor is on the first row
    pub fn bof(&self) -> bool {
        self.table.cursor.at_beginning()
    }

    /// Move the cursor to `row`; see [`RowCursor::goto`]
    pub fn goto(&mut self, row: u32) -> DbfResult<()> {
        self.table.cursor.goto(row, self.header.row_count)
    }

    /// Move the cursor by `delta` rows, clamping; deleted rows are not skipped
    pub fn skip(&mut self, delta: i64) {
        self.table.cursor.skip(delta, self.header.row_count)
    }

    /// Check the deletion flag of the row at the cursor
    pub fn is_deleted(&mut self) -> DbfResult<bool> {
        let row = self.table.cursor.current_row(self.header.row_count)?;
        let addressor = Addressor::new(&self.header, &self.table.columns);
        let flag = addressor.read_deletion_flag(&mut self.data, row)?;
        Ok(flag == DELETED_MARKER)
    }

    /// Read and decode the row at the cursor
    pub fn row(&mut self) -> DbfResult<Row> {
        let position = self.table.cursor.current_row(self.header.row_count)?;
        let data = self.read_row(position)?;

        let mut values = Vec::with_capacity(self.column_count());
        for column in 0..self.column_count() {
            let raw = self.addressor().slice_field(&data, column)?.to_vec();
            values.push(self.decode_field(column, &raw)?);
        }

        Ok(Row {
            position,
            deleted: data[0] == DELETED_MARKER,
            values,
        })
    }

    /// Decoded value of the named column in the row at the cursor
    pub fn field(&mut self, name: &str) -> DbfResult<Value> {
        let column = self
            .column_index(name)
            .ok_or_else(|| DbfError::UnknownColumn(name.to_string()))?;
        let row = self.table.cursor.current_row(self.header.row_count)?;
        self.value(row, column)
    }

    /// Give back the table and memo storages
    pub fn into_inner(self) -> (S, Option<S>) {
        (self.data, self.memo.map(MemoStore::into_inner))
    }
}

impl<S> std::fmt::Debug for Dbf<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dbf")
            .field("header", &self.header)
            .field("columns", &self.table.columns.len())
            .field("position", &self.table.cursor.position())
            .field("memo", &self.memo)
            .field("encoding", &self.converter.name())
            .finish()
    }
}

/// Columns must fit inside the declared row length
fn check_row_layout(header: &Header, columns: &[Column]) -> DbfResult<()> {
    let used: u64 = DELETION_FLAG_SIZE as u64 + columns.iter().map(|c| c.length as u64).sum::<u64>();
    if used > header.row_length as u64 {
        return Err(DbfError::format(
            header.first_row as u64,
            format!(
                "columns need {} bytes per row but the header declares {}",
                used, header.row_length
            ),
        ));
    }
    Ok(())
}
