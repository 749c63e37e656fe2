//! Row cursor for sequential navigation
//!
//! The cursor is a single row position in `[0, row_count]`, where
//! `row_count` itself means "past the last row".

use crate::error::{DbfError, DbfResult};

/// Deletion flag value marking a deleted row
pub const DELETED_MARKER: u8 = b'*';

/// Deletion flag value marking a live row
pub const ACTIVE_MARKER: u8 = b' ';

/// Current row position of a table handle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCursor {
    position: u32,
}

impl RowCursor {
    /// Create a cursor on the first row
    pub fn new() -> Self {
        RowCursor { position: 0 }
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    /// Move to row `row`
    ///
    /// Past the end the cursor is parked at `row_count` and
    /// [`DbfError::EndOfFile`] is returned.
    pub fn goto(&mut self, row: u32, row_count: u32) -> DbfResult<()> {
        if row > row_count {
            self.position = row_count;
            return Err(DbfError::EndOfFile {
                position: row,
                row_count,
            });
        }
        self.position = row;
        Ok(())
    }

    /// Move by `delta` rows, clamping to `[0, row_count]`
    ///
    /// Never fails; only [`RowCursor::goto`] reports running off the end.
    pub fn skip(&mut self, delta: i64, row_count: u32) {
        let target = (self.position as i64).saturating_add(delta);
        self.position = if target >= row_count as i64 {
            row_count
        } else if target < 0 {
            0
        } else {
            target as u32
        };
    }

    /// Check if the cursor is past the last row
    pub fn at_end(&self, row_count: u32) -> bool {
        self.position >= row_count
    }

    /// Check if the cursor is on the first row
    pub fn at_beginning(&self) -> bool {
        self.position == 0
    }

    /// Current row, or [`DbfError::EndOfFile`] when past the last row
    pub fn current_row(&self, row_count: u32) -> DbfResult<u32> {
        if self.at_end(row_count) {
            return Err(DbfError::EndOfFile {
                position: self.position,
                row_count,
            });
        }
        Ok(self.position)
    }
}
