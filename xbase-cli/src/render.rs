//! Plain-text rendering of table metadata and rows

use std::fmt;

use xbase_engine::storage::{Column, Header, MemoHeader, TableFlags};
use xbase_engine::Row;

/// Header summary printed by `info`
pub struct HeaderReport<'a> {
    pub header: &'a Header,
    pub memo: Option<&'a MemoHeader>,
    pub encoding: &'a str,
}

impl fmt::Display for HeaderReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header;
        writeln!(f, "File type:    0x{:02x}", header.file_type)?;
        match header.last_update() {
            Some(date) => writeln!(f, "Last update:  {}", date.format("%Y-%m-%d"))?,
            None => writeln!(f, "Last update:  (invalid)")?,
        }
        writeln!(f, "Rows:         {}", header.row_count)?;
        writeln!(f, "First row:    {}", header.first_row)?;
        writeln!(f, "Row length:   {}", header.row_length)?;
        writeln!(f, "Flags:        {}", flags(header.flags))?;
        writeln!(f, "Code page:    0x{:02x}", header.code_page)?;
        writeln!(f, "Encoding:     {}", self.encoding)?;
        if let Some(memo) = self.memo {
            writeln!(f, "Memo blocks:  {} bytes, next free {}", memo.block_size, memo.next_free)?;
        }
        Ok(())
    }
}

fn flags(flags: TableFlags) -> String {
    let names: Vec<&str> = flags.iter_names().map(|(name, _)| name).collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(" | ")
    }
}

/// Column listing printed by `columns`
pub struct ColumnTable<'a>(pub &'a [Column]);

impl fmt::Display for ColumnTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<11} {:<4} {:>6} {:>6} {:>4}", "NAME", "TYPE", "OFFSET", "LENGTH", "DEC")?;
        for column in self.0 {
            writeln!(
                f,
                "{:<11} {:<4} {:>6} {:>6} {:>4}",
                column.name, column.data_type as char, column.offset, column.length, column.decimals
            )?;
        }
        Ok(())
    }
}

/// One decoded row, `*` marking deleted rows
pub struct RowLine<'a> {
    pub row: &'a Row,
    pub names: &'a [&'a str],
}

impl fmt::Display for RowLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.row.deleted { "*" } else { " " };
        write!(f, "{}{:>6}", marker, self.row.position)?;
        for (name, value) in self.names.iter().zip(&self.row.values) {
            write!(f, "  {}={}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xbase_engine::storage::ColumnFlags;
    use xbase_engine::Value;

    #[test]
    fn test_flags() {
        assert_eq!(flags(TableFlags::empty()), "-");
        assert_eq!(flags(TableFlags::MEMO | TableFlags::STRUCTURAL_INDEX), "STRUCTURAL_INDEX | MEMO");
    }

    #[test]
    fn test_header_report() {
        let header = Header {
            file_type: 0x30,
            year: 124,
            month: 3,
            day: 15,
            row_count: 2,
            first_row: 97,
            row_length: 12,
            flags: TableFlags::MEMO,
            code_page: 0x03,
        };
        let memo = MemoHeader {
            next_free: 9,
            block_size: 64,
        };
        let report = HeaderReport {
            header: &header,
            memo: Some(&memo),
            encoding: "windows-1252",
        }
        .to_string();

        assert!(report.contains("Last update:  2024-03-15\n"));
        assert!(report.contains("Flags:        MEMO\n"));
        assert!(report.ends_with("Memo blocks:  64 bytes, next free 9\n"));
    }

    #[test]
    fn test_column_table() {
        let columns = [Column {
            name: "NAME".to_string(),
            data_type: b'C',
            displacement: 1,
            length: 10,
            decimals: 0,
            flags: ColumnFlags::empty(),
            next_autoincrement: 0,
            autoincrement_step: 0,
            offset: 1,
        }];
        let text = ColumnTable(&columns).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "NAME        C         1     10    0");
    }

    #[test]
    fn test_row() {
        let row = Row {
            position: 4,
            deleted: true,
            values: vec![Value::Character("Ada".into()), Value::Null],
        };
        let line = RowLine {
            row: &row,
            names: &["NAME", "AGE"],
        };
        assert_eq!(line.to_string(), "*     4  NAME=Ada  AGE=NULL");
    }
}
