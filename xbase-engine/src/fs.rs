//! Filesystem adapter: opens a `.dbf` and its sibling memo file
//!
//! The decoders only need `Read + Seek`; this module is the default way of
//! getting such storages from paths.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::encoding::EncodingConverter;
use crate::error::{DbfError, DbfResult};
use crate::storage::header::Header;
use crate::table::Dbf;

/// Memo file extension for upper-case table names
pub const MEMO_EXT_UPPER: &str = "FPT";

/// Memo file extension otherwise
pub const MEMO_EXT_LOWER: &str = "fpt";

/// Path of the memo file belonging to a table
///
/// `DATA.DBF` pairs with `DATA.FPT`, anything else with a lower-case `.fpt`.
pub fn memo_path(table: &Path) -> PathBuf {
    let upper = table
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_uppercase() == e)
        .unwrap_or(true);
    table.with_extension(if upper { MEMO_EXT_UPPER } else { MEMO_EXT_LOWER })
}

/// Open a table from disk, together with its memo file when the header
/// declares one
pub fn open(path: &Path, converter: Box<dyn EncodingConverter>) -> DbfResult<Dbf<File>> {
    let mut file = File::open(path)?;
    let header = Header::read_from(&mut file)?;

    let memo = if header.has_memo() {
        let memo = memo_path(path);
        debug!(table = %path.display(), memo = %memo.display(), "opening memo file");
        let file = File::open(&memo).map_err(|e| {
            DbfError::Io(io::Error::new(
                e.kind(),
                format!("memo file {}: {}", memo.display(), e),
            ))
        })?;
        Some(file)
    } else {
        None
    };

    Dbf::from_header(file, header, memo, converter)
}
