//! xbase Engine - read-only FoxPro table decoder
//!
//! This crate decodes FoxPro DBF tables and their FPT memo files: header
//! and column directory parsing, row and field addressing, memo block
//! reads and a row cursor for sequential navigation.

pub mod error;
pub mod encoding;
pub mod storage;
pub mod table;
pub mod value;
pub mod fs;

#[cfg(test)]
mod testutil;

pub use encoding::EncodingConverter;
pub use error::{DbfError, DbfResult, ErrorKind};
pub use table::{Dbf, Row, SharedDbf};
pub use value::Value;
