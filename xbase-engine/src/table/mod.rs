//! Table handles: the open table, its row cursor and a thread-safe wrapper

pub mod cursor;
pub mod dbf;
pub mod shared;

pub use cursor::{RowCursor, ACTIVE_MARKER, DELETED_MARKER};
pub use dbf::{Dbf, Modification, Row, Table};
pub use shared::SharedDbf;
