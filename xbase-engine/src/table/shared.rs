//! Shared table handle for use across threads
//!
//! A [`Dbf`] does no locking of its own: positioned reads and the cursor
//! assume a single owner. `SharedDbf` puts one exclusive lock around a
//! handle so clones can be passed to other threads. Every call holds the
//! lock for the whole seek-and-read sequence.

use parking_lot::{Mutex, MutexGuard};
use std::io::{Read, Seek};
use std::sync::Arc;

use super::dbf::{Dbf, Row};
use crate::error::DbfResult;
use crate::value::Value;

/// Cloneable, lock-protected table handle
pub struct SharedDbf<S> {
    inner: Arc<Mutex<Dbf<S>>>,
}

impl<S> Clone for SharedDbf<S> {
    fn clone(&self) -> Self {
        SharedDbf {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Read + Seek> SharedDbf<S> {
    pub fn new(dbf: Dbf<S>) -> Self {
        SharedDbf {
            inner: Arc::new(Mutex::new(dbf)),
        }
    }

    /// Lock the handle for a sequence of calls
    pub fn lock(&self) -> MutexGuard<'_, Dbf<S>> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access to the handle
    pub fn with<R>(&self, f: impl FnOnce(&mut Dbf<S>) -> R) -> R {
        let mut dbf = self.inner.lock();
        f(&mut dbf)
    }

    pub fn read_row(&self, row: u32) -> DbfResult<Vec<u8>> {
        self.inner.lock().read_row(row)
    }

    pub fn value(&self, row: u32, column: usize) -> DbfResult<Value> {
        self.inner.lock().value(row, column)
    }

    /// Position the shared cursor and read the row there, atomically
    pub fn row_at(&self, row: u32) -> DbfResult<Row> {
        let mut dbf = self.inner.lock();
        dbf.goto(row)?;
        dbf.row()
    }

    pub fn row_count(&self) -> u32 {
        self.inner.lock().row_count()
    }

    /// Unwrap the handle if this is the last clone
    pub fn try_unwrap(self) -> Result<Dbf<S>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| SharedDbf { inner })
    }
}
