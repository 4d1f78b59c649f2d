//! Implements the `Sheet` trait in memory for tests.

use crate::error::{Error, ErrorType, Result};
use crate::store::{Rows, Sheet};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Holds tables in a shared map so that a test can keep a clone and inspect what was written.
/// Writes can be made to fail to exercise error paths.
#[derive(Debug, Default, Clone)]
pub(crate) struct MemorySheet {
    tables: Rc<RefCell<HashMap<PathBuf, Rows>>>,
    writes: Rc<Cell<usize>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemorySheet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, path: impl Into<PathBuf>, rows: Rows) {
        self.tables.borrow_mut().insert(path.into(), rows);
    }

    pub(crate) fn get(&self, path: &Path) -> Option<Rows> {
        self.tables.borrow().get(path).cloned()
    }

    /// The number of successful writes so far.
    pub(crate) fn writes(&self) -> usize {
        self.writes.get()
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail)
    }
}

impl Sheet for MemorySheet {
    fn exists(&self, path: &Path) -> bool {
        self.tables.borrow().contains_key(path)
    }

    fn read(&self, path: &Path) -> Result<Rows> {
        self.get(path).ok_or_else(|| {
            Error::new(
                ErrorType::NotFound,
                anyhow::anyhow!("Sheet '{}' not found", path.display()),
            )
        })
    }

    fn write(&self, path: &Path, rows: &[Vec<String>]) -> Result<()> {
        if self.fail_writes.get() {
            return Err(Error::new(
                ErrorType::Io,
                anyhow::anyhow!("'{}' is locked by another program", path.display()),
            ));
        }
        self.insert(path, rows.to_vec());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
