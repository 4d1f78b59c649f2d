//! Reading and writing tables of cells to and from spreadsheet files.
//!
//! The `Sheet` trait is the seam between the record-keeping logic and the file format. `CsvSheet`
//! is what the application uses; tests may use the in-memory `MemorySheet`. `Store` wraps a sheet
//! and owns the file lifecycle policy: a file is created with only its header row when it is
//! missing, and an existing file is never replaced by that step unless forced.

pub(crate) mod cell;
mod csv_sheet;
#[cfg(test)]
mod memory_sheet;

use crate::error::{Error, ErrorType, Result};
use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, trace};

pub use csv_sheet::CsvSheet;
#[cfg(test)]
pub(crate) use memory_sheet::MemorySheet;

/// A table of cells. The first row is the header row.
pub type Rows = Vec<Vec<String>>;

/// Something that can hold tables of cells addressed by path.
pub trait Sheet {
    /// Returns true if a table exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Reads every row at `path`, header row included.
    ///
    /// # Errors
    /// - `ErrorType::NotFound` if nothing exists at `path`
    /// - `ErrorType::CorruptFormat` if the contents are not tabular
    /// - `ErrorType::Io` if the file cannot be read
    fn read(&self, path: &Path) -> Result<Rows>;

    /// Replaces whatever is at `path` with `rows`.
    ///
    /// # Errors
    /// - `ErrorType::Io` if the file cannot be written
    fn write(&self, path: &Path, rows: &[Vec<String>]) -> Result<()>;
}

/// A cheaply clonable handle to a `Sheet` that implements load, save and create-if-missing.
#[derive(Clone)]
pub struct Store {
    sheet: Rc<dyn Sheet>,
}

impl Debug for Store {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Store")
    }
}

impl Store {
    pub fn new(sheet: impl Sheet + 'static) -> Self {
        Self {
            sheet: Rc::new(sheet),
        }
    }

    /// A store backed by CSV files on disk.
    pub fn csv() -> Self {
        Self::new(CsvSheet)
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.sheet.exists(path)
    }

    /// Loads the rows at `path`, header row included. The caller is expected to create the file
    /// when this returns `ErrorType::NotFound`.
    pub fn load(&self, path: &Path) -> Result<Rows> {
        if !self.sheet.exists(path) {
            return Err(Error::new(
                ErrorType::NotFound,
                anyhow::anyhow!("No sheet exists at {}", path.display()),
            ));
        }
        let rows = self.sheet.read(path)?;
        trace!("Loaded {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    /// Rewrites `path` with `header` followed by `rows`.
    pub fn save<H, S>(
        &self,
        path: &Path,
        header: &[H],
        rows: impl IntoIterator<Item = Vec<S>>,
    ) -> Result<()>
    where
        H: AsRef<str>,
        S: Into<String>,
    {
        let mut table: Rows = vec![header.iter().map(|h| h.as_ref().to_string()).collect()];
        table.extend(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect()),
        );
        self.sheet.write(path, &table)?;
        debug!("Saved {} rows to {}", table.len() - 1, path.display());
        Ok(())
    }

    /// Writes a table holding `header` and `rows` if `path` does not exist yet. An existing file is
    /// left untouched unless `force` is true. Returns true if a file was written.
    pub fn create_if_missing<H, S>(
        &self,
        path: &Path,
        header: &[H],
        rows: impl IntoIterator<Item = Vec<S>>,
        force: bool,
    ) -> Result<bool>
    where
        H: AsRef<str>,
        S: Into<String>,
    {
        if self.sheet.exists(path) && !force {
            debug!(
                "Not creating {} because it already exists",
                path.display()
            );
            return Ok(false);
        }
        self.save(path, header, rows)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = Store::csv();
        let err = store.load(&dir.path().join("nope.csv")).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("costs").join("costs_2024_03.csv");
        let store = Store::csv();
        store
            .save(
                &path,
                &["Activity", "Element", "Quantity", "TotalValue"],
                vec![vec!["Watering", "Hose, green", "1", "35.90"]],
            )
            .unwrap();
        let rows = store.load(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["Activity", "Element", "Quantity", "TotalValue"],
                vec!["Watering", "Hose, green", "1", "35.90"],
            ]
        );
    }

    #[test]
    fn test_create_if_missing_never_clobbers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sales.csv");
        let store = Store::csv();
        store.save(&path, &["Item"], vec![vec!["Rose"]]).unwrap();

        let created = store
            .create_if_missing(&path, &["Item"], Vec::<Vec<String>>::new(), false)
            .unwrap();
        assert!(!created);
        assert_eq!(store.load(&path).unwrap().len(), 2);

        let created = store
            .create_if_missing(&path, &["Item"], Vec::<Vec<String>>::new(), true)
            .unwrap();
        assert!(created);
        assert_eq!(store.load(&path).unwrap(), vec![vec!["Item".to_string()]]);
    }

    #[test]
    fn test_create_if_missing_creates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("new.csv");
        let store = Store::csv();
        let created = store
            .create_if_missing(&path, &["A", "B"], vec![vec!["1", "2"]], false)
            .unwrap();
        assert!(created);
        assert_eq!(store.load(&path).unwrap(), vec![vec!["A", "B"], vec!["1", "2"]]);
    }
}
