//! Implements the `Sheet` trait with CSV files on disk.

use crate::error::{ErrorType, IntoResult, Result};
use crate::store::{Rows, Sheet};
use anyhow::Context;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A `Sheet` where every table is a CSV file. Writes go to a hidden sibling file that is then
/// renamed over the target, so a failed write never leaves a half-written table behind.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvSheet;

impl Sheet for CsvSheet {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> Result<Rows> {
        let file = File::open(path)
            .with_context(|| format!("Unable to open {}", path.display()))
            .pub_result(ErrorType::Io)?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut rows = Rows::new();
        for result in rdr.records() {
            let record = result
                .with_context(|| format!("Unable to parse {} as a table", path.display()))
                .pub_result(ErrorType::CorruptFormat)?;
            rows.push(record.iter().map(|field| field.to_string()).collect());
        }
        Ok(rows)
    }

    fn write(&self, path: &Path, rows: &[Vec<String>]) -> Result<()> {
        write_atomic(path, rows).pub_result(ErrorType::Io)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

fn write_atomic(path: &Path, rows: &[Vec<String>]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Unable to create directory {}", parent.display()))?;
    }

    let tmp = temp_path(path);
    let file =
        File::create(&tmp).with_context(|| format!("Unable to create file {}", tmp.display()))?;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
    for row in rows {
        wtr.write_record(row)
            .with_context(|| format!("Unable to write a row to {}", tmp.display()))?;
    }
    wtr.flush()
        .with_context(|| format!("Unable to flush {}", tmp.display()))?;
    drop(wtr);

    std::fs::rename(&tmp, path).with_context(|| {
        format!(
            "Unable to move '{}' to '{}'",
            tmp.display(),
            path.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");
        let rows = vec![
            vec!["Item".to_string(), "Quantity".to_string()],
            vec!["Rose, red".to_string(), "10".to_string()],
        ];
        CsvSheet.write(&path, &rows).unwrap();
        let first = std::fs::read(&path).unwrap();
        CsvSheet.write(&path, &rows).unwrap();
        let second = std::fs::read(&path).unwrap();
        assert_eq!(first, second);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_read_ragged_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ragged.csv");
        std::fs::write(&path, "A,B,C\n1,2\n3,4,5\n").unwrap();
        let rows = CsvSheet.read(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["1", "2"]);
    }

    #[test]
    fn test_read_binary_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.csv");
        std::fs::write(&path, [0x50, 0x4b, 0x03, 0x04, 0xff, 0xfe, 0x00, 0xc3]).unwrap();
        let err = CsvSheet.read(&path).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::CorruptFormat);
    }

    #[test]
    fn test_write_into_missing_dir_creates_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("t.csv");
        CsvSheet.write(&path, &[vec!["x".to_string()]]).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_write_to_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("occupied");
        std::fs::create_dir(&target).unwrap();
        let err = CsvSheet.write(&target, &[vec!["x".to_string()]]).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Io);
    }
}
