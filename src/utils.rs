use crate::error::Res;
use crate::model::Amount;
use anyhow::Context;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Write a file.
pub(crate) fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Res<()> {
    let path = path.as_ref();
    std::fs::write(path, contents).context(format!("Unable to write to {}", path.display()))
}

/// Read a file to a `String`.
pub(crate) fn read(path: &Path) -> Res<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Deserialize a JSON file into type `T`.
pub(crate) fn deserialize<T>(path: &Path) -> Res<T>
where
    T: DeserializeOwned,
{
    let content = read(path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file at {}", path.display()))
}

/// Create a directory and its parents. It is not an error if it already exists.
pub(crate) fn make_dir(path: impl AsRef<Path>) -> Res<()> {
    let path = path.as_ref();
    match std::fs::create_dir_all(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e).context(format!("Unable to create directory {}", path.display())),
    }
}

pub(crate) fn canonicalize(path: impl AsRef<Path>) -> Res<PathBuf> {
    let path = path.as_ref();
    path.canonicalize()
        .with_context(|| format!("Unable to canonicalize {}", path.display()))
}

/// Used by clap to parse money typed on the command line.
pub(crate) fn parse_amount(s: &str) -> Result<Amount, String> {
    let amount = Amount::from_str(s).map_err(|e| format!("Invalid amount '{s}': {e}"))?;
    if amount.is_negative() {
        return Err(format!("Invalid amount '{s}': it cannot be negative"));
    }
    Ok(amount)
}

/// Used by clap to parse dates typed on the command line, e.g. `2024-03-15` or `15/03/2024`.
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    crate::store::cell::date(s).ok_or_else(|| format!("Invalid date '{s}', use YYYY-MM-DD"))
}
