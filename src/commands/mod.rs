//! Command handlers for the nursery CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod balance;
mod config;
mod costs;
mod frequencies;
mod init;
mod sales;

use crate::error::{Error, ErrorType};
use crate::ledger::Ledger;
use crate::period::Period;
use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::{debug, info};

pub use balance::{balance_copy_split, balance_reset_split, balance_show, balance_split};
pub use config::config;
pub use costs::{costs_add, costs_delete, costs_duplicate, costs_edit, costs_list};
pub use frequencies::frequencies;
pub use init::init;
pub use sales::{sales_add, sales_delete, sales_duplicate, sales_edit, sales_list, NumberedSale};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Turns the 1-based row numbers typed by the user into table indices.
fn row_indices(rows: &[usize], len: usize) -> Result<Vec<usize>> {
    rows.iter().map(|&row| row_index(row, len)).collect()
}

fn row_index(row: usize, len: usize) -> Result<usize> {
    if row == 0 || row > len {
        return Err(Error::validation(format!(
            "There is no row {row}, the table has {len} rows"
        )));
    }
    Ok(row - 1)
}

/// Fails if a table could not be written after a change.
fn ensure_saved(ledger: &Ledger) -> Result<()> {
    if ledger.has_unsaved_changes() {
        return Err(Error::new(
            ErrorType::Io,
            anyhow::anyhow!("The change could not be written, see the errors above"),
        ));
    }
    Ok(())
}

/// Brings the balance of every year in `periods` up to date. The ledger only follows the balance
/// of the year it was opened for.
fn refresh_years(ledger: &mut Ledger, periods: impl IntoIterator<Item = Period>) -> Result<()> {
    let by_year: BTreeMap<i32, Period> = periods.into_iter().map(|p| (p.year(), p)).collect();
    for period in by_year.into_values() {
        if period.year() != ledger.period().year() {
            ledger.set_period(period)?;
        }
    }
    Ok(())
}

fn plural(count: usize, noun: &str) -> String {
    format!("{count} {noun}{}", if count == 1 { "" } else { "s" })
}
