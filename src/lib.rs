//! nursery-ledger keeps the books of a small plant nursery in spreadsheet files: a sales sheet,
//! one costs sheet per month, per-item sales frequencies and a yearly balance sheet that splits
//! each month's margin three ways.
//!
//! The tables are edited through `Collection`s that rewrite their file after every change and
//! notify subscribers. `Ledger` wires the tables and the derived views together.

mod aggregate;
pub mod args;
mod balance_sheet;
mod collection;
pub mod commands;
mod config;
mod error;
mod frequency_view;
mod ledger;
pub mod model;
pub mod period;
pub mod store;
mod utils;


pub use aggregate::{compute_frequencies, compute_monthly_balance, total_quantity, CostSource};
pub use balance_sheet::BalanceSheet;
pub use collection::{Cardinality, Change, Collection, PasteMode, Record};
pub use config::{Config, Paths};
pub use error::{Error, ErrorType, Result};
pub use frequency_view::FrequencyView;
pub use ledger::Ledger;
pub use period::Period;
pub use store::{CsvSheet, Sheet, Store};
