//! These structs provide the CLI interface for the nursery CLI.

use crate::error::Result;
use crate::model::{CostUpdates, SaleUpdates};
use crate::period::Period;
use crate::utils;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// nursery: keeps the books of a plant nursery in spreadsheet files.
///
/// Sales go in one sheet, costs in one sheet per month. From those the program derives how much
/// of each plant was sold in a month and at what average price, and a yearly balance sheet that
/// splits each month's margin three ways.
///
/// Start with `nursery init`, then add sales with `nursery sales add`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the nursery home, its configuration file and the folders for the sheets.
    ///
    /// The spreadsheet files go in the base directory, `data` inside the nursery home unless
    /// --base-dir says otherwise. An empty sales sheet is created there.
    Init(InitArgs),
    /// Show or change where the sheets are kept.
    Config(ConfigArgs),
    /// List, add, edit, delete or duplicate sales.
    Sales(SalesArgs),
    /// List, add, edit, delete or duplicate the costs of a month.
    Costs(CostsArgs),
    /// Show how much of each item was sold in a month, and at what average unit value.
    Frequencies(FrequenciesArgs),
    /// Show the yearly balance sheet or change how a month's margin is split.
    Balance(BalanceArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration file is held. Defaults to ~/nursery
    #[arg(long, env = "NURSERY_HOME", default_value_t = default_nursery_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for the `nursery init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Where the spreadsheet files go. A relative path is relative to the nursery home.
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Replace an existing sales sheet with an empty one.
    #[arg(long)]
    force: bool,
}

impl InitArgs {
    pub fn new(base_dir: Option<PathBuf>, force: bool) -> Self {
        Self { base_dir, force }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn force(&self) -> bool {
        self.force
    }
}

/// Args for the `nursery config` command.
#[derive(Debug, Parser, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigSubcommand,
}

impl ConfigArgs {
    pub fn action(&self) -> &ConfigSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Print the configured directories and files.
    Show,
    /// Move the base directory. Existing sheets are not moved.
    SetBase { dir: PathBuf },
    /// Keep the sales sheet in its own directory. Without DIR it goes back to the base directory.
    SetSales { dir: Option<PathBuf> },
    /// Keep the monthly costs sheets in their own directory. Without DIR they go back to the base
    /// directory.
    SetCosts { dir: Option<PathBuf> },
}

/// Selects a month. Missing values default to the current month.
#[derive(Debug, Default, Parser, Clone, Copy)]
pub struct PeriodArgs {
    /// The year, between 1900 and 2100.
    #[arg(long)]
    year: Option<i32>,

    /// The month, between 1 and 12.
    #[arg(long)]
    month: Option<u32>,
}

impl PeriodArgs {
    pub fn new(year: Option<i32>, month: Option<u32>) -> Self {
        Self { year, month }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    /// The selected month, validated.
    pub fn period(&self) -> Result<Period> {
        let current = Period::current();
        Period::new(
            self.year.unwrap_or(current.year()),
            self.month.unwrap_or(current.month()),
        )
    }
}

/// Row numbers as printed by `list`, starting at 1.
#[derive(Debug, Parser, Clone)]
pub struct RowsArgs {
    /// One or more row numbers.
    #[arg(required = true, num_args = 1..)]
    rows: Vec<usize>,
}

impl RowsArgs {
    pub fn new(rows: Vec<usize>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }
}

/// Args for the `nursery sales` command.
#[derive(Debug, Parser, Clone)]
pub struct SalesArgs {
    #[command(subcommand)]
    action: SalesSubcommand,
}

impl SalesArgs {
    pub fn new(action: SalesSubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &SalesSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SalesSubcommand {
    /// Print the sales, optionally only those of one customer or one month.
    List(ListSalesArgs),
    /// Add a sale. Fields that are not given are left blank, the date defaults to today.
    Add(Box<SaleUpdates>),
    /// Change fields of a sale.
    Edit(EditSaleArgs),
    /// Delete sales. Nothing is deleted without --yes.
    Delete(DeleteArgs),
    /// Copy sales and paste them after another row.
    Duplicate(DuplicateArgs),
}

/// Args for the `nursery sales list` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ListSalesArgs {
    /// Only sales whose customer contains this text, ignoring case.
    #[arg(long)]
    customer: Option<String>,

    /// Only sales of this year. Requires --month.
    #[arg(long, requires = "month")]
    year: Option<i32>,

    /// Only sales of this month. Without --year the current year is used.
    #[arg(long)]
    month: Option<u32>,
}

impl ListSalesArgs {
    pub fn new(customer: Option<String>, year: Option<i32>, month: Option<u32>) -> Self {
        Self {
            customer,
            year,
            month,
        }
    }

    pub fn customer(&self) -> Option<&str> {
        self.customer.as_deref()
    }

    /// The month to filter by, if any.
    pub fn period(&self) -> Result<Option<Period>> {
        match self.month {
            None => Ok(None),
            Some(_) => PeriodArgs::new(self.year, self.month).period().map(Some),
        }
    }
}

/// Args for the `nursery sales edit` command.
#[derive(Debug, Parser, Clone)]
pub struct EditSaleArgs {
    /// The row number of the sale, as printed by `list`.
    row: usize,

    #[clap(flatten)]
    updates: SaleUpdates,
}

impl EditSaleArgs {
    pub fn new(row: usize, updates: SaleUpdates) -> Self {
        Self { row, updates }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn updates(&self) -> &SaleUpdates {
        &self.updates
    }
}

/// Args for deleting rows.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    #[clap(flatten)]
    rows: RowsArgs,

    /// Confirm the deletion.
    #[arg(long)]
    yes: bool,
}

impl DeleteArgs {
    pub fn new(rows: Vec<usize>, yes: bool) -> Self {
        Self {
            rows: RowsArgs::new(rows),
            yes,
        }
    }

    pub fn rows(&self) -> &[usize] {
        self.rows.rows()
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// Args for copying rows and pasting them after another row.
#[derive(Debug, Parser, Clone)]
pub struct DuplicateArgs {
    #[clap(flatten)]
    rows: RowsArgs,

    /// The copies are inserted after this row.
    #[arg(long)]
    after: usize,
}

impl DuplicateArgs {
    pub fn new(rows: Vec<usize>, after: usize) -> Self {
        Self {
            rows: RowsArgs::new(rows),
            after,
        }
    }

    pub fn rows(&self) -> &[usize] {
        self.rows.rows()
    }

    pub fn after(&self) -> usize {
        self.after
    }
}

/// Args for the `nursery costs` command.
#[derive(Debug, Parser, Clone)]
pub struct CostsArgs {
    #[command(subcommand)]
    action: CostsSubcommand,
}

impl CostsArgs {
    pub fn new(action: CostsSubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &CostsSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CostsSubcommand {
    /// Print the costs of a month.
    List {
        #[clap(flatten)]
        period: PeriodArgs,
    },
    /// Add a cost to a month.
    Add {
        #[clap(flatten)]
        period: PeriodArgs,
        #[clap(flatten)]
        updates: CostUpdates,
    },
    /// Change fields of a cost.
    Edit {
        #[clap(flatten)]
        period: PeriodArgs,
        /// The row number of the cost, as printed by `list`.
        row: usize,
        #[clap(flatten)]
        updates: CostUpdates,
    },
    /// Delete costs. Nothing is deleted without --yes.
    Delete {
        #[clap(flatten)]
        period: PeriodArgs,
        #[clap(flatten)]
        args: DeleteArgs,
    },
    /// Copy costs and paste them after another row.
    Duplicate {
        #[clap(flatten)]
        period: PeriodArgs,
        #[clap(flatten)]
        args: DuplicateArgs,
    },
}

/// Args for the `nursery frequencies` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct FrequenciesArgs {
    #[clap(flatten)]
    period: PeriodArgs,

    /// Also write the frequencies to `frequencies_{year}_{month}` in the frequencies folder.
    #[arg(long)]
    export: bool,
}

impl FrequenciesArgs {
    pub fn new(period: PeriodArgs, export: bool) -> Self {
        Self { period, export }
    }

    pub fn period(&self) -> &PeriodArgs {
        &self.period
    }

    pub fn export(&self) -> bool {
        self.export
    }
}

/// Args for the `nursery balance` command.
#[derive(Debug, Parser, Clone)]
pub struct BalanceArgs {
    #[command(subcommand)]
    action: BalanceSubcommand,
}

impl BalanceArgs {
    pub fn new(action: BalanceSubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &BalanceSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum BalanceSubcommand {
    /// Print the balance sheet of a year.
    Show {
        /// Defaults to the current year.
        #[arg(long)]
        year: Option<i32>,
    },
    /// Set the three percentages a month's margin is split into.
    Split {
        #[clap(flatten)]
        period: PeriodArgs,
        #[arg(long, value_parser = parse_percentage)]
        a: Decimal,
        #[arg(long, value_parser = parse_percentage)]
        b: Decimal,
        #[arg(long, value_parser = parse_percentage)]
        c: Decimal,
    },
    /// Copy the percentages of one month onto other months.
    CopySplit {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        from: u32,
        #[arg(long, required = true, num_args = 1..)]
        to: Vec<u32>,
    },
    /// Put the percentages of months back to 40/40/20. Nothing changes without --yes.
    ResetSplit {
        #[arg(long)]
        year: Option<i32>,
        #[arg(required = true, num_args = 1..)]
        months: Vec<u32>,
        #[arg(long)]
        yes: bool,
    },
}

fn parse_percentage(s: &str) -> std::result::Result<Decimal, String> {
    utils::parse_amount(s.trim().trim_end_matches('%')).map(Decimal::from)
}

fn default_nursery_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("nursery"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or NURSERY_HOME instead of relying on the default \
                nursery home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("nursery")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
