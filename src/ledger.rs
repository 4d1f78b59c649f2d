//! Wires the datasets together: edits to sales or costs flow into the frequencies and the balance.

use crate::aggregate::CostSource;
use crate::balance_sheet::BalanceSheet;
use crate::collection::{Change, Collection};
use crate::config::{Config, Paths};
use crate::error::Result;
use crate::frequency_view::FrequencyView;
use crate::model::{Cost, Sale};
use crate::period::Period;
use crate::store::Store;
use std::sync::mpsc::Receiver;
use tracing::{debug, trace};

/// The sales table, the costs of the selected month, the frequencies of the selected month and
/// the balance of the selected year. Mutate the tables through `sales_mut` and `costs_mut`, then
/// call `refresh` to bring the derived views up to date.
#[derive(Debug)]
pub struct Ledger {
    store: Store,
    paths: Paths,
    period: Period,
    sales: Collection<Sale>,
    costs: Collection<Cost>,
    frequencies: FrequencyView,
    balance: BalanceSheet,
    sales_changes: Receiver<Change>,
    costs_changes: Receiver<Change>,
}

impl Ledger {
    /// Opens the CSV files configured in `config` for `period`.
    pub fn open(config: &Config, period: Period) -> Result<Self> {
        Self::with_store(Store::csv(), config.paths().clone(), period)
    }

    /// Opens the ledger for `period`, creating any sheet that does not exist yet.
    pub fn with_store(store: Store, paths: Paths, period: Period) -> Result<Self> {
        let mut sales = Collection::new(store.clone(), paths.sales_file());
        let sales_changes = sales.subscribe();
        sales.load();

        let mut costs = Collection::new(store.clone(), paths.costs_file(period));
        let costs_changes = costs.subscribe();
        costs.load();

        let frequencies = FrequencyView::new(period, sales.data());
        let balance = BalanceSheet::open(store.clone(), &paths, period.year())?;

        let mut ledger = Self {
            store,
            paths,
            period,
            sales,
            costs,
            frequencies,
            balance,
            sales_changes,
            costs_changes,
        };
        ledger.refresh_balance();
        ledger.drain();
        Ok(ledger)
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn sales(&self) -> &Collection<Sale> {
        &self.sales
    }

    pub fn sales_mut(&mut self) -> &mut Collection<Sale> {
        &mut self.sales
    }

    pub fn costs(&self) -> &Collection<Cost> {
        &self.costs
    }

    pub fn costs_mut(&mut self) -> &mut Collection<Cost> {
        &mut self.costs
    }

    pub fn frequencies(&self) -> &FrequencyView {
        &self.frequencies
    }

    pub fn balance(&self) -> &BalanceSheet {
        &self.balance
    }

    pub fn balance_mut(&mut self) -> &mut BalanceSheet {
        &mut self.balance
    }

    /// True when a table could not be written, i.e. a file is behind what is in memory.
    pub fn has_unsaved_changes(&self) -> bool {
        self.sales.has_unsaved_changes()
            || self.costs.has_unsaved_changes()
            || self.balance.has_unsaved_changes()
    }

    /// Selects another month. The costs sheet of that month is opened, and the balance of its
    /// year if the year changed.
    pub fn set_period(&mut self, period: Period) -> Result<()> {
        if period == self.period {
            return Ok(());
        }
        if period.year() != self.period.year() {
            self.balance = BalanceSheet::open(self.store.clone(), &self.paths, period.year())?;
        }
        self.period = period;
        self.costs.open(self.paths.costs_file(period));
        self.frequencies.set_period(period, self.sales.data());
        self.refresh();
        Ok(())
    }

    /// Selects the year of the frequencies view. A rejected year leaves the view unchanged.
    pub fn set_frequency_year(&mut self, year: i32) -> Result<()> {
        self.frequencies.set_year(year, self.sales.data())
    }

    /// Selects the month of the frequencies view. A rejected month leaves the view unchanged.
    pub fn set_frequency_month(&mut self, month: u32) -> Result<()> {
        self.frequencies.set_month(month, self.sales.data())
    }

    /// Moves the frequencies view to the latest year with sales if its year has none.
    pub fn adopt_available_year(&mut self) -> bool {
        self.frequencies.adopt_available_year(self.sales.data())
    }

    /// Handles the pending change notifications. The frequencies follow the sales, the balance
    /// follows both. Returns true if anything was recomputed.
    pub fn refresh(&mut self) -> bool {
        let (sales_changed, costs_changed) = self.drain();
        if !sales_changed && !costs_changed {
            trace!("Nothing changed");
            return false;
        }
        if sales_changed {
            self.frequencies.refresh(self.sales.data());
        }
        self.refresh_balance();
        debug!("Refreshed the views, sales changed: {sales_changed}, costs: {costs_changed}");
        true
    }

    fn refresh_balance(&mut self) {
        let costs = CostSource::MonthlyFiles {
            store: &self.store,
            paths: &self.paths,
        };
        self.balance.refresh(self.sales.data(), costs);
    }

    fn drain(&mut self) -> (bool, bool) {
        let sales = self.sales_changes.try_iter().count() > 0;
        let costs = self.costs_changes.try_iter().count() > 0;
        (sales, costs)
    }
}
