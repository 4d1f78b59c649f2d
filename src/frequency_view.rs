//! The per-item frequencies of one month, kept in step with the sales table.

use crate::aggregate::compute_frequencies;
use crate::config::Paths;
use crate::error::Result;
use crate::model::{available_years, to_rows, Frequency, Item, Sale};
use crate::period::Period;
use crate::store::Store;
use indexmap::IndexMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Holds the selected month and the frequencies of its sales. A rejected year or month leaves
/// everything as it was and sets `message`.
#[derive(Debug, Clone)]
pub struct FrequencyView {
    period: Period,
    message: Option<String>,
    frequencies: IndexMap<String, Frequency>,
}

impl FrequencyView {
    pub fn new(period: Period, sales: &[Sale]) -> Self {
        Self {
            period,
            message: None,
            frequencies: compute_frequencies(sales, period),
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// The reason the last year or month was rejected, cleared by the next accepted one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn frequencies(&self) -> &IndexMap<String, Frequency> {
        &self.frequencies
    }

    pub fn set_year(&mut self, year: i32, sales: &[Sale]) -> Result<()> {
        self.try_set(Period::new(year, self.period.month()), sales)
    }

    pub fn set_month(&mut self, month: u32, sales: &[Sale]) -> Result<()> {
        self.try_set(Period::new(self.period.year(), month), sales)
    }

    pub fn set_period(&mut self, period: Period, sales: &[Sale]) {
        self.period = period;
        self.message = None;
        self.refresh(sales);
    }

    fn try_set(&mut self, period: Result<Period>, sales: &[Sale]) -> Result<()> {
        match period {
            Ok(period) => {
                self.set_period(period, sales);
                Ok(())
            }
            Err(e) => {
                warn!("{e}");
                self.message = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Recomputes the frequencies of the selected month from scratch.
    pub fn refresh(&mut self, sales: &[Sale]) {
        self.frequencies = compute_frequencies(sales, self.period);
    }

    /// When no sale happened in the selected year, moves to the latest year that has sales.
    /// Returns true if the year changed.
    pub fn adopt_available_year(&mut self, sales: &[Sale]) -> bool {
        let years = available_years(sales);
        if years.contains(&self.period.year()) {
            return false;
        }
        let Some(&latest) = years.last() else {
            return false;
        };
        match Period::new(latest, self.period.month()) {
            Ok(period) => {
                info!("There are no sales in {}, showing {latest}", self.period.year());
                self.set_period(period, sales);
                true
            }
            Err(e) => {
                warn!("Not switching to the year of the latest sales: {e}");
                false
            }
        }
    }

    /// Writes the frequencies to `frequencies_{year}_{month}` and returns its path. An existing
    /// export of the same month is replaced.
    pub fn export(&self, store: &Store, paths: &Paths) -> Result<PathBuf> {
        let path = paths.frequencies_file(self.period);
        let data: Vec<Frequency> = self.frequencies.values().cloned().collect();
        store.save(&path, Frequency::headers(), to_rows(&data))?;
        Ok(path)
    }
}
