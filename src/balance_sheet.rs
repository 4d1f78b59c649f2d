//! The yearly balance sheet: twelve months of revenue, cost, margin and profit split.

use crate::aggregate::CostSource;
use crate::collection::{Change, Collection};
use crate::config::Paths;
use crate::error::{Error, Result};
use crate::model::{revenue_in_period, Amount, BalanceLine, Sale, Splits};
use crate::period::{validate_month, validate_year, Period};
use crate::store::Store;
use std::path::Path;
use std::sync::mpsc::Receiver;
use tracing::debug;

/// Always holds exactly one line per month, January first.
#[derive(Debug)]
pub struct BalanceSheet {
    year: i32,
    lines: Collection<BalanceLine>,
}

impl BalanceSheet {
    /// Loads `balance_{year}`, creating it with twelve default lines when it is missing.
    pub fn open(store: Store, paths: &Paths, year: i32) -> Result<Self> {
        let year = validate_year(year)?;
        let seed = default_lines(year)?;
        let mut lines = Collection::new(store, paths.balance_file(year)).with_seed(seed);
        lines.load();
        let mut sheet = Self { year, lines };
        sheet.normalize()?;
        Ok(sheet)
    }

    /// Puts the loaded lines in month order and fills in missing months. The first line found for
    /// a month wins.
    fn normalize(&mut self) -> Result<()> {
        let mut lines = default_lines(self.year)?;
        let mut seen = [false; 12];
        for loaded in self.lines.data() {
            let ix = (loaded.month() - 1) as usize;
            if !seen[ix] {
                seen[ix] = true;
                lines[ix].set_splits(loaded.splits());
                lines[ix].set_totals(loaded.revenue(), loaded.cost());
            }
        }
        let missing = seen.iter().filter(|s| !**s).count();
        if missing > 0 {
            debug!("{missing} months were missing from the {} balance", self.year);
        }
        *self.lines.data_mut() = lines;
        Ok(())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn path(&self) -> &Path {
        self.lines.path()
    }

    pub fn lines(&self) -> &[BalanceLine] {
        self.lines.data()
    }

    /// The line of `month`, 1 through 12.
    pub fn line(&self, month: u32) -> Result<&BalanceLine> {
        let month = validate_month(month)?;
        self.lines
            .get((month - 1) as usize)
            .ok_or_else(|| Error::validation(format!("There is no line for month {month}")))
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.lines.has_unsaved_changes()
    }

    pub fn subscribe(&mut self) -> Receiver<Change> {
        self.lines.subscribe()
    }

    /// Recomputes the revenue and cost of every month. The sheet is saved only if a value
    /// changed. Returns true if it did.
    pub fn refresh(&mut self, sales: &[Sale], costs: CostSource<'_>) -> bool {
        let mut changed = false;
        for line in self.lines.data_mut().iter_mut() {
            let Ok(period) = Period::new(line.year(), line.month()) else {
                continue;
            };
            let revenue = revenue_in_period(sales, period);
            let cost = costs.total(period);
            if line.revenue() != revenue || line.cost() != cost {
                line.set_totals(revenue, cost);
                changed = true;
            }
        }
        if changed {
            self.lines.commit(Change::Edited);
        }
        changed
    }

    pub fn set_splits(&mut self, month: u32, splits: Splits) -> Result<()> {
        let ix = index(month)?;
        self.lines.edit(ix, |line| line.set_splits(splits))
    }

    /// Copies the percentages of `from` onto every month in `to`.
    pub fn copy_splits(&mut self, from: u32, to: &[u32]) -> Result<()> {
        let from = index(from)?;
        let to = to.iter().map(|&m| index(m)).collect::<Result<Vec<_>>>()?;
        self.lines.select([from]);
        self.lines.copy();
        self.lines.clear_selection();
        for ix in to {
            self.lines.paste(ix);
        }
        Ok(())
    }

    /// Puts the percentages of `months` back to 40/40/20.
    pub fn reset_splits(&mut self, months: &[u32]) -> Result<()> {
        let indices = months.iter().map(|&m| index(m)).collect::<Result<Vec<_>>>()?;
        self.lines.select(indices);
        self.lines.delete();
        Ok(())
    }

    /// Sets the percentages of `months` to zero, keeping the previous ones on the clipboard.
    pub fn clear_splits(&mut self, months: &[u32]) -> Result<()> {
        let indices = months.iter().map(|&m| index(m)).collect::<Result<Vec<_>>>()?;
        self.lines.select(indices);
        self.lines.cut();
        Ok(())
    }

    /// Pastes the clipboard percentages onto `month`.
    pub fn paste_splits(&mut self, month: u32) -> Result<()> {
        let ix = index(month)?;
        self.lines.paste(ix);
        Ok(())
    }

    /// Yearly revenue, cost and margin.
    pub fn totals(&self) -> (Amount, Amount, Amount) {
        let lines = self.lines.data();
        (
            lines.iter().map(BalanceLine::revenue).sum(),
            lines.iter().map(BalanceLine::cost).sum(),
            lines.iter().map(BalanceLine::margin).sum(),
        )
    }
}

fn index(month: u32) -> Result<usize> {
    Ok((validate_month(month)? - 1) as usize)
}

fn default_lines(year: i32) -> Result<Vec<BalanceLine>> {
    (1..=12)
        .map(|month| Period::new(year, month).map(BalanceLine::new))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cost, PaymentMethod};
    use crate::store::MemorySheet;
    use crate::ErrorType;
    use chrono::NaiveDate;
    use rust_decimal::prelude::*;

    fn open(sheet: &MemorySheet) -> BalanceSheet {
        BalanceSheet::open(
            Store::new(sheet.clone()),
            &Paths::with_base_dir("/base"),
            2024,
        )
        .unwrap()
    }

    fn file(sheet: &MemorySheet) -> Vec<Vec<String>> {
        sheet
            .get(Path::new("/base/balances/balance_2024.csv"))
            .unwrap()
    }

    #[test]
    fn test_created_with_defaults() {
        let sheet = MemorySheet::new();
        let balance = open(&sheet);
        assert_eq!(balance.lines().len(), 12);
        assert!(balance.lines().iter().all(|l| l.year() == 2024));
        assert_eq!(balance.line(12).unwrap().month(), 12);
        assert_eq!(balance.line(1).unwrap().splits(), Splits::default());
        let rows = file(&sheet);
        assert_eq!(rows.len(), 14);
        assert_eq!(rows[1][1], "January/2024");
        assert_eq!(rows[13][0], "TOTAL");
    }

    #[test]
    fn test_invalid_year_and_month() {
        let sheet = MemorySheet::new();
        let err =
            BalanceSheet::open(Store::new(sheet), &Paths::with_base_dir("/base"), 1800)
                .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);

        let sheet = MemorySheet::new();
        let mut balance = open(&sheet);
        assert!(balance.line(13).is_err());
        assert!(balance.set_splits(0, Splits::zero()).is_err());
    }

    #[test]
    fn test_existing_file_is_kept_and_filled() {
        let sheet = MemorySheet::new();
        let rows: Vec<Vec<String>> = vec![
            vec!["Month", "%A", "%B", "%C"],
            vec!["3", "50", "50", "0"],
            vec!["TOTAL", "", "", ""],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(String::from).collect())
        .collect();
        sheet.insert("/base/balances/balance_2024.csv", rows.clone());

        let balance = open(&sheet);
        assert_eq!(balance.lines().len(), 12);
        assert_eq!(balance.line(3).unwrap().splits().c(), Decimal::ZERO);
        assert_eq!(balance.line(4).unwrap().splits(), Splits::default());
        assert_eq!(file(&sheet), rows);
    }

    #[test]
    fn test_refresh_and_persisted_splits() {
        let sheet = MemorySheet::new();
        let mut balance = open(&sheet);
        let sales = vec![Sale::new(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            "Maria",
            "Rose",
            100,
            dec!(10),
            PaymentMethod::Cash,
        )];
        let costs = vec![Cost::new("Rent", "", 1, dec!(400))];
        assert!(balance.refresh(&sales, CostSource::InMemory(&costs)));
        assert!(!balance.refresh(&sales, CostSource::InMemory(&costs)));

        let march = balance.line(3).unwrap();
        assert_eq!(march.margin().value(), dec!(600));
        assert_eq!(march.split_amounts()[2].value(), dec!(120));
        // every month is charged the in-memory costs
        assert_eq!(balance.line(1).unwrap().margin().value(), dec!(-400));

        let (revenue, cost, margin) = balance.totals();
        assert_eq!(revenue.value(), dec!(1000));
        assert_eq!(cost.value(), dec!(4800));
        assert_eq!(margin.value(), dec!(-3800));
        assert_eq!(file(&sheet)[13][2], "1000");

        balance
            .set_splits(3, Splits::new(dec!(10), dec!(20), dec!(70)).unwrap())
            .unwrap();
        let reopened = open(&sheet);
        assert_eq!(reopened.line(3).unwrap().splits().c(), dec!(70));
        assert_eq!(reopened.line(3).unwrap().revenue().value(), dec!(1000));
    }

    #[test]
    fn test_copy_reset_and_clear_splits() {
        let sheet = MemorySheet::new();
        let mut balance = open(&sheet);
        let custom = Splits::new(dec!(60), dec!(30), dec!(10)).unwrap();
        balance.set_splits(1, custom).unwrap();
        balance.copy_splits(1, &[2, 12]).unwrap();
        assert_eq!(balance.line(2).unwrap().splits(), custom);
        assert_eq!(balance.line(12).unwrap().splits(), custom);
        assert_eq!(balance.line(3).unwrap().splits(), Splits::default());
        assert!(balance.copy_splits(1, &[13]).is_err());

        balance.reset_splits(&[2]).unwrap();
        assert_eq!(balance.line(2).unwrap().splits(), Splits::default());

        balance.clear_splits(&[12]).unwrap();
        assert_eq!(balance.line(12).unwrap().splits(), Splits::zero());
        balance.paste_splits(5).unwrap();
        assert_eq!(balance.line(5).unwrap().splits(), custom);
        assert_eq!(balance.lines().len(), 12);
    }
}
