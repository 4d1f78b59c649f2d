//! Views derived from the sales and costs tables. Everything here is recomputed from scratch.

use crate::config::Paths;
use crate::error::ErrorType;
use crate::model::{
    parse_rows, revenue_in_period, sales_in_period, Amount, BalanceLine, Cost, Frequency, Sale,
    Splits,
};
use crate::period::Period;
use crate::store::Store;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Groups the sales of `period` by item. Each item's quantity is the sum of its sales and its
/// value is the quantity weighted average unit price. Sales of zero units are skipped. Items
/// appear in the order of their first sale.
pub fn compute_frequencies(sales: &[Sale], period: Period) -> IndexMap<String, Frequency> {
    let mut frequencies: IndexMap<String, Frequency> = IndexMap::new();
    for sale in sales_in_period(sales, period) {
        if sale.quantity() == 0 {
            continue;
        }
        match frequencies.get_mut(sale.item()) {
            Some(frequency) => frequency.add(sale.quantity(), sale.total().value()),
            None => {
                frequencies.insert(
                    sale.item().to_string(),
                    Frequency::new(sale.item(), sale.quantity(), sale.unit_price().value()),
                );
            }
        }
    }
    debug!("Computed {} frequencies for {period}", frequencies.len());
    frequencies
}

/// Where the costs of a month come from.
#[derive(Debug, Clone, Copy)]
pub enum CostSource<'a> {
    /// The `TotalValue` column of the monthly costs sheet of the month being computed. A month
    /// without a sheet costs nothing.
    MonthlyFiles { store: &'a Store, paths: &'a Paths },
    /// These costs, whatever the month.
    InMemory(&'a [Cost]),
}

impl CostSource<'_> {
    pub fn total(&self, period: Period) -> Amount {
        match self {
            CostSource::InMemory(costs) => costs.iter().map(Cost::total).sum(),
            CostSource::MonthlyFiles { store, paths } => {
                let path = paths.costs_file(period);
                let rows = match store.load(&path) {
                    Ok(rows) => rows,
                    Err(e) if e.error_type() == ErrorType::NotFound => {
                        return Amount::ZERO;
                    }
                    Err(e) => {
                        warn!("Counting the costs of {period} as zero: {e}");
                        return Amount::ZERO;
                    }
                };
                match parse_rows::<Cost>(&rows) {
                    Ok(costs) => costs.iter().map(Cost::total).sum(),
                    Err(e) => {
                        warn!(
                            "Counting the costs of {period} as zero, '{}' is malformed: {e:#}",
                            path.display()
                        );
                        Amount::ZERO
                    }
                }
            }
        }
    }
}

/// Builds the balance line of `period`: the revenue of its sales, its costs, and the margin split
/// with `splits`.
pub fn compute_monthly_balance(
    sales: &[Sale],
    costs: CostSource<'_>,
    period: Period,
    splits: Splits,
) -> BalanceLine {
    let mut line = BalanceLine::new(period);
    line.set_totals(revenue_in_period(sales, period), costs.total(period));
    line.set_splits(splits);
    line
}

/// The sum of the quantities of `frequencies`.
pub fn total_quantity(frequencies: &IndexMap<String, Frequency>) -> Decimal {
    frequencies
        .values()
        .map(|f| Decimal::from(f.quantity()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PaymentMethod;
    use crate::store::MemorySheet;
    use chrono::NaiveDate;
    use rust_decimal::prelude::*;

    fn sale(date: (i32, u32, u32), item: &str, quantity: u32, price: Decimal) -> Sale {
        Sale::new(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            "Maria",
            item,
            quantity,
            price,
            PaymentMethod::Cash,
        )
    }

    fn march() -> Period {
        Period::new(2024, 3).unwrap()
    }

    #[test]
    fn test_single_sale() {
        let sales = vec![sale((2024, 3, 15), "Rose", 10, dec!(5.00))];
        let frequencies = compute_frequencies(&sales, march());
        assert_eq!(frequencies.len(), 1);
        let rose = &frequencies["Rose"];
        assert_eq!(rose.quantity(), 10);
        assert_eq!(rose.value(), dec!(5.00));
        assert_eq!(rose.total().value(), dec!(50.00));
    }

    #[test]
    fn test_quantities_sum_per_item() {
        let sales = vec![
            sale((2024, 3, 1), "Rose", 10, dec!(5)),
            sale((2024, 3, 2), "Fern", 4, dec!(12)),
            sale((2024, 3, 3), "Rose", 7, dec!(6)),
            sale((2024, 3, 4), "Rose", 3, dec!(4)),
            sale((2024, 4, 1), "Rose", 100, dec!(1)),
        ];
        let frequencies = compute_frequencies(&sales, march());
        assert_eq!(frequencies["Rose"].quantity(), 20);
        assert_eq!(frequencies["Fern"].quantity(), 4);
        assert_eq!(total_quantity(&frequencies), dec!(24));
        assert_eq!(frequencies["Rose"].total().value(), dec!(104));
        assert_eq!(frequencies["Rose"].value(), dec!(5.2));
    }

    #[test]
    fn test_uniform_price_is_the_average() {
        let sales: Vec<Sale> = (1..=9)
            .map(|q| sale((2024, 3, q), "Orchid", q * 3, dec!(7.33)))
            .collect();
        let frequencies = compute_frequencies(&sales, march());
        assert_eq!(frequencies["Orchid"].value(), dec!(7.33));
    }

    #[test]
    fn test_first_occurrence_order_and_zero_quantity() {
        let sales = vec![
            sale((2024, 3, 1), "Ghost", 0, dec!(9)),
            sale((2024, 3, 2), "Fern", 1, dec!(1)),
            sale((2024, 3, 3), "Rose", 1, dec!(1)),
            sale((2024, 3, 4), "Fern", 1, dec!(1)),
        ];
        let frequencies = compute_frequencies(&sales, march());
        let keys: Vec<&str> = frequencies.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Fern", "Rose"]);
    }

    #[test]
    fn test_extreme_sales_do_not_panic() {
        let sales = vec![
            sale((2024, 3, 1), "Rose", 10, Decimal::MAX),
            sale((2024, 3, 2), "Fern", u32::MAX, dec!(0)),
            sale((2024, 3, 3), "Fern", 1, dec!(0)),
        ];
        let frequencies = compute_frequencies(&sales, march());
        assert_eq!(frequencies["Rose"].total().value(), dec!(0));
        assert_eq!(frequencies["Fern"].quantity(), u32::MAX);
        assert_eq!(revenue_in_period(&sales, march()).value(), dec!(0));
    }

    #[test]
    fn test_empty_period() {
        assert!(compute_frequencies(&[], march()).is_empty());
    }

    #[test]
    fn test_monthly_balance_in_memory() {
        let sales = vec![
            sale((2024, 3, 1), "Rose", 100, dec!(6)),
            sale((2024, 3, 9), "Fern", 10, dec!(40)),
            sale((2024, 2, 9), "Fern", 10, dec!(40)),
        ];
        let costs = vec![
            Cost::new("Watering", "Hose", 1, dec!(150)),
            Cost::new("Rent", "", 1, dec!(250)),
        ];
        let line = compute_monthly_balance(
            &sales,
            CostSource::InMemory(&costs),
            march(),
            Splits::default(),
        );
        assert_eq!(line.revenue().value(), dec!(1000));
        assert_eq!(line.cost().value(), dec!(400));
        assert_eq!(line.margin().value(), dec!(600));
        let [a, b, c] = line.split_amounts();
        assert_eq!(a.value(), dec!(240));
        assert_eq!(b.value(), dec!(240));
        assert_eq!(c.value(), dec!(120));
    }

    #[test]
    fn test_monthly_balance_from_cost_files() {
        let sheet = MemorySheet::new();
        let store = Store::new(sheet.clone());
        let paths = Paths::with_base_dir("/base");
        let to_strings = |rows: Vec<Vec<&str>>| -> Vec<Vec<String>> {
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect()
        };
        sheet.insert(
            paths.costs_file(march()),
            to_strings(vec![
                vec!["Activity", "Element", "Quantity", "TotalValue"],
                vec!["Watering", "Hose", "1", "35.90"],
                vec!["Rent", "", "1", "R$ 1.000,10"],
            ]),
        );
        let source = CostSource::MonthlyFiles {
            store: &store,
            paths: &paths,
        };
        assert_eq!(source.total(march()).value(), dec!(1036.00));
        let april = Period::new(2024, 4).unwrap();
        assert_eq!(source.total(april), Amount::ZERO);
        let line = compute_monthly_balance(&[], source, april, Splits::zero());
        assert_eq!(line.margin(), Amount::ZERO);
    }
}
