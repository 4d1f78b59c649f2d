//! Frequencies command handler.

use crate::aggregate::total_quantity;
use crate::args::FrequenciesArgs;
use crate::commands::{plural, Out};
use crate::ledger::Ledger;
use crate::model::{Amount, Frequency};
use crate::period::Period;
use crate::{Config, Result};

/// Shows how much of each item was sold in a month and the average unit value it sold for.
///
/// Without `--year`, and when nothing was sold in the current year, the latest year with sales
/// is shown instead. With `--export` the frequencies are also written to
/// `frequencies_{year}_{month}`, replacing an earlier export of the same month.
///
/// # Errors
/// - Returns an error if the year or month is out of range.
/// - Returns an error if the export could not be written.
pub fn frequencies(config: &Config, args: &FrequenciesArgs) -> Result<Out<Vec<Frequency>>> {
    let mut ledger = Ledger::open(config, Period::current())?;
    if let Some(year) = args.period().year() {
        ledger.set_frequency_year(year)?;
    }
    if let Some(month) = args.period().month() {
        ledger.set_frequency_month(month)?;
    }
    if args.period().year().is_none() {
        ledger.adopt_available_year();
    }

    let view = ledger.frequencies();
    let frequencies: Vec<Frequency> = view.frequencies().values().cloned().collect();
    let total: Amount = frequencies.iter().map(Frequency::total).sum();
    let mut message = format!(
        "{} sold in {}: {} units for {}",
        plural(frequencies.len(), "item"),
        view.period().label(),
        total_quantity(view.frequencies()),
        total.to_currency(),
    );
    for frequency in &frequencies {
        message.push_str(&format!(
            "\n{:<24} {:>6} x {:>12} = {:>14}",
            frequency.item(),
            frequency.quantity(),
            Amount::new(frequency.value().round_dp(2)).to_currency(),
            frequency.total().to_currency(),
        ));
    }
    if args.export() {
        let path = view.export(ledger.store(), ledger.paths())?;
        message.push_str(&format!("\nExported to {}", path.display()));
    }
    Ok(Out::new(message, frequencies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::PeriodArgs;
    use crate::model::{PaymentMethod, Sale};
    use crate::test::TestEnv;
    use crate::ErrorType;
    use chrono::NaiveDate;
    use rust_decimal::prelude::*;

    fn sale(y: i32, m: u32, item: &str, quantity: u32, price: Decimal) -> Sale {
        Sale::new(
            NaiveDate::from_ymd_opt(y, m, 10).unwrap(),
            "Maria",
            item,
            quantity,
            price,
            PaymentMethod::Cash,
        )
    }

    #[test]
    fn test_frequencies_of_a_month() {
        let env = TestEnv::new();
        env.write_sales(&[
            sale(2024, 3, "Rose", 10, dec!(5.00)),
            sale(2024, 3, "Fern", 1, dec!(12)),
            sale(2024, 3, "Rose", 5, dec!(8.00)),
            sale(2024, 4, "Rose", 50, dec!(1)),
        ]);
        let args = FrequenciesArgs::new(PeriodArgs::new(Some(2024), Some(3)), false);
        let out = frequencies(&env.config(), &args).unwrap();
        let frequencies = out.structure().unwrap();
        assert_eq!(frequencies.len(), 2);
        assert_eq!(frequencies[0].item(), "Rose");
        assert_eq!(frequencies[0].quantity(), 15);
        assert_eq!(frequencies[0].value(), dec!(6));
        assert!(out.message().starts_with("2 items sold in March/2024: 16 units for R$ 102.00"));
    }

    #[test]
    fn test_export() {
        let env = TestEnv::new();
        env.write_sales(&[sale(2024, 3, "Rose", 10, dec!(5.00))]);
        let config = env.config();
        let args = FrequenciesArgs::new(PeriodArgs::new(Some(2024), Some(3)), true);
        frequencies(&config, &args).unwrap();
        let path = config
            .paths()
            .frequencies_file(Period::new(2024, 3).unwrap());
        let rows = env.read(&path);
        assert_eq!(rows[1], vec!["Rose", "10", "5.00", "50.00"]);
    }

    #[test]
    fn test_latest_year_is_adopted() {
        let env = TestEnv::new();
        env.write_sales(&[sale(2019, 3, "Rose", 10, dec!(5.00))]);
        let args = FrequenciesArgs::new(PeriodArgs::new(None, Some(3)), false);
        let out = frequencies(&env.config(), &args).unwrap();
        assert_eq!(out.structure().unwrap().len(), 1);
        assert!(out.message().contains("March/2019"));
    }

    #[test]
    fn test_rejected_period() {
        let env = TestEnv::new();
        let args = FrequenciesArgs::new(PeriodArgs::new(Some(1800), Some(3)), false);
        let err = frequencies(&env.config(), &args).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        let args = FrequenciesArgs::new(PeriodArgs::new(Some(2024), Some(0)), false);
        assert!(frequencies(&env.config(), &args).is_err());
    }
}
