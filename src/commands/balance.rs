//! Balance command handlers.

use crate::args::PeriodArgs;
use crate::balance_sheet::BalanceSheet;
use crate::commands::{ensure_saved, plural, Out};
use crate::ledger::Ledger;
use crate::model::{BalanceLine, Splits};
use crate::period::{validate_year, Period};
use crate::{Config, Result};
use rust_decimal::Decimal;

/// Opens the ledger on the balance of `year`, defaulting to the current year.
fn open(config: &Config, year: Option<i32>) -> Result<Ledger> {
    let current = Period::current();
    let year = validate_year(year.unwrap_or(current.year()))?;
    Ledger::open(config, Period::new(year, current.month())?)
}

/// Shows the balance sheet of a year with up to date revenue and costs.
pub fn balance_show(config: &Config, year: Option<i32>) -> Result<Out<Vec<BalanceLine>>> {
    let ledger = open(config, year)?;
    let balance = ledger.balance();
    Ok(Out::new(render(balance), balance.lines().to_vec()))
}

/// Sets the percentages of one month.
///
/// # Errors
/// - Returns an error if a percentage is negative or the year or month is out of range.
pub fn balance_split(
    config: &Config,
    period: &PeriodArgs,
    a: Decimal,
    b: Decimal,
    c: Decimal,
) -> Result<Out<BalanceLine>> {
    let splits = Splits::new(a, b, c)?;
    let period = period.period()?;
    let mut ledger = Ledger::open(config, period)?;
    ledger.balance_mut().set_splits(period.month(), splits)?;
    ensure_saved(&ledger)?;
    let line = ledger.balance().line(period.month())?.clone();
    let [value_a, value_b, value_c] = line.split_amounts();
    Ok(Out::new(
        format!(
            "{} is now split {a}/{b}/{c}: {} / {} / {}",
            line.name(),
            value_a.to_currency(),
            value_b.to_currency(),
            value_c.to_currency()
        ),
        line,
    ))
}

/// Copies the percentages of month `from` onto every month in `to`.
pub fn balance_copy_split(
    config: &Config,
    year: Option<i32>,
    from: u32,
    to: &[u32],
) -> Result<Out<Splits>> {
    let mut ledger = open(config, year)?;
    ledger.balance_mut().copy_splits(from, to)?;
    ensure_saved(&ledger)?;
    let splits = ledger.balance().line(from)?.splits();
    Ok(Out::new(
        format!(
            "Copied {}/{}/{} from {} onto {}",
            splits.a(),
            splits.b(),
            splits.c(),
            ledger.balance().line(from)?.name(),
            plural(to.len(), "month")
        ),
        splits,
    ))
}

/// Puts the percentages of `months` back to 40/40/20. Without `--yes` nothing happens.
pub fn balance_reset_split(
    config: &Config,
    year: Option<i32>,
    months: &[u32],
    yes: bool,
) -> Result<Out<()>> {
    let mut ledger = open(config, year)?;
    if !yes {
        return Ok(format!(
            "Not resetting {}, pass --yes to confirm",
            plural(months.len(), "month")
        )
        .into());
    }
    ledger.balance_mut().reset_splits(months)?;
    ensure_saved(&ledger)?;
    Ok(format!("Reset {} to 40/40/20", plural(months.len(), "month")).into())
}

fn render(balance: &BalanceSheet) -> String {
    let mut out = format!(
        "Balance {}\n{:<16} {:>14} {:>14} {:>14}   {:>17}   {:>14} {:>14} {:>14}",
        balance.year(),
        "Month",
        "Revenue",
        "Cost",
        "Margin",
        "%A/%B/%C",
        "A",
        "B",
        "C"
    );
    for line in balance.lines() {
        let splits = line.splits();
        let [a, b, c] = line.split_amounts();
        out.push_str(&format!(
            "\n{:<16} {:>14} {:>14} {:>14}   {:>17}   {:>14} {:>14} {:>14}",
            line.name(),
            line.revenue().to_currency(),
            line.cost().to_currency(),
            line.margin().to_currency(),
            format!("{}/{}/{}", splits.a(), splits.b(), splits.c()),
            a.to_currency(),
            b.to_currency(),
            c.to_currency(),
        ));
    }
    let (revenue, cost, margin) = balance.totals();
    out.push_str(&format!(
        "\n{:<16} {:>14} {:>14} {:>14}",
        "TOTAL",
        revenue.to_currency(),
        cost.to_currency(),
        margin.to_currency()
    ));
    out
}
