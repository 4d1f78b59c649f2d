use crate::error::{Error, Result};
use crate::model::{or_zero, Amount, Item};
use crate::period::{month_name, Period};
use crate::store::cell;
use anyhow::bail;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The three percentages a month's margin is split into. Each one is non-negative, they are not
/// required to add up to 100.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Splits {
    a: Decimal,
    b: Decimal,
    c: Decimal,
}

impl Default for Splits {
    /// 40%, 40% and 20%.
    fn default() -> Self {
        Self {
            a: Decimal::from(40),
            b: Decimal::from(40),
            c: Decimal::from(20),
        }
    }
}

impl Splits {
    pub fn new(a: Decimal, b: Decimal, c: Decimal) -> Result<Self> {
        for (name, value) in [("A", a), ("B", b), ("C", c)] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(Error::validation(format!(
                    "The percentage {name} cannot be negative, got {value}"
                )));
            }
        }
        Ok(Self { a, b, c })
    }

    pub fn zero() -> Self {
        Self {
            a: Decimal::ZERO,
            b: Decimal::ZERO,
            c: Decimal::ZERO,
        }
    }

    pub fn a(&self) -> Decimal {
        self.a
    }

    pub fn b(&self) -> Decimal {
        self.b
    }

    pub fn c(&self) -> Decimal {
        self.c
    }

    fn as_array(&self) -> [Decimal; 3] {
        [self.a, self.b, self.c]
    }
}

/// One month of the yearly balance sheet.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BalanceLine {
    pub(crate) year: i32,
    pub(crate) month: u32,
    pub(crate) revenue: Amount,
    pub(crate) cost: Amount,
    pub(crate) splits: Splits,
}

impl Default for BalanceLine {
    /// Month 0 is not a record, `parse_rows` drops lines whose month column never parsed.
    fn default() -> Self {
        Self {
            year: 0,
            month: 0,
            revenue: Amount::ZERO,
            cost: Amount::ZERO,
            splits: Splits::default(),
        }
    }
}

impl BalanceLine {
    /// An empty line for `period` with the default splits.
    pub fn new(period: Period) -> Self {
        Self {
            year: period.year(),
            month: period.month(),
            ..Default::default()
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month name and year, e.g. `March/2024`.
    pub fn name(&self) -> String {
        format!("{}/{}", month_name(self.month), self.year)
    }

    pub fn revenue(&self) -> Amount {
        self.revenue
    }

    pub fn cost(&self) -> Amount {
        self.cost
    }

    pub fn splits(&self) -> Splits {
        self.splits
    }

    pub fn set_splits(&mut self, splits: Splits) {
        self.splits = splits;
    }

    /// Replaces revenue and cost. The margin and the split amounts follow.
    pub fn set_totals(&mut self, revenue: Amount, cost: Amount) {
        self.revenue = revenue;
        self.cost = cost;
    }

    pub fn margin(&self) -> Amount {
        self.revenue - self.cost
    }

    /// The margin multiplied by each percentage and divided by 100.
    pub fn split_amounts(&self) -> [Amount; 3] {
        let margin = self.margin().value();
        self.splits
            .as_array()
            .map(|pct| {
                let product = or_zero(margin.checked_mul(pct), "A multiplication");
                Amount::new(product / Decimal::ONE_HUNDRED)
            })
    }
}

impl Item for BalanceLine {
    fn headers() -> &'static [&'static str] {
        &[
            MONTH_STR,
            NAME_STR,
            GROSS_REVENUE_STR,
            TOTAL_COST_STR,
            MARGIN_STR,
            PERCENT_A_STR,
            PERCENT_B_STR,
            PERCENT_C_STR,
            VALUE_A_STR,
            VALUE_B_STR,
            VALUE_C_STR,
        ]
    }

    fn set_with_header(&mut self, header: &str, value: &str) {
        let Ok(col) = BalanceColumn::from_header(header) else {
            return;
        };
        match col {
            BalanceColumn::Month => {
                let month = cell::quantity(value);
                self.month = if (1..=12).contains(&month) { month } else { 0 };
            }
            BalanceColumn::GrossRevenue => self.revenue = cell::amount(value),
            BalanceColumn::TotalCost => self.cost = cell::amount(value),
            BalanceColumn::PercentA => self.splits.a = percentage(value),
            BalanceColumn::PercentB => self.splits.b = percentage(value),
            BalanceColumn::PercentC => self.splits.c = percentage(value),
            BalanceColumn::Name
            | BalanceColumn::Margin
            | BalanceColumn::ValueA
            | BalanceColumn::ValueB
            | BalanceColumn::ValueC => {}
        }
    }

    fn get_by_header(&self, header: &str) -> String {
        let Ok(col) = BalanceColumn::from_header(header) else {
            return String::new();
        };
        let [value_a, value_b, value_c] = self.split_amounts();
        match col {
            BalanceColumn::Month => self.month.to_string(),
            BalanceColumn::Name => self.name(),
            BalanceColumn::GrossRevenue => self.revenue.to_string(),
            BalanceColumn::TotalCost => self.cost.to_string(),
            BalanceColumn::Margin => self.margin().to_string(),
            BalanceColumn::PercentA => self.splits.a.to_string(),
            BalanceColumn::PercentB => self.splits.b.to_string(),
            BalanceColumn::PercentC => self.splits.c.to_string(),
            BalanceColumn::ValueA => value_a.to_string(),
            BalanceColumn::ValueB => value_b.to_string(),
            BalanceColumn::ValueC => value_c.to_string(),
        }
    }

    fn is_record(&self) -> bool {
        self.month != 0
    }
}

fn percentage(value: &str) -> Decimal {
    let pct = cell::decimal(value.trim().trim_end_matches('%'));
    if pct.is_sign_negative() && !pct.is_zero() {
        warn!("Ignoring the negative percentage '{value}'");
        return Decimal::ZERO;
    }
    pct
}

/// The trailing row of a balance sheet holding the sums of every money column. It is not a record
/// and is skipped when the sheet is loaded.
pub(crate) fn totals_row(lines: &[BalanceLine]) -> Vec<String> {
    let revenue: Amount = lines.iter().map(BalanceLine::revenue).sum();
    let cost: Amount = lines.iter().map(BalanceLine::cost).sum();
    let margin: Amount = lines.iter().map(BalanceLine::margin).sum();
    let mut values = [Amount::ZERO; 3];
    for line in lines {
        for (total, amount) in values.iter_mut().zip(line.split_amounts()) {
            *total += amount;
        }
    }
    vec![
        TOTAL_STR.to_string(),
        String::new(),
        revenue.to_string(),
        cost.to_string(),
        margin.to_string(),
        String::new(),
        String::new(),
        String::new(),
        values[0].to_string(),
        values[1].to_string(),
        values[2].to_string(),
    ]
}

/// Represents the known columns of a balance sheet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceColumn {
    Month,
    Name,
    GrossRevenue,
    TotalCost,
    Margin,
    PercentA,
    PercentB,
    PercentC,
    ValueA,
    ValueB,
    ValueC,
}

serde_plain::derive_display_from_serialize!(BalanceColumn);
serde_plain::derive_fromstr_from_deserialize!(BalanceColumn);

impl BalanceColumn {
    pub fn from_header(header: impl AsRef<str>) -> anyhow::Result<BalanceColumn> {
        match header.as_ref().trim() {
            MONTH_STR | "Mês" => Ok(BalanceColumn::Month),
            NAME_STR | "Nome" => Ok(BalanceColumn::Name),
            GROSS_REVENUE_STR | "Renda Bruta" => Ok(BalanceColumn::GrossRevenue),
            TOTAL_COST_STR | "Custo Total" => Ok(BalanceColumn::TotalCost),
            MARGIN_STR | "Margem Lucro" => Ok(BalanceColumn::Margin),
            PERCENT_A_STR => Ok(BalanceColumn::PercentA),
            PERCENT_B_STR => Ok(BalanceColumn::PercentB),
            PERCENT_C_STR => Ok(BalanceColumn::PercentC),
            VALUE_A_STR => Ok(BalanceColumn::ValueA),
            VALUE_B_STR => Ok(BalanceColumn::ValueB),
            VALUE_C_STR => Ok(BalanceColumn::ValueC),
            bad => bail!("Invalid balance column name '{bad}'"),
        }
    }
}

pub(crate) const TOTAL_STR: &str = "TOTAL";

pub(super) const MONTH_STR: &str = "Month";
pub(super) const NAME_STR: &str = "Name";
pub(super) const GROSS_REVENUE_STR: &str = "GrossRevenue";
pub(super) const TOTAL_COST_STR: &str = "TotalCost";
pub(super) const MARGIN_STR: &str = "Margin";
pub(super) const PERCENT_A_STR: &str = "%A";
pub(super) const PERCENT_B_STR: &str = "%B";
pub(super) const PERCENT_C_STR: &str = "%C";
pub(super) const VALUE_A_STR: &str = "ValueA";
pub(super) const VALUE_B_STR: &str = "ValueB";
pub(super) const VALUE_C_STR: &str = "ValueC";
