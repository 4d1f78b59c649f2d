use crate::model::{or_zero, Amount, Item};
use anyhow::bail;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How much of one item was sold in a month, and at what average unit value.
///
/// Frequencies are derived from sales and replaced wholesale on every recompute. The running total
/// is kept alongside the average so that adding a sale never compounds a rounding error.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Frequency {
    item: String,
    quantity: u32,
    value: Decimal,
    total: Decimal,
}

impl Frequency {
    pub fn new(item: impl Into<String>, quantity: u32, value: Decimal) -> Self {
        Self {
            item: item.into(),
            quantity,
            value,
            total: Amount::new(value).times(quantity).value(),
        }
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The quantity weighted average unit value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn total(&self) -> Amount {
        Amount::new(self.total)
    }

    /// Folds another sale of the same item into the average. The quantity stops at `u32::MAX`.
    pub(crate) fn add(&mut self, quantity: u32, sale_total: Decimal) {
        let quantity = self.quantity.checked_add(quantity).unwrap_or_else(|| {
            warn!("The quantity sold of '{}' is past {}, capping it", self.item, u32::MAX);
            u32::MAX
        });
        if quantity == 0 {
            return;
        }
        self.total = or_zero(self.total.checked_add(sale_total), "An addition");
        self.quantity = quantity;
        self.value = self.total / Decimal::from(quantity);
    }
}

impl Item for Frequency {
    fn headers() -> &'static [&'static str] {
        &[ITEM_STR, QUANTITY_STR, UNIT_VALUE_STR, TOTAL_VALUE_STR]
    }

    fn set_with_header(&mut self, _header: &str, _value: &str) {
        // frequencies are only ever exported, never read back
    }

    fn get_by_header(&self, header: &str) -> String {
        match FrequencyColumn::from_header(header) {
            Ok(FrequencyColumn::Item) => self.item.clone(),
            Ok(FrequencyColumn::Quantity) => self.quantity.to_string(),
            Ok(FrequencyColumn::UnitValue) => self.value.round_dp(2).to_string(),
            Ok(FrequencyColumn::TotalValue) => self.total.round_dp(2).to_string(),
            Err(_) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyColumn {
    Item,
    Quantity,
    UnitValue,
    TotalValue,
}

serde_plain::derive_display_from_serialize!(FrequencyColumn);
serde_plain::derive_fromstr_from_deserialize!(FrequencyColumn);

impl FrequencyColumn {
    pub fn from_header(header: impl AsRef<str>) -> anyhow::Result<FrequencyColumn> {
        match header.as_ref() {
            ITEM_STR => Ok(FrequencyColumn::Item),
            QUANTITY_STR => Ok(FrequencyColumn::Quantity),
            UNIT_VALUE_STR => Ok(FrequencyColumn::UnitValue),
            TOTAL_VALUE_STR => Ok(FrequencyColumn::TotalValue),
            bad => bail!("Invalid frequency column name '{bad}'"),
        }
    }
}

const ITEM_STR: &str = "Item";
const QUANTITY_STR: &str = "Quantity";
const UNIT_VALUE_STR: &str = "UnitValue";
const TOTAL_VALUE_STR: &str = "TotalValue";
