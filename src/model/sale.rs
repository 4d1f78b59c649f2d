use crate::model::{Amount, Item, PaymentMethod};
use crate::period::Period;
use crate::store::cell;
use crate::utils;
use anyhow::bail;
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// Represents a single row from the sales sheet.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Sale {
    pub(crate) date: NaiveDate,
    pub(crate) customer: String,
    pub(crate) item: String,
    pub(crate) quantity: u32,
    pub(crate) unit_price: Amount,
    pub(crate) payment: PaymentMethod,
}

impl Sale {
    pub fn new(
        date: NaiveDate,
        customer: impl Into<String>,
        item: impl Into<String>,
        quantity: u32,
        unit_price: impl Into<Amount>,
        payment: PaymentMethod,
    ) -> Self {
        Self {
            date,
            customer: customer.into(),
            item: item.into(),
            quantity,
            unit_price: unit_price.into(),
            payment,
        }
    }

    /// A blank sale dated today and paid in cash.
    pub fn today() -> Self {
        Self {
            date: Local::now().date_naive(),
            ..Default::default()
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn customer(&self) -> &str {
        &self.customer
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Amount {
        self.unit_price
    }

    pub fn payment(&self) -> PaymentMethod {
        self.payment
    }

    /// The quantity multiplied by the unit price.
    pub fn total(&self) -> Amount {
        self.unit_price.times(self.quantity)
    }

    /// Returns true if the customer contains `needle`, ignoring case. An empty needle matches.
    pub fn matches_customer(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty() || self.customer.to_lowercase().contains(&needle)
    }

    pub fn merge_updates(&mut self, update: SaleUpdates) {
        if let Some(x) = update.date {
            self.date = x;
        }
        if let Some(x) = update.customer {
            self.customer = x;
        }
        if let Some(x) = update.item {
            self.item = x;
        }
        if let Some(x) = update.quantity {
            self.quantity = x;
        }
        if let Some(x) = update.unit_price {
            self.unit_price = x;
        }
        if let Some(x) = update.payment {
            self.payment = x;
        }
    }
}

impl Item for Sale {
    fn headers() -> &'static [&'static str] {
        &[
            DATE_STR,
            ITEM_STR,
            QUANTITY_STR,
            UNIT_VALUE_STR,
            TOTAL_VALUE_STR,
            CUSTOMER_STR,
            PAYMENT_METHOD_STR,
        ]
    }

    fn set_with_header(&mut self, header: &str, value: &str) {
        let Ok(col) = SaleColumn::from_header(header) else {
            return;
        };
        match col {
            SaleColumn::Date => match cell::date(value) {
                Some(date) => self.date = date,
                None => warn!(
                    "Unable to read the date '{value}' of a sale, it will be shown as {}",
                    self.date
                ),
            },
            SaleColumn::Item => self.item = value.trim().to_string(),
            SaleColumn::Quantity => self.quantity = cell::quantity(value),
            SaleColumn::UnitValue => self.unit_price = cell::amount(value),
            // derived from quantity and unit value
            SaleColumn::TotalValue => {}
            SaleColumn::Customer => self.customer = value.trim().to_string(),
            SaleColumn::PaymentMethod => self.payment = PaymentMethod::from_cell(value),
        }
    }

    fn get_by_header(&self, header: &str) -> String {
        match SaleColumn::from_header(header) {
            Ok(SaleColumn::Date) => self.date.format("%Y-%m-%d").to_string(),
            Ok(SaleColumn::Item) => self.item.clone(),
            Ok(SaleColumn::Quantity) => self.quantity.to_string(),
            Ok(SaleColumn::UnitValue) => self.unit_price.to_string(),
            Ok(SaleColumn::TotalValue) => self.total().to_string(),
            Ok(SaleColumn::Customer) => self.customer.clone(),
            Ok(SaleColumn::PaymentMethod) => self.payment.to_string(),
            Err(_) => String::new(),
        }
    }
}

/// Changes to apply to a sale. Fields left as `None` are not changed.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize)]
pub struct SaleUpdates {
    /// The date of the sale, e.g. 2024-03-15.
    #[arg(long, value_parser = utils::parse_date)]
    pub date: Option<NaiveDate>,

    /// The name of the customer.
    #[arg(long)]
    pub customer: Option<String>,

    /// The plant or product that was sold.
    #[arg(long)]
    pub item: Option<String>,

    /// How many units were sold.
    #[arg(long)]
    pub quantity: Option<u32>,

    /// The price of one unit, e.g. 5.00 or "R$ 5,00".
    #[arg(long, value_parser = utils::parse_amount)]
    pub unit_price: Option<Amount>,

    /// How the customer paid.
    #[arg(long, value_enum)]
    pub payment: Option<PaymentMethod>,
}

/// The sorted, distinct years in which at least one sale happened.
pub fn available_years(sales: &[Sale]) -> Vec<i32> {
    sales
        .iter()
        .map(|s| s.date.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The sales whose customer contains `needle`, ignoring case. An empty needle matches everything.
pub fn filter_by_customer<'a>(sales: &'a [Sale], needle: &str) -> Vec<&'a Sale> {
    sales.iter().filter(|s| s.matches_customer(needle)).collect()
}

pub fn sales_in_period(sales: &[Sale], period: Period) -> impl Iterator<Item = &Sale> {
    sales.iter().filter(move |s| period.contains(s.date))
}

/// The sum of the totals of the sales made in `period`.
pub fn revenue_in_period(sales: &[Sale], period: Period) -> Amount {
    sales_in_period(sales, period).map(Sale::total).sum()
}

/// Represents the known columns of the sales sheet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleColumn {
    Date,
    Item,
    Quantity,
    UnitValue,
    TotalValue,
    Customer,
    PaymentMethod,
}

serde_plain::derive_display_from_serialize!(SaleColumn);
serde_plain::derive_fromstr_from_deserialize!(SaleColumn);

impl SaleColumn {
    /// Matches the English headers and the Portuguese ones found in older sheets.
    pub fn from_header(header: impl AsRef<str>) -> anyhow::Result<SaleColumn> {
        match header.as_ref().trim() {
            DATE_STR | "Data" => Ok(SaleColumn::Date),
            ITEM_STR | "Planta" | "Produto" => Ok(SaleColumn::Item),
            QUANTITY_STR | "Quantidade" => Ok(SaleColumn::Quantity),
            UNIT_VALUE_STR | "Valor" | "Valor Unitário" => Ok(SaleColumn::UnitValue),
            TOTAL_VALUE_STR | "Valor Total" => Ok(SaleColumn::TotalValue),
            CUSTOMER_STR | "Cliente" => Ok(SaleColumn::Customer),
            PAYMENT_METHOD_STR | "Forma de Pagamento" | "FormaPagamento" => {
                Ok(SaleColumn::PaymentMethod)
            }
            bad => bail!("Invalid sale column name '{bad}'"),
        }
    }
}

pub(super) const DATE_STR: &str = "Date";
pub(super) const ITEM_STR: &str = "Item";
pub(super) const QUANTITY_STR: &str = "Quantity";
pub(super) const UNIT_VALUE_STR: &str = "UnitValue";
pub(super) const TOTAL_VALUE_STR: &str = "TotalValue";
pub(super) const CUSTOMER_STR: &str = "Customer";
pub(super) const PAYMENT_METHOD_STR: &str = "PaymentMethod";
