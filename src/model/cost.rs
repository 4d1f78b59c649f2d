use crate::model::{Amount, Item};
use crate::store::cell;
use crate::utils;
use anyhow::bail;
use clap::Parser;
use serde::{Deserialize, Serialize};

/// Represents a single row from a monthly costs sheet. The total is typed in directly, it is not
/// derived from the quantity.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Cost {
    pub(crate) activity: String,
    pub(crate) element: String,
    pub(crate) quantity: u32,
    pub(crate) total: Amount,
}

impl Cost {
    pub fn new(
        activity: impl Into<String>,
        element: impl Into<String>,
        quantity: u32,
        total: impl Into<Amount>,
    ) -> Self {
        Self {
            activity: activity.into(),
            element: element.into(),
            quantity,
            total: total.into(),
        }
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn merge_updates(&mut self, update: CostUpdates) {
        if let Some(x) = update.activity {
            self.activity = x;
        }
        if let Some(x) = update.element {
            self.element = x;
        }
        if let Some(x) = update.quantity {
            self.quantity = x;
        }
        if let Some(x) = update.total {
            self.total = x;
        }
    }
}

impl Item for Cost {
    fn headers() -> &'static [&'static str] {
        &[ACTIVITY_STR, ELEMENT_STR, QUANTITY_STR, TOTAL_VALUE_STR]
    }

    fn set_with_header(&mut self, header: &str, value: &str) {
        match CostColumn::from_header(header) {
            Ok(CostColumn::Activity) => self.activity = value.trim().to_string(),
            Ok(CostColumn::Element) => self.element = value.trim().to_string(),
            Ok(CostColumn::Quantity) => self.quantity = cell::quantity(value),
            Ok(CostColumn::TotalValue) => self.total = cell::amount(value),
            Err(_) => {}
        }
    }

    fn get_by_header(&self, header: &str) -> String {
        match CostColumn::from_header(header) {
            Ok(CostColumn::Activity) => self.activity.clone(),
            Ok(CostColumn::Element) => self.element.clone(),
            Ok(CostColumn::Quantity) => self.quantity.to_string(),
            Ok(CostColumn::TotalValue) => self.total.to_string(),
            Err(_) => String::new(),
        }
    }
}

/// Changes to apply to a cost entry. Fields left as `None` are not changed.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize)]
pub struct CostUpdates {
    /// What the money was spent on, e.g. Watering.
    #[arg(long)]
    pub activity: Option<String>,

    /// The material or service that was bought.
    #[arg(long)]
    pub element: Option<String>,

    #[arg(long)]
    pub quantity: Option<u32>,

    /// The total paid, e.g. 35.90 or "R$ 35,90".
    #[arg(long, value_parser = utils::parse_amount)]
    pub total: Option<Amount>,
}

/// Represents the known columns of a costs sheet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostColumn {
    Activity,
    Element,
    Quantity,
    TotalValue,
}

serde_plain::derive_display_from_serialize!(CostColumn);
serde_plain::derive_fromstr_from_deserialize!(CostColumn);

impl CostColumn {
    pub fn from_header(header: impl AsRef<str>) -> anyhow::Result<CostColumn> {
        match header.as_ref().trim() {
            ACTIVITY_STR | "Atividade" => Ok(CostColumn::Activity),
            ELEMENT_STR | "Elemento" => Ok(CostColumn::Element),
            QUANTITY_STR | "Quantidade" => Ok(CostColumn::Quantity),
            TOTAL_VALUE_STR | "Valor Total" | "Valor" => Ok(CostColumn::TotalValue),
            bad => bail!("Invalid cost column name '{bad}'"),
        }
    }
}

pub(crate) const ACTIVITY_STR: &str = "Activity";
pub(crate) const ELEMENT_STR: &str = "Element";
pub(crate) const QUANTITY_STR: &str = "Quantity";
pub(crate) const TOTAL_VALUE_STR: &str = "TotalValue";
