//! Types that represent the core data model, such as `Sale`, `Cost` and `BalanceLine`.
mod amount;
mod balance;
mod cost;
mod frequency;
mod items;
mod mapping;
mod payment;
mod sale;

pub(crate) use amount::or_zero;
pub use amount::{Amount, AmountError};
pub(crate) use balance::totals_row;
pub use balance::{BalanceColumn, BalanceLine, Splits};
pub use cost::{Cost, CostColumn, CostUpdates};
pub use frequency::{Frequency, FrequencyColumn};
pub(crate) use items::{parse_rows, to_rows};
pub use items::Item;
pub use mapping::{Header, Mapping, MappingError};
pub use payment::PaymentMethod;
pub use sale::{
    available_years, filter_by_customer, revenue_in_period, sales_in_period, Sale, SaleColumn,
    SaleUpdates,
};
