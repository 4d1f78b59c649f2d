//! A calendar month, validated, used to select data and to derive file names.

use crate::error::{Error, Result};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// Checks that `year` is within the supported range.
pub fn validate_year(year: i32) -> Result<i32> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(Error::validation(format!(
            "Invalid year {year}, enter a year between {MIN_YEAR} and {MAX_YEAR}"
        )))
    }
}

/// Checks that `month` is within 1 and 12.
pub fn validate_month(month: u32) -> Result<u32> {
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(Error::validation(format!(
            "Invalid month {month}, enter a month between 1 and 12"
        )))
    }
}

/// A validated (year, month) pair.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        Ok(Self {
            year: validate_year(year)?,
            month: validate_month(month)?,
        })
    }

    /// The month `date` falls in. Fails for dates outside the supported years.
    pub fn of(date: NaiveDate) -> Result<Self> {
        Self::new(date.year(), date.month())
    }

    /// The current month according to the local clock.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns true if `date` falls within this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The `{year}_{month:02}` suffix used in file names, e.g. `2024_03`.
    pub fn file_suffix(&self) -> String {
        format!("{}_{:02}", self.year, self.month)
    }

    /// The English name of the month followed by the year, e.g. `March/2024`.
    pub fn label(&self) -> String {
        format!("{}/{}", month_name(self.month), self.year)
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Returns the English name of a month number, or an empty string when out of range.
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    month
        .checked_sub(1)
        .and_then(|ix| NAMES.get(ix as usize))
        .copied()
        .unwrap_or_default()
}
