//! Month/year partition key shared by list views and invalidation events.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::EngineError;

const MONTH_NAMES: [&str; 12] = [
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

/// A selected month, with `month` in `0..=11`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthScope {
    month: u8,
    year: i32,
}

impl MonthScope {
    pub fn new(month: u8, year: i32) -> Result<Self, EngineError> {
        if month > 11 {
            return Err(EngineError::InvalidScope(format!(
                "month must be in 0..=11, got {month}"
            )));
        }
        Ok(Self { month, year })
    }

    /// The scope a calendar date belongs to.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month0() as u8,
            year: date.year(),
        }
    }

    pub fn month(self) -> u8 {
        self.month
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Self::of(date) == self
    }

    #[must_use]
    pub fn next(self) -> Self {
        if self.month == 11 {
            Self {
                month: 0,
                year: self.year + 1,
            }
        } else {
            Self {
                month: self.month + 1,
                year: self.year,
            }
        }
    }

    #[must_use]
    pub fn prev(self) -> Self {
        if self.month == 0 {
            Self {
                month: 11,
                year: self.year - 1,
            }
        } else {
            Self {
                month: self.month - 1,
                year: self.year,
            }
        }
    }

    pub fn month_name(self) -> &'static str {
        MONTH_NAMES[usize::from(self.month)]
    }

    /// Human label, e.g. `March 2026`.
    pub fn label(self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }
}

impl core::fmt::Display for MonthScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month + 1)
    }
}
