//! Calendar period utilities.
//!
//! A [`Period`] is one calendar month, canonically written `YYYY-MM`. All
//! recurring-bill math in the crate is keyed on periods: the monthly status
//! table, the projection engine, and the reminder scheduler. Ordering on
//! `Period` is chronological, which coincides with lexicographic ordering of
//! the zero-padded canonical form.

use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, e.g. `2024-05`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Builds a period from year and month (1-12).
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidPeriod {
                value: format!("{year:04}-{month:02}"),
            });
        }
        Ok(Self { year, month })
    }

    /// The period containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The period containing the current UTC date.
    #[must_use]
    pub fn current() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    /// Year component.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month component (1-12).
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// The previous calendar month.
    #[must_use]
    pub const fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The next calendar month.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First day of the period.
    ///
    /// # Panics
    /// Never: the month is validated at construction.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_else(|| unreachable!("month is validated at construction"))
    }

    /// Number of days in the period (handles leap years).
    #[must_use]
    pub fn days_in_month(self) -> u32 {
        let first_of_next = self.next().first_day();
        first_of_next.pred_opt().map_or(28, |d| d.day())
    }

    /// The date a bill with the given `due_day` falls due within this period.
    ///
    /// Days beyond the end of a short month clamp to the last day: due day 31
    /// in February yields Feb 28 (or 29). The source this models rolled such
    /// dates into the following month, which was inconsistent with the rest
    /// of its period math; clamping keeps the due date inside the period.
    #[must_use]
    pub fn due_date(self, due_day: u8) -> NaiveDate {
        let day = u32::from(due_day).min(self.days_in_month()).max(1);
        NaiveDate::from_ymd_opt(self.year, self.month, day)
            .unwrap_or_else(|| self.first_day())
    }

    /// Human-readable label, e.g. `"March 2024"`.
    #[must_use]
    pub fn label(self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    /// Periods from `range` months before to `range` months after `self`,
    /// inclusive, in ascending order. Used by month-selector UIs.
    #[must_use]
    pub fn month_range(self, range: u32) -> Vec<Self> {
        let mut start = self;
        for _ in 0..range {
            start = start.prev();
        }
        let mut months = Vec::with_capacity(2 * range as usize + 1);
        let mut cursor = start;
        for _ in 0..=(2 * range) {
            months.push(cursor);
            cursor = cursor.next();
        }
        months
    }

    /// Whether a bill due on `due_day` in this period is due within the next
    /// three days, as seen from `today`. Only bills in `today`'s own period
    /// qualify.
    #[must_use]
    pub fn is_due_soon(self, due_day: u8, today: NaiveDate) -> bool {
        if self != Self::from_date(today) {
            return false;
        }
        let due_day = u32::from(due_day);
        due_day > today.day() && due_day <= today.day() + 3
    }

    /// Whether a bill due on `due_day` in this period is overdue as seen from
    /// `today`. Past periods are always overdue; within the current period
    /// the due day must have passed; future periods never are.
    #[must_use]
    pub fn is_overdue(self, due_day: u8, today: NaiveDate) -> bool {
        let today_period = Self::from_date(today);
        if self < today_period {
            return true;
        }
        if self == today_period {
            return today.day() > u32::from(due_day);
        }
        false
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPeriod {
            value: s.to_string(),
        };
        let (year_str, month_str) = s.split_once('-').ok_or_else(invalid)?;
        if year_str.len() != 4 || month_str.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year_str.parse().map_err(|_| invalid())?;
        let month: u32 = month_str.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Period {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}
