//! indian financial year calendar (april to march) and date helpers

use chrono::{Datelike, Months, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{CalculatorError, Result};

/// first month of the indian financial year
pub const FY_START_MONTH: u32 = 4;

/// date format used by calculator inputs
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// date format used by the nav data provider
pub const NAV_DATE_FORMAT: &str = "%d-%m-%Y";

/// starting calendar year of the financial year containing `date`
pub fn fiscal_year(date: NaiveDate) -> i32 {
    if date.month() >= FY_START_MONTH {
        date.year()
    } else {
        date.year() - 1
    }
}

/// april 1 of `fy_year` and march 31 of the following year
pub fn fiscal_year_bounds(fy_year: i32) -> (NaiveDate, NaiveDate) {
    (ymd(fy_year, FY_START_MONTH, 1), ymd(fy_year + 1, 3, 31))
}

/// display label, e.g. "FY 2023-24"
pub fn fiscal_year_label(fy_year: i32) -> String {
    if fy_year > 2000 {
        format!("FY {}-{:02}", fy_year, (fy_year + 1).rem_euclid(100))
    } else {
        format!("FY {}", fy_year)
    }
}

/// a financial year identified by its starting calendar year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FiscalYear(pub i32);

impl FiscalYear {
    pub fn containing(date: NaiveDate) -> Self {
        FiscalYear(fiscal_year(date))
    }

    pub fn year(&self) -> i32 {
        self.0
    }

    pub fn start(&self) -> NaiveDate {
        fiscal_year_bounds(self.0).0
    }

    pub fn end(&self) -> NaiveDate {
        fiscal_year_bounds(self.0).1
    }

    /// april 1 of the following financial year
    pub fn next_start(&self) -> NaiveDate {
        ymd(self.0 + 1, FY_START_MONTH, 1)
    }

    pub fn next(&self) -> Self {
        FiscalYear(self.0 + 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.end()
    }

    pub fn label(&self) -> String {
        fiscal_year_label(self.0)
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// every financial year overlapping `[from, to]`, ascending
pub fn fiscal_years_between(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = FiscalYear> {
    let first = fiscal_year(from);
    let last = fiscal_year(to);
    (first..=last).map(FiscalYear)
}

/// parse a strict `YYYY-MM-DD` date
pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(CalculatorError::InvalidDate {
            message: format!("expected YYYY-MM-DD, got '{}'", value),
        });
    }
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT).map_err(|e| CalculatorError::InvalidDate {
        message: format!("'{}': {}", value, e),
    })
}

/// parse a provider `DD-MM-YYYY` date
pub fn parse_nav_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), NAV_DATE_FORMAT).map_err(|e| CalculatorError::InvalidDate {
        message: format!("'{}': {}", value, e),
    })
}

pub fn format_nav_date(date: NaiveDate) -> String {
    date.format(NAV_DATE_FORMAT).to_string()
}

/// add calendar months, clamping the day to the end of the target month
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// signed whole days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// number of days in the month of `year`/`month`
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = ymd(year, month, 1);
    let next = add_months(first, 1);
    days_between(first, next) as u32
}

/// calendar date of the provider's current instant (utc)
pub fn as_of_date(time: &SafeTimeProvider) -> NaiveDate {
    time.now().date_naive()
}

/// `day` of the month `months` after the month of `base`, clamped to month length
pub fn anchored_date(base: NaiveDate, months: u32, day: u32) -> NaiveDate {
    let first = add_months(ymd(base.year(), base.month(), 1), months);
    let day = day.clamp(1, days_in_month(first.year(), first.month()));
    ymd(first.year(), first.month(), day)
}

// saturates outside chrono's representable range
fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(if year < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}
