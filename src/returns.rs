//! trailing returns of a scheme's nav over fixed windows

use chrono::{Days, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::decimal::{powf, Rate};
use crate::fiscal::as_of_date;
use crate::nav::NavHistory;

/// trailing window, ordered shortest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "2Y")]
    TwoYears,
    #[serde(rename = "3Y")]
    ThreeYears,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "10Y")]
    TenYears,
}

impl Timeframe {
    pub const ALL: [Timeframe; 8] = [
        Timeframe::OneMonth,
        Timeframe::ThreeMonths,
        Timeframe::SixMonths,
        Timeframe::OneYear,
        Timeframe::TwoYears,
        Timeframe::ThreeYears,
        Timeframe::FiveYears,
        Timeframe::TenYears,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneMonth => "1M",
            Timeframe::ThreeMonths => "3M",
            Timeframe::SixMonths => "6M",
            Timeframe::OneYear => "1Y",
            Timeframe::TwoYears => "2Y",
            Timeframe::ThreeYears => "3Y",
            Timeframe::FiveYears => "5Y",
            Timeframe::TenYears => "10Y",
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            Timeframe::OneMonth => 30,
            Timeframe::ThreeMonths => 90,
            Timeframe::SixMonths => 180,
            Timeframe::OneYear => 365,
            Timeframe::TwoYears => 730,
            Timeframe::ThreeYears => 1095,
            Timeframe::FiveYears => 1825,
            Timeframe::TenYears => 3650,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// point-to-point return over one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnsMetrics {
    pub timeframe_label: String,
    pub days: u32,
    pub start_nav: Decimal,
    pub end_nav: Decimal,
    pub absolute_return: Decimal,
    #[serde(with = "crate::decimal::percent")]
    pub percentage_return: Rate,
    #[serde(with = "crate::decimal::percent")]
    pub cagr: Rate,
    /// single cash flow approximation on a 365.25 day year
    #[serde(with = "crate::decimal::percent")]
    pub xirr: Rate,
    pub is_available: bool,
}

impl ReturnsMetrics {
    fn unavailable(timeframe: Timeframe) -> Self {
        Self {
            timeframe_label: timeframe.label().to_string(),
            days: timeframe.days(),
            start_nav: Decimal::ZERO,
            end_nav: Decimal::ZERO,
            absolute_return: Decimal::ZERO,
            percentage_return: Rate::ZERO,
            cagr: Rate::ZERO,
            xirr: Rate::ZERO,
            is_available: false,
        }
    }
}

// (end/start)^exponent - 1, zero when it cannot be evaluated
fn annualized(start: Decimal, end: Decimal, exponent: Decimal) -> Rate {
    powf(end / start, exponent)
        .map(|growth| Rate::from_decimal(growth - Decimal::ONE))
        .unwrap_or(Rate::ZERO)
}

/// returns for one window ending on `today` at `end_nav`
///
/// the start nav is the most recent observation on or before `today` minus
/// the window. the window is unavailable when there is none or it is not
/// positive.
pub fn timeframe_return(
    history: &NavHistory,
    end_nav: Decimal,
    today: NaiveDate,
    timeframe: Timeframe,
) -> ReturnsMetrics {
    let days = timeframe.days();
    let start = today
        .checked_sub_days(Days::new(days as u64))
        .and_then(|target| history.on_or_before(target))
        .filter(|point| point.nav > Decimal::ZERO);

    let Some(start) = start else {
        return ReturnsMetrics::unavailable(timeframe);
    };

    let start_nav = start.nav;
    let absolute_return = end_nav - start_nav;
    let days_dec = Decimal::from(days);

    ReturnsMetrics {
        timeframe_label: timeframe.label().to_string(),
        days,
        start_nav,
        end_nav,
        absolute_return,
        percentage_return: Rate::from_decimal(absolute_return / start_nav),
        cagr: annualized(start_nav, end_nav, dec!(365) / days_dec),
        xirr: annualized(start_nav, end_nav, dec!(365.25) / days_dec),
        is_available: true,
    }
}

/// every trailing window measured up to the latest nav, as of the provider's date
pub fn calculate_timeframe_returns(
    history: &NavHistory,
    time: &SafeTimeProvider,
) -> BTreeMap<Timeframe, ReturnsMetrics> {
    let today = as_of_date(time);
    let end_nav = history.latest_nav();
    Timeframe::ALL
        .iter()
        .map(|tf| (*tf, timeframe_return(history, end_nav, today, *tf)))
        .collect()
}
