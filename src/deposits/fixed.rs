use chrono::{Days, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::deposits::{ensure_non_negative_money, ensure_non_negative_rate, DepositSummary, FyData};
use crate::errors::Result;
use crate::fiscal::{add_months, days_between, fiscal_years_between, parse_iso_date};
use crate::interest::{CompoundingEngine, CompoundingFrequency};

/// fixed deposit request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FdInput {
    /// `YYYY-MM-DD`
    pub start_date: String,
    pub invested_amount: Money,
    /// annual rate, percent on the wire
    #[serde(with = "crate::decimal::percent")]
    pub rate: Rate,
    #[serde(default)]
    pub tenure_years: u32,
    #[serde(default)]
    pub tenure_months: u32,
    #[serde(default)]
    pub tenure_days: u32,
    #[serde(default)]
    pub compounding: CompoundingFrequency,
}

impl FdInput {
    /// start plus years, then months, then days
    pub fn maturity_date(&self, start: NaiveDate) -> NaiveDate {
        let after_years = add_months(start, self.tenure_years.saturating_mul(12));
        let after_months = add_months(after_years, self.tenure_months);
        after_months
            .checked_add_days(Days::new(self.tenure_days as u64))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// maturity value and per-financial-year interest of a fixed deposit
///
/// each financial year overlapping the tenure compounds the balance carried
/// from the previous year over the days of the overlap (actual/365). years
/// without overlap are skipped and negative interest is reported as zero.
pub fn calculate_fd_returns(input: &FdInput) -> Result<DepositSummary> {
    let start = parse_iso_date(&input.start_date)?;
    ensure_non_negative_money("investedAmount", input.invested_amount)?;
    ensure_non_negative_rate("rate", input.rate)?;

    let end = input.maturity_date(start);
    let engine = CompoundingEngine::new(input.compounding);
    let principal = input.invested_amount;

    let mut balance = principal;
    let mut fy_data = Vec::new();

    for fy in fiscal_years_between(start, end) {
        let period_start = start.max(fy.start());
        let period_end = end.min(fy.end());
        if period_start > period_end {
            continue;
        }

        let days = days_between(period_start, period_end);
        let end_balance = engine.grow(balance, input.rate, days)?;

        fy_data.push(FyData {
            fy_year: fy.label(),
            start_balance: balance,
            end_balance,
            interest_earned: (end_balance - balance).max(Money::ZERO),
            contribution: None,
        });

        balance = end_balance;
    }

    debug!(
        "fd {} at {} from {} to {}: maturity {}",
        principal, input.rate, start, end, balance
    );

    Ok(DepositSummary {
        total_interest_earned: balance - principal,
        maturity_amount: balance,
        principal: Some(principal),
        fy_data,
    })
}
