use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::deposits::{ensure_non_negative_money, ensure_non_negative_rate, DepositSummary, FyData};
use crate::errors::Result;
use crate::fiscal::{add_months, fiscal_years_between, parse_iso_date};
use crate::interest::annuity_balance;

/// recurring deposit request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RdInput {
    /// `YYYY-MM-DD`, also the date of the first installment
    pub start_date: String,
    pub monthly_installment: Money,
    /// annual rate, percent on the wire
    #[serde(with = "crate::decimal::percent")]
    pub rate: Rate,
    #[serde(default)]
    pub tenure_years: u32,
    #[serde(default)]
    pub tenure_months: u32,
}

impl RdInput {
    pub fn total_months(&self) -> u32 {
        self.tenure_years.saturating_mul(12).saturating_add(self.tenure_months)
    }

    /// installment dates, one per month from the start date
    pub fn installment_dates(&self, start: NaiveDate) -> Vec<NaiveDate> {
        (0..self.total_months()).map(|k| add_months(start, k)).collect()
    }
}

/// maturity value and per-financial-year breakdown of a recurring deposit
///
/// balances follow the monthly-compounded annuity `P((1+i)^m - 1)/i`, where `m`
/// counts installments paid so far. years without an installment are left out.
pub fn calculate_rd_returns(input: &RdInput) -> Result<DepositSummary> {
    let start = parse_iso_date(&input.start_date)?;
    ensure_non_negative_money("monthlyInstallment", input.monthly_installment)?;
    ensure_non_negative_rate("rate", input.rate)?;

    let months = input.total_months();
    let end = add_months(start, months);
    let installment = input.monthly_installment;
    let dates = input.installment_dates(start);

    let maturity_amount = annuity_balance(installment, input.rate, months);
    let principal = installment * Decimal::from(months);

    let mut fy_data = Vec::new();
    for fy in fiscal_years_between(start, end) {
        let paid_before = dates.iter().filter(|d| **d < fy.start()).count() as u32;
        let paid_within = dates.iter().filter(|d| fy.contains(**d)).count() as u32;

        let contribution = installment * Decimal::from(paid_within);
        if contribution.is_zero() {
            continue;
        }

        let opening = annuity_balance(installment, input.rate, paid_before);
        let closing = annuity_balance(installment, input.rate, paid_before + paid_within);

        fy_data.push(FyData {
            fy_year: fy.label(),
            start_balance: opening,
            end_balance: closing,
            interest_earned: (closing - opening - contribution).max(Money::ZERO),
            contribution: Some(contribution),
        });
    }

    debug!(
        "rd {} x {} months at {}: maturity {}",
        installment, months, input.rate, maturity_amount
    );

    Ok(DepositSummary {
        total_interest_earned: maturity_amount - principal,
        maturity_amount,
        principal: Some(principal),
        fy_data,
    })
}
