//! fixed and recurring deposit calculators with financial-year breakdowns

pub mod fixed;
pub mod recurring;

use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};

pub use fixed::{calculate_fd_returns, FdInput};
pub use recurring::{calculate_rd_returns, RdInput};

/// balances and interest for one financial year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FyData {
    pub fy_year: String,
    pub start_balance: Money,
    pub end_balance: Money,
    /// never negative
    pub interest_earned: Money,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub contribution: Option<Money>,
}

/// deposit maturity summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositSummary {
    pub total_interest_earned: Money,
    pub maturity_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub principal: Option<Money>,
    /// ascending by financial year
    pub fy_data: Vec<FyData>,
}

impl DepositSummary {
    /// sum of the per-year interest rows
    pub fn fy_interest_total(&self) -> Money {
        self.fy_data.iter().map(|fy| fy.interest_earned).sum()
    }
}

pub(crate) fn ensure_non_negative_money(field: &str, value: Money) -> Result<()> {
    if value.is_negative() {
        return Err(CalculatorError::invalid_input(field, format!("{} must not be negative", value)));
    }
    Ok(())
}

pub(crate) fn ensure_non_negative_rate(field: &str, value: Rate) -> Result<()> {
    if value.is_negative() {
        return Err(CalculatorError::invalid_input(field, format!("{} must not be negative", value)));
    }
    Ok(())
}
