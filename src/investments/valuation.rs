use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{powf, Money, Rate};
use crate::errors::{CalculatorError, Result};
use crate::fiscal::{as_of_date, days_between};
use crate::investments::installments::{generate_installments, investment_installments, InvestmentInstallment};
use crate::investments::model::{UserInvestment, UserInvestmentData};
use crate::investments::xirr::calculate_xirr;
use crate::nav::NavHistory;
use crate::provider::MutualFundScheme;
use crate::types::InvestmentType;

const DAYS_PER_YEAR: Decimal = dec!(365.25);

/// holdings of one investment at the latest nav
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentValue {
    pub units: Decimal,
    pub current_value: Money,
    pub invested_amount: Money,
}

impl InvestmentValue {
    pub const ZERO: InvestmentValue = InvestmentValue {
        units: Decimal::ZERO,
        current_value: Money::ZERO,
        invested_amount: Money::ZERO,
    };
}

impl std::ops::Add for InvestmentValue {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            units: self.units + other.units,
            current_value: self.current_value + other.current_value,
            invested_amount: self.invested_amount + other.invested_amount,
        }
    }
}

/// summary metrics for the investments held in one scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentMetrics {
    pub total_invested: Money,
    pub current_value: Money,
    pub absolute_gain: Money,
    #[serde(with = "crate::decimal::percent")]
    pub percentage_return: Rate,
    pub units: Decimal,
    #[serde(with = "crate::decimal::percent::option", default, skip_serializing_if = "Option::is_none")]
    pub xirr: Option<Rate>,
    #[serde(with = "crate::decimal::percent::option", default, skip_serializing_if = "Option::is_none")]
    pub cagr: Option<Rate>,
}

impl InvestmentMetrics {
    fn empty() -> Self {
        Self {
            total_invested: Money::ZERO,
            current_value: Money::ZERO,
            absolute_gain: Money::ZERO,
            percentage_return: Rate::ZERO,
            units: Decimal::ZERO,
            xirr: None,
            cagr: None,
        }
    }
}

/// a scheme with the user's installments and their summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundInvestmentDetails {
    pub scheme: MutualFundScheme,
    pub installments: Vec<InvestmentInstallment>,
    pub summary: InvestmentMetrics,
}

pub(crate) fn value_at(investment: &UserInvestment, history: &NavHistory, today: NaiveDate) -> InvestmentValue {
    let installments = investment_installments(investment, history, today, &mut 0);

    let (units, invested_amount) = match investment.investment_type {
        // a lumpsum without nav still counts as invested
        InvestmentType::Lumpsum => (
            installments.iter().map(|i| i.units).sum::<Decimal>(),
            investment.amount,
        ),
        InvestmentType::Sip => installments
            .iter()
            .filter(|i| i.has_nav() && !i.is_cancelled)
            .fold((Decimal::ZERO, Money::ZERO), |(units, invested), i| {
                (units + i.units, invested + i.amount)
            }),
    };

    let latest = history.latest_nav();
    let current_value = if latest > Decimal::ZERO {
        Money::from_decimal(units * latest)
    } else {
        Money::ZERO
    };

    InvestmentValue {
        units,
        current_value,
        invested_amount,
    }
}

pub(crate) fn portfolio_value(investments: &[UserInvestment], history: &NavHistory, today: NaiveDate) -> InvestmentValue {
    investments
        .iter()
        .map(|investment| value_at(investment, history, today))
        .fold(InvestmentValue::ZERO, |acc, v| acc + v)
}

/// units, invested amount and current value of one investment
///
/// sip installments without a usable nav are left out of the totals.
pub fn calculate_investment_value(
    investment: &UserInvestment,
    history: &NavHistory,
    time: &SafeTimeProvider,
) -> Result<InvestmentValue> {
    investment.validate()?;
    Ok(value_at(investment, history, as_of_date(time)))
}

/// totals, gain, percentage return, xirr and cagr across investments
///
/// a cagr too large to represent is reported as `None` alongside the totals.
pub fn aggregate(
    investments: &[UserInvestment],
    history: &NavHistory,
    time: &SafeTimeProvider,
) -> Result<InvestmentMetrics> {
    investments.iter().try_for_each(UserInvestment::validate)?;
    if history.is_empty() {
        return Ok(InvestmentMetrics::empty());
    }

    let value = portfolio_value(investments, history, as_of_date(time));
    let absolute_gain = value.current_value - value.invested_amount;
    let percentage_return = absolute_gain
        .ratio(value.invested_amount)
        .filter(|_| value.invested_amount.is_positive())
        .map(Rate::from_decimal)
        .unwrap_or(Rate::ZERO);

    let metrics = InvestmentMetrics {
        total_invested: value.invested_amount,
        current_value: value.current_value,
        absolute_gain,
        percentage_return,
        units: value.units,
        xirr: calculate_xirr(investments, history, time)?,
        cagr: match calculate_cagr(investments, history, time) {
            Ok(rate) => Some(rate),
            Err(CalculatorError::CalculationError { message }) => {
                warn!("{}, cagr left undetermined", message);
                None
            }
            Err(e) => return Err(e),
        },
    };
    debug!(
        "aggregate of {} investments: invested {}, value {}",
        investments.len(),
        metrics.total_invested,
        metrics.current_value
    );
    Ok(metrics)
}

/// compound annual growth from the earliest start to the latest nav date
///
/// zero when there is nothing to measure: no investments, no history, no
/// elapsed time or nothing invested.
pub fn calculate_cagr(
    investments: &[UserInvestment],
    history: &NavHistory,
    time: &SafeTimeProvider,
) -> Result<Rate> {
    investments.iter().try_for_each(UserInvestment::validate)?;
    let (Some(earliest), Some(latest)) = (
        investments.iter().map(|i| i.start_date).min(),
        history.latest(),
    ) else {
        return Ok(Rate::ZERO);
    };

    let years = Decimal::from(days_between(earliest, latest.date)) / DAYS_PER_YEAR;
    if years <= Decimal::ZERO {
        return Ok(Rate::ZERO);
    }

    let value = portfolio_value(investments, history, as_of_date(time));
    if !value.invested_amount.is_positive() {
        return Ok(Rate::ZERO);
    }

    let growth = value
        .current_value
        .ratio(value.invested_amount)
        .and_then(|ratio| powf(ratio, Decimal::ONE / years))
        .ok_or_else(|| CalculatorError::CalculationError {
            message: format!(
                "cagr of {} on {} over {} years",
                value.current_value, value.invested_amount, years
            ),
        })?;
    Ok(Rate::from_decimal(growth - Decimal::ONE))
}

/// years elapsed since the earliest investment, zero when none or in the future
pub fn investment_duration(investments: &[UserInvestment], time: &SafeTimeProvider) -> Decimal {
    investments
        .iter()
        .map(|i| i.start_date)
        .min()
        .map(|earliest| Decimal::from(days_between(earliest, as_of_date(time))) / DAYS_PER_YEAR)
        .filter(|years| *years > Decimal::ZERO)
        .unwrap_or(Decimal::ZERO)
}

/// installments and summary of the user's holdings in `scheme`
pub fn fund_investment_details(
    scheme: MutualFundScheme,
    data: &UserInvestmentData,
    history: &NavHistory,
    time: &SafeTimeProvider,
) -> Result<FundInvestmentDetails> {
    Ok(FundInvestmentDetails {
        installments: generate_installments(data, history, time)?,
        summary: aggregate(&data.investments, history, time)?,
        scheme,
    })
}
