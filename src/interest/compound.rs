use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{powf, Money, Rate};
use crate::errors::{CalculatorError, Result};

/// compounding frequency offered for fixed deposits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CompoundingFrequency {
    Monthly,
    #[default]
    Quarterly,
    HalfYearly,
    Annually,
}

impl CompoundingFrequency {
    /// number of compounding periods per year
    pub fn periods_per_year(&self) -> u32 {
        match self {
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::HalfYearly => 2,
            CompoundingFrequency::Annually => 1,
        }
    }
}

/// engine for compound growth over day counts
pub struct CompoundingEngine {
    pub frequency: CompoundingFrequency,
    pub basis_days: u32,
}

impl CompoundingEngine {
    pub fn new(frequency: CompoundingFrequency) -> Self {
        Self { frequency, basis_days: 365 }
    }

    /// balance after `days`: `P(1 + r/n)^(n * days/basis)`
    pub fn grow(&self, principal: Money, annual_rate: Rate, days: i64) -> Result<Money> {
        if days <= 0 || annual_rate.as_decimal().is_zero() {
            return Ok(principal);
        }

        let n = self.frequency.periods_per_year();
        let base = Decimal::ONE + annual_rate.periodic_rate(n).as_decimal();
        let exponent = Decimal::from(n) * Decimal::from(days) / Decimal::from(self.basis_days);

        let factor = powf(base, exponent).ok_or_else(|| CalculatorError::CalculationError {
            message: format!("growth factor {}^{} is not finite", base, exponent),
        })?;

        Ok(Money::from_decimal(principal.as_decimal() * factor))
    }

    /// interest earned over `days`
    pub fn interest_for_days(&self, principal: Money, annual_rate: Rate, days: i64) -> Result<Money> {
        Ok(self.grow(principal, annual_rate, days)? - principal)
    }
}

/// value of a monthly annuity after `months` installments, compounded monthly
///
/// `P((1 + i)^m - 1) / i` with `i` the monthly rate; zero months is zero.
pub fn annuity_balance(installment: Money, annual_rate: Rate, months: u32) -> Money {
    if months == 0 {
        return Money::ZERO;
    }

    let monthly_rate = annual_rate.monthly_rate().as_decimal();
    if monthly_rate.is_zero() {
        return installment * Decimal::from(months);
    }

    // calculate (1 + i)^m using iteration
    let mut compound_factor = Decimal::ONE;
    let base = Decimal::ONE + monthly_rate;
    for _ in 0..months {
        compound_factor *= base;
    }

    Money::from_decimal(installment.as_decimal() * (compound_factor - Decimal::ONE) / monthly_rate)
}

/// future value of a lump sum over fractional years
pub fn future_value(
    present_value: Money,
    annual_rate: Rate,
    years: Decimal,
    frequency: CompoundingFrequency,
) -> Result<Money> {
    let engine = CompoundingEngine::new(frequency);
    let days = (years * Decimal::from(engine.basis_days)).round();
    let days = days.to_i64().ok_or_else(|| CalculatorError::CalculationError {
        message: format!("tenure of {} years is out of range", years),
    })?;
    engine.grow(present_value, annual_rate, days)
}
