use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};

/// calculator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculatorConfig {
    pub ppf: PpfConfig,
    pub xirr: XirrConfig,
}

/// public provident fund rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PpfConfig {
    /// rate applied to years without a declared rate
    #[serde(with = "crate::decimal::percent")]
    pub default_rate: Rate,
    /// account lifetime in financial years
    pub maturity_years: u32,
    /// statutory ceiling on deposits per financial year
    pub annual_limit: Money,
    /// day basis for pro-rata interest
    pub day_basis: u32,
}

impl Default for PpfConfig {
    fn default() -> Self {
        Self {
            default_rate: Rate::from_percentage(dec!(7.1)),
            maturity_years: 15,
            annual_limit: Money::from_major(150_000),
            day_basis: 365,
        }
    }
}

/// newton-raphson settings for xirr
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct XirrConfig {
    pub initial_guess: f64,
    pub max_iterations: u32,
    /// convergence threshold on the absolute net present value
    pub tolerance: f64,
    /// days per year used to convert cash flow offsets to years
    pub day_basis: f64,
}

impl Default for XirrConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.1,
            max_iterations: 100,
            tolerance: 1e-6,
            day_basis: 365.25,
        }
    }
}

impl CalculatorConfig {
    /// load from json, missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CalculatorConfig =
            serde_json::from_str(json).map_err(|e| CalculatorError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.ppf.validate()?;
        self.xirr.validate()
    }
}

impl PpfConfig {
    pub fn validate(&self) -> Result<()> {
        if self.maturity_years == 0 {
            return Err(CalculatorError::InvalidConfiguration {
                message: "ppf maturity must be at least one year".to_string(),
            });
        }
        if self.day_basis == 0 {
            return Err(CalculatorError::InvalidConfiguration {
                message: "ppf day basis must be positive".to_string(),
            });
        }
        if self.default_rate.is_negative() || self.annual_limit.is_negative() {
            return Err(CalculatorError::InvalidConfiguration {
                message: "ppf rate and limit must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

impl XirrConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(CalculatorError::InvalidConfiguration {
                message: "xirr needs at least one iteration".to_string(),
            });
        }
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.tolerance) || !positive(self.day_basis) {
            return Err(CalculatorError::InvalidConfiguration {
                message: "xirr tolerance and day basis must be positive".to_string(),
            });
        }
        if !self.initial_guess.is_finite() || self.initial_guess <= -1.0 {
            return Err(CalculatorError::InvalidConfiguration {
                message: format!("xirr initial guess {} must be above -1", self.initial_guess),
            });
        }
        Ok(())
    }
}
