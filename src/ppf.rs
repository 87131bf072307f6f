//! public provident fund ledger

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::PpfConfig;
use crate::decimal::{Money, Rate};
use crate::deposits::FyData;
use crate::errors::{CalculatorError, Result};
use crate::fiscal::FiscalYear;
use crate::interest::AccrualEngine;

/// one deposit into the account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PpfSingleContribution {
    pub amount: Money,
    /// defaults to april 1 of the financial year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl PpfSingleContribution {
    pub fn on(amount: Money, date: NaiveDate) -> Self {
        Self { amount, date: Some(date) }
    }

    pub fn at_year_start(amount: Money) -> Self {
        Self { amount, date: None }
    }

    pub fn effective_date(&self, fy: FiscalYear) -> NaiveDate {
        self.date.unwrap_or_else(|| fy.start())
    }
}

/// deposits and rate declared for one financial year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PpfContribution {
    /// starting calendar year of the financial year
    pub year: i32,
    /// falls back to the calculator default when absent
    #[serde(with = "crate::decimal::percent::option", default)]
    pub interest_rate: Option<Rate>,
    #[serde(default)]
    pub contributions: Vec<PpfSingleContribution>,
}

impl PpfContribution {
    pub fn total(&self) -> Money {
        self.contributions.iter().map(|c| c.amount).sum()
    }
}

/// ledger row for one financial year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PpfYearData {
    pub year: i32,
    pub fy_year: String,
    pub opening_balance: Money,
    pub contribution: Money,
    pub interest: Money,
    /// always opening + contribution + interest
    pub closing_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PpfCalculationResult {
    pub yearly_data: Vec<PpfYearData>,
    pub total_invested: Money,
    pub total_interest_earned: Money,
    pub maturity_amount: Money,
    pub absolute_return: Money,
    #[serde(with = "crate::decimal::percent")]
    pub absolute_return_percentage: Rate,
}

impl PpfCalculationResult {
    /// ledger rows in the deposit summary shape
    pub fn financial_year_data(&self) -> Vec<FyData> {
        self.yearly_data
            .iter()
            .map(|row| FyData {
                fy_year: row.fy_year.clone(),
                start_balance: row.opening_balance,
                end_balance: row.closing_balance,
                interest_earned: row.interest,
                contribution: Some(row.contribution),
            })
            .collect()
    }
}

/// year-by-year ppf balance roll-forward
pub struct PpfCalculator {
    config: PpfConfig,
    accrual: AccrualEngine,
}

impl PpfCalculator {
    pub fn new() -> Self {
        Self::build(PpfConfig::default())
    }

    /// calculator for custom account rules, rejected when they fail validation
    pub fn with_config(config: PpfConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PpfConfig) -> Self {
        let accrual = AccrualEngine::new(config.day_basis);
        Self { config, accrual }
    }

    pub fn config(&self) -> &PpfConfig {
        &self.config
    }

    /// check deposits against the statutory annual limit
    pub fn validate_contributions(&self, contributions: &[PpfContribution]) -> Result<()> {
        for year in contributions {
            for single in &year.contributions {
                if single.amount.is_negative() {
                    return Err(CalculatorError::invalid_input(
                        "contributions.amount",
                        format!("deposit of {} in FY {} is negative", single.amount, year.year),
                    ));
                }
            }
            if let Some(rate) = year.interest_rate {
                if rate.is_negative() {
                    return Err(CalculatorError::invalid_input(
                        "interestRate",
                        format!("rate {} for FY {} is negative", rate, year.year),
                    ));
                }
            }

            let total = year.total();
            if total > self.config.annual_limit {
                return Err(CalculatorError::ContributionLimitExceeded {
                    year: year.year,
                    limit: self.config.annual_limit,
                    provided: total,
                });
            }
        }
        Ok(())
    }

    /// roll the account forward from `start_year` over the maturity period
    ///
    /// the opening balance earns a full year of interest at the year's rate and
    /// each deposit earns pro-rata interest from its date to the next april 1.
    /// interest is credited at year end. years without a declared rate use the
    /// configured default rate.
    pub fn calculate(&self, start_year: i32, contributions: &[PpfContribution]) -> PpfCalculationResult {
        let default_rate = self.config.default_rate;
        let mut balance = Money::ZERO;
        let mut total_invested = Money::ZERO;
        let mut total_interest = Money::ZERO;
        let mut yearly_data = Vec::with_capacity(self.config.maturity_years as usize);

        for offset in 0..self.config.maturity_years as i32 {
            let fy = FiscalYear(start_year + offset);
            let declared = contributions.iter().find(|c| c.year == fy.year());
            let rate = declared.and_then(|c| c.interest_rate).unwrap_or(default_rate);
            let deposits = declared.map(|c| c.contributions.as_slice()).unwrap_or(&[]);

            let opening_balance = balance;
            let mut contribution = Money::ZERO;
            let mut interest = self.accrual.full_year(opening_balance, rate);

            for deposit in deposits {
                contribution += deposit.amount;
                interest += self.accrual.pro_rata_in_fy(
                    deposit.amount,
                    rate,
                    deposit.effective_date(fy),
                    fy,
                );
            }

            let closing_balance = opening_balance + contribution + interest;
            balance = closing_balance;
            total_invested += contribution;
            total_interest += interest;

            yearly_data.push(PpfYearData {
                year: fy.year(),
                fy_year: fy.label(),
                opening_balance,
                contribution,
                interest,
                closing_balance,
            });
        }

        let absolute_return = balance - total_invested;
        let absolute_return_percentage = absolute_return
            .ratio(total_invested)
            .map(Rate::from_decimal)
            .unwrap_or(Rate::ZERO);

        debug!(
            "ppf from FY {} over {} years: invested {}, maturity {}",
            start_year, self.config.maturity_years, total_invested, balance
        );

        PpfCalculationResult {
            yearly_data,
            total_invested,
            total_interest_earned: total_interest,
            maturity_amount: balance,
            absolute_return,
            absolute_return_percentage,
        }
    }
}

impl Default for PpfCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// ppf ledger with the default 15 year account rules
pub fn calculate_ppf(start_year: i32, default_rate: Rate, contributions: &[PpfContribution]) -> PpfCalculationResult {
    PpfCalculator::build(PpfConfig {
        default_rate,
        ..PpfConfig::default()
    })
    .calculate(start_year, contributions)
}

/// same yearly deposit on april 1 of every year of the account
pub fn uniform_contributions(start_year: i32, years: u32, amount: Money) -> Vec<PpfContribution> {
    (0..years as i32)
        .map(|offset| PpfContribution {
            year: start_year + offset,
            interest_rate: None,
            contributions: vec![PpfSingleContribution::at_year_start(amount)],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_standard_maturity_table() {
        let rate = Rate::from_percentage(dec!(7.1));
        let contributions: Vec<PpfContribution> = (0..15)
            .map(|offset| PpfContribution {
                year: 2020 + offset,
                interest_rate: None,
                contributions: vec![PpfSingleContribution::on(
                    Money::from_major(150_000),
                    date(2020 + offset, 4, 1),
                )],
            })
            .collect();

        let result = calculate_ppf(2020, rate, &contributions);

        assert_eq!(result.yearly_data.len(), 15);
        assert_eq!(result.yearly_data[0].interest, Money::from_major(10_650));
        assert_eq!(result.total_invested, Money::from_major(2_250_000));

        // standard table for 1.5 lakh a year at 7.1% is about 40.68 lakh
        assert!(result.maturity_amount > Money::from_major(4_060_000));
        assert!(result.maturity_amount < Money::from_major(4_075_000));
        assert_eq!(result.absolute_return, result.maturity_amount - result.total_invested);
    }

    #[test]
    fn test_ledger_chain_is_exact() {
        let contributions = vec![
            PpfContribution {
                year: 2021,
                interest_rate: Some(Rate::from_percentage(dec!(7.1))),
                contributions: vec![
                    PpfSingleContribution::on(Money::from_str_exact("12345.67").unwrap(), date(2021, 6, 17)),
                    PpfSingleContribution::on(Money::from_major(40_000), date(2022, 3, 3)),
                ],
            },
            PpfContribution {
                year: 2023,
                interest_rate: Some(Rate::from_percentage(dec!(7.6))),
                contributions: vec![PpfSingleContribution::at_year_start(Money::from_major(99_999))],
            },
        ];

        let result = calculate_ppf(2021, Rate::from_percentage(dec!(7.1)), &contributions);

        for row in &result.yearly_data {
            assert_eq!(row.closing_balance, row.opening_balance + row.contribution + row.interest);
        }
        for pair in result.yearly_data.windows(2) {
            assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
        }
        assert_eq!(result.yearly_data.last().unwrap().closing_balance, result.maturity_amount);
    }

    #[test]
    fn test_pro_rata_first_year() {
        let contributions = vec![PpfContribution {
            year: 2021,
            interest_rate: Some(Rate::from_percentage(dec!(10))),
            contributions: vec![PpfSingleContribution::on(Money::from_major(36_500), date(2021, 10, 1))],
        }];

        let result = calculate_ppf(2021, Rate::from_percentage(dec!(7.1)), &contributions);
        let first = &result.yearly_data[0];
        assert_eq!(first.fy_year, "FY 2021-22");
        assert_eq!(first.interest, Money::from_major(1_820));

        // second year falls back to the default rate on the carried balance
        let second = &result.yearly_data[1];
        assert_eq!(second.contribution, Money::ZERO);
        assert_eq!(second.interest, second.opening_balance.apply_rate(Rate::from_percentage(dec!(7.1)), 365, 365));
    }

    #[test]
    fn test_no_contributions() {
        let result = calculate_ppf(2020, Rate::from_percentage(dec!(7.1)), &[]);
        assert_eq!(result.yearly_data.len(), 15);
        assert_eq!(result.maturity_amount, Money::ZERO);
        assert_eq!(result.absolute_return_percentage, Rate::ZERO);
    }

    #[test]
    fn test_contribution_limit() {
        let calculator = PpfCalculator::new();
        let over = vec![PpfContribution {
            year: 2022,
            interest_rate: None,
            contributions: vec![
                PpfSingleContribution::at_year_start(Money::from_major(100_000)),
                PpfSingleContribution::on(Money::from_major(60_000), date(2022, 9, 1)),
            ],
        }];

        let err = calculator.validate_contributions(&over).unwrap_err();
        assert!(matches!(err, CalculatorError::ContributionLimitExceeded { year: 2022, .. }));

        let within = uniform_contributions(2022, 15, Money::from_major(150_000));
        assert!(calculator.validate_contributions(&within).is_ok());
    }

    #[test]
    fn test_custom_maturity_period() {
        let config = PpfConfig { maturity_years: 20, ..PpfConfig::default() };
        let calculator = PpfCalculator::with_config(config).unwrap();
        let result = calculator.calculate(2015, &[]);
        assert_eq!(result.yearly_data.len(), 20);
        assert_eq!(result.yearly_data.last().unwrap().year, 2034);
    }

    #[test]
    fn test_configured_default_rate() {
        let config = PpfConfig {
            default_rate: Rate::from_percentage(dec!(8)),
            ..PpfConfig::default()
        };
        let contributions = uniform_contributions(2020, 1, Money::from_major(10_000));
        let result = PpfCalculator::with_config(config).unwrap().calculate(2020, &contributions);
        assert_eq!(result.yearly_data[0].interest, Money::from_major(800));
        assert_eq!(
            result,
            calculate_ppf(2020, Rate::from_percentage(dec!(8)), &contributions)
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let zero_basis = PpfConfig { day_basis: 0, ..PpfConfig::default() };
        assert!(matches!(
            PpfCalculator::with_config(zero_basis),
            Err(CalculatorError::InvalidConfiguration { .. })
        ));

        let no_years = PpfConfig { maturity_years: 0, ..PpfConfig::default() };
        assert!(PpfCalculator::with_config(no_years).is_err());
    }

    #[test]
    fn test_financial_year_rows() {
        let result = calculate_ppf(
            2020,
            Rate::from_percentage(dec!(7.1)),
            &uniform_contributions(2020, 3, Money::from_major(10_000)),
        );
        let rows = result.financial_year_data();
        assert_eq!(rows.len(), 15);
        assert_eq!(rows[0].fy_year, "FY 2020-21");
        assert_eq!(rows[0].contribution, Some(Money::from_major(10_000)));
        assert_eq!(rows[0].interest_earned, Money::from_major(710));
        assert_eq!(rows[3].contribution, Some(Money::ZERO));
    }

    #[test]
    fn test_deserialize_store_payload() {
        let json = r#"[{"year": 2024, "interestRate": 7.1, "contributions": [{"amount": 5000, "date": "2024-07-10"}, {"amount": 2500}]}]"#;
        let parsed: Vec<PpfContribution> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed[0].interest_rate, Some(Rate::from_percentage(dec!(7.1))));
        assert_eq!(parsed[0].contributions[0].date, Some(date(2024, 7, 10)));
        assert_eq!(parsed[0].contributions[1].effective_date(FiscalYear(2024)), date(2024, 4, 1));
        assert_eq!(parsed[0].total(), Money::from_major(7_500));
    }

    #[test]
    fn test_idempotent() {
        let contributions = uniform_contributions(2018, 15, Money::from_major(75_000));
        let rate = Rate::from_percentage(dec!(7.9));
        assert_eq!(calculate_ppf(2018, rate, &contributions), calculate_ppf(2018, rate, &contributions));
    }
}
