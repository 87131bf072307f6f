use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{CalculatorError, Result};
use crate::types::{InvestmentType, SchemeCode};

/// sip amount change applying to installments on or after `effective_date`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SipAmountModification {
    pub effective_date: NaiveDate,
    pub amount: Money,
}

/// one investment declared by the user in a scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInvestment {
    pub scheme_code: SchemeCode,
    pub investment_type: InvestmentType,
    pub start_date: NaiveDate,
    pub amount: Money,
    /// monthly amount for a sip, `amount` is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sip_amount: Option<Money>,
    /// day of month the sip is debited, 1 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sip_monthly_date: Option<u32>,
    /// present once the sip has been cancelled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sip_end_date: Option<NaiveDate>,
    /// ascending by effective date
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sip_amount_modifications: Vec<SipAmountModification>,
}

impl UserInvestment {
    pub fn lumpsum(scheme_code: SchemeCode, start_date: NaiveDate, amount: Money) -> Self {
        Self {
            scheme_code,
            investment_type: InvestmentType::Lumpsum,
            start_date,
            amount,
            sip_amount: None,
            sip_monthly_date: None,
            sip_end_date: None,
            sip_amount_modifications: Vec::new(),
        }
    }

    pub fn sip(scheme_code: SchemeCode, start_date: NaiveDate, sip_amount: Money, day: u32) -> Self {
        Self {
            scheme_code,
            investment_type: InvestmentType::Sip,
            start_date,
            amount: sip_amount,
            sip_amount: Some(sip_amount),
            sip_monthly_date: Some(day),
            sip_end_date: None,
            sip_amount_modifications: Vec::new(),
        }
    }

    pub fn is_sip(&self) -> bool {
        self.investment_type == InvestmentType::Sip
    }

    /// debit day of month
    pub fn sip_day(&self) -> u32 {
        self.sip_monthly_date.unwrap_or(1)
    }

    /// amount before any modification
    pub fn base_sip_amount(&self) -> Money {
        self.sip_amount.unwrap_or(self.amount)
    }

    /// sip amount in force on `date`
    ///
    /// relies on `sip_amount_modifications` being sorted, which `validate`
    /// enforces.
    pub fn effective_sip_amount(&self, date: NaiveDate) -> Money {
        let mut amount = self.base_sip_amount();
        for modification in &self.sip_amount_modifications {
            if modification.effective_date > date {
                break;
            }
            amount = modification.amount;
        }
        amount
    }

    pub fn validate(&self) -> Result<()> {
        if self.amount.is_negative() {
            return Err(CalculatorError::invalid_input("amount", "must not be negative"));
        }
        if self.sip_amount.is_some_and(|a| a.is_negative()) {
            return Err(CalculatorError::invalid_input("sipAmount", "must not be negative"));
        }
        if let Some(day) = self.sip_monthly_date {
            if !(1..=31).contains(&day) {
                return Err(CalculatorError::invalid_input(
                    "sipMonthlyDate",
                    format!("{} is not a day of the month", day),
                ));
            }
        }
        for modification in &self.sip_amount_modifications {
            if modification.amount.is_negative() {
                return Err(CalculatorError::invalid_input(
                    "sipAmountModifications",
                    format!("amount effective {} must not be negative", modification.effective_date),
                ));
            }
        }
        if let Some(pair) = self
            .sip_amount_modifications
            .windows(2)
            .find(|pair| pair[0].effective_date > pair[1].effective_date)
        {
            return Err(CalculatorError::invalid_input(
                "sipAmountModifications",
                format!(
                    "not sorted by effective date ({} after {})",
                    pair[1].effective_date, pair[0].effective_date
                ),
            ));
        }
        Ok(())
    }

    /// copy with modifications sorted by effective date, ties keep their order
    pub fn normalized(&self) -> Self {
        let mut investment = self.clone();
        investment
            .sip_amount_modifications
            .sort_by_key(|m| m.effective_date);
        investment
    }

    /// copy of this sip cancelled on `on`
    pub fn cancel_sip(&self, on: NaiveDate) -> Result<Self> {
        self.ensure_sip("cancel")?;
        let mut investment = self.clone();
        investment.sip_end_date = Some(on);
        Ok(investment)
    }

    /// copy of this sip paying `amount` from `effective_date` onwards
    pub fn modify_sip_amount(&self, effective_date: NaiveDate, amount: Money) -> Result<Self> {
        self.ensure_sip("modify amount of")?;
        if amount.is_negative() {
            return Err(CalculatorError::invalid_input("amount", "must not be negative"));
        }
        let mut investment = self.normalized();
        let at = investment
            .sip_amount_modifications
            .partition_point(|m| m.effective_date <= effective_date);
        investment
            .sip_amount_modifications
            .insert(at, SipAmountModification { effective_date, amount });
        Ok(investment)
    }

    fn ensure_sip(&self, action: &str) -> Result<()> {
        if !self.is_sip() {
            return Err(CalculatorError::invalid_input(
                "investmentType",
                format!("cannot {} a lumpsum investment", action),
            ));
        }
        Ok(())
    }
}

/// every investment the user holds in one scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInvestmentData {
    pub scheme_code: SchemeCode,
    pub investments: Vec<UserInvestment>,
}

impl UserInvestmentData {
    pub fn new(scheme_code: SchemeCode) -> Self {
        Self {
            scheme_code,
            investments: Vec::new(),
        }
    }

    pub fn with_investment(mut self, investment: UserInvestment) -> Self {
        self.investments.push(investment);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.investments.iter().try_for_each(UserInvestment::validate)
    }

    /// earliest start date across investments
    pub fn earliest_start(&self) -> Option<NaiveDate> {
        self.investments.iter().map(|i| i.start_date).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sip_with_changes() -> UserInvestment {
        let mut sip = UserInvestment::sip(120503, date(2023, 1, 10), Money::from_major(5_000), 10);
        sip.sip_amount_modifications = vec![
            SipAmountModification { effective_date: date(2023, 6, 10), amount: Money::from_major(7_500) },
            SipAmountModification { effective_date: date(2024, 1, 1), amount: Money::from_major(10_000) },
        ];
        sip
    }

    #[test]
    fn test_effective_sip_amount() {
        let sip = sip_with_changes();
        assert_eq!(sip.effective_sip_amount(date(2023, 5, 10)), Money::from_major(5_000));
        assert_eq!(sip.effective_sip_amount(date(2023, 6, 10)), Money::from_major(7_500));
        assert_eq!(sip.effective_sip_amount(date(2023, 12, 31)), Money::from_major(7_500));
        assert_eq!(sip.effective_sip_amount(date(2024, 2, 10)), Money::from_major(10_000));
    }

    #[test]
    fn test_base_amount_falls_back_to_amount() {
        let mut sip = UserInvestment::sip(1, date(2023, 1, 1), Money::from_major(2_000), 1);
        sip.sip_amount = None;
        sip.amount = Money::from_major(3_000);
        assert_eq!(sip.effective_sip_amount(date(2023, 3, 1)), Money::from_major(3_000));
    }

    #[test]
    fn test_unsorted_modifications_rejected() {
        let mut sip = sip_with_changes();
        sip.sip_amount_modifications.reverse();
        let err = sip.validate().unwrap_err();
        assert!(matches!(err, CalculatorError::InvalidInput { ref field, .. } if field == "sipAmountModifications"));

        let fixed = sip.normalized();
        assert!(fixed.validate().is_ok());
        assert_eq!(fixed, sip_with_changes());
    }

    #[test]
    fn test_invalid_sip_day() {
        let mut sip = sip_with_changes();
        sip.sip_monthly_date = Some(0);
        assert!(sip.validate().is_err());
        sip.sip_monthly_date = Some(32);
        assert!(sip.validate().is_err());
        sip.sip_monthly_date = Some(31);
        assert!(sip.validate().is_ok());
    }

    #[test]
    fn test_cancel_and_modify() {
        let sip = sip_with_changes();
        let cancelled = sip.cancel_sip(date(2024, 3, 31)).unwrap();
        assert_eq!(cancelled.sip_end_date, Some(date(2024, 3, 31)));
        assert_eq!(sip.sip_end_date, None);

        let modified = sip.modify_sip_amount(date(2023, 9, 10), Money::from_major(6_000)).unwrap();
        let dates: Vec<NaiveDate> = modified
            .sip_amount_modifications
            .iter()
            .map(|m| m.effective_date)
            .collect();
        assert_eq!(dates, vec![date(2023, 6, 10), date(2023, 9, 10), date(2024, 1, 1)]);
        assert_eq!(modified.effective_sip_amount(date(2023, 10, 10)), Money::from_major(6_000));

        let lumpsum = UserInvestment::lumpsum(1, date(2023, 1, 1), Money::from_major(1_000));
        assert!(lumpsum.cancel_sip(date(2023, 2, 1)).is_err());
        assert!(lumpsum.modify_sip_amount(date(2023, 2, 1), Money::ONE).is_err());
    }

    #[test]
    fn test_store_payload() {
        let json = r#"{
            "schemeCode": 120503,
            "investments": [
                {"schemeCode": 120503, "investmentType": "lumpsum", "startDate": "2022-05-02", "amount": 50000},
                {"schemeCode": 120503, "investmentType": "sip", "startDate": "2023-01-10", "amount": 5000,
                 "sipAmount": 5000, "sipMonthlyDate": 10,
                 "sipAmountModifications": [{"effectiveDate": "2023-06-10", "amount": 7500}]}
            ]
        }"#;
        let data: UserInvestmentData = serde_json::from_str(json).unwrap();
        assert_eq!(data.investments.len(), 2);
        assert_eq!(data.investments[0].investment_type, InvestmentType::Lumpsum);
        assert_eq!(data.investments[1].sip_day(), 10);
        assert_eq!(data.earliest_start(), Some(date(2022, 5, 2)));
        assert!(data.validate().is_ok());
    }
}
