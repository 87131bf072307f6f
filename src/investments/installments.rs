use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::Result;
use crate::fiscal::{anchored_date, as_of_date};
use crate::investments::model::{UserInvestment, UserInvestmentData};
use crate::nav::NavHistory;
use crate::types::{InstallmentType, InvestmentType};

/// a purchase made on a specific date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentInstallment {
    pub id: String,
    #[serde(rename = "type")]
    pub installment_type: InstallmentType,
    pub original_start_date: NaiveDate,
    pub installment_date: NaiveDate,
    pub amount: Money,
    /// nav nearest the installment date, zero when unknown
    pub nav: Decimal,
    pub units: Decimal,
    pub is_cancelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_on: Option<NaiveDate>,
}

impl InvestmentInstallment {
    pub fn has_nav(&self) -> bool {
        self.nav > Decimal::ZERO
    }
}

/// monthly debit dates of a sip up to `until`
///
/// the first date is the sip day in the start month, or in the month after
/// when that falls before the start date. later dates keep the same day,
/// clamped to shorter months. the schedule stops after the sip end date.
pub fn sip_schedule(investment: &UserInvestment, until: NaiveDate) -> Vec<NaiveDate> {
    let start = investment.start_date;
    let day = investment.sip_day();
    let bound = match investment.sip_end_date {
        Some(end) => end.min(until),
        None => until,
    };

    let first_offset = if anchored_date(start, 0, day) < start { 1 } else { 0 };
    let mut dates = Vec::new();
    for offset in first_offset.. {
        let date = anchored_date(start, offset, day);
        if date > bound || date == NaiveDate::MAX {
            break;
        }
        dates.push(date);
    }
    dates
}

fn units_for(amount: Money, nav: Decimal) -> Decimal {
    if nav > Decimal::ZERO {
        amount.as_decimal() / nav
    } else {
        Decimal::ZERO
    }
}

/// installments of one investment, ids continue from `next_id`
pub(crate) fn investment_installments(
    investment: &UserInvestment,
    history: &NavHistory,
    today: NaiveDate,
    next_id: &mut usize,
) -> Vec<InvestmentInstallment> {
    let mut make = |date: NaiveDate, amount: Money| {
        let nav = history.closest_to(date).map(|p| p.nav).unwrap_or(Decimal::ZERO);
        let is_cancelled = investment.sip_end_date.is_some_and(|end| date > end);
        let installment = InvestmentInstallment {
            id: format!("inst-{}", *next_id),
            installment_type: investment.investment_type.into(),
            original_start_date: investment.start_date,
            installment_date: date,
            amount,
            nav,
            units: units_for(amount, nav),
            is_cancelled,
            cancelled_on: if is_cancelled { investment.sip_end_date } else { None },
        };
        *next_id += 1;
        installment
    };

    match investment.investment_type {
        InvestmentType::Lumpsum => vec![make(investment.start_date, investment.amount)],
        InvestmentType::Sip => sip_schedule(investment, today)
            .into_iter()
            .map(|date| make(date, investment.effective_sip_amount(date)))
            .collect(),
    }
}

/// every installment of every investment in `data`, ascending by date
///
/// sips run until their end date or the provider's current date, whichever
/// comes first.
pub fn generate_installments(
    data: &UserInvestmentData,
    history: &NavHistory,
    time: &SafeTimeProvider,
) -> Result<Vec<InvestmentInstallment>> {
    data.validate()?;
    let today = as_of_date(time);

    let mut next_id = 0;
    let mut installments: Vec<InvestmentInstallment> = data
        .investments
        .iter()
        .flat_map(|investment| investment_installments(investment, history, today, &mut next_id))
        .collect();

    let missing_nav = installments.iter().filter(|i| !i.has_nav()).count();
    if missing_nav > 0 {
        debug!(
            "scheme {}: {} of {} installments have no nav",
            data.scheme_code,
            missing_nav,
            installments.len()
        );
    }

    installments.sort_by_key(|i| i.installment_date);
    Ok(installments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalculatorError;
    use crate::investments::model::SipAmountModification;
    use crate::nav::tests::{date, history};
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32) -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()))
    }

    fn monthly_history() -> NavHistory {
        history(&[
            (date(2023, 1, 2), dec!(10)),
            (date(2023, 2, 1), dec!(12.5)),
            (date(2023, 3, 1), dec!(20)),
            (date(2023, 4, 3), dec!(25)),
            (date(2023, 5, 2), dec!(16)),
        ])
    }

    #[test]
    fn test_lumpsum_single_installment() {
        let data = UserInvestmentData::new(1)
            .with_investment(UserInvestment::lumpsum(1, date(2023, 2, 2), Money::from_major(10_000)));
        let installments = generate_installments(&data, &monthly_history(), &at(2023, 6, 1)).unwrap();

        assert_eq!(installments.len(), 1);
        let inst = &installments[0];
        assert_eq!(inst.id, "inst-0");
        assert_eq!(inst.installment_type, InstallmentType::Lumpsum);
        assert_eq!(inst.nav, dec!(12.5));
        assert_eq!(inst.units, dec!(800));
        assert!(!inst.is_cancelled);
    }

    #[test]
    fn test_lumpsum_amounts_round_trip() {
        let data = UserInvestmentData::new(1)
            .with_investment(UserInvestment::lumpsum(1, date(2023, 3, 1), Money::from_str_exact("12345.67").unwrap()))
            .with_investment(UserInvestment::lumpsum(1, date(2023, 1, 5), Money::from_major(50_000)));
        let installments = generate_installments(&data, &monthly_history(), &at(2023, 6, 1)).unwrap();

        let total: Money = installments.iter().filter(|i| !i.is_cancelled).map(|i| i.amount).sum();
        assert_eq!(total, Money::from_str_exact("62345.67").unwrap());
        // sorted by date, ids keep generation order
        assert_eq!(installments[0].id, "inst-1");
        assert_eq!(installments[1].id, "inst-0");
    }

    #[test]
    fn test_sip_schedule_until_today() {
        let sip = UserInvestment::sip(1, date(2023, 1, 15), Money::from_major(1_000), 1);
        let dates = sip_schedule(&sip, date(2023, 5, 1));
        assert_eq!(dates, vec![date(2023, 2, 1), date(2023, 3, 1), date(2023, 4, 1), date(2023, 5, 1)]);
    }

    #[test]
    fn test_sip_day_clamps_without_drift() {
        let sip = UserInvestment::sip(1, date(2024, 1, 5), Money::from_major(1_000), 31);
        let dates = sip_schedule(&sip, date(2024, 5, 1));
        assert_eq!(dates, vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]);
    }

    #[test]
    fn test_sip_end_before_start_is_empty() {
        let mut sip = UserInvestment::sip(1, date(2023, 3, 10), Money::from_major(1_000), 10);
        sip.sip_end_date = Some(date(2023, 1, 1));
        let data = UserInvestmentData::new(1).with_investment(sip);
        let installments = generate_installments(&data, &monthly_history(), &at(2023, 6, 1)).unwrap();
        assert!(installments.is_empty());
    }

    #[test]
    fn test_sip_respects_end_date_and_modifications() {
        let mut sip = UserInvestment::sip(1, date(2023, 1, 1), Money::from_major(1_000), 1);
        sip.sip_amount_modifications = vec![SipAmountModification {
            effective_date: date(2023, 3, 1),
            amount: Money::from_major(2_000),
        }];
        let sip = sip.cancel_sip(date(2023, 4, 15)).unwrap();
        let data = UserInvestmentData::new(1).with_investment(sip);

        let installments = generate_installments(&data, &monthly_history(), &at(2023, 12, 1)).unwrap();
        let amounts: Vec<Money> = installments.iter().map(|i| i.amount).collect();
        assert_eq!(
            amounts,
            vec![
                Money::from_major(1_000),
                Money::from_major(1_000),
                Money::from_major(2_000),
                Money::from_major(2_000),
            ]
        );
        assert!(installments.iter().all(|i| i.installment_type == InstallmentType::SipInstallment));
        assert!(installments.iter().all(|i| !i.is_cancelled));
        assert_eq!(installments[3].nav, dec!(25));
        assert_eq!(installments[3].units, dec!(80));
    }

    #[test]
    fn test_missing_nav_gives_zero_units() {
        let data = UserInvestmentData::new(1)
            .with_investment(UserInvestment::sip(1, date(2023, 1, 1), Money::from_major(1_000), 1));
        let installments = generate_installments(&data, &NavHistory::default(), &at(2023, 3, 1)).unwrap();
        assert_eq!(installments.len(), 3);
        assert!(installments.iter().all(|i| i.nav.is_zero() && i.units.is_zero()));
    }

    #[test]
    fn test_unsorted_modifications_fail() {
        let mut sip = UserInvestment::sip(1, date(2023, 1, 1), Money::from_major(1_000), 1);
        sip.sip_amount_modifications = vec![
            SipAmountModification { effective_date: date(2023, 5, 1), amount: Money::from_major(3_000) },
            SipAmountModification { effective_date: date(2023, 3, 1), amount: Money::from_major(2_000) },
        ];
        let data = UserInvestmentData::new(1).with_investment(sip);
        let err = generate_installments(&data, &monthly_history(), &at(2023, 6, 1)).unwrap_err();
        assert!(matches!(err, CalculatorError::InvalidInput { .. }));
    }

    #[test]
    fn test_idempotent_for_fixed_time() {
        let data = UserInvestmentData::new(1)
            .with_investment(UserInvestment::sip(1, date(2023, 1, 20), Money::from_major(1_500), 20))
            .with_investment(UserInvestment::lumpsum(1, date(2023, 2, 14), Money::from_major(9_000)));
        let time = at(2023, 5, 25);
        let first = generate_installments(&data, &monthly_history(), &time).unwrap();
        let second = generate_installments(&data, &monthly_history(), &time).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wire_shape() {
        let data = UserInvestmentData::new(1)
            .with_investment(UserInvestment::lumpsum(1, date(2023, 2, 1), Money::from_major(1_000)));
        let installments = generate_installments(&data, &monthly_history(), &at(2023, 6, 1)).unwrap();
        let json = serde_json::to_value(&installments[0]).unwrap();
        assert_eq!(json["type"], "lumpsum");
        assert_eq!(json["installmentDate"], "2023-02-01");
        assert_eq!(json["isCancelled"], false);
        assert!(json.get("cancelledOn").is_none());
    }
}
