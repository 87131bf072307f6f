use chrono::NaiveDate;

use crate::decimal::{Money, Rate};
use crate::fiscal::{days_between, FiscalYear};

/// simple, non-compounding interest over a fixed day basis
pub struct AccrualEngine {
    pub basis_days: u32,
}

impl AccrualEngine {
    pub fn new(basis_days: u32) -> Self {
        Self { basis_days }
    }

    /// interest for a full year of the basis
    pub fn full_year(&self, principal: Money, annual_rate: Rate) -> Money {
        principal.apply_rate(annual_rate, self.basis_days, self.basis_days)
    }

    /// days from `date` until the start of the next financial year, capped at the basis
    pub fn days_remaining_in_fy(&self, date: NaiveDate) -> u32 {
        let fy = FiscalYear::containing(date);
        let days = days_between(date, fy.next_start()).max(0) as u32;
        days.min(self.basis_days)
    }

    /// interest on an amount deposited on `date` within financial year `fy`
    ///
    /// amounts dated on or before april 1 earn the full year.
    pub fn pro_rata_in_fy(&self, amount: Money, annual_rate: Rate, date: NaiveDate, fy: FiscalYear) -> Money {
        if date <= fy.start() {
            return self.full_year(amount, annual_rate);
        }

        let days = days_between(date, fy.next_start()).max(0) as u32;
        amount.apply_rate(annual_rate, days.min(self.basis_days), self.basis_days)
    }
}

impl Default for AccrualEngine {
    fn default() -> Self {
        Self::new(365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_year_from_april_first() {
        let engine = AccrualEngine::default();
        let interest = engine.pro_rata_in_fy(
            Money::from_major(150_000),
            Rate::from_percentage(dec!(7.1)),
            date(2020, 4, 1),
            FiscalYear(2020),
        );
        assert_eq!(interest, Money::from_major(10_650));
    }

    #[test]
    fn test_leap_year_does_not_exceed_full_year() {
        let engine = AccrualEngine::default();
        // FY 2023-24 spans 29 feb 2024
        let interest = engine.pro_rata_in_fy(
            Money::from_major(100_000),
            Rate::from_percentage(dec!(7.1)),
            date(2023, 4, 2),
            FiscalYear(2023),
        );
        assert_eq!(interest, Money::from_major(7_100));
    }

    #[test]
    fn test_mid_year_contribution() {
        let engine = AccrualEngine::default();
        // 1 oct 2021 to 1 apr 2022 is 182 days
        let interest = engine.pro_rata_in_fy(
            Money::from_major(36_500),
            Rate::from_percentage(dec!(10)),
            date(2021, 10, 1),
            FiscalYear(2021),
        );
        assert_eq!(interest, Money::from_major(1_820));
        assert_eq!(engine.days_remaining_in_fy(date(2021, 10, 1)), 182);
    }

    #[test]
    fn test_date_before_fy_earns_full_year() {
        let engine = AccrualEngine::default();
        let interest = engine.pro_rata_in_fy(
            Money::from_major(1_000),
            Rate::from_percentage(dec!(8)),
            date(2019, 12, 1),
            FiscalYear(2020),
        );
        assert_eq!(interest, Money::from_major(80));
    }

    #[test]
    fn test_date_after_fy_earns_nothing() {
        let engine = AccrualEngine::default();
        let interest = engine.pro_rata_in_fy(
            Money::from_major(1_000),
            Rate::from_percentage(dec!(8)),
            date(2022, 5, 1),
            FiscalYear(2020),
        );
        assert_eq!(interest, Money::ZERO);
    }
}
