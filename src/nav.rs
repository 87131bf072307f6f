//! nav history as delivered by the data provider, parsed for lookups

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::fiscal::{days_between, format_nav_date, parse_nav_date};

/// raw nav record: `DD-MM-YYYY` date and decimal string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavData {
    pub date: String,
    pub nav: String,
}

impl NavData {
    pub fn new(date: NaiveDate, nav: Decimal) -> Self {
        Self {
            date: format_nav_date(date),
            nav: nav.to_string(),
        }
    }
}

/// parsed nav observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavPoint {
    pub date: NaiveDate,
    pub nav: Decimal,
}

/// nav observations in the order the provider returned them (oldest first)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NavHistory {
    points: Vec<NavPoint>,
}

impl NavHistory {
    pub fn new(points: Vec<NavPoint>) -> Self {
        Self { points }
    }

    /// parse provider records, dropping any that do not parse
    pub fn from_records(records: &[NavData]) -> Self {
        let points = records
            .iter()
            .filter_map(|record| {
                let date = match parse_nav_date(&record.date) {
                    Ok(date) => date,
                    Err(e) => {
                        warn!("skipping nav record: {}", e);
                        return None;
                    }
                };
                match Decimal::from_str(record.nav.trim()) {
                    Ok(nav) => Some(NavPoint { date, nav }),
                    Err(e) => {
                        warn!("skipping nav record for {}: '{}' {}", record.date, record.nav, e);
                        None
                    }
                }
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[NavPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// most recent observation, the last element
    pub fn latest(&self) -> Option<&NavPoint> {
        self.points.last()
    }

    /// latest nav value, zero when there is no history
    pub fn latest_nav(&self) -> Decimal {
        self.latest().map(|p| p.nav).unwrap_or(Decimal::ZERO)
    }

    /// observation nearest to `target` by absolute day distance
    ///
    /// equidistant observations resolve to the earlier date; identical dates
    /// keep the first one in history order.
    pub fn closest_to(&self, target: NaiveDate) -> Option<&NavPoint> {
        let mut best: Option<(&NavPoint, i64)> = None;
        for point in &self.points {
            let distance = days_between(point.date, target).abs();
            best = match best {
                None => Some((point, distance)),
                Some((current, best_distance)) => {
                    if distance < best_distance
                        || (distance == best_distance && point.date < current.date)
                    {
                        Some((point, distance))
                    } else {
                        Some((current, best_distance))
                    }
                }
            };
        }
        best.map(|(point, _)| point)
    }

    /// most recent observation dated on or before `date`
    pub fn on_or_before(&self, date: NaiveDate) -> Option<&NavPoint> {
        self.points
            .iter()
            .filter(|p| p.date <= date)
            .fold(None, |best: Option<&NavPoint>, p| match best {
                Some(b) if b.date >= p.date => Some(b),
                _ => Some(p),
            })
    }

    /// earliest observation date
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.iter().map(|p| p.date).min()
    }
}

impl From<&[NavData]> for NavHistory {
    fn from(records: &[NavData]) -> Self {
        NavHistory::from_records(records)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn history(points: &[(NaiveDate, Decimal)]) -> NavHistory {
        NavHistory::new(points.iter().map(|(date, nav)| NavPoint { date: *date, nav: *nav }).collect())
    }

    #[test]
    fn test_parse_records() {
        let records = vec![
            NavData { date: "01-01-2024".into(), nav: "10.5000".into() },
            NavData { date: "2024-01-02".into(), nav: "10.6".into() },
            NavData { date: "03-01-2024".into(), nav: "n/a".into() },
            NavData { date: "04-01-2024".into(), nav: " 10.8 ".into() },
        ];
        let history = NavHistory::from_records(&records);
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().date, date(2024, 1, 4));
        assert_eq!(history.latest_nav(), dec!(10.8));
    }

    #[test]
    fn test_closest_prefers_earlier_on_tie() {
        let h = history(&[
            (date(2024, 1, 1), dec!(10)),
            (date(2024, 1, 5), dec!(11)),
            (date(2024, 1, 9), dec!(12)),
        ]);
        assert_eq!(h.closest_to(date(2024, 1, 3)).unwrap().nav, dec!(10));
        assert_eq!(h.closest_to(date(2024, 1, 4)).unwrap().nav, dec!(11));
        assert_eq!(h.closest_to(date(2024, 1, 7)).unwrap().nav, dec!(11));
        assert_eq!(h.closest_to(date(2030, 1, 1)).unwrap().nav, dec!(12));
    }

    #[test]
    fn test_tie_break_ignores_history_order() {
        let h = history(&[(date(2024, 1, 5), dec!(11)), (date(2024, 1, 1), dec!(10))]);
        assert_eq!(h.closest_to(date(2024, 1, 3)).unwrap().nav, dec!(10));
    }

    #[test]
    fn test_empty_history() {
        let h = NavHistory::default();
        assert!(h.closest_to(date(2024, 1, 1)).is_none());
        assert!(h.latest().is_none());
        assert_eq!(h.latest_nav(), Decimal::ZERO);
    }

    #[test]
    fn test_on_or_before() {
        let h = history(&[
            (date(2023, 1, 1), dec!(10)),
            (date(2023, 6, 1), dec!(11)),
            (date(2024, 1, 1), dec!(12)),
        ]);
        assert_eq!(h.on_or_before(date(2023, 12, 31)).unwrap().nav, dec!(11));
        assert_eq!(h.on_or_before(date(2023, 6, 1)).unwrap().nav, dec!(11));
        assert!(h.on_or_before(date(2022, 12, 31)).is_none());
        assert_eq!(h.first_date(), Some(date(2023, 1, 1)));
    }

    #[test]
    fn test_nav_data_formatting() {
        let record = NavData::new(date(2024, 3, 7), dec!(45.1234));
        assert_eq!(record.date, "07-03-2024");
        assert_eq!(record.nav, "45.1234");
    }
}
