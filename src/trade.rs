//! Trade and report types
//!
//! A trade carries one volume per hourly period of a trading day. The report is
//! the aggregated net position keyed by absolute hour slot.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of hourly periods in a trading day
pub const PERIODS_PER_DAY: usize = 24;

/// One hourly slot of a trade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// 1-based period index (1..=24)
    pub period: u32,
    /// Signed volume, positive is long and negative is short
    pub volume: f64,
}

impl Period {
    pub fn new(period: u32, volume: f64) -> Self {
        Self { period, volume }
    }
}

/// A single day's contracted volumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Reference date of the trade
    pub date: NaiveDate,
    pub periods: Vec<Period>,
}

impl Trade {
    pub fn new(date: NaiveDate, periods: Vec<Period>) -> Self {
        Self { date, periods }
    }

    /// Build a full-day trade with the same volume in every period
    pub fn flat(date: NaiveDate, volume: f64) -> Self {
        Self::from_volumes(date, &[volume; PERIODS_PER_DAY])
    }

    /// Build a trade from volumes listed in period order, starting at period 1
    pub fn from_volumes(date: NaiveDate, volumes: &[f64]) -> Self {
        let periods = volumes
            .iter()
            .enumerate()
            .map(|(i, v)| Period::new(i as u32 + 1, *v))
            .collect();
        Self::new(date, periods)
    }
}

/// Net volume per hour slot, iterated in chronological order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    buckets: BTreeMap<NaiveDateTime, f64>,
}

impl Report {
    pub(crate) fn from_buckets(buckets: BTreeMap<NaiveDateTime, f64>) -> Self {
        Self { buckets }
    }

    /// Iterate buckets in ascending slot order
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDateTime, &f64)> {
        self.buckets.iter()
    }

    pub fn get(&self, slot: &NaiveDateTime) -> Option<f64> {
        self.buckets.get(slot).copied()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_trade_has_full_day() {
        let date = NaiveDate::from_ymd_opt(2015, 4, 1).unwrap();
        let trade = Trade::flat(date, 100.0);

        assert_eq!(trade.periods.len(), PERIODS_PER_DAY);
        assert_eq!(trade.periods[0], Period::new(1, 100.0));
        assert_eq!(trade.periods[23], Period::new(24, 100.0));
    }

    #[test]
    fn test_trade_json_shape() {
        let json = r#"{"date":"2015-04-01","periods":[{"period":1,"volume":-20.5}]}"#;
        let trade: Trade = serde_json::from_str(json).unwrap();

        assert_eq!(trade.date, NaiveDate::from_ymd_opt(2015, 4, 1).unwrap());
        assert_eq!(trade.periods, vec![Period::new(1, -20.5)]);
    }
}
