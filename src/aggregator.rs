//! Hour-bucket aggregation
//!
//! A trading day starts at 23:00 on the calendar day before the reference
//! date. Period `i` of every trade lands in the slot `start + (i - 1)h`, and the
//! report holds the net volume per slot across all trades.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use std::collections::{BTreeMap, HashSet};

use crate::error::AggregationError;
use crate::trade::{PERIODS_PER_DAY, Report, Trade};

/// Hour at which the trading day opens on the previous calendar day
pub const TRADING_DAY_START_HOUR: u32 = 23;

/// First slot of the trading day that contains `reference`
pub fn trading_day_start(reference: NaiveDateTime) -> NaiveDateTime {
    let midnight = reference.date().and_time(NaiveTime::default());
    midnight - Duration::hours(24 - i64::from(TRADING_DAY_START_HOUR))
}

/// Slot timestamp for a 1-based period index
pub fn period_slot(start: NaiveDateTime, period: u32) -> NaiveDateTime {
    start + Duration::hours(i64::from(period) - 1)
}

/// Sum every trade's period volumes into hourly buckets.
///
/// Any malformed trade fails the whole call; nothing is partially aggregated.
pub fn aggregate(trades: &[Trade], reference: NaiveDateTime) -> Result<Report, AggregationError> {
    for (idx, trade) in trades.iter().enumerate() {
        validate(idx, trade)?;
    }

    let start = trading_day_start(reference);
    let mut volumes: BTreeMap<NaiveDateTime, Vec<f64>> = BTreeMap::new();
    for trade in trades {
        for period in &trade.periods {
            volumes
                .entry(period_slot(start, period.period))
                .or_default()
                .push(period.volume);
        }
    }

    // Sum in a canonical order so float rounding cannot depend on input order.
    let buckets: BTreeMap<NaiveDateTime, f64> = volumes
        .into_iter()
        .map(|(slot, mut vols)| {
            vols.sort_by(f64::total_cmp);
            (slot, vols.into_iter().sum::<f64>())
        })
        .collect();

    Ok(Report::from_buckets(buckets))
}

fn validate(idx: usize, trade: &Trade) -> Result<(), AggregationError> {
    if trade.periods.len() != PERIODS_PER_DAY {
        return Err(AggregationError::PeriodCount {
            trade: idx,
            count: trade.periods.len(),
            expected: PERIODS_PER_DAY,
        });
    }

    let max = PERIODS_PER_DAY as u32;
    let mut seen = HashSet::with_capacity(PERIODS_PER_DAY);
    for p in &trade.periods {
        if p.period == 0 || p.period > max {
            return Err(AggregationError::PeriodOutOfRange {
                trade: idx,
                period: p.period,
                max,
            });
        }
        if !seen.insert(p.period) {
            return Err(AggregationError::DuplicatePeriod {
                trade: idx,
                period: p.period,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade::Period;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn trade_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 4, 1).unwrap()
    }

    fn reference_trades() -> Vec<Trade> {
        let mut second = vec![50.0; 11];
        second.extend(vec![-20.0; 13]);
        vec![
            Trade::flat(trade_date(), 100.0),
            Trade::from_volumes(trade_date(), &second),
        ]
    }

    #[test]
    fn test_bucket_mapping() {
        let start = trading_day_start(at(2015, 4, 1, 0, 0));

        assert_eq!(period_slot(start, 1), at(2015, 3, 31, 23, 0));
        assert_eq!(period_slot(start, 12), at(2015, 4, 1, 10, 0));
        assert_eq!(period_slot(start, 24), at(2015, 4, 1, 22, 0));
    }

    #[test]
    fn test_trading_day_ignores_time_of_day() {
        assert_eq!(
            trading_day_start(at(2015, 4, 1, 22, 59)),
            at(2015, 3, 31, 23, 0)
        );
        assert_eq!(trading_day_start(at(2015, 1, 1, 8, 0)), at(2014, 12, 31, 23, 0));
    }

    #[test]
    fn test_additivity() {
        let report = aggregate(&reference_trades(), at(2015, 4, 1, 0, 0)).unwrap();

        assert_eq!(report.len(), 24);
        assert_eq!(report.get(&at(2015, 3, 31, 23, 0)), Some(150.0));
        assert_eq!(report.get(&at(2015, 4, 1, 9, 0)), Some(150.0));
        assert_eq!(report.get(&at(2015, 4, 1, 10, 0)), Some(80.0));
        assert_eq!(report.get(&at(2015, 4, 1, 22, 0)), Some(80.0));
    }

    #[test]
    fn test_chronological_iteration() {
        let report = aggregate(&reference_trades(), at(2015, 4, 1, 14, 7)).unwrap();
        let slots: Vec<NaiveDateTime> = report.iter().map(|(slot, _)| *slot).collect();

        assert_eq!(slots.first(), Some(&at(2015, 3, 31, 23, 0)));
        assert_eq!(slots.last(), Some(&at(2015, 4, 1, 22, 0)));
        assert!(slots.windows(2).all(|w| w[1] - w[0] == Duration::hours(1)));
    }

    #[test]
    fn test_order_independence() {
        let reference = at(2015, 4, 1, 0, 0);
        let volumes: Vec<f64> = (0..24).map(|i| 0.1 * f64::from(i) - 1.3).collect();
        let mut trades = vec![
            Trade::from_volumes(trade_date(), &volumes),
            Trade::flat(trade_date(), 0.7),
            Trade::from_volumes(trade_date(), &volumes.iter().map(|v| v * 3.3).collect::<Vec<_>>()),
        ];
        let expected = aggregate(&trades, reference).unwrap();

        trades.reverse();
        for trade in &mut trades {
            trade.periods.reverse();
        }
        assert_eq!(aggregate(&trades, reference).unwrap(), expected);

        trades.rotate_left(1);
        trades[0].periods.swap(0, 17);
        trades[2].periods.rotate_right(5);
        assert_eq!(aggregate(&trades, reference).unwrap(), expected);
    }

    #[test]
    fn test_empty_trades() {
        let report = aggregate(&[], at(2015, 4, 1, 0, 0)).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_rejects_short_and_long_trades() {
        let reference = at(2015, 4, 1, 0, 0);
        let short = Trade::from_volumes(trade_date(), &[1.0; 23]);
        let long = Trade::from_volumes(trade_date(), &[1.0; 25]);

        assert_eq!(
            aggregate(&[Trade::flat(trade_date(), 1.0), short], reference),
            Err(AggregationError::PeriodCount {
                trade: 1,
                count: 23,
                expected: 24
            })
        );
        assert_eq!(
            aggregate(&[long], reference),
            Err(AggregationError::PeriodCount {
                trade: 0,
                count: 25,
                expected: 24
            })
        );
    }

    #[test]
    fn test_rejects_bad_period_indices() {
        let reference = at(2015, 4, 1, 0, 0);

        let mut zero = Trade::flat(trade_date(), 1.0);
        zero.periods[3] = Period::new(0, 1.0);
        assert!(matches!(
            aggregate(&[zero], reference),
            Err(AggregationError::PeriodOutOfRange { period: 0, .. })
        ));

        let mut dup = Trade::flat(trade_date(), 1.0);
        dup.periods[5] = Period::new(5, 1.0);
        assert_eq!(
            aggregate(&[dup], reference),
            Err(AggregationError::DuplicatePeriod { trade: 0, period: 5 })
        );
    }
}
