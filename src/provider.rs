//! Upstream trade providers
//!
//! The fetch stage only depends on [`TradeProvider`]. Two implementations ship
//! with the service: a simulated power service that behaves like the vendor
//! feed (random volumes, intermittent failures) and a JSON file replay.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rand::Rng;
use std::path::PathBuf;
use tracing::debug;

use crate::aggregator::trading_day_start;
use crate::trade::{PERIODS_PER_DAY, Trade};

/// Source of trades for the trading day of a reference time
#[async_trait]
pub trait TradeProvider: Send + Sync {
    async fn get_trades(&self, reference: NaiveDateTime) -> Result<Vec<Trade>>;
}

/// Random trade generator with a configurable failure rate
#[derive(Debug, Clone)]
pub struct SimulatedPowerService {
    trade_count: usize,
    failure_rate: f64,
    max_volume: f64,
}

impl SimulatedPowerService {
    pub fn new(trade_count: usize, failure_rate: f64, max_volume: f64) -> Self {
        Self {
            trade_count,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            max_volume: max_volume.abs(),
        }
    }
}

#[async_trait]
impl TradeProvider for SimulatedPowerService {
    async fn get_trades(&self, reference: NaiveDateTime) -> Result<Vec<Trade>> {
        let mut rng = rand::thread_rng();
        if rng.gen_bool(self.failure_rate) {
            bail!("power service unavailable");
        }

        // Trade date is the calendar day the trading day mostly covers
        let date = (trading_day_start(reference) + chrono::Duration::hours(1)).date();
        let trades = (0..self.trade_count)
            .map(|_| {
                let volumes: Vec<f64> = (0..PERIODS_PER_DAY)
                    .map(|_| {
                        if self.max_volume > 0.0 {
                            rng.gen_range(-self.max_volume..=self.max_volume).round()
                        } else {
                            0.0
                        }
                    })
                    .collect();
                Trade::from_volumes(date, &volumes)
            })
            .collect::<Vec<_>>();

        debug!("Simulated {} trades for {}", trades.len(), date);
        Ok(trades)
    }
}

/// Reads a captured extract (`[Trade, ...]` as JSON) on every call
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TradeProvider for JsonFileProvider {
    async fn get_trades(&self, _reference: NaiveDateTime) -> Result<Vec<Trade>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .context(format!("Failed to read trades file: {:?}", self.path))?;

        let trades: Vec<Trade> = serde_json::from_str(&content)
            .context(format!("Failed to parse trades file: {:?}", self.path))?;

        debug!("Loaded {} trades from {:?}", trades.len(), self.path);
        Ok(trades)
    }
}
