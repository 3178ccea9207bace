//! Power position extraction library
//!
//! Periodically pulls the day's power trades from an upstream provider,
//! nets their volumes into hourly buckets of the trading day, and writes each
//! result as a timestamped CSV snapshot.
//!
//! Pipeline:
//! - `Scheduler` runs an `ExtractionJob` on a fixed interval
//! - `ExtractionJob` fetches via `ResilientFetcher`, aggregates, then writes via `CsvSnapshotWriter`

pub mod aggregator;
pub mod clock;
pub mod config;
pub mod csv_writer;
pub mod error;
pub mod fetcher;
pub mod job;
pub mod provider;
pub mod scheduler;
pub mod trade;

// Re-export commonly used types
pub use aggregator::{aggregate, period_slot, trading_day_start};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, ProviderConfig};
pub use csv_writer::{CsvSnapshotWriter, render_csv, snapshot_file_name};
pub use error::{AggregationError, FetchError, JobError, Stage, WriteError};
pub use fetcher::{ResilientFetcher, RetryPolicy};
pub use job::{CycleOutcome, ExtractionJob};
pub use provider::{JsonFileProvider, SimulatedPowerService, TradeProvider};
pub use scheduler::{Scheduler, SchedulerSummary};
pub use trade::{PERIODS_PER_DAY, Period, Report, Trade};
