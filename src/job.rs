//! One extraction cycle: fetch, aggregate, write
//!
//! Every failure is contained here. The scheduler only ever receives a
//! [`CycleOutcome`], never an error.

use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::aggregator::aggregate;
use crate::clock::Clock;
use crate::csv_writer::CsvSnapshotWriter;
use crate::error::{JobError, Stage};
use crate::fetcher::ResilientFetcher;

/// Result of a single cycle
#[derive(Debug)]
pub enum CycleOutcome {
    Completed { path: PathBuf, buckets: usize },
    Failed { stage: Stage, error: JobError },
}

impl CycleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed { .. })
    }

    /// Final state of the cycle
    pub fn stage(&self) -> Stage {
        match self {
            CycleOutcome::Completed { .. } => Stage::Done,
            CycleOutcome::Failed { .. } => Stage::Failed,
        }
    }
}

pub struct ExtractionJob {
    fetcher: ResilientFetcher,
    writer: CsvSnapshotWriter,
    clock: Arc<dyn Clock>,
}

impl ExtractionJob {
    pub fn new(fetcher: ResilientFetcher, writer: CsvSnapshotWriter, clock: Arc<dyn Clock>) -> Self {
        Self {
            fetcher,
            writer,
            clock,
        }
    }

    /// Run a cycle with the clock's current time as reference
    pub async fn run_now(&self, cancel: &CancellationToken) -> CycleOutcome {
        let reference = self.clock.now();
        self.run(reference, cancel).await
    }

    /// Run a cycle for an explicit reference time
    pub async fn run(&self, reference: NaiveDateTime, cancel: &CancellationToken) -> CycleOutcome {
        info!("Running power position extraction: {} (local time)", reference);

        match self.execute(reference, cancel).await {
            Ok((path, buckets)) => {
                info!(
                    "Completed power position extraction: {} -> {:?} ({} buckets)",
                    reference, path, buckets
                );
                CycleOutcome::Completed { path, buckets }
            }
            Err(e) => {
                let stage = e.stage();
                error!(
                    "Power position extraction failed at {} for {}: {}",
                    stage, reference, e
                );
                CycleOutcome::Failed { stage, error: e }
            }
        }
    }

    async fn execute(
        &self,
        reference: NaiveDateTime,
        cancel: &CancellationToken,
    ) -> Result<(PathBuf, usize), JobError> {
        debug!("Stage {}", Stage::Fetching);
        let trades = self.fetcher.fetch(reference, cancel).await?;

        debug!("Stage {} ({} trades)", Stage::Aggregating, trades.len());
        let report = aggregate(&trades, reference)?;
        drop(trades);

        debug!("Stage {} ({} buckets)", Stage::Writing, report.len());
        let generated_at = self.clock.now();
        let path = self.writer.write(&report, generated_at).await?;

        Ok((path, report.len()))
    }
}
