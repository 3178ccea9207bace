//! Fixed-interval driver for the extraction job

use anyhow::{Result, bail};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::job::ExtractionJob;

/// Cycle counts reported when the scheduler stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerSummary {
    pub cycles: u64,
    pub completed: u64,
    pub failed: u64,
}

pub struct Scheduler {
    job: ExtractionJob,
    interval: Duration,
}

impl Scheduler {
    pub fn new(job: ExtractionJob, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            bail!("scheduler interval must be positive");
        }
        Ok(Self { job, interval })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one cycle immediately, then one cycle per `interval` after the
    /// previous cycle finishes, until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) -> SchedulerSummary {
        info!("Scheduler started (interval: {:?})", self.interval);
        let mut summary = SchedulerSummary::default();

        while !cancel.is_cancelled() {
            let outcome = self.job.run_now(&cancel).await;
            summary.cycles += 1;
            if outcome.is_completed() {
                summary.completed += 1;
            } else {
                summary.failed += 1;
            }

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = cancel.cancelled() => break,
            }
        }

        info!(
            "Scheduler stopped after {} cycles ({} completed, {} failed)",
            summary.cycles, summary.completed, summary.failed
        );
        summary
    }

    /// Run a single cycle outside the interval loop
    pub async fn run_once(&self, cancel: CancellationToken) -> SchedulerSummary {
        let outcome = self.job.run_now(&cancel).await;
        let completed = u64::from(outcome.is_completed());
        SchedulerSummary {
            cycles: 1,
            completed,
            failed: 1 - completed,
        }
    }
}
