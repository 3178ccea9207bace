//! Error types for one extraction cycle

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Upstream provider still failing after the retry budget was spent
#[derive(Error, Debug)]
#[error("trade fetch failed after {attempts} attempt(s): {source}")]
pub struct FetchError {
    pub attempts: u32,
    #[source]
    pub source: anyhow::Error,
}

/// Trade data that cannot be mapped onto a trading day
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    #[error("trade {trade} has {count} periods, expected {expected}")]
    PeriodCount {
        trade: usize,
        count: usize,
        expected: usize,
    },

    #[error("trade {trade} has period index {period} outside 1..={max}")]
    PeriodOutOfRange { trade: usize, period: u32, max: u32 },

    #[error("trade {trade} lists period {period} more than once")]
    DuplicatePeriod { trade: usize, period: u32 },
}

/// Snapshot could not be persisted
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to create output directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("snapshot {0:?} already exists")]
    AlreadyExists(PathBuf),

    #[error("failed to write snapshot {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Any failure that ends a cycle early
#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl JobError {
    /// Pipeline stage the error came from
    pub fn stage(&self) -> Stage {
        match self {
            JobError::Fetch(_) => Stage::Fetching,
            JobError::Aggregation(_) => Stage::Aggregating,
            JobError::Write(_) => Stage::Writing,
        }
    }
}

/// Stages of an extraction cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Aggregating,
    Writing,
    Done,
    Failed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Fetching => "FETCHING",
            Stage::Aggregating => "AGGREGATING",
            Stage::Writing => "WRITING",
            Stage::Done => "DONE",
            Stage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}
