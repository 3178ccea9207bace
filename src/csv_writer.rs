//! CSV snapshot writer
//!
//! One file per cycle, named after the generation minute:
//! `PowerPosition_YYYYMMDD_HHmm.csv`. Content is staged in a temp file inside
//! the output directory and published with a hard link, so readers never see a
//! half-written snapshot and an existing snapshot is never replaced.

use chrono::NaiveDateTime;
use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::WriteError;
use crate::trade::Report;

pub const CSV_HEADER: &str = "Local Time,Volume";
const FILE_PREFIX: &str = "PowerPosition";

/// Snapshot file name for a generation time, truncated to the minute
pub fn snapshot_file_name(generated_at: NaiveDateTime) -> String {
    format!("{}_{}.csv", FILE_PREFIX, generated_at.format("%Y%m%d_%H%M"))
}

/// Render the report as CSV text, buckets in chronological order
pub fn render_csv(report: &Report) -> String {
    let mut out = String::with_capacity(32 + report.len() * 16);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for (slot, volume) in report.iter() {
        // Writing into a String cannot fail
        let _ = writeln!(out, "{},{}", slot.format("%H:%M"), volume);
    }
    out
}

#[derive(Debug, Clone)]
pub struct CsvSnapshotWriter {
    output_dir: PathBuf,
}

impl CsvSnapshotWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Persist the report and return the snapshot path.
    ///
    /// Fails with [`WriteError::AlreadyExists`] when a snapshot for the same
    /// generation minute is already on disk.
    pub async fn write(
        &self,
        report: &Report,
        generated_at: NaiveDateTime,
    ) -> Result<PathBuf, WriteError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| WriteError::CreateDir {
                path: self.output_dir.clone(),
                source,
            })?;

        let file_name = snapshot_file_name(generated_at);
        let path = self.output_dir.join(&file_name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(WriteError::AlreadyExists(path));
        }

        let content = render_csv(report);
        let temp_path = self.temp_path(&file_name);
        if let Err(source) = stage(&temp_path, content.as_bytes()).await {
            remove_temp(&temp_path).await;
            return Err(WriteError::Io {
                path: temp_path,
                source,
            });
        }

        // hard_link refuses to replace an existing target
        let published = tokio::fs::hard_link(&temp_path, &path).await;
        remove_temp(&temp_path).await;
        match published {
            Ok(()) => {
                info!("Wrote {} buckets to {:?}", report.len(), path);
                Ok(path)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(WriteError::AlreadyExists(path)),
            Err(source) => Err(WriteError::Io { path, source }),
        }
    }

    /// Hidden staging path next to the final file
    fn temp_path(&self, file_name: &str) -> PathBuf {
        let pid = std::process::id();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        self.output_dir
            .join(format!(".{}.{}.{}.tmp", file_name, pid, nanos))
    }
}

async fn stage(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    debug!("Staged {} bytes at {:?}", content.len(), path);
    Ok(())
}

async fn remove_temp(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove temp file {:?}: {}", path, e);
        }
    }
}
