///! Per-run bookkeeping and end-of-run report
///!
///! Counts what happened to every record, keeps the text of the failed
///! ones, and at the end writes them to a timestamped overflow file before
///! optionally emptying the source.

use std::path::Path;

use chrono::{DateTime, Local};
use qrzsync_common::ADIF_HEADER;
use tokio::fs;
use tracing::{info, warn};

use super::logbook::SubmitOutcome;
use crate::error::{Result, SyncError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLedger {
    pub processed: usize,
    pub added: usize,
    pub ignored: usize,
    pub failed: usize,
    /// Submitted text of every rejected record, in input order
    pub failed_records: Vec<String>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record skipped because the dedup cache already knows it.
    pub fn record_ignored(&mut self) {
        self.processed += 1;
        self.ignored += 1;
    }

    /// A record that went to the logbook as `adif`.
    pub fn record_outcome(&mut self, outcome: &SubmitOutcome, adif: &str) {
        self.processed += 1;
        if outcome.is_failure() {
            self.failed += 1;
            self.failed_records.push(adif.to_string());
        } else {
            self.added += 1;
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 { 1 } else { 0 }
    }

    /// One-line summary; zero counters other than `processed` are left out.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = [
            (self.added, "added"),
            (self.ignored, "ignored (already uploaded)"),
            (self.failed, "failed"),
        ]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{} {}", count, label))
        .collect();

        if parts.is_empty() {
            format!("Processed {} records", self.processed)
        } else {
            format!("Processed {} records: {}", self.processed, parts.join(", "))
        }
    }

    /// Close the run: save failed records, empty the source if asked, log
    /// the summary and return the exit code.
    ///
    /// The source is left alone unless the failed records were written.
    pub async fn finalize(&self, failed_dir: &Path, source: &Path, delete_source: bool) -> Result<i32> {
        if !self.failed_records.is_empty() {
            let path = failed_dir.join(failed_records_file_name(Local::now()));

            if let Err(e) = self.write_failed_records(&path).await {
                if delete_source {
                    warn!("Will *not* empty {} due to error above", source.display());
                }
                return Err(e);
            }
            info!(
                "Written {} failed records into file {}",
                self.failed_records.len(),
                path.display()
            );
        }

        if delete_source {
            fs::write(source, format!("{}\n", ADIF_HEADER))
                .await
                .map_err(|source_err| SyncError::Truncate {
                    path: source.to_path_buf(),
                    source: source_err,
                })?;
            info!("Emptied the source file {}", source.display());
        }

        info!("{}", self.summary());
        Ok(self.exit_code())
    }

    async fn write_failed_records(&self, path: &Path) -> Result<()> {
        let mut content = format!("{}\n", ADIF_HEADER);
        for record in &self.failed_records {
            content.push_str(record);
            content.push('\n');
        }

        fs::write(path, content)
            .await
            .map_err(|source| SyncError::FailedRecordsWrite {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// `YYYYMMDD_HHMMSS_failed_records.adi`
pub fn failed_records_file_name(now: DateTime<Local>) -> String {
    format!("{}_failed_records.adi", now.format("%Y%m%d_%H%M%S"))
}
