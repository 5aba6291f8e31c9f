//! Run history: stored run records and their removal.
//!
//! Each run lives in its own directory below the runs directory:
//!
//! ```text
//! <runs_dir>/<test name>/<YYYYMMDDTHHMMSS.mmm>/
//!     run.json      - the RunRecord
//!     output.log    - captured stdout and stderr
//! ```

use crate::Result;
use crate::models::RunRecord;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name of a run record inside its run directory.
pub const RUN_RECORD_FILE: &str = "run.json";

/// File name of the captured output inside a run directory.
pub const RUN_OUTPUT_FILE: &str = "output.log";

/// Stored run records.
pub trait RunHistory {
    /// All records, oldest first.
    fn records(&self) -> Result<Vec<RunRecord>>;

    /// Delete a record and its artifacts.
    fn remove(&self, record: &RunRecord) -> Result<()>;
}

impl<T: RunHistory + ?Sized> RunHistory for &T {
    fn records(&self) -> Result<Vec<RunRecord>> {
        (**self).records()
    }

    fn remove(&self, record: &RunRecord) -> Result<()> {
        (**self).remove(record)
    }
}

/// Run records stored as `run.json` files below a runs directory.
#[derive(Debug, Clone)]
pub struct DirRunHistory {
    runs_dir: PathBuf,
}

impl DirRunHistory {
    pub fn new(runs_dir: impl Into<PathBuf>) -> Self {
        Self {
            runs_dir: runs_dir.into(),
        }
    }

    pub fn runs_dir(&self) -> &Path {
        &self.runs_dir
    }
}

impl RunHistory for DirRunHistory {
    fn records(&self) -> Result<Vec<RunRecord>> {
        if !self.runs_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in WalkDir::new(&self.runs_dir).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() || entry.file_name() != RUN_RECORD_FILE {
                continue;
            }
            let path = entry.path();
            match read_record(path) {
                Ok(mut record) => {
                    record.dir = path
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.runs_dir.clone());
                    records.push(record);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable run record");
                }
            }
        }

        records.sort_by(|a, b| {
            a.started_at
                .cmp(&b.started_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(records)
    }

    fn remove(&self, record: &RunRecord) -> Result<()> {
        // Never delete outside the runs directory
        if record.dir == self.runs_dir || !record.dir.starts_with(&self.runs_dir) {
            return Err(crate::Error::InvalidInput(format!(
                "run directory {} is not inside {}",
                record.dir.display(),
                self.runs_dir.display()
            )));
        }
        tracing::debug!(dir = %record.dir.display(), "removing run");
        fs::remove_dir_all(&record.dir)?;

        // Drop the per-test directory once its last run is gone
        if let Some(parent) = record.dir.parent() {
            if parent != self.runs_dir && fs::read_dir(parent)?.next().is_none() {
                fs::remove_dir(parent)?;
            }
        }
        Ok(())
    }
}

fn read_record(path: &Path) -> Result<RunRecord> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write a record into its run directory.
pub fn write_record(record: &RunRecord) -> Result<()> {
    fs::create_dir_all(&record.dir)?;
    let json = serde_json::to_string_pretty(record)?;
    fs::write(record.dir.join(RUN_RECORD_FILE), json)?;
    Ok(())
}
