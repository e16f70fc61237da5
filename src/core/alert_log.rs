//! Append-only log of triggered results, one JSON Lines file per run

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use chrono::Utc;
use tracing::debug;
use crate::error::AlertLogError;
use crate::types::AnalysisResult;

/// Run id from the current UTC time
pub fn new_run_id() -> String {
    Utc::now().format("%Y%m%dT%H%M%S%3fZ").to_string()
}

/// Writer for `<dir>/run_<run_id>.jsonl`
#[derive(Debug)]
pub struct AlertLog {
    path: PathBuf,
    file: File,
    written: usize,
}

impl AlertLog {
    /// Create `dir` if needed and open the run file for appending
    pub fn open(dir: impl AsRef<Path>, run_id: &str) -> Result<Self, AlertLogError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| AlertLogError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = dir.join(format!("run_{}.jsonl", run_id));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AlertLogError::Io {
                path: path.display().to_string(),
                source,
            })?;
        debug!(path = %path.display(), "alert log opened");
        Ok(Self {
            path,
            file,
            written: 0,
        })
    }

    /// Persist `result` if it triggered; returns whether a line was written
    pub fn record(&mut self, result: &AnalysisResult) -> Result<bool, AlertLogError> {
        if !result.triggered() {
            return Ok(false);
        }
        let line = serde_json::to_string(result)?;
        writeln!(self.file, "{}", line)
            .and_then(|_| self.file.flush())
            .map_err(|source| AlertLogError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        self.written += 1;
        Ok(true)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

/// Read back every record of a run file
pub fn load_alerts(path: impl AsRef<Path>) -> Result<Vec<AnalysisResult>, AlertLogError> {
    let path = path.as_ref();
    let io_err = |source| AlertLogError::Io {
        path: path.display().to_string(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(io_err)?);
    let mut results = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        results.push(serde_json::from_str(&line)?);
    }
    Ok(results)
}
