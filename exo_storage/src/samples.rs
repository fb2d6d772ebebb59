//! Append-only JSON-lines sample log.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use exo_traits::{SampleSink, SensorSample};

use crate::error::{Result, StorageError};
use crate::util::LineAppender;

/// One flat sample object per line, in arrival order.
#[derive(Debug)]
pub struct JsonlSampleSink {
    path: PathBuf,
    file: Mutex<LineAppender<File>>,
}

impl JsonlSampleSink {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = LineAppender::open(&path)?;
        tracing::debug!(path = %path.display(), "sample log opened");
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, sample: &SensorSample) -> Result<()> {
        let line = serde_json::to_vec(sample)?;
        let mut f = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        f.append(&line)?;
        Ok(())
    }
}

impl SampleSink for JsonlSampleSink {
    fn append(
        &self,
        sample: &SensorSample,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write(sample).map_err(Into::into)
    }
}

/// Read a sample log back. Blank lines are skipped; a malformed line is an error.
pub fn read_samples(path: &Path) -> Result<Vec<SensorSample>> {
    let reader = BufReader::new(File::open(path)?);
    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let sample = serde_json::from_str(&line).map_err(|e| StorageError::Corrupt {
            path: path.to_path_buf(),
            msg: format!("line {}: {e}", idx + 1),
        })?;
        out.push(sample);
    }
    Ok(out)
}
