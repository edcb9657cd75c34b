// Run tracing
// Append-only JSONL trace of the stages completed for one sequence

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during trace operations
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Driver stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CamStart,
    ImuStart,
    SyncRecord,
    Contacts,
    PoseTrans,
    FilteredTrajectory,
    UnfilteredTrajectory,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::CamStart,
        Stage::ImuStart,
        Stage::SyncRecord,
        Stage::Contacts,
        Stage::PoseTrans,
        Stage::FilteredTrajectory,
        Stage::UnfilteredTrajectory,
    ];

    /// Fraction of the run finished once this stage completes
    pub fn progress(&self) -> f32 {
        let position = Stage::ALL.iter().position(|s| s == self).unwrap_or(0);
        (position + 1) as f32 / Stage::ALL.len() as f32
    }
}

/// A single trace entry in the run log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// ISO 8601 timestamp of when this entry was created
    pub timestamp: String,

    pub sequence: String,

    pub stage: Stage,

    /// Overall run progress [0.0, 1.0]
    pub progress: f32,

    pub message: String,

    /// Optional structured data (detected frames, artifact checksums)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TraceEntry {
    /// Entry marking `stage` as finished
    pub fn completed(sequence: &str, stage: Stage, message: impl Into<String>) -> Self {
        TraceEntry {
            timestamp: Utc::now().to_rfc3339(),
            sequence: sequence.to_string(),
            stage,
            progress: stage.progress(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Serialize to JSON line (with newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

/// Run trace writer
pub struct TraceWriter {
    file_path: PathBuf,
}

impl TraceWriter {
    /// Start a fresh trace, discarding entries from earlier runs
    pub fn create(file_path: PathBuf) -> Result<Self, TraceError> {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        File::create(&file_path)?;
        Ok(TraceWriter { file_path })
    }

    /// Append a trace entry to the file
    pub fn write(&self, entry: &TraceEntry) -> Result<(), TraceError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        file.write_all(entry.to_json_line()?.as_bytes())?;
        file.flush()?;

        Ok(())
    }

    /// Get the trace file path
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Read trace entries from a JSONL file
pub fn read_trace_file(path: &Path) -> Result<Vec<TraceEntry>, TraceError> {
    let contents = fs::read_to_string(path)?;
    let mut entries = Vec::new();

    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let entry: TraceEntry = serde_json::from_str(line)?;
        entries.push(entry);
    }

    Ok(entries)
}
