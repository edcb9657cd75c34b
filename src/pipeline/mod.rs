// Pipeline module
// Batch driver that turns one capture session into its synchronized outputs

pub mod driver;
pub mod paths;
pub mod trace;

use std::path::PathBuf;
use thiserror::Error;

use crate::capture::CaptureError;
use crate::config::ConfigError;
use crate::motion::MotionError;
use crate::state::StorageError;
use crate::sync::SyncError;
use crate::trajectory::TrajectoryError;

pub use driver::BatchDriver;
pub use paths::{find_by_name, SequencePaths};
pub use trace::{read_trace_file, Stage, TraceEntry, TraceError, TraceWriter};

/// Any failure that aborts a run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{what} not found: {path}")]
    FileNotFound { what: &'static str, path: PathBuf },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Synchronization failed: {0}")]
    Sync(#[from] SyncError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Motion text error: {0}")]
    Motion(#[from] MotionError),

    #[error("Trajectory error: {0}")]
    Trajectory(#[from] TrajectoryError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),
}
