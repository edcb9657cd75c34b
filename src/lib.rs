// Capture Sync - Clap-based synchronization of head-camera and IMU suit captures
// Module declarations

pub mod audio;
pub mod capture;
pub mod config;
pub mod motion;
pub mod pipeline;
pub mod signal;
pub mod state;
pub mod sync;
pub mod trajectory;

pub use config::Config;
pub use pipeline::{BatchDriver, PipelineError};
pub use state::RunSummary;
pub use sync::SyncOffset;
