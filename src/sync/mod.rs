// Synchronization module
// Locates the clap in the camera audio and the IMU stream and pairs the two frames

pub mod audio_clap;
pub mod imu_clap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::CacheError;

pub use audio_clap::{cam_start_from_signal, locate_cam_start, sample_to_frame};
pub use imu_clap::{locate_imu_start, ImuClap};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No peak found in {0}")]
    NoPeakFound(String),

    #[error("Frame {frame} is missing channel '{key}'")]
    MissingKey { frame: usize, key: String },

    #[error("Audio cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Frame in each stream at which the clap happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOffset {
    pub imu_start: usize,
    pub cam_start: usize,
}

impl SyncOffset {
    pub fn new(imu_start: usize, cam_start: usize) -> Self {
        SyncOffset {
            imu_start,
            cam_start,
        }
    }
}
