// Data models for run outputs
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::sync::{ImuClap, SyncOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    AudioCache,
    SyncOffset,
    Contacts,
    PoseTrans,
    FilteredTrajectory,
    UnfilteredTrajectory,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::AudioCache => "audio_cache",
            ArtifactKind::SyncOffset => "sync_offset",
            ArtifactKind::Contacts => "contacts",
            ArtifactKind::PoseTrans => "pose_trans",
            ArtifactKind::FilteredTrajectory => "filtered_trajectory",
            ArtifactKind::UnfilteredTrajectory => "unfiltered_trajectory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub sha256: String,
    pub bytes: u64,
}

/// Everything a driver run produced for one sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub sequence: String,
    pub offset: SyncOffset,
    pub imu_clap: ImuClap,
    pub artifacts: Vec<StoredArtifact>,
}

impl RunSummary {
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&StoredArtifact> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }
}
