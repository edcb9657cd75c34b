// Camera trajectory module
// Reformats per-frame camera localization results into trajectory records

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed localization JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid threshold {0}")]
    InvalidThreshold(f64),
}

/// One frame of camera localization output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizationRecord {
    /// Video frame index; defaults to the record's position in the file
    #[serde(default)]
    pub frame: Option<u64>,

    /// Camera position in world coordinates
    pub position: [f64; 3],

    /// Camera orientation quaternion (x, y, z, w)
    #[serde(default)]
    pub orientation: Option<[f64; 4]>,

    /// Localization confidence, higher is better
    pub confidence: f64,
}

/// Camera trajectory, one entry per kept frame in every sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRecord {
    /// Confidence threshold the record was derived with
    pub threshold: f64,
    pub frames: Vec<u64>,
    pub positions: Vec<[f64; 3]>,
    pub orientations: Vec<Option<[f64; 4]>>,
    pub confidences: Vec<f64>,
}

impl TrajectoryRecord {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn push(&mut self, frame: u64, record: &LocalizationRecord) {
        self.frames.push(frame);
        self.positions.push(record.position);
        self.orientations.push(record.orientation);
        self.confidences.push(record.confidence);
    }
}

/// Turns raw localization frames into a trajectory record
pub trait TrajectoryFilter {
    fn apply(&self, records: &[Option<LocalizationRecord>]) -> TrajectoryRecord;
}

/// Keeps frames whose confidence reaches a threshold
///
/// A threshold of 0 keeps every localized frame. Frames where localization
/// was lost (`null` in the input) are always dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceFilter {
    threshold: f64,
}

impl ConfidenceFilter {
    pub fn new(threshold: f64) -> Result<Self, TrajectoryError> {
        if !(threshold >= 0.0) {
            return Err(TrajectoryError::InvalidThreshold(threshold));
        }
        Ok(ConfidenceFilter { threshold })
    }

    /// Filter that keeps every localized frame
    pub fn unfiltered() -> Self {
        ConfidenceFilter { threshold: 0.0 }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl TrajectoryFilter for ConfidenceFilter {
    fn apply(&self, records: &[Option<LocalizationRecord>]) -> TrajectoryRecord {
        let mut trajectory = TrajectoryRecord {
            threshold: self.threshold,
            ..TrajectoryRecord::default()
        };

        for (position, record) in records.iter().enumerate() {
            let Some(record) = record else {
                continue;
            };
            if record.confidence >= self.threshold {
                trajectory.push(record.frame.unwrap_or(position as u64), record);
            }
        }

        log::debug!(
            "Trajectory at threshold {}: kept {} of {} frames",
            self.threshold,
            trajectory.len(),
            records.len()
        );

        trajectory
    }
}

/// Load localization results from a JSON array
pub fn load_localization(path: &Path) -> Result<Vec<Option<LocalizationRecord>>, TrajectoryError> {
    let content = fs::read_to_string(path).map_err(|source| TrajectoryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_localization(&content)
}

pub fn parse_localization(json: &str) -> Result<Vec<Option<LocalizationRecord>>, TrajectoryError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"frame": 0, "position": [0.0, 0.0, 1.6], "orientation": [0, 0, 0, 1], "confidence": 0.9},
        {"frame": 1, "position": [0.1, 0.0, 1.6], "confidence": 0.05},
        null,
        {"position": [0.3, 0.0, 1.6], "orientation": [0, 0, 0, 1], "confidence": 0.0},
        {"frame": 4, "position": [0.4, 0.1, 1.6], "confidence": 0.1}
    ]"#;

    #[test]
    fn test_parse_localization() {
        let records = parse_localization(SAMPLE).unwrap();

        assert_eq!(records.len(), 5);
        assert!(records[2].is_none());
        assert_eq!(records[1].as_ref().unwrap().orientation, None);
        assert_eq!(records[3].as_ref().unwrap().frame, None);
    }

    #[test]
    fn test_unfiltered_keeps_every_localized_frame() {
        let records = parse_localization(SAMPLE).unwrap();
        let trajectory = ConfidenceFilter::unfiltered().apply(&records);

        assert_eq!(trajectory.frames, vec![0, 1, 3, 4]);
        assert_eq!(trajectory.positions.len(), 4);
        assert_eq!(trajectory.threshold, 0.0);
    }

    #[test]
    fn test_threshold_drops_low_confidence() {
        let records = parse_localization(SAMPLE).unwrap();
        let trajectory = ConfidenceFilter::new(0.1).unwrap().apply(&records);

        // 0.1 itself is kept
        assert_eq!(trajectory.frames, vec![0, 4]);
        assert_eq!(trajectory.confidences, vec![0.9, 0.1]);
        assert_eq!(trajectory.positions[1], [0.4, 0.1, 1.6]);
    }

    #[test]
    fn test_sequences_stay_parallel() {
        let records = parse_localization(SAMPLE).unwrap();
        let trajectory = ConfidenceFilter::new(0.01).unwrap().apply(&records);

        assert_eq!(trajectory.frames.len(), trajectory.positions.len());
        assert_eq!(trajectory.frames.len(), trajectory.orientations.len());
        assert_eq!(trajectory.frames.len(), trajectory.confidences.len());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        assert!(matches!(
            ConfidenceFilter::new(-0.1),
            Err(TrajectoryError::InvalidThreshold(_))
        ));
        assert!(ConfidenceFilter::new(f64::NAN).is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_localization(r#"[{"position": [0, 0]}]"#),
            Err(TrajectoryError::Json(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        let trajectory = ConfidenceFilter::unfiltered().apply(&[]);
        assert!(trajectory.is_empty());
    }
}
