// IMU clap locator
// Finds the clap as the hand-acceleration spike near the start of the suit capture

use serde::{Deserialize, Serialize};

use super::SyncError;
use crate::capture::AccelerationFrame;
use crate::config::SyncSettings;
use crate::signal::find_dominant_peak;

const LEFT_HAND: &str = "left_hand";
const RIGHT_HAND: &str = "right_hand";

/// Peak acceleration frame for each hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImuClap {
    pub left: usize,
    pub right: usize,
}

impl ImuClap {
    /// Frame used as the IMU start. The left hand is the reference.
    pub fn anchor(&self) -> usize {
        self.left
    }

    /// Frames between the two hands' peaks
    pub fn hand_disagreement(&self) -> usize {
        self.left.abs_diff(self.right)
    }
}

/// Locate the clap in the leading window of an acceleration stream
pub fn locate_imu_start(
    frames: &[AccelerationFrame],
    settings: &SyncSettings,
) -> Result<ImuClap, SyncError> {
    let window = &frames[..frames.len().min(settings.imu_window_frames)];

    let left = hand_peak(window, LEFT_HAND)?;
    let right = hand_peak(window, RIGHT_HAND)?;
    let clap = ImuClap { left, right };

    log::info!("Right start: {}", clap.right);
    log::info!("Left start: {}", clap.left);
    if clap.hand_disagreement() > 0 {
        log::debug!(
            "Hand peaks differ by {} frames, using left hand",
            clap.hand_disagreement()
        );
    }

    Ok(clap)
}

fn hand_peak(window: &[AccelerationFrame], channel: &str) -> Result<usize, SyncError> {
    let magnitudes = channel_magnitudes(window, channel)?;

    find_dominant_peak(&magnitudes)
        .map(|peak| peak.index)
        .ok_or_else(|| {
            SyncError::NoPeakFound(format!(
                "{} acceleration (first {} frames)",
                channel,
                window.len()
            ))
        })
}

/// Euclidean norm of one channel for every frame
fn channel_magnitudes(frames: &[AccelerationFrame], channel: &str) -> Result<Vec<f32>, SyncError> {
    frames
        .iter()
        .enumerate()
        .map(|(frame_idx, frame)| {
            frame
                .get(channel)
                .map(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt())
                .ok_or_else(|| SyncError::MissingKey {
                    frame: frame_idx,
                    key: channel.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Vec3;

    fn frame(left: Vec3, right: Vec3) -> AccelerationFrame {
        let mut f = AccelerationFrame::new();
        f.insert(LEFT_HAND.to_string(), left);
        f.insert(RIGHT_HAND.to_string(), right);
        f.insert("pelvis".to_string(), [0.0, 0.0, 9.8]);
        f
    }

    /// Small varying motion with norm at most 1
    fn quiet(i: usize) -> Vec3 {
        let wobble = (i % 5) as f32 * 0.1;
        [0.2, wobble, 0.5]
    }

    #[test]
    fn test_left_hand_spike_at_200() {
        let frames: Vec<AccelerationFrame> = (0..1000)
            .map(|i| {
                let left = if i == 200 { [0.0, 0.0, 5.0] } else { quiet(i) };
                let right = if i == 203 { [0.0, 4.0, 0.0] } else { quiet(i + 1) };
                frame(left, right)
            })
            .collect();

        let clap = locate_imu_start(&frames, &SyncSettings::default()).unwrap();

        assert_eq!(clap.anchor(), 200);
        assert_eq!(clap.right, 203);
        assert_eq!(clap.hand_disagreement(), 3);
    }

    #[test]
    fn test_left_hand_is_authoritative() {
        let frames: Vec<AccelerationFrame> = (0..300)
            .map(|i| {
                let left = if i == 120 { [0.0, 0.0, 3.0] } else { quiet(i) };
                let right = if i == 40 { [0.0, 0.0, 9.0] } else { quiet(i) };
                frame(left, right)
            })
            .collect();

        let clap = locate_imu_start(&frames, &SyncSettings::default()).unwrap();
        assert_eq!(clap.anchor(), 120);
    }

    #[test]
    fn test_spike_after_window_is_ignored() {
        let frames: Vec<AccelerationFrame> = (0..1500)
            .map(|i| {
                let left = match i {
                    300 => [0.0, 0.0, 2.0],
                    1200 => [0.0, 0.0, 20.0],
                    _ => quiet(i),
                };
                frame(left, quiet(i))
            })
            .collect();

        let clap = locate_imu_start(&frames, &SyncSettings::default()).unwrap();
        assert_eq!(clap.anchor(), 300);
    }

    #[test]
    fn test_custom_window() {
        let frames: Vec<AccelerationFrame> = (0..100)
            .map(|i| {
                let left = match i {
                    10 => [0.0, 0.0, 2.0],
                    60 => [0.0, 0.0, 8.0],
                    _ => quiet(i),
                };
                frame(left, quiet(i))
            })
            .collect();

        let settings = SyncSettings {
            imu_window_frames: 50,
            ..SyncSettings::default()
        };
        assert_eq!(locate_imu_start(&frames, &settings).unwrap().anchor(), 10);
    }

    #[test]
    fn test_still_hand_has_no_peak() {
        let frames: Vec<AccelerationFrame> = (0..100)
            .map(|i| frame(quiet(i), [0.0, 0.0, 0.0]))
            .collect();

        match locate_imu_start(&frames, &SyncSettings::default()) {
            Err(SyncError::NoPeakFound(what)) => assert!(what.contains(RIGHT_HAND)),
            other => panic!("expected NoPeakFound, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_stream() {
        assert!(matches!(
            locate_imu_start(&[], &SyncSettings::default()),
            Err(SyncError::NoPeakFound(_))
        ));
    }

    #[test]
    fn test_missing_hand_channel() {
        let mut frames: Vec<AccelerationFrame> =
            (0..10).map(|i| frame(quiet(i), quiet(i))).collect();
        frames[4].remove(LEFT_HAND);

        match locate_imu_start(&frames, &SyncSettings::default()) {
            Err(SyncError::MissingKey { frame, key }) => {
                assert_eq!(frame, 4);
                assert_eq!(key, LEFT_HAND);
            }
            other => panic!("expected MissingKey, got {:?}", other),
        }
    }
}
