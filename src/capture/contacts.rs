// Foot contacts
// Transposes per-frame contact records into one sequence per foot point

use serde::{Deserialize, Serialize};

use super::{CaptureError, ContactFrame};

/// The four contact points tracked on each capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FootPoint {
    LeftHeel,
    LeftToe,
    RightHeel,
    RightToe,
}

impl FootPoint {
    pub const ALL: [FootPoint; 4] = [
        FootPoint::LeftHeel,
        FootPoint::LeftToe,
        FootPoint::RightHeel,
        FootPoint::RightToe,
    ];

    /// Label used in the capture's contact records
    pub fn label(&self) -> &'static str {
        match self {
            FootPoint::LeftHeel => "LeftFoot_Heel",
            FootPoint::LeftToe => "LeftFoot_Toe",
            FootPoint::RightHeel => "RightFoot_Heel",
            FootPoint::RightToe => "RightFoot_Toe",
        }
    }
}

/// Contact state per frame, one sequence per foot point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FootContacts {
    pub left_heel: Vec<f32>,
    pub left_toe: Vec<f32>,
    pub right_heel: Vec<f32>,
    pub right_toe: Vec<f32>,
}

impl FootContacts {
    pub fn with_capacity(frames: usize) -> Self {
        FootContacts {
            left_heel: Vec::with_capacity(frames),
            left_toe: Vec::with_capacity(frames),
            right_heel: Vec::with_capacity(frames),
            right_toe: Vec::with_capacity(frames),
        }
    }

    pub fn sequence(&self, point: FootPoint) -> &[f32] {
        match point {
            FootPoint::LeftHeel => &self.left_heel,
            FootPoint::LeftToe => &self.left_toe,
            FootPoint::RightHeel => &self.right_heel,
            FootPoint::RightToe => &self.right_toe,
        }
    }

    fn sequence_mut(&mut self, point: FootPoint) -> &mut Vec<f32> {
        match point {
            FootPoint::LeftHeel => &mut self.left_heel,
            FootPoint::LeftToe => &mut self.left_toe,
            FootPoint::RightHeel => &mut self.right_heel,
            FootPoint::RightToe => &mut self.right_toe,
        }
    }

    pub fn len(&self) -> usize {
        self.left_heel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left_heel.is_empty()
    }
}

/// Split contact records into four parallel sequences, preserving frame order
///
/// Fails on the first frame missing any of the four foot points; nothing is
/// returned for a partially valid stream.
pub fn reformat_contacts(frames: &[ContactFrame]) -> Result<FootContacts, CaptureError> {
    let mut contacts = FootContacts::with_capacity(frames.len());

    for (frame_idx, frame) in frames.iter().enumerate() {
        for point in FootPoint::ALL {
            let value = frame
                .get(point.label())
                .copied()
                .ok_or_else(|| CaptureError::MissingKey {
                    frame: frame_idx,
                    key: point.label().to_string(),
                })?;
            contacts.sequence_mut(point).push(value);
        }
    }

    Ok(contacts)
}
