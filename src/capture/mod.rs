// IMU capture module
// Per-frame channel records read from the suit capture, and foot-contact reshaping

pub mod contacts;
pub mod mvnx;

use std::collections::BTreeMap;
use thiserror::Error;

pub use contacts::{reformat_contacts, FootContacts, FootPoint};
pub use mvnx::MvnxReader;

/// Three-axis acceleration in m/s²
pub type Vec3 = [f32; 3];

/// One frame of acceleration, keyed by snake_case segment name (e.g. "left_hand")
pub type AccelerationFrame = BTreeMap<String, Vec3>;

/// One frame of foot contacts, keyed by contact label (e.g. "LeftFoot_Heel")
pub type ContactFrame = BTreeMap<String, f32>;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Capture is missing <{0}>")]
    MissingElement(&'static str),

    #[error("Frame {frame}: invalid number '{value}' in <{element}>")]
    InvalidNumber {
        frame: usize,
        element: &'static str,
        value: String,
    },

    #[error("Frame {frame}: <{element}> has {found} values, expected {expected}")]
    ValueCount {
        frame: usize,
        element: &'static str,
        found: usize,
        expected: usize,
    },

    #[error("Frame {frame} is missing key '{key}'")]
    MissingKey { frame: usize, key: String },
}

/// Source of per-frame sensor channels for one capture
pub trait CaptureSource {
    /// Per-frame acceleration for every segment
    fn acceleration(&self) -> Result<Vec<AccelerationFrame>, CaptureError>;

    /// Per-frame foot-contact states
    fn foot_contacts(&self) -> Result<Vec<ContactFrame>, CaptureError>;
}
