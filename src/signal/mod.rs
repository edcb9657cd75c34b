// Signal analysis module
// Peak picking shared by the audio and IMU clap locators

pub mod peaks;

pub use peaks::{find_dominant_peak, find_peaks, Peak};
