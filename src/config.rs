// Configuration
// Path roots and tunable analysis settings, loaded from TOML

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::audio::DEFAULT_DECODE_SAMPLE_RATE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{name} does not exist: {path}")]
    MissingRoot { name: &'static str, path: PathBuf },

    #[error("Invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathRoots,

    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub audio: AudioSettings,

    #[serde(default)]
    pub trajectory: TrajectorySettings,
}

/// Filesystem roots used to compose every input and output path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathRoots {
    /// Searched recursively for `<id>.mp4`
    #[serde(rename = "VIDEO_PATH")]
    pub video: PathBuf,

    /// Decoded-audio cache
    #[serde(rename = "AUDIO_PATH")]
    pub audio: PathBuf,

    #[serde(rename = "MVNX_PATH")]
    pub mvnx: PathBuf,

    /// Pose and translation text files
    #[serde(rename = "TXT_PATH")]
    pub txt: PathBuf,

    #[serde(rename = "CONTACT_PATH")]
    pub contact: PathBuf,

    /// Sync offset records
    #[serde(rename = "INIT_PATH_SAVE")]
    pub init_save: PathBuf,

    #[serde(rename = "IMU_PATH")]
    pub imu: PathBuf,

    /// Trajectory outputs
    #[serde(rename = "CAM_PATH")]
    pub cam: PathBuf,

    /// Searched recursively for `<id>.json` localization results
    #[serde(rename = "IN_CAM_PATH")]
    pub in_cam: PathBuf,
}

impl PathRoots {
    /// Roots that must already exist before a run starts
    pub fn input_roots(&self) -> [(&'static str, &Path); 4] {
        [
            ("VIDEO_PATH", self.video.as_path()),
            ("MVNX_PATH", self.mvnx.as_path()),
            ("TXT_PATH", self.txt.as_path()),
            ("IN_CAM_PATH", self.in_cam.as_path()),
        ]
    }

    /// Roots the pipeline writes into, created on demand
    pub fn output_roots(&self) -> [(&'static str, &Path); 5] {
        [
            ("AUDIO_PATH", self.audio.as_path()),
            ("CONTACT_PATH", self.contact.as_path()),
            ("INIT_PATH_SAVE", self.init_save.as_path()),
            ("IMU_PATH", self.imu.as_path()),
            ("CAM_PATH", self.cam.as_path()),
        ]
    }

    /// Every root rooted under `base`, using the conventional directory names
    pub fn under(base: &Path) -> Self {
        PathRoots {
            video: base.join("videos"),
            audio: base.join("audio"),
            mvnx: base.join("mvnx"),
            txt: base.join("txt"),
            contact: base.join("contacts"),
            init_save: base.join("init"),
            imu: base.join("imu"),
            cam: base.join("cam"),
            in_cam: base.join("cam_in"),
        }
    }
}

/// Clap search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Camera frame rate used to convert audio samples to frames
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,

    /// Only the leading part of the audio is searched for the clap
    #[serde(default = "default_audio_window_secs")]
    pub audio_window_secs: f64,

    /// Only the leading IMU frames are searched for the clap
    #[serde(default = "default_imu_window_frames")]
    pub imu_window_frames: usize,
}

fn default_target_fps() -> u32 { 30 }
fn default_audio_window_secs() -> f64 { 50.0 }
fn default_imu_window_frames() -> usize { 1000 }

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            target_fps: default_target_fps(),
            audio_window_secs: default_audio_window_secs(),
            imu_window_frames: default_imu_window_frames(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,

    #[serde(default = "default_decode_sample_rate")]
    pub decode_sample_rate: u32,
}

fn default_ffmpeg() -> PathBuf { PathBuf::from("ffmpeg") }
fn default_decode_sample_rate() -> u32 { DEFAULT_DECODE_SAMPLE_RATE }

impl Default for AudioSettings {
    fn default() -> Self {
        AudioSettings {
            ffmpeg: default_ffmpeg(),
            decode_sample_rate: default_decode_sample_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectorySettings {
    /// Minimum localization confidence kept in the filtered trajectory
    #[serde(default = "default_filtered_threshold")]
    pub filtered_threshold: f64,
}

fn default_filtered_threshold() -> f64 { 0.1 }

impl Default for TrajectorySettings {
    fn default() -> Self {
        TrajectorySettings {
            filtered_threshold: default_filtered_threshold(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Check settings and that every input root exists
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, path) in self.paths.input_roots() {
            if !path.is_dir() {
                return Err(ConfigError::MissingRoot {
                    name,
                    path: path.to_path_buf(),
                });
            }
        }

        if self.sync.target_fps == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "target_fps",
                reason: "must be positive".to_string(),
            });
        }
        if !(self.sync.audio_window_secs > 0.0) {
            return Err(ConfigError::InvalidSetting {
                name: "audio_window_secs",
                reason: format!("must be positive, got {}", self.sync.audio_window_secs),
            });
        }
        if self.sync.imu_window_frames == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "imu_window_frames",
                reason: "must be positive".to_string(),
            });
        }
        if self.audio.decode_sample_rate == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "decode_sample_rate",
                reason: "must be positive".to_string(),
            });
        }
        if !(self.trajectory.filtered_threshold >= 0.0) {
            return Err(ConfigError::InvalidSetting {
                name: "filtered_threshold",
                reason: format!("must be non-negative, got {}", self.trajectory.filtered_threshold),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[paths]
VIDEO_PATH = "/data/videos"
AUDIO_PATH = "/data/audio"
MVNX_PATH = "/data/mvnx"
TXT_PATH = "/data/txt"
CONTACT_PATH = "/out/contacts"
INIT_PATH_SAVE = "/out/init"
IMU_PATH = "/out/imu"
CAM_PATH = "/out/cam"
IN_CAM_PATH = "/data/cam"

[sync]
imu_window_frames = 500
"#;

    #[test]
    fn test_parse_with_defaults() {
        let config = Config::from_toml(SAMPLE).unwrap();

        assert_eq!(config.paths.video, PathBuf::from("/data/videos"));
        assert_eq!(config.paths.init_save, PathBuf::from("/out/init"));
        assert_eq!(config.sync.imu_window_frames, 500);
        assert_eq!(config.sync.target_fps, 30);
        assert_eq!(config.sync.audio_window_secs, 50.0);
        assert_eq!(config.audio.decode_sample_rate, 44100);
        assert_eq!(config.trajectory.filtered_threshold, 0.1);
    }

    #[test]
    fn test_missing_root_key_fails() {
        let result = Config::from_toml("[paths]\nVIDEO_PATH = \"/v\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_reports_missing_input_root() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            paths: PathRoots::under(temp_dir.path()),
            ..Config::default()
        };

        match config.validate() {
            Err(ConfigError::MissingRoot { name, .. }) => assert_eq!(name, "VIDEO_PATH"),
            other => panic!("expected MissingRoot, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_ok_without_output_roots() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PathRoots::under(temp_dir.path());
        for (_, root) in paths.input_roots() {
            fs::create_dir_all(root).unwrap();
        }

        let config = Config {
            paths,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_fps() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PathRoots::under(temp_dir.path());
        for (_, root) in paths.input_roots() {
            fs::create_dir_all(root).unwrap();
        }

        let mut config = Config {
            paths,
            ..Config::default()
        };
        config.sync.target_fps = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSetting { name: "target_fps", .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/no/such/capture_sync.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
