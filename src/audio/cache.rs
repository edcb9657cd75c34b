// Decoded-audio cache
// Path-addressed store so each video is decoded at most once

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::extract::DecodeError;
use super::ingest::{load_wav, write_wav, AudioError, AudioSignal};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("No cached audio at {0}")]
    Missing(PathBuf),
}

/// Result of an `ensure` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Entry already existed, nothing was computed
    Hit,

    /// Entry was computed and stored
    Stored,
}

/// Storage for decoded audio keyed by path
pub trait AudioCache {
    fn contains(&self, key: &Path) -> bool;

    fn store(&mut self, key: &Path, signal: &AudioSignal) -> Result<(), CacheError>;

    fn load(&self, key: &Path) -> Result<AudioSignal, CacheError>;

    /// Compute and store the entry for `key` unless it already exists
    fn ensure<F>(&mut self, key: &Path, compute: F) -> Result<CacheOutcome, CacheError>
    where
        F: FnOnce() -> Result<AudioSignal, CacheError>,
        Self: Sized,
    {
        if self.contains(key) {
            log::debug!("Audio cache hit: {}", key.display());
            return Ok(CacheOutcome::Hit);
        }

        let signal = compute()?;
        self.store(key, &signal)?;
        log::info!("Cached {} samples at {}", signal.len(), key.display());

        Ok(CacheOutcome::Stored)
    }
}

/// Cache entries are WAV files on disk
#[derive(Debug, Default, Clone)]
pub struct FsAudioCache;

impl FsAudioCache {
    pub fn new() -> Self {
        FsAudioCache
    }
}

impl AudioCache for FsAudioCache {
    fn contains(&self, key: &Path) -> bool {
        key.is_file()
    }

    fn store(&mut self, key: &Path, signal: &AudioSignal) -> Result<(), CacheError> {
        if let Some(parent) = key.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename so a failed write never looks like a hit
        let partial = key.with_extension("wav.partial");
        write_wav(&partial, signal)?;
        fs::rename(&partial, key)?;

        Ok(())
    }

    fn load(&self, key: &Path) -> Result<AudioSignal, CacheError> {
        if !key.is_file() {
            return Err(CacheError::Missing(key.to_path_buf()));
        }
        Ok(load_wav(key)?)
    }
}
