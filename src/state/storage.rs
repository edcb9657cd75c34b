// File system operations for storing output records
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::models::{ArtifactKind, StoredArtifact};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Create a directory and its parents if missing
pub fn ensure_dir(dir: &Path) -> StorageResult<()> {
    fs::create_dir_all(dir).map_err(io_error(dir))
}

/// Serialize a record as pretty JSON, replacing any previous file
///
/// Returns the written path with its size and SHA256 hash.
pub fn store_record<T: Serialize>(
    kind: ArtifactKind,
    path: &Path,
    record: &T,
) -> StorageResult<StoredArtifact> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let data = serde_json::to_vec_pretty(record)?;
    fs::write(path, &data).map_err(io_error(path))?;

    Ok(StoredArtifact {
        kind,
        path: path.to_path_buf(),
        sha256: calculate_sha256(&data),
        bytes: data.len() as u64,
    })
}

/// Describe a file that is already on disk
pub fn describe_file(kind: ArtifactKind, path: &Path) -> StorageResult<StoredArtifact> {
    let data = fs::read(path).map_err(io_error(path))?;

    Ok(StoredArtifact {
        kind,
        path: path.to_path_buf(),
        sha256: calculate_sha256(&data),
        bytes: data.len() as u64,
    })
}

/// Calculate SHA256 hash of data
pub fn calculate_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
