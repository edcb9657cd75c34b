// State module
// Output records and their on-disk storage

pub mod models;
pub mod storage;

pub use models::{ArtifactKind, RunSummary, StoredArtifact};
pub use storage::{calculate_sha256, describe_file, ensure_dir, store_record, StorageError};
