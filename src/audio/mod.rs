// Audio module
// WAV ingestion, ffmpeg extraction and the decoded-audio cache

pub mod cache;
pub mod extract;
pub mod ingest;

pub use cache::{AudioCache, CacheError, CacheOutcome, FsAudioCache};
pub use extract::{AudioDecoder, DecodeError, FfmpegDecoder, DEFAULT_DECODE_SAMPLE_RATE};
pub use ingest::{ingest_wav, load_wav, write_wav, AudioError, AudioSignal};
