// Audio clap locator
// Finds the clap transient in the head-camera audio and converts it to a video frame

use std::path::Path;

use super::SyncError;
use crate::audio::{AudioCache, AudioDecoder, AudioSignal, CacheError, CacheOutcome};
use crate::config::SyncSettings;
use crate::signal::find_dominant_peak;

/// Convert a sample index to a video frame index, truncating
///
/// Integer arithmetic keeps the mapping monotonic in `sample_index`.
pub fn sample_to_frame(sample_index: usize, sample_rate: u32, fps: u32) -> usize {
    if sample_rate == 0 {
        return 0;
    }
    (sample_index as u64 * fps as u64 / sample_rate as u64) as usize
}

/// Camera frame of the clap in already decoded audio
///
/// Empty audio, or a window without any positive peak, degrades to frame 0.
pub fn cam_start_from_signal(signal: &AudioSignal, settings: &SyncSettings) -> usize {
    if signal.is_empty() {
        log::warn!("Audio is empty, camera start defaults to 0");
        return 0;
    }

    let window = signal.leading_window(settings.audio_window_secs);
    log::debug!(
        "Searching {:.1}s of {:.1}s audio for the clap",
        window.len() as f64 / signal.sample_rate.max(1) as f64,
        signal.duration_secs()
    );

    match find_dominant_peak(window) {
        Some(peak) => {
            let frame = sample_to_frame(peak.index, signal.sample_rate, settings.target_fps);
            log::debug!(
                "Audio clap at sample {} (amplitude {:.3}) -> frame {}",
                peak.index,
                peak.height,
                frame
            );
            frame
        }
        None => {
            log::warn!(
                "No positive peak in the first {}s of audio, camera start defaults to 0",
                settings.audio_window_secs
            );
            0
        }
    }
}

/// Camera frame of the clap for a video, decoding its audio into the cache if needed
///
/// A decode failure is treated like a missing audio track: the result is 0
/// and nothing is cached, so the next run tries again. An existing cache
/// entry that cannot be read as audio also yields 0 and is left in place.
pub fn locate_cam_start<C, D>(
    video_path: &Path,
    audio_cache_path: &Path,
    cache: &mut C,
    decoder: &D,
    settings: &SyncSettings,
) -> Result<usize, SyncError>
where
    C: AudioCache,
    D: AudioDecoder + ?Sized,
{
    let outcome = cache.ensure(audio_cache_path, || {
        decoder.decode(video_path).map_err(CacheError::from)
    });

    match outcome {
        Ok(CacheOutcome::Hit) => {
            log::info!("Using cached audio {}", audio_cache_path.display());
        }
        Ok(CacheOutcome::Stored) => {
            log::info!("Extracted audio to {}", audio_cache_path.display());
        }
        Err(CacheError::Decode(e)) => {
            log::warn!(
                "Could not decode audio from {}: {}; camera start defaults to 0",
                video_path.display(),
                e
            );
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    }

    let signal = match cache.load(audio_cache_path) {
        Ok(signal) => signal,
        Err(CacheError::Audio(e)) => {
            log::warn!(
                "Cached audio {} is unreadable: {}; camera start defaults to 0",
                audio_cache_path.display(),
                e
            );
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };
    Ok(cam_start_from_signal(&signal, settings))
}
