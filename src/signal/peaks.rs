// Peak detection
// Local-maximum search with a height floor, used to find clap transients

/// A detected local maximum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Index into the analysed signal
    pub index: usize,

    /// Signal value at `index`
    pub height: f32,
}

/// Find every local maximum whose height is strictly above `min_height`
///
/// A sample is a local maximum when it is strictly greater than its left
/// neighbour and strictly greater than the next differing sample on its
/// right. Flat peaks are reported once, at the middle of the plateau
/// (rounded down). The first and last samples are never peaks.
pub fn find_peaks(signal: &[f32], min_height: f32) -> Vec<Peak> {
    let mut peaks = Vec::new();

    if signal.len() < 3 {
        return peaks;
    }

    let last = signal.len() - 1;
    let mut i = 1;

    while i < last {
        if signal[i] > signal[i - 1] {
            // Skip over a plateau, if any
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }

            if signal[ahead] < signal[i] {
                let index = (i + ahead - 1) / 2;
                let height = signal[index];
                if height > min_height {
                    peaks.push(Peak { index, height });
                }

                // signal[ahead] is on a falling edge and cannot be a peak
                i = ahead + 1;
                continue;
            }
        }
        i += 1;
    }

    peaks
}

/// Find the highest strictly-positive local maximum
///
/// Returns `None` for empty or silent input, or when no positive peak exists.
/// Ties resolve to the earliest peak.
pub fn find_dominant_peak(signal: &[f32]) -> Option<Peak> {
    find_peaks(signal, 0.0)
        .into_iter()
        .fold(None, |best, peak| match best {
            Some(current) if current.height >= peak.height => Some(current),
            _ => Some(peak),
        })
}
