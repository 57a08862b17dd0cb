//! Speech interval detection and silence gap-filling.
//!
//! The actual non-silence scan is delegated to a [`SilenceDetector`] backend
//! which reports raw millisecond ranges; this module owns the unit conversion,
//! the symmetric padding around detected speech, and the derivation of the
//! complementary silence intervals.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use super::Interval;
use crate::config::SilenceConfig;

/// Backend that scans an audio file for non-silent ranges.
///
/// Implementations report raw `(start_ms, end_ms)` pairs in ascending order,
/// without any padding applied.
#[async_trait]
pub trait SilenceDetector: Send + Sync {
    /// Non-silent ranges in milliseconds.
    async fn detect_nonsilent(&self, audio: &Path, config: &SilenceConfig) -> Result<Vec<(u64, u64)>>;

    /// Total duration of the audio in seconds.
    async fn duration(&self, audio: &Path) -> Result<f64>;
}

/// Detect speech intervals in an audio file.
///
/// Each raw range is padded by `config.padding_ms` on both ends, clamped to
/// `[0, total_duration]`, and converted to seconds at millisecond precision.
/// Padding may leave adjacent intervals overlapping; the merge stage runs
/// unconditionally downstream and resolves that.
pub async fn detect_speech_intervals(
    detector: &dyn SilenceDetector,
    audio: &Path,
    config: &SilenceConfig,
    total_duration: f64,
) -> Result<Vec<Interval>> {
    let ranges = detector.detect_nonsilent(audio, config).await?;
    debug!("Detector reported {} non-silent ranges", ranges.len());
    Ok(pad_and_convert(&ranges, config.padding_ms, total_duration))
}

/// Convert raw millisecond ranges to padded speech intervals in seconds.
pub fn pad_and_convert(ranges_ms: &[(u64, u64)], padding_ms: u64, total_duration: f64) -> Vec<Interval> {
    let padding = padding_ms as f64 / 1000.0;

    ranges_ms
        .iter()
        .filter_map(|&(start_ms, end_ms)| {
            let start = round_ms((start_ms as f64 / 1000.0 - padding).max(0.0));
            let end = round_ms((end_ms as f64 / 1000.0 + padding).min(total_duration));
            (end > start).then(|| Interval::speech(start, end))
        })
        .collect()
}

/// Fill every gap left by `speech` with a silence interval.
///
/// Covers the lead-in before the first speech interval, all inter-speech gaps,
/// and the tail up to `total_duration`. An empty speech list yields a single
/// silence interval spanning the whole file.
pub fn derive_silence_intervals(speech: &[Interval], total_duration: f64) -> Vec<Interval> {
    let (first, last) = match (speech.first(), speech.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return vec![Interval::silence(0.0, total_duration)],
    };

    let mut silences = Vec::new();

    if first.start > 0.0 {
        silences.push(Interval::silence(0.0, first.start));
    }

    for pair in speech.windows(2) {
        let gap_start = pair[0].end;
        let gap_end = pair[1].start;
        if gap_end - gap_start > 0.0 {
            silences.push(Interval::silence(gap_start, gap_end));
        }
    }

    if last.end < total_duration {
        silences.push(Interval::silence(last.end, total_duration));
    }

    silences
}

/// Round to millisecond precision.
pub(crate) fn round_ms(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_and_convert() {
        let intervals = pad_and_convert(&[(1000, 2000)], 400, 10.0);
        assert_eq!(intervals, vec![Interval::speech(0.6, 2.4)]);
    }

    #[test]
    fn test_padding_clamps_to_file_bounds() {
        let intervals = pad_and_convert(&[(100, 9900)], 400, 10.0);
        assert_eq!(intervals, vec![Interval::speech(0.0, 10.0)]);
    }

    #[test]
    fn test_conversion_rounds_to_millisecond_precision() {
        let intervals = pad_and_convert(&[(333, 667)], 0, 10.0);
        assert_eq!(intervals, vec![Interval::speech(0.333, 0.667)]);
    }

    #[test]
    fn test_derive_silence_fills_lead_in_and_tail() {
        let speech = vec![Interval::speech(1.0, 2.0)];
        let silences = derive_silence_intervals(&speech, 3.0);
        assert_eq!(
            silences,
            vec![Interval::silence(0.0, 1.0), Interval::silence(2.0, 3.0)]
        );
    }

    #[test]
    fn test_derive_silence_fills_inner_gaps() {
        let speech = vec![Interval::speech(0.0, 1.0), Interval::speech(2.5, 4.0)];
        let silences = derive_silence_intervals(&speech, 4.0);
        assert_eq!(silences, vec![Interval::silence(1.0, 2.5)]);
    }

    #[test]
    fn test_empty_speech_yields_single_silence() {
        let silences = derive_silence_intervals(&[], 5.0);
        assert_eq!(silences, vec![Interval::silence(0.0, 5.0)]);
    }

    #[test]
    fn test_speech_covering_whole_file_yields_no_silence() {
        let speech = vec![Interval::speech(0.0, 5.0)];
        assert!(derive_silence_intervals(&speech, 5.0).is_empty());
    }

    #[test]
    fn test_silence_partitions_with_speech() {
        let speech = vec![
            Interval::speech(0.5, 2.0),
            Interval::speech(3.0, 4.5),
            Interval::speech(6.0, 9.0),
        ];
        let total = 10.0;
        let mut all = speech.clone();
        all.extend(derive_silence_intervals(&speech, total));
        all.sort_by(|a, b| a.start.total_cmp(&b.start));

        assert_eq!(all.first().map(|i| i.start), Some(0.0));
        assert_eq!(all.last().map(|i| i.end), Some(total));
        for pair in all.windows(2) {
            assert!((pair[0].end - pair[1].start).abs() < 1e-9, "gap or overlap at {:?}", pair);
        }
    }
}
