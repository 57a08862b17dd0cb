//! Coalescing of speech intervals separated by short gaps.

use super::detector::derive_silence_intervals;
use super::{Interval, SegmentKind};

/// Merge speech intervals whose gap is at most `max_gap_seconds`.
///
/// Merging is transitive (a chain of close intervals collapses into one) and
/// idempotent. Overlapping intervals, which padding in the detection stage can
/// produce, count as a zero-or-negative gap and always merge.
pub fn merge_close_segments(speech: &[Interval], max_gap_seconds: f64) -> Vec<Interval> {
    let mut sorted = speech.to_vec();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(previous) if interval.start - previous.end <= max_gap_seconds => {
                previous.end = previous.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }

    merged
}

/// Build the full speech+silence segmentation of `[0, total_duration]`.
///
/// Speech intervals are merged first, silence is regenerated from the merged
/// set, and the union is returned sorted by start. The result partitions the
/// timeline with no gaps and no overlaps.
pub fn segment_timeline(speech: &[Interval], max_gap_seconds: f64, total_duration: f64) -> Vec<Interval> {
    let merged = merge_close_segments(speech, max_gap_seconds);
    let mut segments = merged.clone();
    segments.extend(derive_silence_intervals(&merged, total_duration));

    // Equal starts cannot happen when the partition invariant holds, but keep
    // the ordering deterministic anyway: speech sorts before silence.
    segments.sort_by(|a, b| {
        a.start
            .total_cmp(&b.start)
            .then_with(|| match (a.kind, b.kind) {
                (SegmentKind::Speech, SegmentKind::Silence) => std::cmp::Ordering::Less,
                (SegmentKind::Silence, SegmentKind::Speech) => std::cmp::Ordering::Greater,
                _ => std::cmp::Ordering::Equal,
            })
    });

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_intervals_merge() {
        let speech = vec![Interval::speech(1.0, 2.0), Interval::speech(2.2, 3.0)];
        let merged = merge_close_segments(&speech, 0.3);
        assert_eq!(merged, vec![Interval::speech(1.0, 3.0)]);
    }

    #[test]
    fn test_distant_intervals_stay_separate() {
        let speech = vec![Interval::speech(1.0, 2.0), Interval::speech(2.5, 3.0)];
        let merged = merge_close_segments(&speech, 0.3);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_is_transitive() {
        let speech = vec![
            Interval::speech(0.0, 1.0),
            Interval::speech(1.1, 2.0),
            Interval::speech(2.1, 3.0),
            Interval::speech(3.1, 4.0),
        ];
        let merged = merge_close_segments(&speech, 0.2);
        assert_eq!(merged, vec![Interval::speech(0.0, 4.0)]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let speech = vec![
            Interval::speech(0.0, 1.0),
            Interval::speech(1.2, 2.0),
            Interval::speech(5.0, 6.0),
        ];
        let once = merge_close_segments(&speech, 0.3);
        let twice = merge_close_segments(&once, 0.3);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_is_monotonic() {
        let speech = vec![
            Interval::speech(0.0, 1.0),
            Interval::speech(1.1, 2.5),
            Interval::speech(4.0, 5.0),
        ];
        let merged = merge_close_segments(&speech, 0.2);
        assert!(merged.len() <= speech.len());
        for original in &speech {
            assert!(
                merged
                    .iter()
                    .any(|m| m.start <= original.start && original.end <= m.end),
                "{:?} not covered by any merged interval",
                original
            );
        }
    }

    #[test]
    fn test_overlapping_padded_intervals_merge_with_zero_gap() {
        let speech = vec![Interval::speech(0.0, 2.4), Interval::speech(2.1, 4.0)];
        let merged = merge_close_segments(&speech, 0.0);
        assert_eq!(merged, vec![Interval::speech(0.0, 4.0)]);
    }

    #[test]
    fn test_segment_timeline_partitions_duration() {
        let speech = vec![Interval::speech(1.0, 2.0), Interval::speech(2.2, 3.0)];
        let segments = segment_timeline(&speech, 0.3, 5.0);

        assert_eq!(
            segments,
            vec![
                Interval::silence(0.0, 1.0),
                Interval::speech(1.0, 3.0),
                Interval::silence(3.0, 5.0),
            ]
        );
        let total: f64 = segments.iter().map(Interval::duration).sum();
        assert!((total - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_timeline_with_no_speech() {
        let segments = segment_timeline(&[], 0.3, 4.0);
        assert_eq!(segments, vec![Interval::silence(0.0, 4.0)]);
    }
}
