//! Mapping of detected segments onto the original clip placements.
//!
//! Segments live in output-timeline coordinates; each original clip binds a
//! range of the output timeline to a position in its source media. Mapping
//! translates a segment's start into the enclosing clip's source coordinate
//! space so the rewritten clip plays the right part of the media.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::segments::{Interval, SegmentKind};

/// A pre-existing placement of source media on the output timeline.
///
/// Occupies the half-open range `[offset_in_output, offset_in_output + duration)`
/// in output coordinates; `start_in_source` is the matching point on the source
/// media's own time axis. Read-only lookup data, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalClip {
    pub source_ref: String,
    pub offset_in_output: f64,
    pub start_in_source: f64,
    pub duration: f64,
    pub name: String,
}

/// A segment located within an original clip, with its start translated into
/// source coordinates. Consumed immediately by the timeline rewriter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedSegment {
    pub output_start: f64,
    pub output_duration: f64,
    pub source_start: f64,
    pub source_ref: String,
    pub kind: SegmentKind,
    pub name: String,
}

/// Result of a mapping pass: the mapped segments plus every segment that no
/// clip covered, so callers can detect data loss.
#[derive(Debug, Clone, Default)]
pub struct MappingOutcome {
    pub mapped: Vec<MappedSegment>,
    pub dropped: Vec<Interval>,
}

/// Locate the enclosing original clip for each segment and translate its start
/// into source coordinates.
///
/// The first clip whose range contains `segment.start` wins. Segments with no
/// enclosing clip are dropped but reported through the outcome and a warning,
/// never silently. The scan is O(segments x clips), which is fine for the tens
/// to low hundreds of entries a real project has.
pub fn map_segments_to_clips(segments: &[Interval], clips: &[OriginalClip]) -> MappingOutcome {
    let mut outcome = MappingOutcome::default();

    for segment in segments {
        let enclosing = clips.iter().find(|clip| {
            clip.offset_in_output <= segment.start
                && segment.start < clip.offset_in_output + clip.duration
        });

        match enclosing {
            Some(clip) => outcome.mapped.push(MappedSegment {
                output_start: segment.start,
                output_duration: segment.end - segment.start,
                source_start: clip.start_in_source + (segment.start - clip.offset_in_output),
                source_ref: clip.source_ref.clone(),
                kind: segment.kind,
                name: clip.name.clone(),
            }),
            None => {
                warn!(
                    "🕳️ No clip covers segment {:.3}s-{:.3}s, dropping it",
                    segment.start, segment.end
                );
                outcome.dropped.push(segment.clone());
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(source_ref: &str, offset: f64, start: f64, duration: f64) -> OriginalClip {
        OriginalClip {
            source_ref: source_ref.to_string(),
            offset_in_output: offset,
            start_in_source: start,
            duration,
            name: format!("{} clip", source_ref),
        }
    }

    #[test]
    fn test_segment_start_translates_into_source_coordinates() {
        let clips = vec![clip("r2", 0.0, 10.0, 5.0)];
        let segments = vec![Interval::speech(2.0, 4.0)];

        let outcome = map_segments_to_clips(&segments, &clips);
        assert!(outcome.dropped.is_empty());
        let mapped = &outcome.mapped[0];
        assert_eq!(mapped.source_start, 12.0);
        assert_eq!(mapped.output_start, 2.0);
        assert_eq!(mapped.output_duration, 2.0);
        assert_eq!(mapped.source_ref, "r2");
    }

    #[test]
    fn test_uncovered_segment_is_dropped_and_counted() {
        let clips = vec![clip("r2", 0.0, 0.0, 50.0)];
        let segments = vec![Interval::speech(100.0, 101.0)];

        let outcome = map_segments_to_clips(&segments, &clips);
        assert!(outcome.mapped.is_empty());
        assert_eq!(outcome.dropped.len(), 1);
    }

    #[test]
    fn test_clip_range_is_half_open() {
        let clips = vec![clip("a", 0.0, 0.0, 10.0), clip("b", 10.0, 0.0, 10.0)];
        let segments = vec![Interval::speech(10.0, 11.0)];

        let outcome = map_segments_to_clips(&segments, &clips);
        assert_eq!(outcome.mapped[0].source_ref, "b");
    }

    #[test]
    fn test_first_matching_clip_wins_on_overlap() {
        // Overlapping placements are malformed input but must still map
        // deterministically.
        let clips = vec![clip("a", 0.0, 0.0, 10.0), clip("b", 5.0, 0.0, 10.0)];
        let segments = vec![Interval::speech(6.0, 7.0)];

        let outcome = map_segments_to_clips(&segments, &clips);
        assert_eq!(outcome.mapped[0].source_ref, "a");
    }

    #[test]
    fn test_source_start_is_never_negative() {
        let clips = vec![clip("r2", 5.0, 0.0, 20.0)];
        let segments = vec![Interval::speech(5.0, 6.0), Interval::silence(12.5, 20.0)];

        let outcome = map_segments_to_clips(&segments, &clips);
        for mapped in &outcome.mapped {
            assert!(mapped.source_start >= 0.0);
        }
    }

    #[test]
    fn test_silence_kind_is_preserved() {
        let clips = vec![clip("r2", 0.0, 0.0, 10.0)];
        let segments = vec![Interval::silence(1.0, 2.0)];

        let outcome = map_segments_to_clips(&segments, &clips);
        assert_eq!(outcome.mapped[0].kind, SegmentKind::Silence);
    }
}
