//! Speech/silence interval model shared by the detection and merge stages.

pub mod detector;
pub mod merger;

pub use detector::{derive_silence_intervals, detect_speech_intervals, SilenceDetector};
pub use merger::{merge_close_segments, segment_timeline};

use serde::{Deserialize, Serialize};

/// Classification of a time range in the analyzed audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Speech,
    Silence,
}

/// A half-open time range `[start, end)` in seconds, classified as speech or silence.
///
/// Interval collections produced for a single audio source are non-overlapping,
/// and once silence gaps are filled they partition `[0, total_duration]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Start time in seconds (>= 0).
    pub start: f64,
    /// End time in seconds (> start).
    pub end: f64,
    pub kind: SegmentKind,
}

impl Interval {
    pub fn speech(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            kind: SegmentKind::Speech,
        }
    }

    pub fn silence(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            kind: SegmentKind::Silence,
        }
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_speech(&self) -> bool {
        self.kind == SegmentKind::Speech
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_duration() {
        let interval = Interval::speech(1.25, 3.0);
        assert!((interval.duration() - 1.75).abs() < f64::EPSILON);
        assert!(interval.is_speech());
        assert!(!Interval::silence(0.0, 1.0).is_speech());
    }
}
