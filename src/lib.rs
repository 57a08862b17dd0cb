/// FCPX Autocut - Rust Implementation
///
/// Video-editing automation for Final Cut Pro projects: silence-aware timeline
/// recutting, SRT caption injection, SRT generation, and GIF enrichment.

pub mod audio;
pub mod captions;
pub mod config;
pub mod gifs;
pub mod pipeline;
pub mod segments;
pub mod srt;
pub mod timeline;

// Re-export main types for easy access
pub use crate::audio::{AudioAnalyzer, FfmpegSilenceDetector};
pub use crate::config::{Config, MergeConfig, SilenceConfig};
pub use crate::gifs::GiphyClient;
pub use crate::pipeline::{RecutPipeline, RecutReport};
pub use crate::segments::{Interval, SegmentKind, SilenceDetector};
pub use crate::srt::{SrtEntry, SrtFile, TranscriptSegment};
pub use crate::timeline::{FcpxmlDocument, MappedSegment, OriginalClip, TimelineError};
