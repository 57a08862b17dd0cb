//! FCPXML timeline reading, segment mapping, and spine rewriting.

pub mod document;
pub mod mapper;
pub mod rewriter;
pub mod time;

pub use document::FcpxmlDocument;
pub use mapper::{map_segments_to_clips, MappedSegment, MappingOutcome, OriginalClip};
pub use rewriter::rewrite_timeline;
pub use time::{format_seconds, parse_seconds};

/// Error types for timeline document operations
#[derive(thiserror::Error, Debug)]
pub enum TimelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FCPXML parse error: {0}")]
    Parse(#[from] xmltree::ParseError),

    #[error("FCPXML write error: {0}")]
    Write(#[from] xmltree::Error),

    #[error("document has no <{0}> element")]
    MissingStructure(&'static str),

    #[error("<{element}> is missing the {attribute} attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("unparseable time value {value:?} (expected \"12.5s\" or \"37500/1000s\")")]
    BadTimeValue { value: String },
}

/// Result type for timeline document operations
pub type Result<T> = std::result::Result<T, TimelineError>;
