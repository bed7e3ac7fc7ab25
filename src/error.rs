//! Error types for SABR stream parsing.
//!
//! Every failure the parser can surface is a variant of [`StreamError`]. The
//! categories map onto the layers of the decoding pipeline:
//!
//! - **Framing Errors**: the UMP envelope itself is malformed or truncated
//! - **Protocol Decode Errors**: a known part carries a payload that does not decode
//! - **Segment Mismatch**: a media header arrived out of sequence and could not be corrected
//! - **File / Config Errors**: problems opening a stream file or loading parser configuration
//!
//! ## Recovery and Retry
//!
//! None of these errors are retried inside the parser. `is_retryable` tells the caller
//! whether re-issuing the request with a fresh session is worth attempting:
//!
//! ```rust
//! use sabr_stream::{SegmentMismatch, StreamError};
//!
//! let error = StreamError::from(SegmentMismatch::new(7, 12));
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::PartKind;

/// Result type alias for stream operations.
pub type Result<T, E = StreamError> = std::result::Result<T, E>;

/// Main error type for SABR stream parsing.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StreamError {
    #[error("UMP framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("Failed to decode {kind} payload")]
    ProtocolDecode {
        kind: PartKind,
        #[source]
        source: prost::DecodeError,
    },

    #[error("Malformed {kind} payload: {details}")]
    MalformedPayload { kind: PartKind, details: String },

    #[error(transparent)]
    SegmentMismatch(#[from] SegmentMismatch),

    #[error("Parser was aborted by an earlier error")]
    Aborted,

    #[error("Stream file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {details}")]
    Config { details: String },
}

/// Failures of the UMP envelope layer. Always fatal.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FramingError {
    #[error("stream ended inside the {field} varint (expected {width} bytes)")]
    TruncatedVarint { field: &'static str, width: usize },

    #[error("part {part_id} declares {declared} payload bytes but only {available} were available")]
    TruncatedPayload { part_id: u32, declared: usize, available: usize },

    #[error("part {part_id} declares {declared} payload bytes, above the {limit} byte limit")]
    PartTooLarge { part_id: u32, declared: usize, limit: usize },

    #[error("decoder already failed on an earlier part")]
    Poisoned,

    #[error("failed to read from byte source")]
    Io(#[source] std::io::Error),
}

/// A media header whose sequence number differs from the one the session expected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Media segment mismatch: expected sequence {expected}, received {received}")]
pub struct SegmentMismatch {
    pub expected: i64,
    pub received: i64,
    /// Format the header belonged to, when known.
    pub format: Option<String>,
    pub header_id: Option<u32>,
}

impl SegmentMismatch {
    pub fn new(expected: i64, received: i64) -> Self {
        Self { expected, received, format: None, header_id: None }
    }

    /// `received - expected`; `-1` and `+2` are the live-correctable deltas.
    pub fn delta(&self) -> i64 {
        self.received.saturating_sub(self.expected)
    }
}

impl StreamError {
    /// Returns whether re-issuing the request with a fresh session may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::SegmentMismatch(_) => true,
            StreamError::Framing(FramingError::Io(_)) => true,
            StreamError::Framing(_) => false,
            StreamError::ProtocolDecode { .. } => false,
            StreamError::MalformedPayload { .. } => false,
            StreamError::Aborted => false,
            StreamError::File { .. } => false,
            StreamError::Config { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            StreamError::Framing(_) => vec![
                "Discard the response and re-request the segment",
                "Check that the byte source delivers the complete body",
                "Raise max_part_size if the server sends very large parts",
            ],
            StreamError::ProtocolDecode { .. } | StreamError::MalformedPayload { .. } => vec![
                "Verify the response is a SABR/UMP body",
                "Check for a protocol revision the payload schemas do not cover",
            ],
            StreamError::SegmentMismatch(_) => vec![
                "Start a fresh session and resync from the live head",
                "Re-request with the player time reset to the last known segment",
            ],
            StreamError::Aborted => vec!["Create a new parser instance for the next response"],
            StreamError::File { .. } => {
                vec!["Check file exists and is readable", "Check file permissions"]
            }
            StreamError::Config { .. } => {
                vec!["Check configuration syntax", "Verify field names and value ranges"]
            }
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        StreamError::File { path, source }
    }

    /// Helper constructor for payloads that decoded but are missing required data.
    pub fn malformed(kind: PartKind, details: impl Into<String>) -> Self {
        StreamError::MalformedPayload { kind, details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config(details: impl Into<String>) -> Self {
        StreamError::Config { details: details.into() }
    }
}

impl From<std::io::Error> for FramingError {
    fn from(err: std::io::Error) -> Self {
        FramingError::Io(err)
    }
}
