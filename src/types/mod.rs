//! Core types for SABR stream processing.
//!
//! ## Architecture
//!
//! - [`PartKind`] is the closed set of part identifiers this crate interprets
//! - [`SessionState`] holds the per-session playback parameters the resync policy adjusts
//! - [`FormatKey`] and [`InitializedFormat`] track which segment each format should deliver next
//! - [`SabrPart`] is the terminal result type returned by the stream parser
//!
//! ## Usage Example
//!
//! ```rust
//! use sabr_stream::types::{PartKind, SessionState};
//!
//! assert_eq!(PartKind::from_id(20), Some(PartKind::MediaHeader));
//! assert_eq!(PartKind::from_id(61), None);
//!
//! let state = SessionState::live(10_000, 500);
//! assert!(state.is_live);
//! assert_eq!(state.resync_stats().total(), 0);
//! ```

mod format;
mod part_kind;
mod sabr_part;
mod session_state;

pub use format::{FormatKey, InitializedFormat};
pub use part_kind::PartKind;
pub use sabr_part::{
    ContextSendingPolicy, ContextUpdate, FormatInitialized, LiveMetadata, MediaChunk,
    MediaSegmentEnd, MediaSegmentHeader, NextRequestPolicy, ProtectionStatus, Redirect,
    ReloadPlayer, SabrPart, Seek, ServerError, StreamProtection,
};
pub(crate) use sabr_part::ticks_to_ms;
pub use session_state::{DEFAULT_LIVE_SEGMENT_TOLERANCE_MS, ResyncStats, SessionState};
