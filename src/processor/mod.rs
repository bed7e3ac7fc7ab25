//! SABR part processing
//!
//! [`SabrProcessor`] turns one classified part into a [`PartOutcome`]:
//!
//! - `Emit`: a result the caller should see
//! - `Consumed`: handled, nothing to report (for example media for a header that was dropped)
//! - `Mismatch`: a media header arrived out of sequence; the stream parser decides whether
//!   the resync policy in [`resync`] can absorb it
//!
//! Malformed payloads are returned as errors and are never retried.
//!
//! The processor owns the [`SessionState`] and the per-format sequence
//! tracking that media headers are validated against.

mod control;
mod media;
pub mod resync;

use bytes::Bytes;
use prost::Message;
use std::collections::HashMap;

use crate::error::SegmentMismatch;
use crate::types::{FormatKey, InitializedFormat, PartKind, SabrPart, SessionState};
use crate::ump::Part;
use crate::{Result, StreamError};

pub use resync::{
    BACKTRACK_RESYNC_DELTA, FORWARD_RESYNC_DELTA, ResyncCorrection, ResyncDirection, apply_resync,
    resync_direction,
};

/// What processing a single part produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PartOutcome {
    Emit(SabrPart),
    Consumed,
    Mismatch(SegmentMismatch),
}

/// Segment opened by an accepted media header and not yet closed by `MediaEnd`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveSegment {
    format: FormatKey,
    sequence_number: Option<i64>,
}

/// Stateful transformer from classified parts to results.
#[derive(Debug, Clone)]
pub struct SabrProcessor {
    state: SessionState,
    formats: HashMap<FormatKey, InitializedFormat>,
    active_segments: HashMap<u32, ActiveSegment>,
}

impl Default for SabrProcessor {
    fn default() -> Self {
        Self::new(SessionState::default())
    }
}

impl SabrProcessor {
    pub fn new(state: SessionState) -> Self {
        Self { state, formats: HashMap::new(), active_segments: HashMap::new() }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn is_live(&self) -> bool {
        self.state.is_live
    }

    /// Tracking record for a format, if the server has announced it.
    pub fn format(&self, key: &FormatKey) -> Option<&InitializedFormat> {
        self.formats.get(key)
    }

    pub fn formats(&self) -> impl Iterator<Item = &InitializedFormat> {
        self.formats.values()
    }

    /// Segments opened by a media header and not yet closed by `MediaEnd` or a seek.
    pub fn open_segments(&self) -> usize {
        self.active_segments.len()
    }

    /// Process one classified part.
    pub fn process(&mut self, part: &Part) -> Result<PartOutcome> {
        let payload = &part.payload;
        match part.kind {
            PartKind::MediaHeader => self.process_media_header(payload),
            PartKind::Media => self.process_media(payload),
            PartKind::MediaEnd => self.process_media_end(payload),
            PartKind::StreamProtectionStatus => self.process_stream_protection_status(payload),
            PartKind::SabrRedirect => self.process_redirect(payload),
            PartKind::FormatInitializationMetadata => {
                self.process_format_initialization_metadata(payload)
            }
            PartKind::NextRequestPolicy => self.process_next_request_policy(payload),
            PartKind::LiveMetadata => self.process_live_metadata(payload),
            PartKind::SabrSeek => self.process_seek(payload),
            PartKind::SabrError => self.process_error(payload),
            PartKind::SabrContextUpdate => self.process_context_update(payload),
            PartKind::SabrContextSendingPolicy => self.process_context_sending_policy(payload),
            PartKind::ReloadPlayerResponse => self.process_reload_player_response(payload),
        }
    }
}

/// Decode a protobuf payload, tagging failures with the part kind.
fn decode_message<M: Message + Default>(kind: PartKind, payload: &Bytes) -> Result<M> {
    M::decode(payload.as_ref()).map_err(|source| StreamError::ProtocolDecode { kind, source })
}
