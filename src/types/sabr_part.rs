//! Terminal results handed to the caller by the stream parser

use bytes::Bytes;

use super::{FormatKey, PartKind};

/// One decoded, externally meaningful SABR part.
///
/// There is one variant per recognized [`PartKind`]. Parts that are consumed
/// without producing anything never reach the caller, so there is no empty variant.
#[derive(Debug, Clone, PartialEq)]
pub enum SabrPart {
    MediaHeader(MediaSegmentHeader),
    Media(MediaChunk),
    MediaEnd(MediaSegmentEnd),
    StreamProtectionStatus(StreamProtection),
    Redirect(Redirect),
    FormatInitialized(FormatInitialized),
    NextRequestPolicy(NextRequestPolicy),
    LiveMetadata(LiveMetadata),
    Seek(Seek),
    Error(ServerError),
    ContextUpdate(ContextUpdate),
    ContextSendingPolicy(ContextSendingPolicy),
    ReloadPlayerResponse(ReloadPlayer),
}

impl SabrPart {
    /// The wire kind this result was decoded from.
    pub fn kind(&self) -> PartKind {
        match self {
            SabrPart::MediaHeader(_) => PartKind::MediaHeader,
            SabrPart::Media(_) => PartKind::Media,
            SabrPart::MediaEnd(_) => PartKind::MediaEnd,
            SabrPart::StreamProtectionStatus(_) => PartKind::StreamProtectionStatus,
            SabrPart::Redirect(_) => PartKind::SabrRedirect,
            SabrPart::FormatInitialized(_) => PartKind::FormatInitializationMetadata,
            SabrPart::NextRequestPolicy(_) => PartKind::NextRequestPolicy,
            SabrPart::LiveMetadata(_) => PartKind::LiveMetadata,
            SabrPart::Seek(_) => PartKind::SabrSeek,
            SabrPart::Error(_) => PartKind::SabrError,
            SabrPart::ContextUpdate(_) => PartKind::SabrContextUpdate,
            SabrPart::ContextSendingPolicy(_) => PartKind::SabrContextSendingPolicy,
            SabrPart::ReloadPlayerResponse(_) => PartKind::ReloadPlayerResponse,
        }
    }
}

/// An accepted media header; subsequent `Media` parts with the same `header_id` belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSegmentHeader {
    pub header_id: u32,
    pub format: FormatKey,
    pub video_id: Option<String>,
    pub is_init_segment: bool,
    /// Absent only for init segments.
    pub sequence_number: Option<i64>,
    pub start_ms: Option<i64>,
    pub duration_ms: Option<i64>,
    pub start_range: Option<i64>,
    pub content_length: Option<i64>,
}

/// A chunk of segment bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaChunk {
    pub header_id: u32,
    pub format: FormatKey,
    pub sequence_number: Option<i64>,
    pub data: Bytes,
}

/// All chunks for the segment opened by `header_id` have been delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSegmentEnd {
    pub header_id: u32,
    pub format: FormatKey,
    pub sequence_number: Option<i64>,
}

/// Attestation state reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionStatus {
    Ok,
    AttestationPending,
    AttestationRequired,
    Unknown(i32),
}

impl From<i32> for ProtectionStatus {
    fn from(value: i32) -> Self {
        match value {
            1 => ProtectionStatus::Ok,
            2 => ProtectionStatus::AttestationPending,
            3 => ProtectionStatus::AttestationRequired,
            other => ProtectionStatus::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamProtection {
    pub status: ProtectionStatus,
    pub max_retries: Option<i32>,
}

/// The server asks the client to send subsequent requests to `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatInitialized {
    pub format: FormatKey,
    pub video_id: Option<String>,
    pub mime_type: Option<String>,
    pub end_time_ms: Option<i64>,
    pub end_segment_number: Option<i64>,
    pub duration_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextRequestPolicy {
    pub target_audio_readahead_ms: Option<i32>,
    pub target_video_readahead_ms: Option<i32>,
    pub backoff_time_ms: Option<i32>,
    /// Opaque cookie to echo back on the next request.
    pub playback_cookie: Option<Bytes>,
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveMetadata {
    pub head_sequence_number: Option<i64>,
    pub head_sequence_time_ms: Option<i64>,
    pub wall_time_ms: Option<i64>,
    pub video_id: Option<String>,
    pub post_live_dvr: bool,
    pub min_seekable_time_ms: Option<i64>,
    pub max_seekable_time_ms: Option<i64>,
}

/// The server moved the playback position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seek {
    pub seek_time_ms: i64,
    pub seek_source: Option<i32>,
}

/// An explicit protocol error reported in-band by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    pub error_type: Option<String>,
    pub code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextUpdate {
    pub context_type: i32,
    pub scope: Option<i32>,
    pub value: Bytes,
    pub send_by_default: bool,
    pub write_policy: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextSendingPolicy {
    pub start_policy: Vec<i32>,
    pub stop_policy: Vec<i32>,
    pub discard_policy: Vec<i32>,
}

/// The client must refetch the player response before continuing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadPlayer {
    pub token: Option<String>,
}

/// Convert a tick count in `timescale` units to milliseconds.
pub(crate) fn ticks_to_ms(ticks: i64, timescale: i32) -> Option<i64> {
    if timescale <= 0 {
        return None;
    }
    let ms = i128::from(ticks) * 1000 / i128::from(timescale);
    i64::try_from(ms).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_convert_to_milliseconds() {
        assert_eq!(ticks_to_ms(90_000, 90_000), Some(1_000));
        assert_eq!(ticks_to_ms(12_345, 1_000), Some(12_345));
        assert_eq!(ticks_to_ms(5, 0), None);
        assert_eq!(ticks_to_ms(5, -1), None);
    }

    #[test]
    fn protection_status_keeps_unknown_codes() {
        assert_eq!(ProtectionStatus::from(1), ProtectionStatus::Ok);
        assert_eq!(ProtectionStatus::from(3), ProtectionStatus::AttestationRequired);
        assert_eq!(ProtectionStatus::from(9), ProtectionStatus::Unknown(9));
    }

    #[test]
    fn every_result_reports_its_kind() {
        let part = SabrPart::Redirect(Redirect { url: "https://rr1.example".into() });
        assert_eq!(part.kind(), PartKind::SabrRedirect);

        let part = SabrPart::Seek(Seek { seek_time_ms: 0, seek_source: None });
        assert_eq!(part.kind(), PartKind::SabrSeek);
    }
}
