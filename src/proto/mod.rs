//! Protobuf payload schemas for SABR parts
//!
//! Message definitions for the part payloads the processor decodes. Field
//! tags follow the server's wire layout; everything is `optional` because the
//! server omits fields freely and the processor decides which ones it needs.
//!
//! `Media` and `MediaEnd` payloads are not protobuf and have no schema here.

use prost::Message;

#[derive(Clone, PartialEq, Message)]
pub struct FormatId {
    #[prost(int32, optional, tag = "1")]
    pub itag: Option<i32>,
    #[prost(uint64, optional, tag = "2")]
    pub last_modified: Option<u64>,
    #[prost(string, optional, tag = "3")]
    pub xtags: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TimeRange {
    #[prost(int64, optional, tag = "1")]
    pub start_ticks: Option<i64>,
    #[prost(int64, optional, tag = "2")]
    pub duration_ticks: Option<i64>,
    #[prost(int32, optional, tag = "3")]
    pub timescale: Option<i32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MediaHeader {
    #[prost(uint32, optional, tag = "1")]
    pub header_id: Option<u32>,
    #[prost(string, optional, tag = "2")]
    pub video_id: Option<String>,
    #[prost(int32, optional, tag = "3")]
    pub itag: Option<i32>,
    #[prost(uint64, optional, tag = "4")]
    pub lmt: Option<u64>,
    #[prost(string, optional, tag = "5")]
    pub xtags: Option<String>,
    #[prost(int64, optional, tag = "6")]
    pub start_range: Option<i64>,
    #[prost(int32, optional, tag = "7")]
    pub compression_algorithm: Option<i32>,
    #[prost(bool, optional, tag = "8")]
    pub is_init_seg: Option<bool>,
    #[prost(int64, optional, tag = "9")]
    pub sequence_number: Option<i64>,
    #[prost(int64, optional, tag = "11")]
    pub start_ms: Option<i64>,
    #[prost(int64, optional, tag = "12")]
    pub duration_ms: Option<i64>,
    #[prost(message, optional, tag = "13")]
    pub format_id: Option<FormatId>,
    #[prost(int64, optional, tag = "14")]
    pub content_length: Option<i64>,
    #[prost(message, optional, tag = "15")]
    pub time_range: Option<TimeRange>,
}

#[derive(Clone, PartialEq, Message)]
pub struct FormatInitializationMetadata {
    #[prost(string, optional, tag = "1")]
    pub video_id: Option<String>,
    #[prost(message, optional, tag = "2")]
    pub format_id: Option<FormatId>,
    #[prost(int64, optional, tag = "3")]
    pub end_time_ms: Option<i64>,
    #[prost(int64, optional, tag = "4")]
    pub end_segment_number: Option<i64>,
    #[prost(string, optional, tag = "5")]
    pub mime_type: Option<String>,
    #[prost(int64, optional, tag = "9")]
    pub duration_units: Option<i64>,
    #[prost(int64, optional, tag = "10")]
    pub duration_timescale: Option<i64>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PlaybackCookie {
    #[prost(int32, optional, tag = "1")]
    pub resolution: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub field2: Option<i32>,
    #[prost(message, optional, tag = "7")]
    pub video_fmt: Option<FormatId>,
    #[prost(message, optional, tag = "8")]
    pub audio_fmt: Option<FormatId>,
}

#[derive(Clone, PartialEq, Message)]
pub struct NextRequestPolicy {
    #[prost(int32, optional, tag = "1")]
    pub target_audio_readahead_ms: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub target_video_readahead_ms: Option<i32>,
    #[prost(int32, optional, tag = "4")]
    pub backoff_time_ms: Option<i32>,
    #[prost(message, optional, tag = "7")]
    pub playback_cookie: Option<PlaybackCookie>,
    #[prost(string, optional, tag = "8")]
    pub video_id: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct LiveMetadata {
    #[prost(string, optional, tag = "1")]
    pub broadcast_id: Option<String>,
    #[prost(int64, optional, tag = "3")]
    pub head_sequence_number: Option<i64>,
    #[prost(int64, optional, tag = "4")]
    pub head_sequence_time_ms: Option<i64>,
    #[prost(int64, optional, tag = "5")]
    pub wall_time_ms: Option<i64>,
    #[prost(string, optional, tag = "6")]
    pub video_id: Option<String>,
    #[prost(bool, optional, tag = "7")]
    pub post_live_dvr: Option<bool>,
    #[prost(int64, optional, tag = "12")]
    pub min_seekable_time_ticks: Option<i64>,
    #[prost(int32, optional, tag = "13")]
    pub min_seekable_timescale: Option<i32>,
    #[prost(int64, optional, tag = "14")]
    pub max_seekable_time_ticks: Option<i64>,
    #[prost(int32, optional, tag = "15")]
    pub max_seekable_timescale: Option<i32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SabrSeek {
    #[prost(int64, optional, tag = "1")]
    pub seek_time_ticks: Option<i64>,
    #[prost(int32, optional, tag = "2")]
    pub timescale: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub seek_source: Option<i32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SabrError {
    #[prost(string, optional, tag = "1")]
    pub error_type: Option<String>,
    #[prost(int32, optional, tag = "2")]
    pub code: Option<i32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SabrRedirect {
    #[prost(string, optional, tag = "1")]
    pub url: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct StreamProtectionStatus {
    #[prost(int32, optional, tag = "1")]
    pub status: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub max_retries: Option<i32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SabrContextUpdate {
    #[prost(int32, optional, tag = "1")]
    pub context_type: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub scope: Option<i32>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub value: Option<Vec<u8>>,
    #[prost(bool, optional, tag = "4")]
    pub send_by_default: Option<bool>,
    #[prost(int32, optional, tag = "5")]
    pub write_policy: Option<i32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SabrContextSendingPolicy {
    #[prost(int32, repeated, tag = "1")]
    pub start_policy: Vec<i32>,
    #[prost(int32, repeated, tag = "2")]
    pub stop_policy: Vec<i32>,
    #[prost(int32, repeated, tag = "3")]
    pub discard_policy: Vec<i32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ReloadPlaybackParams {
    #[prost(string, optional, tag = "1")]
    pub token: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ReloadPlayerResponse {
    #[prost(message, optional, tag = "1")]
    pub reload_playback_params: Option<ReloadPlaybackParams>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_header_survives_the_wire() {
        let header = MediaHeader {
            header_id: Some(3),
            itag: Some(136),
            sequence_number: Some(26),
            start_ms: Some(123_888),
            duration_ms: Some(5_008),
            format_id: Some(FormatId {
                itag: Some(136),
                last_modified: Some(1747754870573293),
                xtags: None,
            }),
            ..Default::default()
        };

        let decoded = MediaHeader::decode(header.encode_to_vec().as_slice()).expect("decode");
        assert_eq!(decoded, header);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        // Field 10 is not part of the schema.
        let mut bytes = MediaHeader { sequence_number: Some(4), ..Default::default() }.encode_to_vec();
        bytes.extend_from_slice(&[0x50, 0x07]);

        let decoded = MediaHeader::decode(bytes.as_slice()).expect("decode");
        assert_eq!(decoded.sequence_number, Some(4));
    }
}
