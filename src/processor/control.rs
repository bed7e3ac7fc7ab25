//! Handlers for control parts: everything except the media trio

use bytes::Bytes;
use prost::Message;
use tracing::{debug, warn};

use super::{PartOutcome, SabrProcessor, decode_message};
use crate::proto;
use crate::types::{
    ContextSendingPolicy, ContextUpdate, FormatInitialized, FormatKey, InitializedFormat,
    LiveMetadata, NextRequestPolicy, PartKind, ProtectionStatus, Redirect, ReloadPlayer,
    SabrPart, Seek, ServerError, StreamProtection, ticks_to_ms,
};
use crate::{Result, StreamError};

impl SabrProcessor {
    pub(super) fn process_stream_protection_status(
        &mut self,
        payload: &Bytes,
    ) -> Result<PartOutcome> {
        let kind = PartKind::StreamProtectionStatus;
        let msg: proto::StreamProtectionStatus = decode_message(kind, payload)?;
        let status = msg.status.ok_or_else(|| StreamError::malformed(kind, "missing status"))?;

        Ok(PartOutcome::Emit(SabrPart::StreamProtectionStatus(StreamProtection {
            status: ProtectionStatus::from(status),
            max_retries: msg.max_retries,
        })))
    }

    pub(super) fn process_redirect(&mut self, payload: &Bytes) -> Result<PartOutcome> {
        let kind = PartKind::SabrRedirect;
        let msg: proto::SabrRedirect = decode_message(kind, payload)?;
        let url = msg
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| StreamError::malformed(kind, "missing redirect url"))?;

        debug!("Server redirected session to {}", url);
        Ok(PartOutcome::Emit(SabrPart::Redirect(Redirect { url })))
    }

    pub(super) fn process_format_initialization_metadata(
        &mut self,
        payload: &Bytes,
    ) -> Result<PartOutcome> {
        let kind = PartKind::FormatInitializationMetadata;
        let msg: proto::FormatInitializationMetadata = decode_message(kind, payload)?;
        let format = msg
            .format_id
            .as_ref()
            .and_then(FormatKey::from_format_id)
            .ok_or_else(|| StreamError::malformed(kind, "missing format id"))?;

        let tracked = self
            .formats
            .entry(format.clone())
            .or_insert_with(|| InitializedFormat::new(format.clone()));
        tracked.video_id = msg.video_id.clone().or(tracked.video_id.take());
        tracked.mime_type = msg.mime_type.clone().or(tracked.mime_type.take());
        tracked.end_segment_number = msg.end_segment_number.or(tracked.end_segment_number);

        let duration_ms = match (msg.duration_units, msg.duration_timescale) {
            (Some(units), Some(timescale)) => i32::try_from(timescale)
                .ok()
                .and_then(|timescale| ticks_to_ms(units, timescale)),
            _ => None,
        };

        debug!("Initialized format {} ({:?})", format, msg.mime_type);
        Ok(PartOutcome::Emit(SabrPart::FormatInitialized(FormatInitialized {
            format,
            video_id: msg.video_id,
            mime_type: msg.mime_type,
            end_time_ms: msg.end_time_ms,
            end_segment_number: msg.end_segment_number,
            duration_ms,
        })))
    }

    pub(super) fn process_next_request_policy(&mut self, payload: &Bytes) -> Result<PartOutcome> {
        let msg: proto::NextRequestPolicy = decode_message(PartKind::NextRequestPolicy, payload)?;

        Ok(PartOutcome::Emit(SabrPart::NextRequestPolicy(NextRequestPolicy {
            target_audio_readahead_ms: msg.target_audio_readahead_ms,
            target_video_readahead_ms: msg.target_video_readahead_ms,
            backoff_time_ms: msg.backoff_time_ms,
            playback_cookie: msg.playback_cookie.map(|c| Bytes::from(c.encode_to_vec())),
            video_id: msg.video_id,
        })))
    }

    pub(super) fn process_live_metadata(&mut self, payload: &Bytes) -> Result<PartOutcome> {
        let msg: proto::LiveMetadata = decode_message(PartKind::LiveMetadata, payload)?;

        let seekable = |ticks: Option<i64>, timescale: Option<i32>| ticks_to_ms(ticks?, timescale?);
        Ok(PartOutcome::Emit(SabrPart::LiveMetadata(LiveMetadata {
            head_sequence_number: msg.head_sequence_number,
            head_sequence_time_ms: msg.head_sequence_time_ms,
            wall_time_ms: msg.wall_time_ms,
            video_id: msg.video_id,
            post_live_dvr: msg.post_live_dvr.unwrap_or(false),
            min_seekable_time_ms: seekable(msg.min_seekable_time_ticks, msg.min_seekable_timescale),
            max_seekable_time_ms: seekable(msg.max_seekable_time_ticks, msg.max_seekable_timescale),
        })))
    }

    pub(super) fn process_seek(&mut self, payload: &Bytes) -> Result<PartOutcome> {
        let kind = PartKind::SabrSeek;
        let msg: proto::SabrSeek = decode_message(kind, payload)?;
        let seek_time_ms = match (msg.seek_time_ticks, msg.timescale) {
            (Some(ticks), Some(timescale)) => ticks_to_ms(ticks, timescale),
            _ => None,
        }
        .ok_or_else(|| StreamError::malformed(kind, "missing or invalid seek time"))?;

        // Segments after a seek do not continue the old numbering, and
        // segments still open from before it will never be finished.
        for format in self.formats.values_mut() {
            format.last_sequence_number = None;
        }
        if !self.active_segments.is_empty() {
            debug!("Seek closes {} unfinished segments", self.active_segments.len());
            self.active_segments.clear();
        }

        debug!("Server seek to {} ms", seek_time_ms);
        Ok(PartOutcome::Emit(SabrPart::Seek(Seek { seek_time_ms, seek_source: msg.seek_source })))
    }

    pub(super) fn process_error(&mut self, payload: &Bytes) -> Result<PartOutcome> {
        let msg: proto::SabrError = decode_message(PartKind::SabrError, payload)?;

        Ok(PartOutcome::Emit(SabrPart::Error(ServerError {
            error_type: msg.error_type,
            code: msg.code,
        })))
    }

    pub(super) fn process_context_update(&mut self, payload: &Bytes) -> Result<PartOutcome> {
        let msg: proto::SabrContextUpdate = decode_message(PartKind::SabrContextUpdate, payload)?;

        let (Some(context_type), Some(value)) = (msg.context_type, msg.value) else {
            warn!("Received a context update without type or value, ignoring");
            return Ok(PartOutcome::Consumed);
        };

        Ok(PartOutcome::Emit(SabrPart::ContextUpdate(ContextUpdate {
            context_type,
            scope: msg.scope,
            value: Bytes::from(value),
            send_by_default: msg.send_by_default.unwrap_or(false),
            write_policy: msg.write_policy,
        })))
    }

    pub(super) fn process_context_sending_policy(
        &mut self,
        payload: &Bytes,
    ) -> Result<PartOutcome> {
        let msg: proto::SabrContextSendingPolicy =
            decode_message(PartKind::SabrContextSendingPolicy, payload)?;

        Ok(PartOutcome::Emit(SabrPart::ContextSendingPolicy(ContextSendingPolicy {
            start_policy: msg.start_policy,
            stop_policy: msg.stop_policy,
            discard_policy: msg.discard_policy,
        })))
    }

    pub(super) fn process_reload_player_response(
        &mut self,
        payload: &Bytes,
    ) -> Result<PartOutcome> {
        let msg: proto::ReloadPlayerResponse =
            decode_message(PartKind::ReloadPlayerResponse, payload)?;

        Ok(PartOutcome::Emit(SabrPart::ReloadPlayerResponse(ReloadPlayer {
            token: msg.reload_playback_params.and_then(|p| p.token),
        })))
    }
}
