//! Media header, media and media end handling

use bytes::Bytes;
use tracing::{debug, trace};

use super::{ActiveSegment, PartOutcome, SabrProcessor, decode_message};
use crate::error::SegmentMismatch;
use crate::proto;
use crate::types::{
    FormatKey, InitializedFormat, MediaChunk, MediaSegmentEnd, MediaSegmentHeader, PartKind,
    SabrPart,
};
use crate::ump::decode_varint;
use crate::{Result, StreamError};

impl SabrProcessor {
    pub(super) fn process_media_header(&mut self, payload: &Bytes) -> Result<PartOutcome> {
        let header: proto::MediaHeader = decode_message(PartKind::MediaHeader, payload)?;

        let header_id = header.header_id.unwrap_or_default();
        let format = FormatKey::from_media_header(&header)
            .ok_or_else(|| StreamError::malformed(PartKind::MediaHeader, "no format id or itag"))?;
        let is_init_segment = header.is_init_seg.unwrap_or(false);

        let sequence_number = match (is_init_segment, header.sequence_number) {
            (true, n) => n,
            (false, Some(n)) => Some(n),
            (false, None) => {
                return Err(StreamError::malformed(
                    PartKind::MediaHeader,
                    format!("media segment for {} has no sequence number", format),
                ));
            }
        };

        let tracked = self
            .formats
            .entry(format.clone())
            .or_insert_with(|| InitializedFormat::new(format.clone()));
        if tracked.video_id.is_none() {
            tracked.video_id = header.video_id.clone();
        }

        // Init segments sit outside the numbered sequence.
        if let (false, Some(received)) = (is_init_segment, sequence_number) {
            if let Some(last) = tracked.last_sequence_number {
                let expected = last.checked_add(1).ok_or_else(|| {
                    StreamError::malformed(
                        PartKind::MediaHeader,
                        format!("sequence numbering for {} has no successor after {}", format, last),
                    )
                })?;
                if received != expected {
                    debug!(
                        "Media header {} for {} out of sequence: expected {}, received {}",
                        header_id, format, expected, received
                    );
                    return Ok(PartOutcome::Mismatch(SegmentMismatch {
                        expected,
                        received,
                        format: Some(format.to_string()),
                        header_id: Some(header_id),
                    }));
                }
            }
            tracked.last_sequence_number = Some(received);
        }

        debug!(
            "Accepted media header {} for {} (sequence {:?}, init {})",
            header_id, format, sequence_number, is_init_segment
        );
        self.active_segments
            .insert(header_id, ActiveSegment { format: format.clone(), sequence_number });

        Ok(PartOutcome::Emit(SabrPart::MediaHeader(MediaSegmentHeader {
            header_id,
            format,
            video_id: header.video_id,
            is_init_segment,
            sequence_number,
            start_ms: header.start_ms,
            duration_ms: header.duration_ms,
            start_range: header.start_range,
            content_length: header.content_length,
        })))
    }

    pub(super) fn process_media(&mut self, payload: &Bytes) -> Result<PartOutcome> {
        let (header_id, offset) = read_header_id(PartKind::Media, payload)?;

        let Some(segment) = self.active_segments.get(&header_id) else {
            trace!("Dropping media for inactive header {} ({} bytes)", header_id, payload.len());
            return Ok(PartOutcome::Consumed);
        };

        Ok(PartOutcome::Emit(SabrPart::Media(MediaChunk {
            header_id,
            format: segment.format.clone(),
            sequence_number: segment.sequence_number,
            data: payload.slice(offset..),
        })))
    }

    pub(super) fn process_media_end(&mut self, payload: &Bytes) -> Result<PartOutcome> {
        let (header_id, _) = read_header_id(PartKind::MediaEnd, payload)?;

        let Some(segment) = self.active_segments.remove(&header_id) else {
            trace!("Dropping media end for inactive header {}", header_id);
            return Ok(PartOutcome::Consumed);
        };

        Ok(PartOutcome::Emit(SabrPart::MediaEnd(MediaSegmentEnd {
            header_id,
            format: segment.format,
            sequence_number: segment.sequence_number,
        })))
    }
}

/// `Media` and `MediaEnd` payloads start with the header id as a UMP varint.
fn read_header_id(kind: PartKind, payload: &Bytes) -> Result<(u32, usize)> {
    decode_varint(payload).ok_or_else(|| StreamError::malformed(kind, "missing header id"))
}
