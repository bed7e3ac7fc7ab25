//! Builders for synthetic UMP streams and SABR parts
//!
//! Shared by unit tests and the benchmarks (through the `benchmark` feature),
//! so that no test needs a captured server response on disk.

#![cfg(any(test, feature = "benchmark"))]

use bytes::{Bytes, BytesMut};
use prost::Message;

use crate::proto;
use crate::types::PartKind;
use crate::ump::{Part, UmpPart, encode_varint};

/// Incrementally assembles a UMP byte stream.
#[derive(Debug, Default)]
pub struct UmpStreamBuilder {
    buf: BytesMut,
}

impl UmpStreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a part with an arbitrary identifier and raw payload.
    pub fn part(mut self, part_id: u32, payload: &[u8]) -> Self {
        UmpPart::new(part_id, Bytes::copy_from_slice(payload)).encode(&mut self.buf);
        self
    }

    /// Append a known part carrying a protobuf message.
    pub fn message(self, kind: PartKind, msg: &impl Message) -> Self {
        self.part(kind.id(), &msg.encode_to_vec())
    }

    /// Append a part whose identifier is outside the known set.
    ///
    /// # Panics
    ///
    /// Panics if `part_id` is a known part identifier.
    pub fn unknown(self, part_id: u32, payload: &[u8]) -> Self {
        assert!(PartKind::from_id(part_id).is_none(), "part {} is a known kind", part_id);
        self.part(part_id, payload)
    }

    pub fn media_header(self, header_id: u32, itag: i32, sequence_number: i64) -> Self {
        self.message(PartKind::MediaHeader, &media_header(header_id, itag, sequence_number))
    }

    pub fn media(self, header_id: u32, data: &[u8]) -> Self {
        self.part(PartKind::Media.id(), &media_payload(header_id, data))
    }

    pub fn media_end(self, header_id: u32) -> Self {
        self.part(PartKind::MediaEnd.id(), &media_payload(header_id, &[]))
    }

    pub fn build(self) -> Bytes {
        self.buf.freeze()
    }
}

/// A classified part wrapping an encoded protobuf message.
pub fn known_part(kind: PartKind, msg: &impl Message) -> Part {
    Part { kind, payload: Bytes::from(msg.encode_to_vec()) }
}

/// A non-init media header for `itag` with `sequence_number`.
pub fn media_header(header_id: u32, itag: i32, sequence_number: i64) -> proto::MediaHeader {
    proto::MediaHeader {
        header_id: Some(header_id),
        video_id: Some("dQw4w9WgXcQ".into()),
        itag: Some(itag),
        lmt: Some(0),
        is_init_seg: Some(false),
        sequence_number: Some(sequence_number),
        start_ms: Some(sequence_number.saturating_mul(5_000)),
        duration_ms: Some(5_000),
        ..Default::default()
    }
}

/// `Media`/`MediaEnd` payload: the header id varint followed by `data`.
pub fn media_payload(header_id: u32, data: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(data.len() + 5);
    encode_varint(header_id, &mut buf);
    buf.extend_from_slice(data);
    buf.freeze()
}
