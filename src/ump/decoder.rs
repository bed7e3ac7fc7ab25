//! Forward-only UMP envelope decoder

use bytes::Bytes;
use std::io::Read;
use tracing::trace;

use super::part::UmpPart;
use super::varint::read_varint;
use crate::error::FramingError;

/// Default upper bound on a single part's declared payload length (16 MiB).
pub const DEFAULT_MAX_PART_SIZE: usize = 16 * 1024 * 1024;

/// Initial buffer reservation per payload, independent of the declared length.
const PAYLOAD_CHUNK: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    Ready,
    Exhausted,
    Failed,
}

/// Pulls complete `(part_id, payload)` units from a byte source.
///
/// The decoder knows nothing about what parts mean. Each call to
/// [`decode`](Self::decode) either returns one whole part, `None` once the
/// source is exhausted, or a [`FramingError`]. After an error the decoder is
/// poisoned and never reads from the source again.
#[derive(Debug)]
pub struct UmpDecoder<R> {
    reader: R,
    max_part_size: usize,
    state: DecoderState,
    parts_decoded: u64,
    bytes_consumed: u64,
}

impl<R: Read> UmpDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_max_part_size(reader, DEFAULT_MAX_PART_SIZE)
    }

    pub fn with_max_part_size(reader: R, max_part_size: usize) -> Self {
        Self {
            reader,
            max_part_size,
            state: DecoderState::Ready,
            parts_decoded: 0,
            bytes_consumed: 0,
        }
    }

    /// Decode the next part.
    pub fn decode(&mut self) -> Result<Option<UmpPart>, FramingError> {
        match self.state {
            DecoderState::Ready => {}
            DecoderState::Exhausted => return Ok(None),
            DecoderState::Failed => return Err(FramingError::Poisoned),
        }

        match self.decode_part() {
            Ok(Some(part)) => {
                self.parts_decoded += 1;
                self.bytes_consumed += part.encoded_len() as u64;
                trace!(
                    "Decoded UMP part {} ({} payload bytes)",
                    part.part_id,
                    part.payload.len()
                );
                Ok(Some(part))
            }
            Ok(None) => {
                trace!(
                    "UMP source exhausted after {} parts ({} bytes)",
                    self.parts_decoded, self.bytes_consumed
                );
                self.state = DecoderState::Exhausted;
                Ok(None)
            }
            Err(e) => {
                self.state = DecoderState::Failed;
                Err(e)
            }
        }
    }

    fn decode_part(&mut self) -> Result<Option<UmpPart>, FramingError> {
        let Some(part_id) = read_varint(&mut self.reader, "part id")? else {
            return Ok(None);
        };

        let declared = read_varint(&mut self.reader, "part length")?
            .ok_or(FramingError::TruncatedVarint { field: "part length", width: 1 })?
            as usize;

        if declared > self.max_part_size {
            return Err(FramingError::PartTooLarge {
                part_id,
                declared,
                limit: self.max_part_size,
            });
        }

        let mut payload = Vec::with_capacity(declared.min(PAYLOAD_CHUNK));
        let available = (&mut self.reader).take(declared as u64).read_to_end(&mut payload)?;
        if available < declared {
            return Err(FramingError::TruncatedPayload { part_id, declared, available });
        }

        Ok(Some(UmpPart { part_id, payload: Bytes::from(payload) }))
    }

    /// Parts successfully decoded so far.
    pub fn parts_decoded(&self) -> u64 {
        self.parts_decoded
    }

    /// Bytes consumed by successfully decoded parts.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == DecoderState::Exhausted
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Give the byte source back to its owner.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for UmpDecoder<R> {
    type Item = Result<UmpPart, FramingError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            DecoderState::Failed => None,
            _ => self.decode().transpose(),
        }
    }
}
