//! Raw and classified UMP parts

use bytes::{BufMut, Bytes};

use super::varint::{encode_varint, encoded_len};
use crate::types::PartKind;

/// One unit read from the envelope: an identifier plus its complete payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UmpPart {
    pub part_id: u32,
    pub payload: Bytes,
}

impl UmpPart {
    pub fn new(part_id: u32, payload: impl Into<Bytes>) -> Self {
        Self { part_id, payload: payload.into() }
    }

    /// Split known kinds from protocol extensions this crate does not interpret.
    pub fn classify(self) -> Classified {
        match PartKind::from_id(self.part_id) {
            Some(kind) => Classified::Known(Part { kind, payload: self.payload }),
            None => Classified::Unknown(self),
        }
    }

    /// Bytes this part occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        // Lengths above u32::MAX cannot be framed; encode() rejects them.
        encoded_len(self.part_id) + encoded_len(self.payload.len() as u32) + self.payload.len()
    }

    /// Append the framed part to `buf`.
    ///
    /// # Panics
    ///
    /// Panics if the payload is longer than `u32::MAX` bytes.
    pub fn encode(&self, buf: &mut impl BufMut) {
        let len = u32::try_from(self.payload.len()).expect("UMP payload exceeds u32 length");
        encode_varint(self.part_id, buf);
        encode_varint(len, buf);
        buf.put_slice(&self.payload);
    }
}

/// A part whose identifier is in the known set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub kind: PartKind,
    pub payload: Bytes,
}

/// Outcome of checking a part identifier against the known set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Known(Part),
    Unknown(UmpPart),
}
