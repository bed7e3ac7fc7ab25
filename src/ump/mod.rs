//! UMP envelope decoding
//!
//! UMP is a plain length-prefixed container: every unit is a varint part
//! identifier, a varint payload length, and the payload. This module reads
//! units off any [`std::io::Read`] source and classifies their identifiers;
//! it assigns no meaning to payloads.

pub mod decoder;
pub mod part;
pub mod varint;

pub use decoder::{DEFAULT_MAX_PART_SIZE, UmpDecoder};
pub use part::{Classified, Part, UmpPart};
pub use varint::{decode_varint, encode_varint, read_varint};
