//! Recognized SABR part kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Part kinds this crate understands.
/// Discriminants are the UMP part identifiers used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum PartKind {
    MediaHeader = 20,
    Media = 21,
    MediaEnd = 22,
    LiveMetadata = 31,
    NextRequestPolicy = 35,
    FormatInitializationMetadata = 42,
    SabrRedirect = 43,
    SabrError = 44,
    SabrSeek = 45,
    ReloadPlayerResponse = 46,
    SabrContextUpdate = 57,
    StreamProtectionStatus = 58,
    SabrContextSendingPolicy = 59,
}

impl PartKind {
    /// Every recognized kind, in dispatch-table order.
    pub const KNOWN: [PartKind; 13] = [
        PartKind::MediaHeader,
        PartKind::Media,
        PartKind::MediaEnd,
        PartKind::StreamProtectionStatus,
        PartKind::SabrRedirect,
        PartKind::FormatInitializationMetadata,
        PartKind::NextRequestPolicy,
        PartKind::LiveMetadata,
        PartKind::SabrSeek,
        PartKind::SabrError,
        PartKind::SabrContextUpdate,
        PartKind::SabrContextSendingPolicy,
        PartKind::ReloadPlayerResponse,
    ];

    /// Classify a raw UMP part identifier.
    ///
    /// Returns `None` for identifiers outside the known set. Those are protocol
    /// extension points, not errors.
    pub const fn from_id(part_id: u32) -> Option<Self> {
        match part_id {
            20 => Some(PartKind::MediaHeader),
            21 => Some(PartKind::Media),
            22 => Some(PartKind::MediaEnd),
            31 => Some(PartKind::LiveMetadata),
            35 => Some(PartKind::NextRequestPolicy),
            42 => Some(PartKind::FormatInitializationMetadata),
            43 => Some(PartKind::SabrRedirect),
            44 => Some(PartKind::SabrError),
            45 => Some(PartKind::SabrSeek),
            46 => Some(PartKind::ReloadPlayerResponse),
            57 => Some(PartKind::SabrContextUpdate),
            58 => Some(PartKind::StreamProtectionStatus),
            59 => Some(PartKind::SabrContextSendingPolicy),
            _ => None,
        }
    }

    /// Wire identifier of this kind.
    pub const fn id(self) -> u32 {
        self as u32
    }

    pub const fn is_known(part_id: u32) -> bool {
        Self::from_id(part_id).is_some()
    }

    /// Human-readable name used in logs and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            PartKind::MediaHeader => "media header",
            PartKind::Media => "media",
            PartKind::MediaEnd => "media end",
            PartKind::LiveMetadata => "live metadata",
            PartKind::NextRequestPolicy => "next request policy",
            PartKind::FormatInitializationMetadata => "format initialization metadata",
            PartKind::SabrRedirect => "redirect",
            PartKind::SabrError => "error",
            PartKind::SabrSeek => "seek",
            PartKind::ReloadPlayerResponse => "reload player response",
            PartKind::SabrContextUpdate => "context update",
            PartKind::StreamProtectionStatus => "stream protection status",
            PartKind::SabrContextSendingPolicy => "context sending policy",
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u32> for PartKind {
    type Error = u32;

    fn try_from(part_id: u32) -> Result<Self, Self::Error> {
        Self::from_id(part_id).ok_or(part_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_table_round_trips_through_ids() {
        for kind in PartKind::KNOWN {
            assert_eq!(PartKind::from_id(kind.id()), Some(kind));
        }
    }

    #[test]
    fn known_table_has_no_duplicates() {
        let mut ids: Vec<u32> = PartKind::KNOWN.iter().map(|k| k.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), PartKind::KNOWN.len());
    }

    #[test]
    fn neighbouring_protocol_ids_are_not_recognized() {
        // Onesie header, hostname change hint, playback start policy, sabr ack.
        for id in [10, 32, 47, 61] {
            assert!(!PartKind::is_known(id), "{} should be skipped", id);
        }
        assert_eq!(PartKind::try_from(61), Err(61));
    }

    proptest! {
        #[test]
        fn classification_agrees_with_known_table(id in 0u32..512) {
            let in_table = PartKind::KNOWN.iter().any(|k| k.id() == id);
            prop_assert_eq!(PartKind::is_known(id), in_table);
        }
    }
}
