//! Format identity and per-format segment tracking

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::proto;

/// Identity of one media format within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatKey {
    pub itag: i32,
    /// Last-modified timestamp of the format.
    pub lmt: u64,
    pub xtags: Option<String>,
}

impl FormatKey {
    pub fn new(itag: i32, lmt: u64) -> Self {
        Self { itag, lmt, xtags: None }
    }

    pub(crate) fn from_format_id(id: &proto::FormatId) -> Option<Self> {
        Some(Self {
            itag: id.itag?,
            lmt: id.last_modified.unwrap_or_default(),
            xtags: id.xtags.clone().filter(|x| !x.is_empty()),
        })
    }

    /// Key for a media header: the embedded format id wins, loose fields otherwise.
    pub(crate) fn from_media_header(header: &proto::MediaHeader) -> Option<Self> {
        if let Some(key) = header.format_id.as_ref().and_then(Self::from_format_id) {
            return Some(key);
        }

        Some(Self {
            itag: header.itag?,
            lmt: header.lmt.unwrap_or_default(),
            xtags: header.xtags.clone().filter(|x| !x.is_empty()),
        })
    }
}

impl fmt::Display for FormatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{}", self.itag, self.lmt, self.xtags.as_deref().unwrap_or(""))
    }
}

/// A format the server has announced or started sending segments for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializedFormat {
    pub key: FormatKey,
    pub video_id: Option<String>,
    pub mime_type: Option<String>,
    pub end_segment_number: Option<i64>,
    /// Sequence number of the last accepted media segment.
    pub last_sequence_number: Option<i64>,
}

impl InitializedFormat {
    pub fn new(key: FormatKey) -> Self {
        Self {
            key,
            video_id: None,
            mime_type: None,
            end_segment_number: None,
            last_sequence_number: None,
        }
    }

    /// The next sequence number this format should deliver, once one has been seen.
    ///
    /// `None` also when the last accepted number is `i64::MAX` and has no successor.
    pub fn expected_sequence_number(&self) -> Option<i64> {
        self.last_sequence_number.and_then(|n| n.checked_add(1))
    }
}
