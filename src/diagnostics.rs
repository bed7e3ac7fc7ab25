//! Advisory diagnostics side channel
//!
//! The stream parser reports skipped unknown parts and applied resync
//! corrections here. Sinks observe only; nothing they do can change what the
//! parser returns.

use tracing::{debug, warn};

use crate::processor::ResyncCorrection;

/// Receiver for parser diagnostics.
pub trait DiagnosticsSink {
    /// A part with an identifier outside the known set was skipped.
    fn unknown_part(&mut self, part_id: u32, payload_len: usize);

    /// A live segment mismatch was absorbed by adjusting the player time.
    fn resync_applied(&mut self, _correction: &ResyncCorrection) {}
}

/// Default sink: forwards notices to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn unknown_part(&mut self, part_id: u32, payload_len: usize) {
        debug!("Unknown part encountered: {} ({} bytes)", part_id, payload_len);
    }

    fn resync_applied(&mut self, correction: &ResyncCorrection) {
        warn!(
            "Live segment resync ({:?}): expected {}, received {}; player time {} -> {} ms",
            correction.direction,
            correction.mismatch.expected,
            correction.mismatch.received,
            correction.previous_player_time_ms,
            correction.player_time_ms
        );
    }
}

/// A skipped unknown part, as recorded by [`RecordingDiagnostics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedPart {
    pub part_id: u32,
    pub payload_len: usize,
}

/// Sink that keeps every notice in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingDiagnostics {
    pub skipped: Vec<SkippedPart>,
    pub corrections: Vec<ResyncCorrection>,
}

impl DiagnosticsSink for RecordingDiagnostics {
    fn unknown_part(&mut self, part_id: u32, payload_len: usize) {
        self.skipped.push(SkippedPart { part_id, payload_len });
    }

    fn resync_applied(&mut self, correction: &ResyncCorrection) {
        self.corrections.push(correction.clone());
    }
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for &mut S {
    fn unknown_part(&mut self, part_id: u32, payload_len: usize) {
        (**self).unknown_part(part_id, payload_len);
    }

    fn resync_applied(&mut self, correction: &ResyncCorrection) {
        (**self).resync_applied(correction);
    }
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for Box<S> {
    fn unknown_part(&mut self, part_id: u32, payload_len: usize) {
        (**self).unknown_part(part_id, payload_len);
    }

    fn resync_applied(&mut self, correction: &ResyncCorrection) {
        (**self).resync_applied(correction);
    }
}
