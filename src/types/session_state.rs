//! Per-session adaptive bitrate state

use serde::{Deserialize, Serialize};

/// Default tolerance applied when correcting live segment drift.
pub const DEFAULT_LIVE_SEGMENT_TOLERANCE_MS: u64 = 100;

/// Mutable playback parameters for one SABR session.
///
/// Owned by a single processor. The player time is the position the next
/// segment request targets; resync corrections nudge it forwards or backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub player_time_ms: u64,
    pub is_live: bool,
    pub live_segment_target_duration_tolerance_ms: u64,
    /// Corrections that moved the player time forward.
    pub forward_resync_count: u32,
    /// Corrections that moved the player time backward.
    pub backtrack_resync_count: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            player_time_ms: 0,
            is_live: false,
            live_segment_target_duration_tolerance_ms: DEFAULT_LIVE_SEGMENT_TOLERANCE_MS,
            forward_resync_count: 0,
            backtrack_resync_count: 0,
        }
    }
}

impl SessionState {
    /// State for a video-on-demand session starting at `player_time_ms`.
    pub fn on_demand(player_time_ms: u64) -> Self {
        Self { player_time_ms, ..Self::default() }
    }

    /// State for a live session with the given drift tolerance.
    pub fn live(player_time_ms: u64, tolerance_ms: u64) -> Self {
        Self {
            player_time_ms,
            is_live: true,
            live_segment_target_duration_tolerance_ms: tolerance_ms,
            ..Self::default()
        }
    }

    /// Move the player time forward by one tolerance step.
    pub(crate) fn resync_forward(&mut self) {
        self.player_time_ms =
            self.player_time_ms.saturating_add(self.live_segment_target_duration_tolerance_ms);
        self.forward_resync_count += 1;
    }

    /// Move the player time back by one tolerance step, never below zero.
    pub(crate) fn resync_backtrack(&mut self) {
        self.player_time_ms =
            self.player_time_ms.saturating_sub(self.live_segment_target_duration_tolerance_ms);
        self.backtrack_resync_count += 1;
    }

    pub fn resync_stats(&self) -> ResyncStats {
        ResyncStats {
            forward: self.forward_resync_count,
            backtrack: self.backtrack_resync_count,
        }
    }
}

/// Snapshot of the resync counters. Diagnostic only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResyncStats {
    pub forward: u32,
    pub backtrack: u32,
}

impl ResyncStats {
    pub fn total(&self) -> u32 {
        self.forward + self.backtrack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_resync_adds_tolerance() {
        let mut state = SessionState::live(10_000, 500);
        state.resync_forward();
        assert_eq!(state.player_time_ms, 10_500);
        assert_eq!(state.resync_stats(), ResyncStats { forward: 1, backtrack: 0 });
    }

    #[test]
    fn backtrack_resync_clamps_at_zero() {
        let mut state = SessionState::live(200, 500);
        state.resync_backtrack();
        assert_eq!(state.player_time_ms, 0);
        assert_eq!(state.backtrack_resync_count, 1);

        state.resync_backtrack();
        assert_eq!(state.player_time_ms, 0);
        assert_eq!(state.resync_stats().total(), 2);
    }

    #[test]
    fn missing_yaml_fields_use_defaults() {
        let state: SessionState = serde_yaml_ng::from_str("is_live: true\nplayer_time_ms: 42\n")
            .expect("partial state should deserialize");
        assert!(state.is_live);
        assert_eq!(state.player_time_ms, 42);
        assert_eq!(
            state.live_segment_target_duration_tolerance_ms,
            DEFAULT_LIVE_SEGMENT_TOLERANCE_MS
        );
        assert_eq!(state.resync_stats(), ResyncStats::default());
    }
}
