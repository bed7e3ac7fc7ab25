//! Live segment resynchronization policy
//!
//! Near the live edge the server maps player time to a segment using the
//! target segment duration, which can land one segment off. Two mismatch
//! shapes are absorbed by nudging the player time:
//!
//! - `received == expected - 1`: the segment before the previous one ran long,
//!   move the player time forward by the tolerance.
//! - `received == expected + 2`: the previous segment ran short, move the
//!   player time back by the tolerance (never below zero).
//!
//! Every other mismatch, and every mismatch on a non-live session, is fatal.

use crate::error::SegmentMismatch;
use crate::types::SessionState;

/// Delta (`received - expected`) corrected by moving the player time forward.
pub const FORWARD_RESYNC_DELTA: i64 = -1;

/// Delta (`received - expected`) corrected by moving the player time backward.
pub const BACKTRACK_RESYNC_DELTA: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncDirection {
    Forward,
    Backtrack,
}

/// Record of one absorbed mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResyncCorrection {
    pub direction: ResyncDirection,
    pub mismatch: SegmentMismatch,
    pub previous_player_time_ms: u64,
    pub player_time_ms: u64,
}

/// Which correction, if any, applies to `mismatch` under `state`.
pub fn resync_direction(state: &SessionState, mismatch: &SegmentMismatch) -> Option<ResyncDirection> {
    if !state.is_live {
        return None;
    }

    match mismatch.delta() {
        FORWARD_RESYNC_DELTA => Some(ResyncDirection::Forward),
        BACKTRACK_RESYNC_DELTA => Some(ResyncDirection::Backtrack),
        _ => None,
    }
}

/// Apply the correction for `mismatch`, or hand the mismatch back when it is fatal.
///
/// `state` is left untouched when the mismatch is returned.
pub fn apply_resync(
    state: &mut SessionState,
    mismatch: SegmentMismatch,
) -> Result<ResyncCorrection, SegmentMismatch> {
    let Some(direction) = resync_direction(state, &mismatch) else {
        return Err(mismatch);
    };

    let previous_player_time_ms = state.player_time_ms;
    match direction {
        ResyncDirection::Forward => state.resync_forward(),
        ResyncDirection::Backtrack => state.resync_backtrack(),
    }

    Ok(ResyncCorrection {
        direction,
        mismatch,
        previous_player_time_ms,
        player_time_ms: state.player_time_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn forward_correction_advances_player_time() {
        let mut state = SessionState::live(10_000, 500);
        let correction = apply_resync(&mut state, SegmentMismatch::new(8, 7)).expect("correctable");

        assert_eq!(correction.direction, ResyncDirection::Forward);
        assert_eq!(correction.previous_player_time_ms, 10_000);
        assert_eq!(correction.player_time_ms, 10_500);
        assert_eq!(state.player_time_ms, 10_500);
        assert_eq!(state.forward_resync_count, 1);
        assert_eq!(state.backtrack_resync_count, 0);
    }

    #[test]
    fn backtrack_correction_clamps_at_zero() {
        let mut state = SessionState::live(300, 500);
        let correction = apply_resync(&mut state, SegmentMismatch::new(8, 10)).expect("correctable");

        assert_eq!(correction.direction, ResyncDirection::Backtrack);
        assert_eq!(state.player_time_ms, 0);
        assert_eq!(state.backtrack_resync_count, 1);
    }

    #[test]
    fn window_is_asymmetric() {
        let state = SessionState::live(10_000, 500);
        // +1 and -2 are the mirror images of the corrected deltas and must stay fatal.
        assert_eq!(resync_direction(&state, &SegmentMismatch::new(8, 9)), None);
        assert_eq!(resync_direction(&state, &SegmentMismatch::new(8, 6)), None);
    }

    #[test]
    fn extreme_sequence_numbers_do_not_overflow() {
        let state = SessionState::live(0, 500);
        assert_eq!(resync_direction(&state, &SegmentMismatch::new(i64::MIN, i64::MAX)), None);
        assert_eq!(resync_direction(&state, &SegmentMismatch::new(i64::MAX, i64::MIN)), None);
    }

    proptest! {
        #[test]
        fn non_live_mismatches_are_always_fatal(
            expected in any::<i64>(),
            received in any::<i64>(),
            player_time in any::<u64>(),
            tolerance in any::<u64>()
        ) {
            let mut state = SessionState { is_live: false, ..SessionState::live(player_time, tolerance) };
            let before = state.clone();
            let mismatch = SegmentMismatch::new(expected, received);

            prop_assert_eq!(apply_resync(&mut state, mismatch.clone()), Err(mismatch));
            prop_assert_eq!(state, before);
        }

        #[test]
        fn live_deltas_outside_window_are_fatal(
            expected in -1_000_000i64..1_000_000,
            delta in -50i64..50,
            player_time in 0u64..1_000_000
        ) {
            prop_assume!(delta != FORWARD_RESYNC_DELTA && delta != BACKTRACK_RESYNC_DELTA);
            let mut state = SessionState::live(player_time, 500);
            let mismatch = SegmentMismatch::new(expected, expected + delta);

            prop_assert!(apply_resync(&mut state, mismatch).is_err());
            prop_assert_eq!(state.player_time_ms, player_time);
            prop_assert_eq!(state.resync_stats().total(), 0);
        }

        #[test]
        fn backtrack_never_goes_negative(player_time in 0u64..10_000, tolerance in 0u64..20_000) {
            let mut state = SessionState::live(player_time, tolerance);
            apply_resync(&mut state, SegmentMismatch::new(5, 7)).expect("correctable");
            prop_assert_eq!(state.player_time_ms, player_time.saturating_sub(tolerance));
        }
    }
}
