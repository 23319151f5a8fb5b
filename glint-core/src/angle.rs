//! Gimbal angle state
//!
//! Angles are unitless integers in the gimbal board's own scale. The
//! mechanical range is [`ANGLE_MIN`]..=[`ANGLE_MAX`] with [`ANGLE_CENTER`]
//! as the neutral position on both axes.

use heapless::HistoryBuffer;

/// Lowest commandable angle on either axis
pub const ANGLE_MIN: u16 = 3000;

/// Highest commandable angle on either axis
pub const ANGLE_MAX: u16 = 7000;

/// Neutral position on both axes
pub const ANGLE_CENTER: u16 = 5000;

/// Pitch used when parking the gimbal at shutdown
pub const PITCH_REST: u16 = 5500;

/// Default number of samples kept in the angle history
pub const DEFAULT_HISTORY: usize = 8;

/// Clamp an arbitrary integer into the mechanical range
pub fn clamp_angle(value: i32) -> u16 {
    value.clamp(ANGLE_MIN as i32, ANGLE_MAX as i32) as u16
}

/// Current and previous angles plus a short history of sent values
///
/// `set` only changes the current angles. The previous angles and the
/// history move forward when a frame carrying the current angles has been
/// sent, see [`AngleState::commit`]. Between the two the pending delta can
/// be inspected to size a settling delay.
pub struct AngleState<const N: usize = DEFAULT_HISTORY> {
    yaw: u16,
    pitch: u16,
    prev_yaw: u16,
    prev_pitch: u16,
    yaw_history: HistoryBuffer<u16, N>,
    pitch_history: HistoryBuffer<u16, N>,
}

impl<const N: usize> Default for AngleState<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> AngleState<N> {
    /// Centered on both axes with an empty history
    pub const fn new() -> Self {
        Self {
            yaw: ANGLE_CENTER,
            pitch: ANGLE_CENTER,
            prev_yaw: ANGLE_CENTER,
            prev_pitch: ANGLE_CENTER,
            yaw_history: HistoryBuffer::new(),
            pitch_history: HistoryBuffer::new(),
        }
    }

    /// Set both angles, clamping each into the mechanical range
    pub fn set(&mut self, yaw: i32, pitch: i32) {
        self.yaw = clamp_angle(yaw);
        self.pitch = clamp_angle(pitch);
    }

    pub fn yaw(&self) -> u16 {
        self.yaw
    }

    pub fn pitch(&self) -> u16 {
        self.pitch
    }

    /// Yaw as of the last successful send
    pub fn prev_yaw(&self) -> u16 {
        self.prev_yaw
    }

    /// Pitch as of the last successful send
    pub fn prev_pitch(&self) -> u16 {
        self.prev_pitch
    }

    /// Movement the next send will command, as (yaw, pitch)
    pub fn pending_delta(&self) -> (i32, i32) {
        (
            self.yaw as i32 - self.prev_yaw as i32,
            self.pitch as i32 - self.prev_pitch as i32,
        )
    }

    /// Largest absolute per-axis movement the next send will command
    pub fn pending_max_delta(&self) -> u32 {
        let (dy, dp) = self.pending_delta();
        dy.unsigned_abs().max(dp.unsigned_abs())
    }

    /// Record that the current angles went out on the wire
    pub fn commit(&mut self) {
        self.prev_yaw = self.yaw;
        self.prev_pitch = self.pitch;
        self.yaw_history.write(self.yaw);
        self.pitch_history.write(self.pitch);
    }

    /// Number of samples in the history (never more than `N`)
    pub fn history_len(&self) -> usize {
        self.yaw_history.len()
    }

    /// Sent (yaw, pitch) pairs, oldest first
    pub fn history(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.yaw_history
            .oldest_ordered()
            .copied()
            .zip(self.pitch_history.oldest_ordered().copied())
    }

    /// Mean of the history window, or `None` before the first send
    pub fn history_average(&self) -> Option<(u16, u16)> {
        let len = self.history_len() as u32;
        if len == 0 {
            return None;
        }
        let (yaw_sum, pitch_sum) = self
            .history()
            .fold((0u32, 0u32), |(ys, ps), (y, p)| (ys + y as u32, ps + p as u32));
        Some(((yaw_sum / len) as u16, (pitch_sum / len) as u16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_is_centered() {
        let state: AngleState = AngleState::new();
        assert_eq!((state.yaw(), state.pitch()), (5000, 5000));
        assert_eq!(state.history_len(), 0);
        assert_eq!(state.history_average(), None);
    }

    #[test]
    fn test_pending_delta_until_commit() {
        let mut state: AngleState = AngleState::new();
        state.set(5200, 4700);
        assert_eq!(state.pending_delta(), (200, -300));
        assert_eq!(state.pending_max_delta(), 300);
        assert_eq!(state.prev_yaw(), 5000);

        state.commit();
        assert_eq!(state.pending_delta(), (0, 0));
        assert_eq!((state.prev_yaw(), state.prev_pitch()), (5200, 4700));
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut state: AngleState<4> = AngleState::new();
        for i in 0..6 {
            state.set(4000 + i * 100, 5000);
            state.commit();
        }
        assert_eq!(state.history_len(), 4);
        let yaws: Vec<u16> = state.history().map(|(y, _)| y).collect();
        assert_eq!(yaws, vec![4200, 4300, 4400, 4500]);
        assert_eq!(state.history_average(), Some((4350, 5000)));
    }

    proptest! {
        #[test]
        fn prop_set_clamps(yaw: i32, pitch: i32) {
            let mut state: AngleState = AngleState::new();
            state.set(yaw, pitch);
            prop_assert_eq!(state.yaw() as i32, yaw.clamp(3000, 7000));
            prop_assert_eq!(state.pitch() as i32, pitch.clamp(3000, 7000));
        }

        #[test]
        fn prop_history_bounded(count in 0usize..40) {
            let mut state: AngleState = AngleState::new();
            for i in 0..count {
                state.set(3000 + i as i32 * 50, 5000);
                state.commit();
            }
            prop_assert_eq!(state.history_len(), count.min(DEFAULT_HISTORY));
        }
    }
}
