//! Flags shared between the input side and the gimbal owner
//!
//! The input side (console, touch panel) never talks to the gimbal
//! directly. It raises flags here and sends commands through a queue;
//! the gimbal owner reads the flags at send time and between points.
//!
//! Only atomic loads and stores are used so the same type works on
//! cores without compare-and-swap.

use portable_atomic::{AtomicBool, AtomicU8, Ordering};

/// Operator-facing work mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum WorkMode {
    /// Booting or parked
    #[default]
    Init = 0,
    /// Capturing calibration corners
    Calibrate = 1,
    /// Jogging to set points and drawing
    Setpoint = 2,
}

impl WorkMode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(WorkMode::Init),
            1 => Some(WorkMode::Calibrate),
            2 => Some(WorkMode::Setpoint),
            _ => None,
        }
    }
}

/// Explicit shared-state object, passed by reference to both sides
#[derive(Debug, Default)]
pub struct SharedState {
    beeper: AtomicBool,
    stop: AtomicBool,
    running: AtomicBool,
    mode: AtomicU8,
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            beeper: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            running: AtomicBool::new(false),
            mode: AtomicU8::new(WorkMode::Init as u8),
        }
    }

    /// Beeper state carried by the next gimbal frame
    pub fn beeper(&self) -> bool {
        self.beeper.load(Ordering::Acquire)
    }

    pub fn set_beeper(&self, on: bool) {
        self.beeper.store(on, Ordering::Release);
    }

    /// Ask the running playback to stop after its current point
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    pub fn clear_stop(&self) {
        self.stop.store(false, Ordering::Release);
    }

    /// Whether a playback is in progress
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    pub fn mode(&self) -> WorkMode {
        WorkMode::from_u8(self.mode.load(Ordering::Acquire)).unwrap_or_default()
    }

    pub fn set_mode(&self, mode: WorkMode) {
        self.mode.store(mode as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let shared = SharedState::new();
        assert!(!shared.beeper());
        assert!(!shared.stop_requested());
        assert!(!shared.is_running());
        assert_eq!(shared.mode(), WorkMode::Init);
    }

    #[test]
    fn test_stop_request_cycle() {
        let shared = SharedState::new();
        shared.request_stop();
        assert!(shared.stop_requested());
        shared.clear_stop();
        assert!(!shared.stop_requested());
    }

    #[test]
    fn test_mode_roundtrip() {
        let shared = SharedState::new();
        for mode in [WorkMode::Calibrate, WorkMode::Setpoint, WorkMode::Init] {
            shared.set_mode(mode);
            assert_eq!(shared.mode(), mode);
        }
    }
}
