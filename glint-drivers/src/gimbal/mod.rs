//! Gimbal controller board driver

mod link;

pub use link::{GimbalLink, LinkError, CENTER_REPEATS, SEND_SPACING_MS, STARTUP_BEEP_AT, STARTUP_SENDS};
