//! Glint wire protocols
//!
//! Two independent byte protocols live here:
//!
//! - The **gimbal link**: a fixed 10-byte command frame sent to the gimbal
//!   controller board at every point of a trajectory.
//!
//! ```text
//! ┌──────┬──────┬─────────┬───────────┬───────┬────────┬──────────┬──────┐
//! │ 0xAA │ 0x06 │ YAW LE  │ PITCH LE  │ LASER │ BEEPER │ CHECKSUM │ 0xBB │
//! │ 1B   │ 1B   │ 2B      │ 2B        │ 1B    │ 1B     │ 1B       │ 1B   │
//! └──────┴──────┴─────────┴───────────┴───────┴────────┴──────────┴──────┘
//! ```
//!
//! - The **operator console**: variable-length frames carrying commands
//!   from whatever front end the operator uses (touch panel, PC tool) and
//!   status reports back.
//!
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ 0–16B       │ 1B       │
//! └───────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! Both use an additive 8-bit checksum.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod gimbal;
pub mod messages;

pub use frame::{ConsoleFrame, ConsoleParser, FrameError, CONSOLE_START, MAX_PAYLOAD_SIZE};
pub use gimbal::{GimbalFrame, GimbalFrameParser, GIMBAL_FRAME_SIZE};
pub use messages::{Axis, ConsoleCommand, ControllerReport, ShapeId, StatusCode};

/// Additive checksum: sum of all bytes modulo 256
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0x01, 0x02]), 0x03);
        assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
    }
}
