//! Gimbal command frame encoding and decoding.
//!
//! Frame format (10 bytes, fixed):
//! - START (1 byte): 0xAA
//! - LENGTH (1 byte): always 0x06, the number of data bytes that follow
//! - YAW (2 bytes, little-endian): mirrored around 5000, see [`mirror_yaw`]
//! - PITCH (2 bytes, little-endian): sent as-is
//! - LASER (1 byte): 0x50 on, 0x00 off
//! - BEEPER (1 byte): 0x01 on, 0x00 off
//! - CHECKSUM (1 byte): sum of LENGTH through BEEPER, modulo 256
//! - END (1 byte): 0xBB

use crate::checksum;
use crate::frame::FrameError;

/// Frame synchronization byte
pub const GIMBAL_FRAME_START: u8 = 0xAA;

/// Value of the LENGTH byte
pub const GIMBAL_FRAME_LENGTH: u8 = 0x06;

/// Frame terminator
pub const GIMBAL_FRAME_END: u8 = 0xBB;

/// Complete frame size in bytes
pub const GIMBAL_FRAME_SIZE: usize = 10;

/// LASER byte value when the laser is enabled
pub const LASER_ON: u8 = 0x50;

/// BEEPER byte value when the beeper is enabled
pub const BEEPER_ON: u8 = 0x01;

/// Center the yaw value is mirrored around
pub const YAW_MIRROR_CENTER: u16 = 5000;

// Byte offsets
const OFFSET_LENGTH: usize = 1;
const OFFSET_YAW: usize = 2;
const OFFSET_PITCH: usize = 4;
const OFFSET_LASER: usize = 6;
const OFFSET_BEEPER: usize = 7;
const OFFSET_CHECKSUM: usize = 8;
const OFFSET_END: usize = 9;

/// Mirror a yaw value around the 5000 center
///
/// The gimbal board's yaw axis runs opposite to the on-screen left/right
/// convention; pitch has no such inversion. Applying the mirror twice is
/// the identity.
pub const fn mirror_yaw(yaw: u16) -> u16 {
    (2 * YAW_MIRROR_CENTER).saturating_sub(yaw)
}

/// One gimbal command
///
/// `yaw` is the logical (unmirrored) value; mirroring happens during
/// encoding and is undone during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GimbalFrame {
    /// Yaw angle
    pub yaw: u16,
    /// Pitch angle
    pub pitch: u16,
    /// Laser enabled
    pub laser: bool,
    /// Beeper enabled
    pub beeper: bool,
}

impl GimbalFrame {
    /// Create a new frame
    pub const fn new(yaw: u16, pitch: u16, laser: bool, beeper: bool) -> Self {
        Self {
            yaw,
            pitch,
            laser,
            beeper,
        }
    }

    /// Encode this frame into its 10-byte wire form
    ///
    /// The checksum is computed from the payload on every call.
    pub fn encode(&self) -> [u8; GIMBAL_FRAME_SIZE] {
        let mut buf = [0u8; GIMBAL_FRAME_SIZE];
        buf[0] = GIMBAL_FRAME_START;
        buf[OFFSET_LENGTH] = GIMBAL_FRAME_LENGTH;
        buf[OFFSET_YAW..OFFSET_YAW + 2].copy_from_slice(&mirror_yaw(self.yaw).to_le_bytes());
        buf[OFFSET_PITCH..OFFSET_PITCH + 2].copy_from_slice(&self.pitch.to_le_bytes());
        buf[OFFSET_LASER] = if self.laser { LASER_ON } else { 0x00 };
        buf[OFFSET_BEEPER] = if self.beeper { BEEPER_ON } else { 0x00 };
        buf[OFFSET_CHECKSUM] = checksum(&buf[OFFSET_LENGTH..OFFSET_CHECKSUM]);
        buf[OFFSET_END] = GIMBAL_FRAME_END;
        buf
    }

    /// Decode and validate a frame
    ///
    /// The checksum is verified before any field is interpreted, so a
    /// corrupted payload byte always reports `InvalidChecksum`.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < GIMBAL_FRAME_SIZE {
            return Err(FrameError::Incomplete);
        }
        if bytes.len() > GIMBAL_FRAME_SIZE {
            return Err(FrameError::InvalidFrame);
        }
        if bytes[0] != GIMBAL_FRAME_START
            || bytes[OFFSET_LENGTH] != GIMBAL_FRAME_LENGTH
            || bytes[OFFSET_END] != GIMBAL_FRAME_END
        {
            return Err(FrameError::InvalidFrame);
        }
        if checksum(&bytes[OFFSET_LENGTH..OFFSET_CHECKSUM]) != bytes[OFFSET_CHECKSUM] {
            return Err(FrameError::InvalidChecksum);
        }

        let laser = match bytes[OFFSET_LASER] {
            LASER_ON => true,
            0x00 => false,
            _ => return Err(FrameError::InvalidFrame),
        };
        let beeper = match bytes[OFFSET_BEEPER] {
            BEEPER_ON => true,
            0x00 => false,
            _ => return Err(FrameError::InvalidFrame),
        };

        let wire_yaw = u16::from_le_bytes([bytes[OFFSET_YAW], bytes[OFFSET_YAW + 1]]);
        let pitch = u16::from_le_bytes([bytes[OFFSET_PITCH], bytes[OFFSET_PITCH + 1]]);

        Ok(Self {
            yaw: mirror_yaw(wire_yaw),
            pitch,
            laser,
            beeper,
        })
    }
}

/// Streaming decoder for a sequence of gimbal frames
///
/// Mirrors what the gimbal controller board does with the byte stream:
/// it hunts for a START byte, collects a full frame, and validates it.
#[derive(Debug, Clone)]
pub struct GimbalFrameParser {
    buffer: [u8; GIMBAL_FRAME_SIZE],
    len: usize,
}

impl Default for GimbalFrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GimbalFrameParser {
    /// Create a new parser
    pub const fn new() -> Self {
        Self {
            buffer: [0u8; GIMBAL_FRAME_SIZE],
            len: 0,
        }
    }

    /// Discard any partially received frame
    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is received.
    pub fn feed(&mut self, byte: u8) -> Result<Option<GimbalFrame>, FrameError> {
        if self.len == 0 {
            // Silently ignore bytes until a START byte shows up
            if byte == GIMBAL_FRAME_START {
                self.buffer[0] = byte;
                self.len = 1;
            }
            return Ok(None);
        }

        self.buffer[self.len] = byte;
        self.len += 1;

        if self.len < GIMBAL_FRAME_SIZE {
            return Ok(None);
        }

        self.len = 0;
        GimbalFrame::decode(&self.buffer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_center_frame() {
        let bytes = GimbalFrame::new(5000, 5000, false, false).encode();
        // 5000 = 0x1388
        assert_eq!(
            bytes,
            [0xAA, 0x06, 0x88, 0x13, 0x88, 0x13, 0x00, 0x00, 0x3C, 0xBB]
        );
    }

    #[test]
    fn test_yaw_is_mirrored_pitch_is_not() {
        let bytes = GimbalFrame::new(6000, 6000, false, false).encode();
        // Yaw 6000 goes out as 4000 (0x0FA0), pitch stays 6000 (0x1770)
        assert_eq!(&bytes[2..4], &[0xA0, 0x0F]);
        assert_eq!(&bytes[4..6], &[0x70, 0x17]);
    }

    #[test]
    fn test_flag_bytes() {
        let bytes = GimbalFrame::new(5000, 5000, true, true).encode();
        assert_eq!(bytes[6], LASER_ON);
        assert_eq!(bytes[7], BEEPER_ON);
        assert_eq!(bytes[8], 0x3C + 0x50 + 0x01);
    }

    #[test]
    fn test_decode_rejects_bad_markers() {
        let mut bytes = GimbalFrame::new(5000, 5000, false, false).encode();
        bytes[9] = 0x00;
        assert_eq!(GimbalFrame::decode(&bytes), Err(FrameError::InvalidFrame));

        let bytes = GimbalFrame::new(5000, 5000, false, false).encode();
        assert_eq!(GimbalFrame::decode(&bytes[..9]), Err(FrameError::Incomplete));
    }

    #[test]
    fn test_parser_resync_after_garbage() {
        let frame = GimbalFrame::new(4200, 5800, true, false);
        let mut stream = [0u8; 14];
        stream[..4].copy_from_slice(&[0x00, 0x13, 0x37, 0xFF]);
        stream[4..].copy_from_slice(&frame.encode());

        let mut parser = GimbalFrameParser::new();
        let mut decoded = None;
        for &byte in &stream {
            if let Some(f) = parser.feed(byte).unwrap() {
                decoded = Some(f);
            }
        }
        assert_eq!(decoded, Some(frame));
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            yaw in 3000u16..=7000,
            pitch in 3000u16..=7000,
            laser: bool,
            beeper: bool,
        ) {
            let frame = GimbalFrame::new(yaw, pitch, laser, beeper);
            prop_assert_eq!(GimbalFrame::decode(&frame.encode()), Ok(frame));
        }

        #[test]
        fn prop_corrupted_payload_fails_checksum(
            yaw in 3000u16..=7000,
            pitch in 3000u16..=7000,
            laser: bool,
            beeper: bool,
            offset in 2usize..8,
            flip in 1u8..=255,
        ) {
            let mut bytes = GimbalFrame::new(yaw, pitch, laser, beeper).encode();
            bytes[offset] = bytes[offset].wrapping_add(flip);
            prop_assert_eq!(GimbalFrame::decode(&bytes), Err(FrameError::InvalidChecksum));
        }

        #[test]
        fn prop_mirror_is_involution(yaw in 0u16..=10000) {
            prop_assert_eq!(mirror_yaw(mirror_yaw(yaw)), yaw);
        }
    }
}
