//! Console frame encoding and decoding.
//!
//! Frame format:
//! - START (1 byte): 0x7E synchronization byte
//! - LENGTH (1 byte): payload length (0-16)
//! - TYPE (1 byte): message type identifier
//! - PAYLOAD (0-16 bytes): type-specific data
//! - CHECKSUM (1 byte): sum of LENGTH, TYPE, and all PAYLOAD bytes, modulo 256
//!
//! The START byte differs from the gimbal frame's 0xAA so a console wired
//! to the wrong port never gets mistaken for gimbal traffic.

use heapless::Vec;

use crate::checksum;

/// Frame synchronization byte
pub const CONSOLE_START: u8 = 0x7E;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 16;

/// Maximum complete frame size (START + LENGTH + TYPE + MAX_PAYLOAD + CHECKSUM)
pub const MAX_FRAME_SIZE: usize = 1 + 1 + 1 + MAX_PAYLOAD_SIZE + 1;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// Frame is incomplete (need more bytes)
    Incomplete,
    /// Invalid frame structure or field value
    InvalidFrame,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A parsed or constructed console frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleFrame {
    /// Message type identifier
    pub msg_type: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl ConsoleFrame {
    /// Create a new frame with the given message type and payload
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { msg_type, payload })
    }

    /// Create a frame with no payload
    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    fn frame_checksum(length: u8, msg_type: u8, payload: &[u8]) -> u8 {
        length
            .wrapping_add(msg_type)
            .wrapping_add(checksum(payload))
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let payload_len = self.payload.len();
        let frame_len = 4 + payload_len;
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let length = payload_len as u8;
        buffer[0] = CONSOLE_START;
        buffer[1] = length;
        buffer[2] = self.msg_type;
        buffer[3..3 + payload_len].copy_from_slice(&self.payload);
        buffer[3 + payload_len] = Self::frame_checksum(length, self.msg_type, &self.payload);

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    WaitingForStart,
    WaitingForLength,
    WaitingForType { length: u8 },
    ReadingPayload { length: u8, msg_type: u8 },
    WaitingForChecksum { length: u8, msg_type: u8 },
}

/// Byte-at-a-time console frame parser
#[derive(Debug, Clone)]
pub struct ConsoleParser {
    state: ParseState,
    buffer: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for ConsoleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleParser {
    /// Create a new frame parser
    pub const fn new() -> Self {
        Self {
            state: ParseState::WaitingForStart,
            buffer: Vec::new(),
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForStart;
        self.buffer.clear();
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on parse error.
    /// The parser resynchronizes on the next START byte after an error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<ConsoleFrame>, FrameError> {
        match self.state {
            ParseState::WaitingForStart => {
                if byte == CONSOLE_START {
                    self.buffer.clear();
                    self.state = ParseState::WaitingForLength;
                }
                Ok(None)
            }
            ParseState::WaitingForLength => {
                if byte as usize > MAX_PAYLOAD_SIZE {
                    self.reset();
                    return Err(FrameError::PayloadTooLarge);
                }
                self.state = ParseState::WaitingForType { length: byte };
                Ok(None)
            }
            ParseState::WaitingForType { length } => {
                self.state = if length == 0 {
                    ParseState::WaitingForChecksum {
                        length,
                        msg_type: byte,
                    }
                } else {
                    ParseState::ReadingPayload {
                        length,
                        msg_type: byte,
                    }
                };
                Ok(None)
            }
            ParseState::ReadingPayload { length, msg_type } => {
                // Length was bounded by MAX_PAYLOAD_SIZE above
                let _ = self.buffer.push(byte);
                if self.buffer.len() == length as usize {
                    self.state = ParseState::WaitingForChecksum { length, msg_type };
                }
                Ok(None)
            }
            ParseState::WaitingForChecksum { length, msg_type } => {
                let expected = ConsoleFrame::frame_checksum(length, msg_type, &self.buffer);
                if byte != expected {
                    self.reset();
                    return Err(FrameError::InvalidChecksum);
                }

                let frame = ConsoleFrame {
                    msg_type,
                    payload: self.buffer.clone(),
                };
                self.reset();
                Ok(Some(frame))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<ConsoleFrame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_empty_payload() {
        let frame = ConsoleFrame::empty(0x01);
        let mut buffer = [0u8; 8];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 4);
        assert_eq!(&buffer[..4], &[CONSOLE_START, 0x00, 0x01, 0x01]);
    }

    #[test]
    fn test_encode_with_payload() {
        let frame = ConsoleFrame::new(0x02, &[0x00, 0x9C, 0xFF]).unwrap();
        let encoded = frame.encode_to_vec().unwrap();

        assert_eq!(encoded.len(), 7);
        assert_eq!(encoded[1], 3);
        assert_eq!(encoded[2], 0x02);
        // 3 + 2 + 0x00 + 0x9C + 0xFF = 0x1A2 -> 0xA2
        assert_eq!(encoded[6], 0xA2);
    }

    #[test]
    fn test_roundtrip_through_parser() {
        let original = ConsoleFrame::new(0x21, &[0x88, 0x13, 0x88, 0x13, 0x01]).unwrap();
        let encoded = original.encode_to_vec().unwrap();

        let mut parser = ConsoleParser::new();
        let parsed = parser.feed_bytes(&encoded).unwrap().unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parser_invalid_checksum() {
        let mut encoded = ConsoleFrame::empty(0x0C).encode_to_vec().unwrap();
        let last = encoded.len() - 1;
        encoded[last] ^= 0xFF;

        let mut parser = ConsoleParser::new();
        assert_eq!(parser.feed_bytes(&encoded), Err(FrameError::InvalidChecksum));
    }

    #[test]
    fn test_parser_rejects_oversized_length() {
        let mut parser = ConsoleParser::new();
        assert_eq!(parser.feed(CONSOLE_START), Ok(None));
        assert_eq!(parser.feed(MAX_PAYLOAD_SIZE as u8 + 1), Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_parser_resync_after_garbage() {
        let encoded = ConsoleFrame::empty(0x0D).encode_to_vec().unwrap();
        let mut data = Vec::<u8, 24>::new();
        data.extend_from_slice(&[0xAA, 0x06, 0x13]).unwrap();
        data.extend_from_slice(&encoded).unwrap();

        let mut parser = ConsoleParser::new();
        let parsed = parser.feed_bytes(&data).unwrap().unwrap();
        assert_eq!(parsed.msg_type, 0x0D);
    }

    #[test]
    fn test_payload_too_large() {
        let payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(ConsoleFrame::new(0x02, &payload), Err(FrameError::PayloadTooLarge));
    }
}
