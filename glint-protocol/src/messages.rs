//! Message types for the operator console protocol
//!
//! Message types are divided into two categories:
//! - Console → Controller: motion, calibration and drawing commands
//! - Controller → Console: heartbeat responses, angle and status reports

use crate::frame::{ConsoleFrame, FrameError};

// Message type IDs: Console → Controller
pub const MSG_PING: u8 = 0x01;
pub const MSG_JOG: u8 = 0x02;
pub const MSG_GOTO: u8 = 0x03;
pub const MSG_GOTO_CORNER: u8 = 0x04;
pub const MSG_BEGIN_CALIBRATION: u8 = 0x05;
pub const MSG_CAPTURE: u8 = 0x06;
pub const MSG_SAVE_CALIBRATION: u8 = 0x07;
pub const MSG_DRAW: u8 = 0x08;
pub const MSG_RUN_SCRIPT: u8 = 0x09;
pub const MSG_SET_LASER: u8 = 0x0A;
pub const MSG_BEEP: u8 = 0x0B;
pub const MSG_CENTER: u8 = 0x0C;
pub const MSG_STOP: u8 = 0x0D;
pub const MSG_SHUTDOWN: u8 = 0x0E;

// Message type IDs: Controller → Console
pub const MSG_PONG: u8 = 0x20;
pub const MSG_ANGLES: u8 = 0x21;
pub const MSG_STATUS: u8 = 0x22;

/// Gimbal axis selector for jog commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    Yaw,
    Pitch,
}

impl Axis {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Axis::Yaw),
            1 => Some(Axis::Pitch),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Axis::Yaw => 0,
            Axis::Pitch => 1,
        }
    }
}

/// Built-in drawing selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShapeId {
    Triangle,
    Rectangle,
    Circle,
    Sine,
}

impl ShapeId {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ShapeId::Triangle),
            1 => Some(ShapeId::Rectangle),
            2 => Some(ShapeId::Circle),
            3 => Some(ShapeId::Sine),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            ShapeId::Triangle => 0,
            ShapeId::Rectangle => 1,
            ShapeId::Circle => 2,
            ShapeId::Sine => 3,
        }
    }
}

/// Outcome code carried by a status report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StatusCode {
    /// Command completed
    Ok = 0,
    /// Drawing refused, no calibration loaded
    Uncalibrated = 1,
    /// Fourth corner captured and the mapping was recomputed
    Calibrated = 2,
    /// A corner was captured, calibration not yet complete
    CornerStored = 3,
    /// Drawing stopped before the last point
    Cancelled = 4,
    /// Gimbal link write failed
    TransportError = 5,
    /// Calibration could not be written to flash
    SaveFailed = 6,
    /// Command not valid in the current state
    Invalid = 7,
}

impl StatusCode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(StatusCode::Ok),
            1 => Some(StatusCode::Uncalibrated),
            2 => Some(StatusCode::Calibrated),
            3 => Some(StatusCode::CornerStored),
            4 => Some(StatusCode::Cancelled),
            5 => Some(StatusCode::TransportError),
            6 => Some(StatusCode::SaveFailed),
            7 => Some(StatusCode::Invalid),
            _ => None,
        }
    }
}

/// Commands parsed from console-originated frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleCommand {
    /// Heartbeat request
    Ping,
    /// Nudge one axis by a signed step
    Jog { axis: Axis, delta: i16 },
    /// Move to absolute angles
    Goto { yaw: u16, pitch: u16 },
    /// Move to the stored destination of a calibration corner (1-4)
    GotoCorner { corner: u8 },
    /// Arm calibration capture for a corner (1-4)
    BeginCalibration { corner: u8 },
    /// Record the current angles into the armed corner
    Capture,
    /// Persist the current calibration points
    SaveCalibration,
    /// Draw a built-in shape
    Draw(ShapeId),
    /// Run an embedded drawing script by index
    RunScript { index: u8 },
    /// Switch the laser on or off
    SetLaser(bool),
    /// Short beep
    Beep,
    /// Run the centering routine
    Center,
    /// Cancel the drawing in progress
    Stop,
    /// Park the gimbal and release the link
    Shutdown,
}

fn corner_byte(frame: &ConsoleFrame) -> Result<u8, FrameError> {
    match frame.payload.first() {
        Some(&c @ 1..=4) => Ok(c),
        _ => Err(FrameError::InvalidFrame),
    }
}

impl ConsoleCommand {
    /// Parse a command from a frame
    pub fn from_frame(frame: &ConsoleFrame) -> Result<Self, FrameError> {
        let p = &frame.payload;
        match frame.msg_type {
            MSG_PING => Ok(ConsoleCommand::Ping),
            MSG_JOG => {
                if p.len() < 3 {
                    return Err(FrameError::InvalidFrame);
                }
                let axis = Axis::from_byte(p[0]).ok_or(FrameError::InvalidFrame)?;
                let delta = i16::from_le_bytes([p[1], p[2]]);
                Ok(ConsoleCommand::Jog { axis, delta })
            }
            MSG_GOTO => {
                if p.len() < 4 {
                    return Err(FrameError::InvalidFrame);
                }
                Ok(ConsoleCommand::Goto {
                    yaw: u16::from_le_bytes([p[0], p[1]]),
                    pitch: u16::from_le_bytes([p[2], p[3]]),
                })
            }
            MSG_GOTO_CORNER => Ok(ConsoleCommand::GotoCorner {
                corner: corner_byte(frame)?,
            }),
            MSG_BEGIN_CALIBRATION => Ok(ConsoleCommand::BeginCalibration {
                corner: corner_byte(frame)?,
            }),
            MSG_CAPTURE => Ok(ConsoleCommand::Capture),
            MSG_SAVE_CALIBRATION => Ok(ConsoleCommand::SaveCalibration),
            MSG_DRAW => {
                let shape = p
                    .first()
                    .and_then(|&b| ShapeId::from_byte(b))
                    .ok_or(FrameError::InvalidFrame)?;
                Ok(ConsoleCommand::Draw(shape))
            }
            MSG_RUN_SCRIPT => {
                let index = *p.first().ok_or(FrameError::InvalidFrame)?;
                Ok(ConsoleCommand::RunScript { index })
            }
            MSG_SET_LASER => match p.first() {
                Some(0) => Ok(ConsoleCommand::SetLaser(false)),
                Some(1) => Ok(ConsoleCommand::SetLaser(true)),
                _ => Err(FrameError::InvalidFrame),
            },
            MSG_BEEP => Ok(ConsoleCommand::Beep),
            MSG_CENTER => Ok(ConsoleCommand::Center),
            MSG_STOP => Ok(ConsoleCommand::Stop),
            MSG_SHUTDOWN => Ok(ConsoleCommand::Shutdown),
            _ => Err(FrameError::InvalidFrame),
        }
    }

    /// Encode this command into a frame (for testing or host tools)
    pub fn to_frame(&self) -> Result<ConsoleFrame, FrameError> {
        match *self {
            ConsoleCommand::Ping => Ok(ConsoleFrame::empty(MSG_PING)),
            ConsoleCommand::Jog { axis, delta } => {
                let d = delta.to_le_bytes();
                ConsoleFrame::new(MSG_JOG, &[axis.to_byte(), d[0], d[1]])
            }
            ConsoleCommand::Goto { yaw, pitch } => {
                let y = yaw.to_le_bytes();
                let p = pitch.to_le_bytes();
                ConsoleFrame::new(MSG_GOTO, &[y[0], y[1], p[0], p[1]])
            }
            ConsoleCommand::GotoCorner { corner } => ConsoleFrame::new(MSG_GOTO_CORNER, &[corner]),
            ConsoleCommand::BeginCalibration { corner } => {
                ConsoleFrame::new(MSG_BEGIN_CALIBRATION, &[corner])
            }
            ConsoleCommand::Capture => Ok(ConsoleFrame::empty(MSG_CAPTURE)),
            ConsoleCommand::SaveCalibration => Ok(ConsoleFrame::empty(MSG_SAVE_CALIBRATION)),
            ConsoleCommand::Draw(shape) => ConsoleFrame::new(MSG_DRAW, &[shape.to_byte()]),
            ConsoleCommand::RunScript { index } => ConsoleFrame::new(MSG_RUN_SCRIPT, &[index]),
            ConsoleCommand::SetLaser(on) => ConsoleFrame::new(MSG_SET_LASER, &[on as u8]),
            ConsoleCommand::Beep => Ok(ConsoleFrame::empty(MSG_BEEP)),
            ConsoleCommand::Center => Ok(ConsoleFrame::empty(MSG_CENTER)),
            ConsoleCommand::Stop => Ok(ConsoleFrame::empty(MSG_STOP)),
            ConsoleCommand::Shutdown => Ok(ConsoleFrame::empty(MSG_SHUTDOWN)),
        }
    }
}

/// Reports sent from the controller to the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerReport {
    /// Heartbeat response
    Pong,
    /// Last angles sent to the gimbal
    Angles { yaw: u16, pitch: u16, laser: bool },
    /// Outcome of the last command
    Status(StatusCode),
}

impl ControllerReport {
    /// Encode this report into a frame
    pub fn to_frame(&self) -> Result<ConsoleFrame, FrameError> {
        match *self {
            ControllerReport::Pong => Ok(ConsoleFrame::empty(MSG_PONG)),
            ControllerReport::Angles { yaw, pitch, laser } => {
                let y = yaw.to_le_bytes();
                let p = pitch.to_le_bytes();
                ConsoleFrame::new(MSG_ANGLES, &[y[0], y[1], p[0], p[1], laser as u8])
            }
            ControllerReport::Status(code) => ConsoleFrame::new(MSG_STATUS, &[code as u8]),
        }
    }

    /// Parse a report from a frame (for host tools and tests)
    pub fn from_frame(frame: &ConsoleFrame) -> Result<Self, FrameError> {
        let p = &frame.payload;
        match frame.msg_type {
            MSG_PONG => Ok(ControllerReport::Pong),
            MSG_ANGLES => {
                if p.len() < 5 {
                    return Err(FrameError::InvalidFrame);
                }
                Ok(ControllerReport::Angles {
                    yaw: u16::from_le_bytes([p[0], p[1]]),
                    pitch: u16::from_le_bytes([p[2], p[3]]),
                    laser: p[4] != 0,
                })
            }
            MSG_STATUS => {
                let code = p
                    .first()
                    .and_then(|&b| StatusCode::from_byte(b))
                    .ok_or(FrameError::InvalidFrame)?;
                Ok(ControllerReport::Status(code))
            }
            _ => Err(FrameError::InvalidFrame),
        }
    }
}
