//! Inter-task communication channels
//!
//! The gimbal task runs on core 1, everything else on core 0. All
//! primitives use `CriticalSectionRawMutex`, which is multicore-safe on the
//! RP2040.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use glint_core::state::SharedState;
use glint_core::Point;
use glint_protocol::{ConsoleCommand, ControllerReport};

/// Channel capacity for operator commands
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Channel capacity for reports back to the console
const REPORT_CHANNEL_SIZE: usize = 8;

/// Flags shared between the console and the gimbal owner (stop, beeper, mode)
pub static SHARED: SharedState = SharedState::new();

/// Operator commands for the gimbal task
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, ConsoleCommand, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Pong and status reports for the console
pub static REPORT_CHANNEL: Channel<CriticalSectionRawMutex, ControllerReport, REPORT_CHANNEL_SIZE> =
    Channel::new();

/// Latest angles after a command, as (yaw, pitch, laser)
pub static ANGLES: Signal<CriticalSectionRawMutex, (u16, u16, bool)> = Signal::new();

/// Destination points to persist (sent by the gimbal task)
pub static CALIBRATION_SAVE: Signal<CriticalSectionRawMutex, [Point; 4]> = Signal::new();
