//! Gimbal link over a blocking UART
//!
//! The link owns the transmit side of the serial port and the gimbal's
//! [`AngleState`]. Every `send` encodes one 10-byte frame from the current
//! angles, the laser flag and the shared beeper flag.
//!
//! # Usage
//!
//! ```ignore
//! let mut link = GimbalLink::new(uart_tx, &SHARED);
//! link.startup(&mut delay, true)?;
//! link.set(5200, 4800);
//! link.send()?;
//! let uart_tx = link.shutdown(&mut delay)?;
//! ```

use embedded_hal::delay::DelayNs;
use glint_core::angle::{AngleState, ANGLE_CENTER, DEFAULT_HISTORY, PITCH_REST};
use glint_core::calibration::{CalibrationSession, Corner};
use glint_core::state::SharedState;
use glint_core::traits::{AngleSource, GimbalDriver};
use glint_hal::UartTx;
use glint_protocol::messages::Axis;
use glint_protocol::GimbalFrame;

/// Spacing between frames in the startup and centering routines
pub const SEND_SPACING_MS: u32 = 150;

/// Frames sent by the startup routine
pub const STARTUP_SENDS: usize = 12;

/// Startup frame that carries the ready beep
pub const STARTUP_BEEP_AT: usize = 10;

/// Frames sent by the centering routine
pub const CENTER_REPEATS: usize = 5;

/// Gimbal link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// The UART rejected a write or flush
    Transport(E),
}

/// Gimbal driver over a transmit-only UART
pub struct GimbalLink<'a, T, const N: usize = DEFAULT_HISTORY> {
    tx: T,
    shared: &'a SharedState,
    angles: AngleState<N>,
    laser: bool,
}

impl<'a, T: UartTx, const N: usize> GimbalLink<'a, T, N> {
    /// Wrap a UART transmitter; centered, laser off, nothing sent yet
    pub fn new(tx: T, shared: &'a SharedState) -> Self {
        Self {
            tx,
            shared,
            angles: AngleState::new(),
            laser: false,
        }
    }

    /// Angle state including history
    pub fn angles(&self) -> &AngleState<N> {
        &self.angles
    }

    /// The frame the next `send` would transmit
    pub fn frame(&self) -> GimbalFrame {
        GimbalFrame::new(
            self.angles.yaw(),
            self.angles.pitch(),
            self.laser,
            self.shared.beeper(),
        )
    }

    fn send_spaced<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), LinkError<T::Error>> {
        self.send()?;
        delay.delay_ms(SEND_SPACING_MS);
        Ok(())
    }

    /// Ready pattern: a burst of centered frames with one short beep
    ///
    /// The gimbal board needs a few frames after power-up before it
    /// follows commands reliably.
    pub fn startup<D: DelayNs>(&mut self, delay: &mut D, beep: bool) -> Result<(), LinkError<T::Error>> {
        self.angles.set(ANGLE_CENTER as i32, ANGLE_CENTER as i32);
        for i in 0..STARTUP_SENDS {
            self.shared.set_beeper(beep && i == STARTUP_BEEP_AT);
            self.send_spaced(delay)?;
        }
        self.shared.set_beeper(false);
        Ok(())
    }

    /// Center both axes with the laser off
    ///
    /// Sends the center frame several times; the second to last carries a
    /// beep and the last always has both laser and beeper off.
    pub fn center<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), LinkError<T::Error>> {
        self.laser = false;
        self.angles.set(ANGLE_CENTER as i32, ANGLE_CENTER as i32);
        let result = (0..CENTER_REPEATS).try_for_each(|i| {
            self.shared.set_beeper(i == CENTER_REPEATS - 2);
            self.send_spaced(delay)
        });
        self.shared.set_beeper(false);
        result
    }

    /// Nudge one axis by a signed step and send
    pub fn jog(&mut self, axis: Axis, delta: i32) -> Result<(), LinkError<T::Error>> {
        let (yaw, pitch) = (self.angles.yaw() as i32, self.angles.pitch() as i32);
        match axis {
            Axis::Yaw => self.angles.set(yaw + delta, pitch),
            Axis::Pitch => self.angles.set(yaw, pitch + delta),
        }
        self.send()
    }

    /// Point the laser at a stored calibration destination
    pub fn go_to_corner(
        &mut self,
        calibration: &CalibrationSession,
        corner: Corner,
    ) -> Result<(), LinkError<T::Error>> {
        let target = calibration.destination(corner);
        self.laser = true;
        self.angles
            .set(libm::roundf(target.x) as i32, libm::roundf(target.y) as i32);
        self.send()
    }

    /// Park at the mechanical rest position and release the UART
    pub fn shutdown<D: DelayNs>(mut self, delay: &mut D) -> Result<T, LinkError<T::Error>> {
        self.laser = false;
        self.shared.set_beeper(false);
        self.angles.set(ANGLE_CENTER as i32, PITCH_REST as i32);
        self.send()?;
        self.tx.flush().map_err(LinkError::Transport)?;
        delay.delay_ms(SEND_SPACING_MS);
        Ok(self.tx)
    }
}

impl<T: UartTx, const N: usize> AngleSource for GimbalLink<'_, T, N> {
    fn yaw(&self) -> u16 {
        self.angles.yaw()
    }

    fn pitch(&self) -> u16 {
        self.angles.pitch()
    }
}

impl<T: UartTx, const N: usize> GimbalDriver for GimbalLink<'_, T, N> {
    type Error = LinkError<T::Error>;

    fn set(&mut self, yaw: i32, pitch: i32) {
        self.angles.set(yaw, pitch);
    }

    // Commit only once the whole frame is out
    fn send(&mut self) -> Result<(), Self::Error> {
        let bytes = self.frame().encode();
        self.tx
            .write_blocking(&bytes)
            .map_err(LinkError::Transport)?;
        self.angles.commit();
        Ok(())
    }

    fn set_laser(&mut self, on: bool) {
        self.laser = on;
    }

    fn laser(&self) -> bool {
        self.laser
    }

    fn set_beeper(&mut self, on: bool) {
        self.shared.set_beeper(on);
    }

    fn pending_delta(&self) -> (i32, i32) {
        self.angles.pending_delta()
    }
}
