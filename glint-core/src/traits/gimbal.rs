//! Gimbal driver traits

/// Read-only view of the gimbal's current angles
///
/// Calibration capture and display code only need this much.
pub trait AngleSource {
    /// Current (clamped) yaw
    fn yaw(&self) -> u16;

    /// Current (clamped) pitch
    fn pitch(&self) -> u16;
}

/// A two-axis gimbal with a laser and a beeper, driven open-loop
///
/// Exactly one owner holds the driver. `set` and the flag setters only
/// change local state; nothing reaches the hardware until `send`.
pub trait GimbalDriver: AngleSource {
    /// Transport error reported by `send`
    type Error;

    /// Set the target angles, clamping each into the mechanical range
    fn set(&mut self, yaw: i32, pitch: i32);

    /// Transmit exactly one command frame for the current state
    ///
    /// Failures are returned to the caller and never retried. The previous
    /// angles and the history advance only after the frame is fully
    /// written, so a failed send leaves them and `pending_delta` unchanged.
    fn send(&mut self) -> Result<(), Self::Error>;

    /// Switch the laser for subsequent frames
    fn set_laser(&mut self, on: bool);

    /// Laser state carried by the next frame
    fn laser(&self) -> bool;

    /// Switch the beeper for subsequent frames
    fn set_beeper(&mut self, on: bool);

    /// Movement the next send will command, as (yaw, pitch)
    fn pending_delta(&self) -> (i32, i32);

    /// Largest absolute per-axis movement the next send will command
    fn pending_max_delta(&self) -> u32 {
        let (dy, dp) = self.pending_delta();
        dy.unsigned_abs().max(dp.unsigned_abs())
    }
}
