//! Trajectory playback
//!
//! Maps normalized points through the calibration and streams them to the
//! gimbal one frame at a time with fixed pacing. Sends and delays block;
//! the engine is meant to run on the gimbal owner's own executor or core.
//!
//! Cancellation is cooperative: the stop flag in [`SharedState`] is polled
//! before each point, so the point in flight always finishes its settling
//! delay.

use embedded_hal::delay::DelayNs;

use crate::calibration::{CalibrationError, CalibrationSession};
use crate::geometry::Point;
use crate::state::SharedState;
use crate::traits::GimbalDriver;
use crate::trajectory::{move_delay_us, Script, ScriptLineError, ScriptStep, TrajectoryError};

/// Playback pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackConfig {
    /// Delay after each point
    pub point_delay_ms: u32,
    /// Run the seed sequence before the first point
    pub seed: bool,
    /// Beeper cue length during the seed sequence
    pub seed_beep_ms: u32,
    /// Settling time after the seed move, before the laser comes on
    pub seed_settle_ms: u32,
    /// Settling time after the last point, before the laser goes off
    pub finish_settle_ms: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            point_delay_ms: 40,
            seed: true,
            seed_beep_ms: 100,
            seed_settle_ms: 1000,
            finish_settle_ms: 50,
        }
    }
}

/// How a playback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackOutcome {
    /// Every point was sent
    Completed { points: usize },
    /// The stop flag was raised; `points` were sent before stopping
    Cancelled { points: usize },
}

/// Playback failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackError<E> {
    /// The gimbal link failed to send a frame
    Link(E),
    /// No calibration, or a point mapped to infinity
    Calibration(CalibrationError),
    /// Invalid shape parameters
    Trajectory(TrajectoryError),
}

impl<E> From<CalibrationError> for PlaybackError<E> {
    fn from(e: CalibrationError) -> Self {
        PlaybackError::Calibration(e)
    }
}

impl<E> From<TrajectoryError> for PlaybackError<E> {
    fn from(e: TrajectoryError) -> Self {
        PlaybackError::Trajectory(e)
    }
}

/// Angle-space point to integer angles
///
/// Rounds to the nearest unit; out-of-range and NaN values are left for
/// the driver's clamp.
fn to_angles(p: Point) -> (i32, i32) {
    (libm::roundf(p.x) as i32, libm::roundf(p.y) as i32)
}

/// Drives a gimbal through point sequences
pub struct PlaybackEngine<'a, G, D> {
    gimbal: &'a mut G,
    delay: &'a mut D,
    shared: &'a SharedState,
    config: PlaybackConfig,
}

impl<'a, G, D> PlaybackEngine<'a, G, D>
where
    G: GimbalDriver,
    D: DelayNs,
{
    pub fn new(
        gimbal: &'a mut G,
        delay: &'a mut D,
        shared: &'a SharedState,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            gimbal,
            delay,
            shared,
            config,
        }
    }

    /// Play a sequence of normalized points
    ///
    /// Fails with `Uncalibrated` before any motion if no homography
    /// exists. Points are mapped lazily, one at a time. The laser is
    /// switched off at the end whether the run completed, was cancelled,
    /// or hit a mapping error.
    pub fn play<I>(
        &mut self,
        calibration: &CalibrationSession,
        points: I,
    ) -> Result<PlaybackOutcome, PlaybackError<G::Error>>
    where
        I: IntoIterator<Item = Point>,
    {
        if !calibration.is_calibrated() {
            return Err(CalibrationError::Uncalibrated.into());
        }

        self.shared.clear_stop();
        self.shared.set_running(true);
        let result = self.play_points(calibration, points.into_iter());
        self.shared.set_running(false);

        let finish = self.finish();
        let outcome = result?;
        finish.map_err(PlaybackError::Link)?;
        Ok(outcome)
    }

    fn play_points(
        &mut self,
        calibration: &CalibrationSession,
        points: impl Iterator<Item = Point>,
    ) -> Result<PlaybackOutcome, PlaybackError<G::Error>> {
        let mut sent = 0usize;
        for point in points {
            if self.shared.stop_requested() {
                return Ok(PlaybackOutcome::Cancelled { points: sent });
            }

            let (yaw, pitch) = to_angles(calibration.transform(point)?);
            if sent == 0 && self.config.seed {
                self.seed(yaw, pitch)?;
            }

            self.gimbal.set(yaw, pitch);
            self.gimbal.send().map_err(PlaybackError::Link)?;
            self.delay.delay_ms(self.config.point_delay_ms);
            sent += 1;
        }
        Ok(PlaybackOutcome::Completed { points: sent })
    }

    /// Move to the first target dark, beep, settle, then light the laser
    fn seed(&mut self, yaw: i32, pitch: i32) -> Result<(), PlaybackError<G::Error>> {
        self.gimbal.set_laser(false);
        self.gimbal.set(yaw, pitch);
        self.gimbal.send().map_err(PlaybackError::Link)?;

        self.gimbal.set_beeper(true);
        self.gimbal.send().map_err(PlaybackError::Link)?;
        self.delay.delay_ms(self.config.seed_beep_ms);
        self.gimbal.set_beeper(false);
        self.gimbal.send().map_err(PlaybackError::Link)?;

        self.delay.delay_ms(self.config.seed_settle_ms);
        self.gimbal.set_laser(true);
        Ok(())
    }

    /// Settle, then switch the laser off
    fn finish(&mut self) -> Result<(), G::Error> {
        self.delay.delay_ms(self.config.finish_settle_ms);
        self.gimbal.set_laser(false);
        self.gimbal.send()
    }

    /// Play a drawing script
    ///
    /// Each move is mapped through the calibration, sent, and followed by
    /// a delay proportional to the larger axis movement. Malformed lines
    /// are handed to `on_error` and skipped.
    pub fn run_script<F>(
        &mut self,
        calibration: &CalibrationSession,
        script: &str,
        mut on_error: F,
    ) -> Result<PlaybackOutcome, PlaybackError<G::Error>>
    where
        F: FnMut(ScriptLineError),
    {
        if !calibration.is_calibrated() {
            return Err(CalibrationError::Uncalibrated.into());
        }

        self.shared.clear_stop();
        self.shared.set_running(true);
        let result = self.run_steps(calibration, Script::new(script), &mut on_error);
        self.shared.set_running(false);

        let finish = self.finish();
        let outcome = result?;
        finish.map_err(PlaybackError::Link)?;
        Ok(outcome)
    }

    fn run_steps<F>(
        &mut self,
        calibration: &CalibrationSession,
        script: Script<'_>,
        on_error: &mut F,
    ) -> Result<PlaybackOutcome, PlaybackError<G::Error>>
    where
        F: FnMut(ScriptLineError),
    {
        let mut moves = 0usize;
        for step in script {
            if self.shared.stop_requested() {
                return Ok(PlaybackOutcome::Cancelled { points: moves });
            }

            match step {
                Ok(ScriptStep::Laser(on)) => {
                    self.gimbal.set_laser(on);
                    self.gimbal.send().map_err(PlaybackError::Link)?;
                }
                Ok(ScriptStep::MoveTo(point)) => {
                    let (yaw, pitch) = to_angles(calibration.transform(point)?);
                    self.gimbal.set(yaw, pitch);
                    let settle_us = move_delay_us(self.gimbal.pending_max_delta());
                    self.gimbal.send().map_err(PlaybackError::Link)?;
                    self.delay.delay_us(settle_us);
                    moves += 1;
                }
                Err(e) => on_error(e),
            }
        }
        Ok(PlaybackOutcome::Completed { points: moves })
    }
}
