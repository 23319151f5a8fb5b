//! Calibration capture state machine
//!
//! ```text
//!          begin(corner)            capture() [corners 1-3, or 4 with gaps]
//!   Idle ───────────────► Capturing ─────────────────────────────────► Idle
//!     ▲                       │
//!     │ begin(corner)         │ capture() [corner 4, all corners set]
//!     │                       ▼
//!     └──────────────────── Ready
//! ```
//!
//! The homography is recomputed only when the fourth corner is captured
//! with every corner set at least once, or when a full point set is
//! loaded. Until then the previous mapping (or the zero matrix) stays in
//! effect.

use super::{CalibrationError, Homography, DEFAULT_DESTINATIONS, SOURCE_CORNERS};
use crate::geometry::Point;
use crate::traits::AngleSource;

/// One of the four calibration reference corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Corner {
    First,
    Second,
    Third,
    Fourth,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::First, Corner::Second, Corner::Third, Corner::Fourth];

    /// Slot index, 0-3
    pub const fn index(self) -> usize {
        match self {
            Corner::First => 0,
            Corner::Second => 1,
            Corner::Third => 2,
            Corner::Fourth => 3,
        }
    }

    /// Operator-facing number, 1-4
    pub const fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Corner::First),
            2 => Some(Corner::Second),
            3 => Some(Corner::Third),
            4 => Some(Corner::Fourth),
            _ => None,
        }
    }
}

/// Capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationState {
    #[default]
    Idle,
    /// Waiting for the operator to capture this corner
    Capturing(Corner),
    /// All corners captured and the homography solved
    Ready,
}

/// Result of a successful capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureOutcome {
    /// The corner was recorded; more corners are needed
    Stored(Corner),
    /// The homography was recomputed
    Calibrated,
}

/// Four-point calibration session
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    state: CalibrationState,
    destinations: [Point; 4],
    /// Bit `i` set once corner `i` has been captured or loaded
    set_mask: u8,
    homography: Homography,
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self::new()
    }
}

const ALL_SET: u8 = 0b1111;

impl CalibrationSession {
    /// Default destinations, nothing captured, not calibrated
    pub const fn new() -> Self {
        Self::with_destinations(DEFAULT_DESTINATIONS)
    }

    /// Preset destinations without solving
    ///
    /// The slots only seed `go_to_corner` targets. The session stays
    /// uncalibrated until a full capture or a successful [`Self::load`].
    pub const fn with_destinations(destinations: [Point; 4]) -> Self {
        Self {
            state: CalibrationState::Idle,
            destinations,
            set_mask: 0,
            homography: Homography::ZERO,
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Arm capture for a corner
    pub fn begin(&mut self, corner: Corner) {
        self.state = CalibrationState::Capturing(corner);
    }

    /// Record the source's current angles into the armed corner
    pub fn capture<S: AngleSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<CaptureOutcome, CalibrationError> {
        let corner = match self.state {
            CalibrationState::Capturing(corner) => corner,
            _ => return Err(CalibrationError::NotCapturing),
        };

        self.destinations[corner.index()] = Point::new(source.yaw() as f32, source.pitch() as f32);
        self.set_mask |= 1 << corner.index();
        self.state = CalibrationState::Idle;

        if corner != Corner::Fourth || self.set_mask != ALL_SET {
            return Ok(CaptureOutcome::Stored(corner));
        }

        self.homography = Homography::from_correspondences(&SOURCE_CORNERS, &self.destinations)?;
        self.state = CalibrationState::Ready;
        Ok(CaptureOutcome::Calibrated)
    }

    /// Replace all four destinations and recompute the homography
    ///
    /// On a degenerate point set the destinations are still taken but the
    /// previous mapping stays in effect.
    pub fn load(&mut self, destinations: [Point; 4]) -> Result<(), CalibrationError> {
        self.destinations = destinations;
        self.set_mask = ALL_SET;
        self.homography = Homography::from_correspondences(&SOURCE_CORNERS, &self.destinations)?;
        self.state = CalibrationState::Ready;
        Ok(())
    }

    /// Current destination points, in corner order
    pub fn destinations(&self) -> &[Point; 4] {
        &self.destinations
    }

    pub fn destination(&self, corner: Corner) -> Point {
        self.destinations[corner.index()]
    }

    pub fn homography(&self) -> &Homography {
        &self.homography
    }

    /// True once a usable homography exists
    pub fn is_calibrated(&self) -> bool {
        !self.homography.is_zero()
    }

    /// Map a normalized screen point to (yaw, pitch)
    pub fn transform(&self, p: Point) -> Result<Point, CalibrationError> {
        self.homography.apply(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAngles(u16, u16);

    impl AngleSource for FixedAngles {
        fn yaw(&self) -> u16 {
            self.0
        }
        fn pitch(&self) -> u16 {
            self.1
        }
    }

    fn capture_all(session: &mut CalibrationSession, points: [(u16, u16); 4]) -> CaptureOutcome {
        let mut outcome = CaptureOutcome::Stored(Corner::First);
        for (corner, (yaw, pitch)) in Corner::ALL.into_iter().zip(points) {
            session.begin(corner);
            outcome = session.capture(&FixedAngles(yaw, pitch)).unwrap();
        }
        outcome
    }

    #[test]
    fn test_transform_before_calibration() {
        let session = CalibrationSession::new();
        assert!(!session.is_calibrated());
        assert_eq!(
            session.transform(Point::new(0.5, 0.5)),
            Err(CalibrationError::Uncalibrated)
        );
    }

    #[test]
    fn test_preset_destinations_stay_uncalibrated() {
        let preset = [
            Point::new(4000.0, 4000.0),
            Point::new(6000.0, 4000.0),
            Point::new(6000.0, 6000.0),
            Point::new(4000.0, 6000.0),
        ];
        let session = CalibrationSession::with_destinations(preset);
        assert_eq!(session.destinations(), &preset);
        assert_eq!(session.destination(Corner::Third), Point::new(6000.0, 6000.0));
        assert_eq!(session.state(), CalibrationState::Idle);
        assert!(session.homography().is_zero());
        assert!(!session.is_calibrated());
        assert_eq!(
            session.transform(Point::new(0.5, 0.5)),
            Err(CalibrationError::Uncalibrated)
        );
    }

    #[test]
    fn test_preset_destinations_need_every_corner() {
        // Preset slots do not count as captured
        let mut session = CalibrationSession::with_destinations(DEFAULT_DESTINATIONS);
        session.begin(Corner::Fourth);
        assert_eq!(
            session.capture(&FixedAngles(4500, 5500)),
            Ok(CaptureOutcome::Stored(Corner::Fourth))
        );
        assert!(!session.is_calibrated());
    }

    #[test]
    fn test_capture_without_begin() {
        let mut session = CalibrationSession::new();
        assert_eq!(
            session.capture(&FixedAngles(5000, 5000)),
            Err(CalibrationError::NotCapturing)
        );
    }

    #[test]
    fn test_corners_one_to_three_return_to_idle() {
        let mut session = CalibrationSession::new();
        session.begin(Corner::Second);
        assert_eq!(session.state(), CalibrationState::Capturing(Corner::Second));
        assert_eq!(
            session.capture(&FixedAngles(6000, 4000)),
            Ok(CaptureOutcome::Stored(Corner::Second))
        );
        assert_eq!(session.state(), CalibrationState::Idle);
        assert_eq!(session.destination(Corner::Second), Point::new(6000.0, 4000.0));
        assert!(!session.is_calibrated());
    }

    #[test]
    fn test_fourth_corner_with_gaps_does_not_solve() {
        let mut session = CalibrationSession::new();
        session.begin(Corner::Fourth);
        assert_eq!(
            session.capture(&FixedAngles(4000, 6000)),
            Ok(CaptureOutcome::Stored(Corner::Fourth))
        );
        assert!(!session.is_calibrated());
    }

    #[test]
    fn test_full_capture_calibrates() {
        let mut session = CalibrationSession::new();
        let outcome = capture_all(
            &mut session,
            [(4000, 4000), (6000, 4000), (6000, 6000), (4000, 6000)],
        );
        assert_eq!(outcome, CaptureOutcome::Calibrated);
        assert_eq!(session.state(), CalibrationState::Ready);

        for (src, corner) in SOURCE_CORNERS.iter().zip(Corner::ALL) {
            let mapped = session.transform(*src).unwrap();
            let want = session.destination(corner);
            assert!((mapped.x - want.x).abs() < 0.01);
            assert!((mapped.y - want.y).abs() < 0.01);
        }
    }

    #[test]
    fn test_degenerate_capture_keeps_previous_mapping() {
        let mut session = CalibrationSession::new();
        session.load(DEFAULT_DESTINATIONS).unwrap();
        let before = *session.homography();

        // Every corner on the same spot
        session.begin(Corner::First);
        session.capture(&FixedAngles(5000, 5000)).unwrap();
        session.begin(Corner::Second);
        session.capture(&FixedAngles(5000, 5000)).unwrap();
        session.begin(Corner::Third);
        session.capture(&FixedAngles(5000, 5000)).unwrap();
        session.begin(Corner::Fourth);
        assert_eq!(
            session.capture(&FixedAngles(5000, 5000)),
            Err(CalibrationError::Degenerate)
        );
        assert_eq!(*session.homography(), before);
        assert!(session.is_calibrated());
    }

    #[test]
    fn test_load_recomputes() {
        let mut session = CalibrationSession::new();
        session.load(DEFAULT_DESTINATIONS).unwrap();
        assert_eq!(session.state(), CalibrationState::Ready);
        let center = session.transform(Point::new(0.715, 0.5)).unwrap();
        assert!((center.x - 5000.0).abs() < 0.01);
        assert!((center.y - 5000.0).abs() < 0.01);
    }

    #[test]
    fn test_corner_numbers() {
        for corner in Corner::ALL {
            assert_eq!(Corner::from_number(corner.number()), Some(corner));
        }
        assert_eq!(Corner::from_number(0), None);
        assert_eq!(Corner::from_number(5), None);
    }
}
