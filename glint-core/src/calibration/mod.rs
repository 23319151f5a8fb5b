//! Four-point calibration
//!
//! The operator jogs the laser onto four reference positions on the
//! screen. The captured gimbal angles and four fixed source corners define
//! a planar homography from normalized screen space to angle space.

pub mod homography;
pub mod session;
pub mod store;

pub use homography::Homography;
pub use session::{CalibrationSession, CalibrationState, CaptureOutcome, Corner};
pub use store::{
    format_points, parse_points, restore_session, CalibrationText, CALIBRATION_TEXT_LEN,
};

use crate::geometry::Point;

/// Source corners in normalized screen space, in corner order
///
/// The 1.43 width matches the aspect of the projection surface the
/// reference points were laid out on.
pub const SOURCE_CORNERS: [Point; 4] = [
    Point::new(0.0, 0.0),
    Point::new(1.43, 0.0),
    Point::new(1.43, 1.0),
    Point::new(0.0, 1.0),
];

/// Destination (yaw, pitch) points used until the operator captures or
/// loads real ones
pub const DEFAULT_DESTINATIONS: [Point; 4] = [
    Point::new(4500.0, 4500.0),
    Point::new(5500.0, 4500.0),
    Point::new(5500.0, 5500.0),
    Point::new(4500.0, 5500.0),
];

/// Calibration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// No homography has been computed yet
    Uncalibrated,
    /// The point set is degenerate (collinear corners, point at infinity)
    Degenerate,
    /// `capture` was called without a corner armed
    NotCapturing,
    /// Persisted calibration text could not be parsed
    Malformed,
}
