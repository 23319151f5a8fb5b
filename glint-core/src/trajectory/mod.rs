//! Trajectory generation
//!
//! Shapes and scripts both produce points in normalized screen space;
//! mapping to gimbal angles happens during playback.

pub mod allocation;
pub mod script;
pub mod shapes;

pub use allocation::{allocate, point_count, POINTS_PER_UNIT};
pub use script::{move_delay_us, parse_line, Script, ScriptLineError, ScriptStep};
pub use shapes::{sine_arc_length, Shape, ShapePoints};

/// Shape parameter errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrajectoryError {
    /// Non-finite coordinate, or a radius or wavelength that is not positive
    InvalidDimension,
}

/// Script line errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScriptError {
    /// First token is not a known directive
    UnknownDirective,
    /// A move has fewer than two coordinates
    MissingCoordinate,
    /// A coordinate is not a finite number
    InvalidNumber,
}
