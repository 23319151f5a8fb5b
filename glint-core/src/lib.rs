//! Board-agnostic core logic for the Glint laser gimbal controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Angle state with clamping and history
//! - Shared flags between the input side and the gimbal owner
//! - Gimbal driver traits
//! - Four-point calibration and the screen-to-angle homography
//! - Trajectory generation (shapes and line scripts)
//! - Playback pacing
//! - Configuration types and the TOML subset parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod angle;
pub mod calibration;
pub mod config;
pub mod geometry;
pub mod playback;
pub mod state;
pub mod traits;
pub mod trajectory;

pub use geometry::Point;
