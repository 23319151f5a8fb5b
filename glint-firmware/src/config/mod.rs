//! Configuration and calibration persistence
//!
//! Loads configuration from flash or embedded defaults, and the
//! calibration destination points from flash.

pub mod calibration;
pub mod loader;

pub use calibration::{load_calibration, save_calibration};
pub use loader::load_config;
