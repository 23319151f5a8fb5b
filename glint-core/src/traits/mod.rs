//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and the gimbal link implementation.

pub mod gimbal;

pub use gimbal::{AngleSource, GimbalDriver};
