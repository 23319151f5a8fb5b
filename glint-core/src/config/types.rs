//! Configuration type definitions
//!
//! These types represent the controller configuration. The firmware embeds
//! a `gimbal.toml`, which may be overridden by a copy stored in flash.

use glint_protocol::ShapeId;

use crate::geometry::Point;
use crate::playback::PlaybackConfig;
use crate::trajectory::Shape;

/// Gimbal link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// UART baud rate
    pub baudrate: u32,
    /// Play the ready pattern on the beeper at startup
    pub startup_beep: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baudrate: 115_200,
            startup_beep: true,
        }
    }
}

/// Parameters of the four built-in drawings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShapeSet {
    pub triangle: [Point; 3],
    pub rectangle_min: Point,
    pub rectangle_max: Point,
    pub circle_center: Point,
    pub circle_radius: f32,
    pub sine_amplitude: f32,
    pub sine_offset: f32,
    pub sine_wavelength: f32,
}

impl Default for ShapeSet {
    fn default() -> Self {
        Self {
            triangle: [
                Point::new(0.2, 0.2),
                Point::new(0.8, 0.2),
                Point::new(0.5, 0.8),
            ],
            rectangle_min: Point::new(0.2, 0.2),
            rectangle_max: Point::new(0.8, 0.8),
            circle_center: Point::new(0.5, 0.5),
            circle_radius: 0.4,
            sine_amplitude: 0.5,
            sine_offset: 0.5,
            sine_wavelength: 1.0,
        }
    }
}

impl ShapeSet {
    /// The configured shape for a console selector
    pub fn shape(&self, id: ShapeId) -> Shape {
        match id {
            ShapeId::Triangle => Shape::Triangle(self.triangle),
            ShapeId::Rectangle => Shape::Rectangle {
                min: self.rectangle_min,
                max: self.rectangle_max,
            },
            ShapeId::Circle => Shape::Circle {
                center: self.circle_center,
                radius: self.circle_radius,
            },
            ShapeId::Sine => Shape::Sine {
                amplitude: self.sine_amplitude,
                offset: self.sine_offset,
                wavelength: self.sine_wavelength,
            },
        }
    }
}

/// Complete controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlintConfig {
    pub link: LinkConfig,
    pub playback: PlaybackConfig,
    pub shapes: ShapeSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GlintConfig::default();
        assert_eq!(config.link.baudrate, 115_200);
        assert_eq!(config.playback.point_delay_ms, 40);
        assert!(config.playback.seed);
    }

    #[test]
    fn test_default_shape_counts() {
        let shapes = ShapeSet::default();
        assert_eq!(shapes.shape(ShapeId::Triangle).point_count(), 97);
        assert_eq!(shapes.shape(ShapeId::Rectangle).point_count(), 120);
        assert_eq!(shapes.shape(ShapeId::Circle).point_count(), 125);
        assert_eq!(shapes.shape(ShapeId::Sine).point_count(), 115);
    }
}
