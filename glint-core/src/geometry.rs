//! 2D points in normalized screen space and gimbal angle space

/// A point in either normalized screen coordinates or (yaw, pitch) angle space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        libm::hypotf(other.x - self.x, other.y - self.y)
    }

    /// Linear interpolation, `t = 0` is `self`, `t = 1` is `other`
    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Point::new(0.0, 1.0);
        let b = Point::new(1.0, 0.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 0.5), Point::new(0.5, 0.5));
    }
}
