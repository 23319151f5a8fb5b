//! Parametric shapes sampled into point sequences
//!
//! All shapes live in normalized screen space. Point counts follow the
//! perimeter (see [`point_count`]); polygons split that budget across
//! edges with [`allocate`]. Sampling is lazy: a shape yields an iterator
//! and nothing is buffered.

use core::f32::consts::PI;

use super::allocation::{allocate, point_count};
use super::TrajectoryError;
use crate::geometry::Point;

/// Slices used to integrate the sine arc length
const SINE_ARC_SLICES: usize = 1000;

/// A drawable shape
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shape {
    /// Closed triangle through three vertices
    Triangle([Point; 3]),
    /// Axis-aligned rectangle between two opposite corners
    Rectangle { min: Point, max: Point },
    /// Full circle
    Circle { center: Point, radius: f32 },
    /// One period of `y = offset + amplitude · sin(2πx / wavelength)`, x from 0
    Sine {
        amplitude: f32,
        offset: f32,
        wavelength: f32,
    },
}

impl Shape {
    fn rectangle_vertices(min: Point, max: Point) -> [Point; 4] {
        [
            Point::new(min.x, min.y),
            Point::new(max.x, min.y),
            Point::new(max.x, max.y),
            Point::new(min.x, max.y),
        ]
    }

    /// Check the shape's dimensions
    pub fn validate(&self) -> Result<(), TrajectoryError> {
        let finite = |p: &Point| p.x.is_finite() && p.y.is_finite();
        match self {
            Shape::Triangle(vertices) => {
                if !vertices.iter().all(finite) {
                    return Err(TrajectoryError::InvalidDimension);
                }
            }
            Shape::Rectangle { min, max } => {
                if !finite(min) || !finite(max) {
                    return Err(TrajectoryError::InvalidDimension);
                }
            }
            Shape::Circle { center, radius } => {
                if !finite(center) || !(*radius > 0.0 && radius.is_finite()) {
                    return Err(TrajectoryError::InvalidDimension);
                }
            }
            Shape::Sine {
                amplitude,
                offset,
                wavelength,
            } => {
                if !amplitude.is_finite()
                    || !offset.is_finite()
                    || !(*wavelength > 0.0 && wavelength.is_finite())
                {
                    return Err(TrajectoryError::InvalidDimension);
                }
            }
        }
        Ok(())
    }

    /// Path length in normalized units
    pub fn perimeter(&self) -> f32 {
        match *self {
            Shape::Triangle(v) => polygon_lengths(&v).iter().sum(),
            Shape::Rectangle { min, max } => {
                polygon_lengths(&Self::rectangle_vertices(min, max)).iter().sum()
            }
            Shape::Circle { radius, .. } => 2.0 * PI * radius,
            Shape::Sine {
                amplitude,
                wavelength,
                ..
            } => sine_arc_length(amplitude, wavelength),
        }
    }

    /// Number of points [`Shape::points`] yields
    pub fn point_count(&self) -> usize {
        point_count(self.perimeter())
    }

    /// Sample the shape
    pub fn points(&self) -> Result<ShapePoints, TrajectoryError> {
        self.validate()?;
        let total = self.point_count();
        Ok(match *self {
            Shape::Triangle(vertices) => ShapePoints::Triangle(Polyline::new(vertices, total)),
            Shape::Rectangle { min, max } => {
                ShapePoints::Rectangle(Polyline::new(Self::rectangle_vertices(min, max), total))
            }
            Shape::Circle { center, radius } => ShapePoints::Circle(CirclePoints {
                center,
                radius,
                count: total,
                index: 0,
            }),
            Shape::Sine {
                amplitude,
                offset,
                wavelength,
            } => ShapePoints::Sine(SinePoints {
                amplitude,
                offset,
                wavelength,
                count: total,
                index: 0,
            }),
        })
    }
}

/// Edge lengths of a closed polygon
fn polygon_lengths<const N: usize>(vertices: &[Point; N]) -> [f32; N] {
    let mut lengths = [0.0f32; N];
    for i in 0..N {
        lengths[i] = vertices[i].distance(vertices[(i + 1) % N]);
    }
    lengths
}

/// Arc length of one sine period, summed over straight chords
pub fn sine_arc_length(amplitude: f32, wavelength: f32) -> f32 {
    let y = |x: f32| amplitude * libm::sinf(2.0 * PI * x / wavelength);
    let dx = wavelength / SINE_ARC_SLICES as f32;
    let mut prev = Point::new(0.0, y(0.0));
    let mut length = 0.0f32;
    for i in 1..=SINE_ARC_SLICES {
        let x = dx * i as f32;
        let next = Point::new(x, y(x));
        length += prev.distance(next);
        prev = next;
    }
    length
}

/// Closed polygon sampled edge by edge, endpoints excluded
///
/// Edge `i` runs from vertex `i` to vertex `i + 1` (wrapping) and gets
/// `counts[i]` evenly spaced points starting at vertex `i`.
#[derive(Debug, Clone)]
pub struct Polyline<const N: usize> {
    vertices: [Point; N],
    counts: [usize; N],
    edge: usize,
    step: usize,
}

impl<const N: usize> Polyline<N> {
    pub fn new(vertices: [Point; N], total: usize) -> Self {
        let counts = allocate(total, &polygon_lengths(&vertices));
        Self {
            vertices,
            counts,
            edge: 0,
            step: 0,
        }
    }

    /// Points allocated to each edge
    pub fn counts(&self) -> &[usize; N] {
        &self.counts
    }
}

impl<const N: usize> Iterator for Polyline<N> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        while self.edge < N {
            let count = self.counts[self.edge];
            if self.step < count {
                let start = self.vertices[self.edge];
                let end = self.vertices[(self.edge + 1) % N];
                let t = self.step as f32 / count as f32;
                self.step += 1;
                return Some(start.lerp(end, t));
            }
            self.edge += 1;
            self.step = 0;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.edge < N {
            self.counts[self.edge..].iter().sum::<usize>() - self.step
        } else {
            0
        };
        (remaining, Some(remaining))
    }
}

/// Uniform angular samples over [0, 2π), endpoint excluded
#[derive(Debug, Clone)]
pub struct CirclePoints {
    center: Point,
    radius: f32,
    count: usize,
    index: usize,
}

impl Iterator for CirclePoints {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.index >= self.count {
            return None;
        }
        let theta = 2.0 * PI * self.index as f32 / self.count as f32;
        self.index += 1;
        Some(Point::new(
            self.center.x + self.radius * libm::cosf(theta),
            self.center.y + self.radius * libm::sinf(theta),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

/// Samples uniform in x over [0, wavelength], both ends included
#[derive(Debug, Clone)]
pub struct SinePoints {
    amplitude: f32,
    offset: f32,
    wavelength: f32,
    count: usize,
    index: usize,
}

impl Iterator for SinePoints {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.index >= self.count {
            return None;
        }
        let x = if self.count > 1 {
            self.wavelength * self.index as f32 / (self.count - 1) as f32
        } else {
            0.0
        };
        self.index += 1;
        let y = self.offset + self.amplitude * libm::sinf(2.0 * PI * x / self.wavelength);
        Some(Point::new(x, y))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

/// Point iterator for any [`Shape`]
#[derive(Debug, Clone)]
pub enum ShapePoints {
    Triangle(Polyline<3>),
    Rectangle(Polyline<4>),
    Circle(CirclePoints),
    Sine(SinePoints),
}

impl Iterator for ShapePoints {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        match self {
            ShapePoints::Triangle(it) => it.next(),
            ShapePoints::Rectangle(it) => it.next(),
            ShapePoints::Circle(it) => it.next(),
            ShapePoints::Sine(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            ShapePoints::Triangle(it) => it.size_hint(),
            ShapePoints::Rectangle(it) => it.size_hint(),
            ShapePoints::Circle(it) => it.size_hint(),
            ShapePoints::Sine(it) => it.size_hint(),
        }
    }
}

impl ExactSizeIterator for ShapePoints {}

#[cfg(test)]
mod tests {
    use super::*;

    const SINE_ARC_REFERENCE: f32 = 2.304_892;

    fn close(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_rectangle_points() {
        let shape = Shape::Rectangle {
            min: Point::new(0.2, 0.2),
            max: Point::new(0.8, 0.8),
        };
        assert_eq!(shape.point_count(), 120);

        let points: Vec<Point> = shape.points().unwrap().collect();
        assert_eq!(points.len(), 120);
        assert_eq!(points[0], Point::new(0.2, 0.2));
        for p in &points {
            assert!(p.x >= 0.2 - 1e-6 && p.x <= 0.8 + 1e-6);
            assert!(p.y >= 0.2 - 1e-6 && p.y <= 0.8 + 1e-6);
        }
    }

    #[test]
    fn test_triangle_edges_sum_to_total() {
        let shape = Shape::Triangle([
            Point::new(0.2, 0.2),
            Point::new(0.8, 0.2),
            Point::new(0.5, 0.8),
        ]);
        // 0.6 + 2 * sqrt(0.45) = 1.9416...
        assert_eq!(shape.point_count(), 97);
        let points = shape.points().unwrap();
        assert_eq!(points.len(), 97);
        if let ShapePoints::Triangle(polyline) = &points {
            assert_eq!(polyline.counts().iter().sum::<usize>(), 97);
        } else {
            panic!("expected a triangle iterator");
        }
        assert_eq!(points.count(), 97);
    }

    #[test]
    fn test_circle_points_on_radius() {
        let center = Point::new(0.5, 0.5);
        let shape = Shape::Circle {
            center,
            radius: 0.4,
        };
        // 2π · 0.4 · 50 = 125.66
        assert_eq!(shape.point_count(), 125);

        let points: Vec<Point> = shape.points().unwrap().collect();
        assert_eq!(points.len(), 125);
        assert!(close(points[0].x, 0.9, 1e-6) && close(points[0].y, 0.5, 1e-6));
        for p in &points {
            assert!(close(center.distance(*p), 0.4, 1e-5));
        }
    }

    #[test]
    fn test_sine_arc_length_converges() {
        let length = sine_arc_length(0.5, 1.0);
        assert!(
            (length - SINE_ARC_REFERENCE).abs() / SINE_ARC_REFERENCE < 0.01,
            "arc length {}",
            length
        );
        assert!(close(length, SINE_ARC_REFERENCE, 1e-3));
    }

    #[test]
    fn test_sine_points_span_period() {
        let shape = Shape::Sine {
            amplitude: 0.5,
            offset: 0.5,
            wavelength: 1.0,
        };
        assert_eq!(shape.point_count(), 115);

        let points: Vec<Point> = shape.points().unwrap().collect();
        assert_eq!(points.len(), 115);
        assert_eq!(points[0].x, 0.0);
        assert!(close(points[0].y, 0.5, 1e-6));
        assert!(close(points[114].x, 1.0, 1e-6));
        for p in &points {
            assert!(p.y >= -1e-6 && p.y <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_invalid_dimensions() {
        let circle = Shape::Circle {
            center: Point::new(0.5, 0.5),
            radius: 0.0,
        };
        assert_eq!(circle.points().err(), Some(TrajectoryError::InvalidDimension));

        let sine = Shape::Sine {
            amplitude: 0.5,
            offset: 0.5,
            wavelength: -1.0,
        };
        assert_eq!(sine.points().err(), Some(TrajectoryError::InvalidDimension));

        let triangle = Shape::Triangle([Point::new(f32::NAN, 0.0), Point::default(), Point::default()]);
        assert_eq!(triangle.validate(), Err(TrajectoryError::InvalidDimension));
    }

    #[test]
    fn test_degenerate_triangle_yields_nothing() {
        let p = Point::new(0.5, 0.5);
        let shape = Shape::Triangle([p, p, p]);
        assert_eq!(shape.points().unwrap().count(), 0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn coord() -> impl Strategy<Value = f32> {
            0.0f32..1.0
        }

        proptest! {
            #[test]
            fn prop_triangle_yields_point_count(
                ax in coord(), ay in coord(),
                bx in coord(), by in coord(),
                cx in coord(), cy in coord(),
            ) {
                let shape = Shape::Triangle([
                    Point::new(ax, ay),
                    Point::new(bx, by),
                    Point::new(cx, cy),
                ]);
                let points: Vec<Point> = shape.points().unwrap().collect();
                prop_assert_eq!(points.len(), shape.point_count());
            }

            #[test]
            fn prop_rectangle_yields_point_count(
                x in coord(), y in coord(),
                w in 0.0f32..1.0, h in 0.0f32..1.0,
            ) {
                let shape = Shape::Rectangle {
                    min: Point::new(x, y),
                    max: Point::new(x + w, y + h),
                };
                let points: Vec<Point> = shape.points().unwrap().collect();
                prop_assert_eq!(points.len(), shape.point_count());
            }
        }
    }
}
