//! Planar homography from four point correspondences
//!
//! `[x', y', w']ᵀ = H · [x, y, 1]ᵀ`, mapped point = `(x'/w', y'/w')`.
//! H has 8 degrees of freedom (h33 fixed to 1); four correspondences give
//! an 8x8 linear system, solved by Gaussian elimination with partial
//! pivoting. The solve runs in f64 since angle-space values are in the
//! thousands while screen coordinates are near 1.

use super::CalibrationError;
use crate::geometry::Point;

/// Pivot magnitude, relative to the largest coefficient, below which the
/// system is treated as singular
const SINGULAR_RELATIVE: f64 = 1e-9;

/// Smallest usable `w'` when mapping a point
const W_EPSILON: f64 = 1e-12;

/// Homography matrix, row-major
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Homography {
    m: [f64; 9],
}

impl Default for Homography {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Homography {
    /// The "not calibrated" matrix
    pub const ZERO: Self = Self { m: [0.0; 9] };

    /// Build from a row-major matrix
    pub const fn from_matrix(m: [f64; 9]) -> Self {
        Self { m }
    }

    pub fn matrix(&self) -> &[f64; 9] {
        &self.m
    }

    /// True while no mapping has been computed
    pub fn is_zero(&self) -> bool {
        self.m.iter().all(|&v| v == 0.0)
    }

    /// Solve for the homography mapping each `src[i]` onto `dst[i]`
    pub fn from_correspondences(src: &[Point; 4], dst: &[Point; 4]) -> Result<Self, CalibrationError> {
        // Augmented 8x9 system
        let mut a = [[0.0f64; 9]; 8];
        for i in 0..4 {
            let (x, y) = (src[i].x as f64, src[i].y as f64);
            let (u, v) = (dst[i].x as f64, dst[i].y as f64);
            a[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y, u];
            a[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y, v];
        }

        let scale = a
            .iter()
            .flat_map(|row| row[..8].iter())
            .fold(0.0f64, |acc, &v| acc.max(libm::fabs(v)));
        let threshold = scale * SINGULAR_RELATIVE;

        for col in 0..8 {
            let mut pivot = col;
            for row in col + 1..8 {
                if libm::fabs(a[row][col]) > libm::fabs(a[pivot][col]) {
                    pivot = row;
                }
            }
            let magnitude = libm::fabs(a[pivot][col]);
            if !(magnitude > threshold) {
                return Err(CalibrationError::Degenerate);
            }
            a.swap(col, pivot);

            for row in col + 1..8 {
                let factor = a[row][col] / a[col][col];
                if factor == 0.0 {
                    continue;
                }
                for k in col..9 {
                    a[row][k] -= factor * a[col][k];
                }
            }
        }

        let mut h = [0.0f64; 8];
        for row in (0..8).rev() {
            let mut sum = a[row][8];
            for k in row + 1..8 {
                sum -= a[row][k] * h[k];
            }
            h[row] = sum / a[row][row];
        }

        if h.iter().any(|v| !v.is_finite()) {
            return Err(CalibrationError::Degenerate);
        }

        Ok(Self {
            m: [h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0],
        })
    }

    /// Map a point through the homography
    pub fn apply(&self, p: Point) -> Result<Point, CalibrationError> {
        if self.is_zero() {
            return Err(CalibrationError::Uncalibrated);
        }
        let (x, y) = (p.x as f64, p.y as f64);
        let m = &self.m;
        let w = m[6] * x + m[7] * y + m[8];
        if !(libm::fabs(w) > W_EPSILON) {
            return Err(CalibrationError::Degenerate);
        }
        let u = (m[0] * x + m[1] * y + m[2]) / w;
        let v = (m[3] * x + m[4] * y + m[5]) / w;
        Ok(Point::new(u as f32, v as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::SOURCE_CORNERS;
    use proptest::prelude::*;

    fn assert_close(actual: Point, expected: Point, tol: f32) {
        assert!(
            (actual.x - expected.x).abs() <= tol && (actual.y - expected.y).abs() <= tol,
            "{:?} not within {} of {:?}",
            actual,
            tol,
            expected
        );
    }

    #[test]
    fn test_zero_is_uncalibrated() {
        assert_eq!(
            Homography::ZERO.apply(Point::new(0.5, 0.5)),
            Err(CalibrationError::Uncalibrated)
        );
    }

    #[test]
    fn test_identity_correspondence() {
        let h = Homography::from_correspondences(&SOURCE_CORNERS, &SOURCE_CORNERS).unwrap();
        let p = h.apply(Point::new(0.7, 0.3)).unwrap();
        assert_close(p, Point::new(0.7, 0.3), 1e-5);
    }

    #[test]
    fn test_default_square() {
        let dst = crate::calibration::DEFAULT_DESTINATIONS;
        let h = Homography::from_correspondences(&SOURCE_CORNERS, &dst).unwrap();
        for (s, d) in SOURCE_CORNERS.iter().zip(dst.iter()) {
            assert_close(h.apply(*s).unwrap(), *d, 0.01);
        }
        // Center of the source rectangle lands in the middle of the square
        assert_close(h.apply(Point::new(0.715, 0.5)).unwrap(), Point::new(5000.0, 5000.0), 0.01);
    }

    #[test]
    fn test_collinear_is_degenerate() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.0),
        ];
        assert_eq!(
            Homography::from_correspondences(&src, &SOURCE_CORNERS),
            Err(CalibrationError::Degenerate)
        );
    }

    #[test]
    fn test_point_at_infinity() {
        // w = x - 1 vanishes on the line x = 1
        let h = Homography::from_matrix([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, -1.0]);
        assert_eq!(h.apply(Point::new(1.0, 0.5)), Err(CalibrationError::Degenerate));
    }

    proptest! {
        #[test]
        fn prop_recovers_affine_map(
            a in 200.0f32..2000.0,
            b in -100.0f32..100.0,
            c in -100.0f32..100.0,
            d in 200.0f32..2000.0,
            tx in 3500.0f32..5000.0,
            ty in 3500.0f32..5000.0,
        ) {
            let map = |p: Point| Point::new(a * p.x + b * p.y + tx, c * p.x + d * p.y + ty);
            let dst = SOURCE_CORNERS.map(map);
            let h = Homography::from_correspondences(&SOURCE_CORNERS, &dst).unwrap();

            for s in SOURCE_CORNERS {
                let got = h.apply(s).unwrap();
                let want = map(s);
                prop_assert!((got.x - want.x).abs() < 0.05);
                prop_assert!((got.y - want.y).abs() < 0.05);
            }

            // An interior point follows the same affine map
            let inner = Point::new(0.4, 0.6);
            let got = h.apply(inner).unwrap();
            let want = map(inner);
            prop_assert!((got.x - want.x).abs() < 0.05);
            prop_assert!((got.y - want.y).abs() < 0.05);
        }
    }
}
