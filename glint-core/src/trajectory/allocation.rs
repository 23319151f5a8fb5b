//! Point budgets proportional to arc length

/// Sampling density, points per unit of perimeter
pub const POINTS_PER_UNIT: f32 = 50.0;

/// Total point count for a path of the given length
///
/// `floor(perimeter × 50)`; non-finite or negative lengths give 0.
pub fn point_count(perimeter: f32) -> usize {
    let count = libm::floorf(perimeter * POINTS_PER_UNIT);
    if count.is_finite() && count > 0.0 {
        count as usize
    } else {
        0
    }
}

/// Split `total` points across edges in proportion to their lengths
///
/// Each edge but the last gets `floor(total × len / sum)`; the last edge
/// takes the remainder so the result always sums to `total`.
pub fn allocate<const N: usize>(total: usize, lengths: &[f32; N]) -> [usize; N] {
    let mut counts = [0usize; N];
    if N == 0 {
        return counts;
    }

    let sum: f32 = lengths.iter().sum();
    let mut used = 0usize;
    if sum.is_finite() && sum > 0.0 {
        for i in 0..N - 1 {
            let share = libm::floorf(total as f32 * lengths[i] / sum);
            let share = if share.is_finite() && share > 0.0 {
                share as usize
            } else {
                0
            };
            counts[i] = share.min(total - used);
            used += counts[i];
        }
    }
    counts[N - 1] = total - used;
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use proptest::prelude::*;

    #[test]
    fn test_point_count() {
        assert_eq!(point_count(2.4), 120);
        assert_eq!(point_count(0.0), 0);
        assert_eq!(point_count(-1.0), 0);
        assert_eq!(point_count(f32::NAN), 0);
    }

    #[test]
    fn test_rectangle_split() {
        // 0.6 x 0.6 square, 120 points
        let counts = allocate(120, &[0.6, 0.6, 0.6, 0.6]);
        assert_eq!(counts.iter().sum::<usize>(), 120);
        assert!(counts[..3].iter().all(|&c| c == 29 || c == 30));
    }

    #[test]
    fn test_last_edge_absorbs_remainder() {
        let counts = allocate(10, &[1.0, 1.0, 1.0]);
        assert_eq!(counts, [3, 3, 4]);
    }

    #[test]
    fn test_zero_length_path() {
        assert_eq!(allocate(0, &[0.0, 0.0, 0.0]), [0, 0, 0]);
        assert_eq!(allocate(5, &[0.0, 0.0]), [0, 5]);
    }

    fn triangle_edges(a: Point, b: Point, c: Point) -> [f32; 3] {
        [a.distance(b), b.distance(c), c.distance(a)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_triangle_allocation_sums(
            ax in 0.0f32..1.0, ay in 0.0f32..1.0,
            bx in 0.0f32..1.0, by in 0.0f32..1.0,
            cx in 0.0f32..1.0, cy in 0.0f32..1.0,
        ) {
            let edges = triangle_edges(Point::new(ax, ay), Point::new(bx, by), Point::new(cx, cy));
            let total = point_count(edges.iter().sum());
            let counts = allocate(total, &edges);
            prop_assert_eq!(counts.iter().sum::<usize>(), total);
        }

        #[test]
        fn prop_rectangle_allocation_sums(w in 0.0f32..1.0, h in 0.0f32..1.0) {
            let edges = [w, h, w, h];
            let total = point_count(2.0 * (w + h));
            let counts = allocate(total, &edges);
            prop_assert_eq!(counts.iter().sum::<usize>(), total);
            // Opposite edges never differ by more than the remainder slack
            prop_assert!(counts[0].abs_diff(counts[2]) <= 4);
        }
    }
}
