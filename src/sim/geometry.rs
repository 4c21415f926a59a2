//! Planar geometry for ship and enemy collisions
//!
//! The ship is a rotated kite polygon and every enemy is a circle, so the
//! only non-trivial test is polygon vs circle. The renderer must build the
//! hull with [`ship_hull`] so that what is drawn is what collides.

use glam::Vec2;

use crate::consts::{SHIP_HEIGHT, SHIP_WIDTH};

/// Rotate `point` about `center` by `angle` radians
#[inline]
pub fn rotate_point(point: Vec2, center: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    let d = point - center;
    center + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Ray-casting parity test. Vertices in order, no closing duplicate.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    let mut inside = false;
    let Some(mut j) = polygon.len().checked_sub(1) else {
        return false;
    };
    for (i, vi) in polygon.iter().enumerate() {
        let vj = polygon[j];
        // The straddle check guarantees vj.y != vi.y, so the division is safe
        if (vi.y > point.y) != (vj.y > point.y)
            && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Squared distance from `point` to the closest point on segment `a`-`b`
pub fn distance_to_segment_squared(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq == 0.0 {
        return point.distance_squared(a);
    }
    let t = ((point - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance_squared(a + seg * t)
}

/// True if the circle's center is inside the polygon or any edge is
/// closer than `radius` to it
pub fn polygon_circle_intersects(polygon: &[Vec2], center: Vec2, radius: f32) -> bool {
    if point_in_polygon(center, polygon) {
        return true;
    }
    let r_sq = radius * radius;
    let n = polygon.len();
    (0..n).any(|i| distance_to_segment_squared(center, polygon[i], polygon[(i + 1) % n]) < r_sq)
}

/// The ship's kite hull at `center`, rotated by `angle`
///
/// Order: nose, right wing, tail, left wing.
pub fn ship_hull(center: Vec2, angle: f32) -> [Vec2; 4] {
    [
        Vec2::new(0.0, -SHIP_HEIGHT / 2.0),
        Vec2::new(SHIP_WIDTH / 2.0, 0.0),
        Vec2::new(0.0, SHIP_HEIGHT / 4.0),
        Vec2::new(-SHIP_WIDTH / 2.0, 0.0),
    ]
    .map(|offset| rotate_point(center + offset, center, angle))
}

/// Wrap a position onto the torus `[0, arena.x) x [0, arena.y)`
#[inline]
pub fn wrap_position(pos: Vec2, arena: Vec2) -> Vec2 {
    Vec2::new(wrap_axis(pos.x, arena.x), wrap_axis(pos.y, arena.y))
}

#[inline]
fn wrap_axis(v: f32, size: f32) -> f32 {
    let wrapped = v.rem_euclid(size);
    // rem_euclid can round up to `size` for tiny negative inputs
    if wrapped >= size { 0.0 } else { wrapped }
}

/// Clamp a circle center so the whole circle stays inside the arena
#[inline]
pub fn clamp_circle_center(center: Vec2, radius: f32, arena: Vec2) -> Vec2 {
    Vec2::new(
        center.x.clamp(radius, (arena.x - radius).max(radius)),
        center.y.clamp(radius, (arena.y - radius).max(radius)),
    )
}

/// True if a circle lies entirely outside the arena rectangle
#[inline]
pub fn circle_outside_arena(center: Vec2, radius: f32, arena: Vec2) -> bool {
    center.x + radius < 0.0
        || center.x - radius > arena.x
        || center.y + radius < 0.0
        || center.y - radius > arena.y
}

/// True if a point lies outside the arena rectangle
#[inline]
pub fn point_outside_arena(point: Vec2, arena: Vec2) -> bool {
    point.x < 0.0 || point.x > arena.x || point.y < 0.0 || point.y > arena.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let p = rotate_point(Vec2::new(10.0, 0.0), Vec2::ZERO, FRAC_PI_2);
        assert!(p.abs_diff_eq(Vec2::new(0.0, 10.0), 1e-5));

        // Pivot is a fixed point
        let c = Vec2::new(3.0, 4.0);
        assert!(rotate_point(c, c, 1.234).abs_diff_eq(c, 1e-6));
    }

    #[test]
    fn test_point_in_polygon() {
        let poly = square();
        assert!(point_in_polygon(Vec2::new(5.0, 5.0), &poly));
        assert!(!point_in_polygon(Vec2::new(15.0, 5.0), &poly));
        assert!(!point_in_polygon(Vec2::new(5.0, -1.0), &poly));
        assert!(!point_in_polygon(Vec2::new(5.0, 5.0), &[]));
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        // Perpendicular projection inside the segment
        assert_eq!(distance_to_segment_squared(Vec2::new(5.0, 3.0), a, b), 9.0);
        // Clamped to endpoints
        assert_eq!(distance_to_segment_squared(Vec2::new(-3.0, 4.0), a, b), 25.0);
        assert_eq!(distance_to_segment_squared(Vec2::new(13.0, 4.0), a, b), 25.0);
        // Degenerate segment
        assert_eq!(distance_to_segment_squared(Vec2::new(3.0, 4.0), a, a), 25.0);
    }

    #[test]
    fn test_polygon_circle_intersects() {
        let poly = square();
        // Center inside
        assert!(polygon_circle_intersects(&poly, Vec2::new(5.0, 5.0), 1.0));
        // Center outside, touching an edge
        assert!(polygon_circle_intersects(&poly, Vec2::new(12.0, 5.0), 3.0));
        // Clear miss
        assert!(!polygon_circle_intersects(&poly, Vec2::new(20.0, 5.0), 3.0));
    }

    #[test]
    fn test_ship_hull_points_along_heading() {
        let center = Vec2::new(100.0, 100.0);
        let nose = ship_hull(center, 0.0)[0];
        assert!(nose.abs_diff_eq(Vec2::new(100.0, 100.0 - SHIP_HEIGHT / 2.0), 1e-4));

        // Facing right
        let nose = ship_hull(center, FRAC_PI_2)[0];
        assert!(nose.abs_diff_eq(Vec2::new(100.0 + SHIP_HEIGHT / 2.0, 100.0), 1e-4));

        // Hull nose matches the heading vector used for movement
        let nose = ship_hull(center, PI / 3.0)[0];
        let expected = center + crate::heading_vector(PI / 3.0) * SHIP_HEIGHT / 2.0;
        assert!(nose.abs_diff_eq(expected, 1e-3));
    }

    #[test]
    fn test_wrap_position_edges() {
        let arena = Vec2::new(1280.0, 960.0);
        assert_eq!(wrap_position(Vec2::new(-1.0, 10.0), arena), Vec2::new(1279.0, 10.0));
        assert_eq!(wrap_position(Vec2::new(1280.0, 960.0), arena), Vec2::ZERO);
        assert_eq!(wrap_position(Vec2::new(-1e-9, 5.0), arena).x, 0.0);
    }

    proptest! {
        #[test]
        fn prop_wrap_full_arena_is_identity(
            x in 0.0f32..1280.0,
            y in 0.0f32..960.0,
            kx in -2i32..=2,
            ky in -2i32..=2,
        ) {
            let arena = Vec2::new(1280.0, 960.0);
            let start = Vec2::new(x, y);
            let moved = start + Vec2::new(kx as f32 * arena.x, ky as f32 * arena.y);
            let back = wrap_position(moved, arena);
            // Distance on the torus, so values straddling an edge still compare equal
            let dx = (back.x - x).abs();
            let dy = (back.y - y).abs();
            prop_assert!(dx.min(arena.x - dx) < 1e-3);
            prop_assert!(dy.min(arena.y - dy) < 1e-3);
        }

        #[test]
        fn prop_clamped_circle_fits_arena(x in -500.0f32..2000.0, y in -500.0f32..2000.0) {
            let arena = Vec2::new(1280.0, 960.0);
            let r = 150.0;
            let c = clamp_circle_center(Vec2::new(x, y), r, arena);
            prop_assert!(c.x - r >= 0.0 && c.x + r <= arena.x);
            prop_assert!(c.y - r >= 0.0 && c.y + r <= arena.y);
        }

        #[test]
        fn prop_rotation_preserves_distance(
            px in -100.0f32..100.0,
            py in -100.0f32..100.0,
            angle in -10.0f32..10.0,
        ) {
            let center = Vec2::new(7.0, -3.0);
            let p = Vec2::new(px, py);
            let r = rotate_point(p, center, angle);
            prop_assert!((r.distance(center) - p.distance(center)).abs() < 1e-2);
        }
    }
}
