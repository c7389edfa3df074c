//! Circle collision tests and impulse response helpers
//!
//! Every collision pass in the game reduces to the same circle-circle
//! distance test; both passes (bullet/enemy and player/enemy) call the one
//! predicate here so the two can never disagree.

use glam::Vec2;

/// Circle-circle overlap: `distance < r1 + r2`
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Impulse along a travel angle (bullet knockback)
#[inline]
pub fn impulse_along(angle: f32, magnitude: f32) -> Vec2 {
    Vec2::from_angle(angle) * magnitude
}

/// Separation impulse for two overlapping bodies. Returns the impulse for
/// `a`; apply the negation to `b`. Coincident centers produce a zero
/// impulse rather than a NaN direction.
pub fn push_apart(a: Vec2, b: Vec2, magnitude: f32) -> Vec2 {
    (a - b).normalize_or_zero() * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn overlap_is_strict_at_the_boundary() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(30.0, 0.0);
        // Touching exactly is not an overlap
        assert!(!circles_overlap(a, 10.0, b, 20.0));
        assert!(circles_overlap(a, 10.0, b, 20.1));
    }

    #[test]
    fn push_apart_handles_coincident_centers() {
        let p = Vec2::new(100.0, 100.0);
        let impulse = push_apart(p, p, 240.0);
        assert_eq!(impulse, Vec2::ZERO);
        assert!(impulse.x.is_finite() && impulse.y.is_finite());
    }

    #[test]
    fn impulse_points_along_travel_angle() {
        let i = impulse_along(0.0, 120.0);
        assert!((i.x - 120.0).abs() < 1e-4);
        assert!(i.y.abs() < 1e-4);

        let i = impulse_along(std::f32::consts::FRAC_PI_2, 120.0);
        assert!(i.x.abs() < 1e-3);
        assert!((i.y - 120.0).abs() < 1e-3);
    }

    proptest! {
        // The same formula serves both collision passes; it must be
        // symmetric in its arguments.
        #[test]
        fn overlap_is_symmetric(
            ax in -2000.0f32..2000.0, ay in -2000.0f32..2000.0,
            bx in -2000.0f32..2000.0, by in -2000.0f32..2000.0,
            ra in 0.1f32..100.0, rb in 0.1f32..100.0,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            prop_assert_eq!(
                circles_overlap(a, ra, b, rb),
                circles_overlap(b, rb, a, ra)
            );
        }
    }
}
