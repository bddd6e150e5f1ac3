//! Math and geometry helpers
//!
//! Pure functions shared by physics, spawning and collision. Hit tests use
//! closed disks: touching counts as overlapping.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Uniform sample in `[min, max)`. Empty or inverted ranges yield `min`.
pub fn sample_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Linear interpolation; exact at both `t = 0` and `t = 1`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Position of `value` between `a` and `b`, clamped to [0, 1]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() < f32::EPSILON {
        return 1.0;
    }
    clamp((value - a) / (b - a), 0.0, 1.0)
}

/// Wrap `value` into `[min, max)`
pub fn wrap(value: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if span <= 0.0 {
        return min;
    }
    min + (value - min).rem_euclid(span)
}

#[inline]
pub fn ease_in_quad(t: f32) -> f32 {
    let t = clamp(t, 0.0, 1.0);
    t * t
}

#[inline]
pub fn ease_out_quad(t: f32) -> f32 {
    let t = clamp(t, 0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = clamp(t, 0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = clamp(t, 0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Axis-aligned rectangle (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Shrink on every side. Width/height never go negative.
    pub fn inset(&self, margin: f32) -> Self {
        Self {
            x: self.x + margin,
            y: self.y + margin,
            w: (self.w - 2.0 * margin).max(0.0),
            h: (self.h - 2.0 * margin).max(0.0),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

/// Circle vs rectangle via the closest point on the rectangle
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    if rect.is_empty() {
        return false;
    }
    let closest = Vec2::new(
        clamp(center.x, rect.x, rect.right()),
        clamp(center.y, rect.y, rect.bottom()),
    );
    center.distance_squared(closest) <= radius * radius
}

/// Circle vs circle via squared distance
#[inline]
pub fn circle_circle_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) <= reach * reach
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_circle_rect_touching_counts() {
        let rect = Rect::new(100.0, 100.0, 50.0, 50.0);
        // Exactly one radius left of the left edge
        assert!(circle_rect_overlap(Vec2::new(90.0, 120.0), 10.0, &rect));
        assert!(!circle_rect_overlap(Vec2::new(89.9, 120.0), 10.0, &rect));
    }

    #[test]
    fn test_circle_rect_corner() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Diagonal distance to corner is ~7.07
        assert!(circle_rect_overlap(Vec2::new(15.0, 15.0), 7.1, &rect));
        assert!(!circle_rect_overlap(Vec2::new(15.0, 15.0), 7.0, &rect));
    }

    #[test]
    fn test_inset_grants_grace() {
        let rect = Rect::new(100.0, 0.0, 60.0, 300.0);
        let center = Vec2::new(92.0, 150.0);
        assert!(circle_rect_overlap(center, 10.0, &rect));
        assert!(!circle_rect_overlap(center, 10.0, &rect.inset(4.0)));
    }

    #[test]
    fn test_collapsed_rect_never_hits() {
        let rect = Rect::new(0.0, 0.0, 6.0, 6.0).inset(4.0);
        assert!(rect.is_empty());
        assert!(!circle_rect_overlap(Vec2::new(3.0, 3.0), 50.0, &rect));
    }

    #[test]
    fn test_circle_circle() {
        assert!(circle_circle_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(!circle_circle_overlap(Vec2::ZERO, 5.0, Vec2::new(10.1, 0.0), 5.0));
    }

    #[test]
    fn test_wrap() {
        assert!((wrap(7.0, 0.0, 5.0) - 2.0).abs() < 1e-5);
        assert!((wrap(-1.0, 0.0, 5.0) - 4.0).abs() < 1e-5);
        assert_eq!(wrap(3.0, 2.0, 2.0), 2.0);
    }

    #[test]
    fn test_easing_endpoints() {
        for ease in [ease_in_quad, ease_out_quad, ease_in_out_quad, ease_out_cubic] {
            assert_eq!(ease(0.0), 0.0);
            assert!((ease(1.0) - 1.0).abs() < 1e-6);
            assert_eq!(ease(-3.0), 0.0);
        }
    }

    #[test]
    fn test_sample_range_inverted() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(sample_range(&mut rng, 5.0, 5.0), 5.0);
        assert_eq!(sample_range(&mut rng, 5.0, 1.0), 5.0);
    }

    proptest! {
        #[test]
        fn prop_sample_range_within_bounds(seed in any::<u64>(), min in -500.0f32..500.0, span in 0.01f32..500.0) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let v = sample_range(&mut rng, min, min + span);
            prop_assert!(v >= min && v <= min + span);
        }

        #[test]
        fn prop_easing_stays_in_unit(t in -2.0f32..3.0) {
            for ease in [ease_in_quad, ease_out_quad, ease_in_out_quad, ease_out_cubic] {
                let v = ease(t);
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }

        #[test]
        fn prop_wrap_in_range(v in -10_000.0f32..10_000.0) {
            let w = wrap(v, 0.0, std::f32::consts::TAU);
            prop_assert!((0.0..=std::f32::consts::TAU).contains(&w));
        }
    }
}
