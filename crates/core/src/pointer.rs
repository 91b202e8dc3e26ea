//! Pointer state and the repulsion it exerts on particles.

use glam::DVec2;

/// Below this distance the push direction is undefined and no push applies.
pub const MIN_DISTANCE: f64 = 1e-9;

/// Last known pointer position and the radius it repels within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    position: Option<DVec2>,
    radius: f64,
    strength: f64,
}

impl Pointer {
    /// A pointer that has not moved yet.
    pub fn new(radius: f64, strength: f64) -> Self {
        Self {
            position: None,
            radius,
            strength,
        }
    }

    /// Last observed position, `None` before the first move.
    pub fn position(&self) -> Option<DVec2> {
        self.position
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Records a pointer move in canvas coordinates.
    pub fn move_to(&mut self, position: DVec2) {
        self.position = Some(position);
    }

    /// Offset to subtract from a particle at `at` this frame.
    ///
    /// The push points from the particle toward the pointer and scales
    /// linearly from `strength` at the pointer to zero at the radius. It is
    /// zero when the pointer is unknown, out of range, or coincides with
    /// the particle.
    pub fn push(&self, at: DVec2) -> DVec2 {
        let Some(pointer) = self.position else {
            return DVec2::ZERO;
        };
        let toward = pointer - at;
        let distance = toward.length();
        if distance < MIN_DISTANCE || distance >= self.radius {
            return DVec2::ZERO;
        }
        let falloff = (self.radius - distance) / self.radius;
        toward / distance * falloff * self.strength
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer_at(x: f64, y: f64) -> Pointer {
        let mut p = Pointer::new(150.0, 5.0);
        p.move_to(DVec2::new(x, y));
        p
    }

    #[test]
    fn unknown_pointer_never_pushes() {
        let p = Pointer::new(150.0, 5.0);
        assert_eq!(p.position(), None);
        assert_eq!(p.push(DVec2::new(1.0, 1.0)), DVec2::ZERO);
    }

    #[test]
    fn coincident_pointer_yields_zero_not_nan() {
        let p = pointer_at(40.0, 40.0);
        let push = p.push(DVec2::new(40.0, 40.0));
        assert_eq!(push, DVec2::ZERO);
        assert!(push.is_finite());
    }

    #[test]
    fn outside_radius_is_untouched() {
        let p = pointer_at(0.0, 0.0);
        assert_eq!(p.push(DVec2::new(150.0, 0.0)), DVec2::ZERO);
        assert_eq!(p.push(DVec2::new(200.0, 0.0)), DVec2::ZERO);
    }

    #[test]
    fn push_points_toward_pointer_with_linear_falloff() {
        let p = pointer_at(100.0, 0.0);
        // Particle 75 units left of the pointer: falloff (150-75)/150 = 0.5.
        let push = p.push(DVec2::new(25.0, 0.0));
        assert!((push.x - 2.5).abs() < 1e-12, "push.x = {}", push.x);
        assert!(push.y.abs() < 1e-12);
        // Subtracting it moves the particle away from the pointer.
        assert!(25.0 - push.x < 25.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn push_is_finite_and_bounded_by_strength(
                px in -500.0_f64..500.0,
                py in -500.0_f64..500.0,
                ax in -500.0_f64..500.0,
                ay in -500.0_f64..500.0,
            ) {
                let p = pointer_at(px, py);
                let push = p.push(DVec2::new(ax, ay));
                prop_assert!(push.is_finite());
                prop_assert!(push.length() <= 5.0 + 1e-9);
            }
        }
    }
}
