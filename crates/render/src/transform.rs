//! Save/restore stack of affine transforms shared by the CPU surfaces.

use glam::{DAffine2, DVec2};

/// Current transform plus the saved ones beneath it.
#[derive(Debug, Clone)]
pub struct TransformStack {
    current: DAffine2,
    saved: Vec<DAffine2>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self {
            current: DAffine2::IDENTITY,
            saved: Vec::new(),
        }
    }
}

impl TransformStack {
    pub fn current(&self) -> DAffine2 {
        self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Pops the last saved transform; a restore without a save is ignored.
    pub fn restore(&mut self) {
        if let Some(t) = self.saved.pop() {
            self.current = t;
        }
    }

    pub fn translate(&mut self, offset: DVec2) {
        self.current = self.current * DAffine2::from_translation(offset);
    }

    pub fn rotate(&mut self, radians: f64) {
        self.current = self.current * DAffine2::from_angle(radians);
    }

    /// Maps a local point to device space.
    pub fn apply(&self, p: DVec2) -> DVec2 {
        self.current.transform_point2(p)
    }

    /// Uniform scale of the current transform (1 for rigid motions).
    pub fn scale(&self) -> f64 {
        self.current.matrix2.determinant().abs().sqrt()
    }

    /// Back to identity with an empty stack, as after a canvas resize.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn translate_then_rotate_matches_canvas_order() {
        let mut t = TransformStack::default();
        t.translate(DVec2::new(10.0, 5.0));
        t.rotate(FRAC_PI_2);
        // Local +x becomes device +y after a quarter turn, then offset.
        assert!(close(t.apply(DVec2::X), DVec2::new(10.0, 6.0)));
    }

    #[test]
    fn restore_returns_to_saved_transform() {
        let mut t = TransformStack::default();
        t.save();
        t.translate(DVec2::splat(3.0));
        t.restore();
        assert!(close(t.apply(DVec2::ZERO), DVec2::ZERO));
        assert_eq!(t.depth(), 0);
    }

    #[test]
    fn unbalanced_restore_is_ignored() {
        let mut t = TransformStack::default();
        t.translate(DVec2::X);
        t.restore();
        assert!(close(t.apply(DVec2::ZERO), DVec2::X));
    }

    #[test]
    fn rigid_transform_has_unit_scale() {
        let mut t = TransformStack::default();
        t.translate(DVec2::new(4.0, 4.0));
        t.rotate(1.234);
        assert!((t.scale() - 1.0).abs() < 1e-12);
    }
}
