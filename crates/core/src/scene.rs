//! The `Scene` trait an animation driver advances frame by frame.
//!
//! The trait is object-safe so hosts can hold a `Box<dyn Scene>`.

use crate::field::ParticleField;
use crate::surface::Surface;

/// Something that advances and redraws itself once per frame.
pub trait Scene {
    /// Advance one frame and redraw onto `surface`.
    fn tick(&mut self, surface: &mut dyn Surface);

    /// Apply a new canvas size immediately.
    fn resize(&mut self, width: f64, height: f64);

    /// Rebuild scene contents for the current size.
    fn rebuild(&mut self);
}

impl Scene for ParticleField {
    fn tick(&mut self, surface: &mut dyn Surface) {
        ParticleField::tick(self, surface);
    }

    fn resize(&mut self, width: f64, height: f64) {
        ParticleField::resize(self, width, height);
    }

    fn rebuild(&mut self) {
        ParticleField::rebuild(self);
    }
}
