//! A single drifting, spinning particle.

use glam::DVec2;

use crate::color::Srgb;
use crate::config::FieldConfig;
use crate::pointer::Pointer;
use crate::prng::Xorshift64;
use crate::shape::Shape;
use crate::surface::{Font, Paint, Scoped, Surface};

/// One particle of the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: DVec2,
    origin: DVec2,
    size: f64,
    velocity: DVec2,
    angle: f64,
    spin: f64,
    shape: Shape,
    color: Srgb,
    opacity: f64,
}

impl Particle {
    /// Spawns a particle somewhere in `[0, bounds)`.
    ///
    /// Draw order from `rng` is fixed: position, size, velocity, angle,
    /// spin, shape (plus glyph), opacity.
    pub fn spawn(rng: &mut Xorshift64, bounds: DVec2, color: Srgb, config: &FieldConfig) -> Self {
        let position = DVec2::new(rng.next_f64() * bounds.x, rng.next_f64() * bounds.y);
        let size = rng.next_range(config.size_min, config.size_max);
        let velocity = DVec2::new(
            rng.next_signed(config.max_speed),
            rng.next_signed(config.max_speed),
        );
        let angle = rng.next_f64() * config.angle_max;
        let spin = rng.next_signed(config.max_spin);
        let shape = Shape::random(rng);
        let opacity = rng.next_range(config.opacity_min, config.opacity_max);
        Self {
            position,
            origin: position,
            size,
            velocity,
            angle,
            spin,
            shape,
            color,
            opacity,
        }
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Where the particle was spawned.
    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn spin(&self) -> f64 {
        self.spin
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn color(&self) -> Srgb {
        self.color
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub(crate) fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    pub(crate) fn set_color(&mut self, color: Srgb) {
        self.color = color;
    }

    /// Places the particle, e.g. for scripted scenes and tests.
    pub fn set_position(&mut self, position: DVec2) {
        self.position = position;
    }

    /// Advances one frame: spin, drift with wobble, pointer push, wrap.
    pub fn update(&mut self, bounds: DVec2, pointer: &Pointer, config: &FieldConfig) {
        self.angle += self.spin;
        let wobble = DVec2::new(self.angle.sin(), self.angle.cos()) * config.wobble;
        self.position += self.velocity + wobble;
        self.position -= pointer.push(self.position);
        self.position = wrap(self.position, bounds, config.wrap_margin);
    }

    /// Draws the particle at its position and rotation.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, config: &FieldConfig) {
        let mut scoped = Scoped::new(surface);
        scoped.translate(self.position);
        scoped.rotate(self.angle);
        let font = Font {
            size_px: self.size + config.glyph_padding,
            family: config.font_family.clone(),
        };
        let paint = Paint {
            color: self.color,
            alpha: self.opacity,
        };
        self.shape.draw(&mut *scoped, self.size, &font, paint);
    }
}

/// Teleports a position that left `[-margin, bounds + margin]` to the
/// opposite edge.
pub fn wrap(position: DVec2, bounds: DVec2, margin: f64) -> DVec2 {
    DVec2::new(
        wrap_axis(position.x, bounds.x, margin),
        wrap_axis(position.y, bounds.y, margin),
    )
}

fn wrap_axis(mut value: f64, extent: f64, margin: f64) -> f64 {
    if value < -margin {
        value = extent + margin;
    }
    if value > extent + margin {
        value = -margin;
    }
    value
}
