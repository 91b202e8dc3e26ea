//! The particle field: every particle on the canvas plus the state they share.
//!
//! A [`ParticleField`] owns its particles, the canvas size, the pointer and
//! the accent color. It is rebuilt wholesale when the canvas size settles;
//! no particle survives a rebuild.

use glam::DVec2;
use log::debug;
use serde::Serialize;

use crate::color::Srgb;
use crate::config::{AccentPolicy, FieldConfig};
use crate::error::BackdropError;
use crate::particle::Particle;
use crate::pointer::Pointer;
use crate::prng::Xorshift64;
use crate::shape::Shape;
use crate::surface::{Scoped, Stroke, Surface};

/// A line between two particles, by index, with its stroke alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub alpha: f64,
}

/// Number of particles for a `width` x `height` canvas.
pub fn particle_count(width: f64, height: f64, density_divisor: f64) -> usize {
    let area = width.max(0.0) * height.max(0.0);
    (area / density_divisor).floor() as usize
}

/// All particles of one canvas, with pointer and accent state.
#[derive(Debug, Clone)]
pub struct ParticleField {
    width: f64,
    height: f64,
    particles: Vec<Particle>,
    pointer: Pointer,
    accent: Srgb,
    config: FieldConfig,
    rng: Xorshift64,
}

impl ParticleField {
    /// Creates and populates a field for a `width` x `height` canvas.
    pub fn new(
        width: f64,
        height: f64,
        accent: Srgb,
        config: FieldConfig,
        rng: Xorshift64,
    ) -> Result<Self, BackdropError> {
        config.validate()?;
        let mut field = Self {
            width: 0.0,
            height: 0.0,
            particles: Vec::new(),
            pointer: Pointer::new(config.repulsion_radius, config.repulsion_strength),
            accent,
            config,
            rng,
        };
        field.resize(width, height);
        field.rebuild();
        Ok(field)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn bounds(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access for scripted scenes; positions are re-wrapped on the
    /// next update.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn accent(&self) -> Srgb {
        self.accent
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Updates the canvas size without touching particles.
    ///
    /// Negative or non-finite sizes are treated as zero. Call
    /// [`rebuild`](Self::rebuild) once the size has settled to respawn at
    /// the right density.
    pub fn resize(&mut self, width: f64, height: f64) {
        let sanitize = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.width = sanitize(width);
        self.height = sanitize(height);
        debug!("canvas resized to {}x{}", self.width, self.height);
    }

    /// Replaces every particle with a fresh set sized to the canvas.
    ///
    /// Every `hexagon_every`-th particle (by creation index, starting at 0)
    /// is forced to a hexagon after its random shape draw.
    pub fn rebuild(&mut self) {
        let count = particle_count(self.width, self.height, self.config.density_divisor);
        let bounds = self.bounds();
        let every = self.config.hexagon_every;
        self.particles = (0..count)
            .map(|i| {
                let mut p = Particle::spawn(&mut self.rng, bounds, self.accent, &self.config);
                if every > 0 && i % every == 0 {
                    p.set_shape(Shape::Hexagon);
                }
                p
            })
            .collect();
        debug!(
            "rebuilt field with {} particles for {}x{}",
            count, self.width, self.height
        );
    }

    /// Records a pointer move in canvas coordinates.
    pub fn pointer_moved(&mut self, position: DVec2) {
        self.pointer.move_to(position);
    }

    /// Sets the accent used for new particles and for links.
    ///
    /// Existing particles are recolored only under [`AccentPolicy::Follow`].
    pub fn set_accent(&mut self, accent: Srgb) {
        self.accent = accent;
        if self.config.accent_policy == AccentPolicy::Follow {
            for p in &mut self.particles {
                p.set_color(accent);
            }
        }
    }

    /// Advances every particle by one frame without drawing.
    pub fn step(&mut self) {
        let bounds = self.bounds();
        for p in &mut self.particles {
            p.update(bounds, &self.pointer, &self.config);
        }
    }

    /// Clears the surface, then advances and draws every particle in order,
    /// then draws the links.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        surface.clear();
        let bounds = self.bounds();
        for p in &mut self.particles {
            p.update(bounds, &self.pointer, &self.config);
            p.draw(surface, &self.config);
        }
        self.draw_links(surface);
    }

    /// Clears the surface and draws the current state without advancing it.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.clear();
        for p in &self.particles {
            p.draw(surface, &self.config);
        }
        self.draw_links(surface);
    }

    /// Squared-distance cutoff below which two particles are linked.
    pub fn link_threshold(&self) -> f64 {
        let d = self.config.link_divisor;
        (self.width / d) * (self.height / d)
    }

    /// Every distinct pair close enough to be linked, with positive alpha.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        let threshold = self.link_threshold();
        let falloff = self.config.link_falloff;
        let scale = self.config.link_alpha;
        let particles = &self.particles;
        particles.iter().enumerate().flat_map(move |(a, pa)| {
            particles[a + 1..]
                .iter()
                .enumerate()
                .filter_map(move |(offset, pb)| {
                    let d2 = pa.position().distance_squared(pb.position());
                    if d2 >= threshold {
                        return None;
                    }
                    let opacity = 1.0 - d2 / falloff;
                    (opacity > 0.0).then_some(Link {
                        a,
                        b: a + 1 + offset,
                        alpha: opacity * scale,
                    })
                })
        })
    }

    /// Strokes every link in the current accent.
    pub fn draw_links<S: Surface + ?Sized>(&self, surface: &mut S) {
        let mut scoped = Scoped::new(surface);
        for link in self.links() {
            let stroke = Stroke {
                color: self.accent,
                alpha: link.alpha,
                width: self.config.line_width,
            };
            scoped.stroke_line(
                self.particles[link.a].position(),
                self.particles[link.b].position(),
                stroke,
            );
        }
    }
}
