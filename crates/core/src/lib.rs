#![deny(unsafe_code)]
//! Core model for the backdrop animated particle background.
//!
//! Provides the `ParticleField` simulation (drift, pointer repulsion, wrap,
//! pairwise links), the `Shape` sum type, the `Surface` drawing trait with a
//! scoped save/restore guard, the `Animator` frame driver with a stop
//! handle and resize settling, theme persistence, page reveal helpers,
//! `FieldConfig`, colors, and the `Xorshift64` PRNG.

pub mod color;
pub mod config;
pub mod driver;
pub mod error;
pub mod field;
pub mod page;
pub mod params;
pub mod particle;
pub mod pointer;
pub mod prng;
pub mod scene;
pub mod shape;
pub mod surface;
pub mod theme;

pub use color::{Srgb, DEFAULT_ACCENT};
pub use config::{AccentPolicy, FieldConfig};
pub use driver::{Animator, DriverState, FrameOutcome, ResizeSettler, StopHandle};
pub use error::BackdropError;
pub use field::{Link, ParticleField};
pub use particle::Particle;
pub use pointer::Pointer;
pub use prng::Xorshift64;
pub use scene::Scene;
pub use shape::Shape;
pub use surface::{Font, Paint, Path, PathOp, Recorder, Scoped, Stroke, Surface};
pub use theme::{Icon, Theme, ThemeStore, ThemeToggle};
