//! Particle shapes.
//!
//! Each particle is one of five shapes. Glyph particles carry the symbol
//! they render; the others are filled paths sized from the particle size.

use std::f64::consts::TAU;
use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::prng::Xorshift64;
use crate::surface::{Font, Paint, Path, Surface};

/// Digits and math symbols a glyph particle may show.
pub const GLYPHS: [char; 23] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'π', '∑', '∫', '√', '∞', '+', '-', '×', '÷',
    '=', '≈', '∂', '∆',
];

/// Number of shape kinds drawn from at spawn time.
pub const SHAPE_KINDS: usize = 5;

/// The drawable form of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Glyph(char),
    Hexagon,
}

impl Shape {
    /// Draws a shape uniformly from the five kinds.
    ///
    /// A glyph symbol is only drawn from `rng` when the glyph kind comes up.
    pub fn random(rng: &mut Xorshift64) -> Self {
        match rng.next_usize(SHAPE_KINDS) {
            0 => Shape::Circle,
            1 => Shape::Square,
            2 => Shape::Triangle,
            3 => Shape::Glyph(rng.pick(&GLYPHS).copied().unwrap_or('0')),
            _ => Shape::Hexagon,
        }
    }

    /// Short kind name, ignoring the glyph symbol.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Square => "square",
            Shape::Triangle => "triangle",
            Shape::Glyph(_) => "glyph",
            Shape::Hexagon => "hexagon",
        }
    }

    /// All kind names in spawn order.
    pub fn kinds() -> [&'static str; SHAPE_KINDS] {
        ["circle", "square", "triangle", "glyph", "hexagon"]
    }

    /// Local-space outline for a particle of the given size.
    ///
    /// Returns `None` for glyphs, which render as text.
    pub fn path(&self, size: f64) -> Option<Path> {
        match self {
            Shape::Circle => Some(Path::new().circle(DVec2::ZERO, size / 2.0)),
            Shape::Square => Some(
                Path::new().rect(DVec2::splat(-size / 2.0), DVec2::splat(size)),
            ),
            Shape::Triangle => {
                let s = size / 1.5;
                Some(Path::polygon([
                    DVec2::new(0.0, -s),
                    DVec2::new(s, s),
                    DVec2::new(-s, s),
                ]))
            }
            Shape::Hexagon => {
                let r = size / 1.2;
                Some(Path::polygon((0..6).map(|i| {
                    let theta = i as f64 * TAU / 6.0;
                    DVec2::new(r * theta.cos(), r * theta.sin())
                })))
            }
            Shape::Glyph(_) => None,
        }
    }

    /// Draws the shape at the local origin of `surface`.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, size: f64, font: &Font, paint: Paint) {
        match self {
            Shape::Glyph(symbol) => {
                let mut buf = [0u8; 4];
                surface.fill_text(symbol.encode_utf8(&mut buf), font, paint);
            }
            other => {
                if let Some(path) = other.path(size) {
                    surface.fill_path(&path, paint);
                }
            }
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Glyph(symbol) => write!(f, "glyph({symbol})"),
            other => f.write_str(other.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::DEFAULT_ACCENT;
    use crate::surface::{Command, PathOp, Recorder};

    fn font() -> Font {
        Font {
            size_px: 14.0,
            family: "monospace".into(),
        }
    }

    fn paint() -> Paint {
        Paint {
            color: DEFAULT_ACCENT,
            alpha: 0.3,
        }
    }

    #[test]
    fn random_covers_every_kind() {
        let mut rng = Xorshift64::new(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(Shape::random(&mut rng).kind());
        }
        assert_eq!(seen.len(), SHAPE_KINDS);
    }

    #[test]
    fn random_glyphs_come_from_symbol_set() {
        let mut rng = Xorshift64::new(9);
        for _ in 0..500 {
            if let Shape::Glyph(c) = Shape::random(&mut rng) {
                assert!(GLYPHS.contains(&c), "unexpected glyph {c}");
            }
        }
    }

    #[test]
    fn circle_radius_is_half_size() {
        let path = Shape::Circle.path(10.0).unwrap();
        assert_eq!(
            path.ops(),
            &[PathOp::Circle {
                center: DVec2::ZERO,
                radius: 5.0
            }]
        );
    }

    #[test]
    fn square_is_centered() {
        let path = Shape::Square.path(8.0).unwrap();
        assert_eq!(
            path.ops(),
            &[PathOp::Rect {
                origin: DVec2::splat(-4.0),
                size: DVec2::splat(8.0)
            }]
        );
    }

    #[test]
    fn triangle_points_up() {
        let path = Shape::Triangle.path(15.0).unwrap();
        assert_eq!(path.ops()[0], PathOp::MoveTo(DVec2::new(0.0, -10.0)));
        assert_eq!(path.ops()[1], PathOp::LineTo(DVec2::new(10.0, 10.0)));
        assert_eq!(path.ops()[2], PathOp::LineTo(DVec2::new(-10.0, 10.0)));
        assert_eq!(path.ops()[3], PathOp::Close);
    }

    #[test]
    fn hexagon_vertices_lie_on_radius() {
        let size = 12.0;
        let path = Shape::Hexagon.path(size).unwrap();
        let vertices: Vec<DVec2> = path
            .ops()
            .iter()
            .filter_map(|op| match op {
                PathOp::MoveTo(p) | PathOp::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0], DVec2::new(size / 1.2, 0.0));
        for v in vertices {
            assert!((v.length() - size / 1.2).abs() < 1e-9);
        }
    }

    #[test]
    fn glyph_has_no_path_and_draws_text() {
        assert!(Shape::Glyph('π').path(10.0).is_none());
        let mut rec = Recorder::new(10.0, 10.0);
        Shape::Glyph('π').draw(&mut rec, 10.0, &font(), paint());
        assert_eq!(
            rec.commands(),
            &[Command::FillText {
                text: "π".into(),
                font: font(),
                paint: paint(),
            }]
        );
    }

    #[test]
    fn display_includes_glyph_symbol() {
        assert_eq!(Shape::Glyph('∞').to_string(), "glyph(∞)");
        assert_eq!(Shape::Hexagon.to_string(), "hexagon");
    }

    #[test]
    fn serde_uses_snake_case_tags() {
        assert_eq!(serde_json::to_string(&Shape::Hexagon).unwrap(), "\"hexagon\"");
        assert_eq!(
            serde_json::to_string(&Shape::Glyph('=')).unwrap(),
            "{\"glyph\":\"=\"}"
        );
    }
}
