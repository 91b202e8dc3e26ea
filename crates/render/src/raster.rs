//! CPU rasterizer implementing [`Surface`] on an RGBA buffer.
//!
//! Paths are flattened to polygons in device space and filled with the
//! nonzero rule, sampling each pixel at its center (no anti-aliasing).
//! Lines are filled as quads of the stroke width. Text has no font
//! rasterizer behind it: a glyph renders as a disc of [`GLYPH_DISC_RATIO`]
//! times the font size, which keeps its position, color and alpha visible
//! in snapshots.
//!
//! Pixels are stored premultiplied and blended source-over.

use std::f64::consts::TAU;

use backdrop_core::color::Srgb;
use backdrop_core::error::BackdropError;
use backdrop_core::surface::{Font, Paint, Path, PathOp, Stroke, Surface};
use glam::DVec2;

use crate::transform::TransformStack;

/// Segments used to flatten a full circle.
const CIRCLE_SEGMENTS: usize = 32;

/// Radius of a glyph's stand-in disc relative to its font size.
pub const GLYPH_DISC_RATIO: f64 = 0.3;

/// Largest accepted side, keeping `width * height * 4` well inside `usize`.
pub const MAX_SIDE: usize = 1 << 15;

/// RGBA raster with a transform stack.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: usize,
    height: usize,
    background: Option<Srgb>,
    /// Premultiplied RGBA per pixel.
    pixels: Vec<[f64; 4]>,
    transform: TransformStack,
}

impl RasterSurface {
    /// Creates a surface. `clear` fills with `background`, or with
    /// transparent black when it is `None`.
    pub fn new(width: usize, height: usize, background: Option<Srgb>) -> Result<Self, BackdropError> {
        if width > MAX_SIDE || height > MAX_SIDE {
            return Err(BackdropError::InvalidDimensions { width, height });
        }
        let mut surface = Self {
            width,
            height,
            background,
            pixels: vec![[0.0; 4]; width * height],
            transform: TransformStack::default(),
        };
        surface.clear();
        Ok(surface)
    }

    pub fn pixel_width(&self) -> usize {
        self.width
    }

    pub fn pixel_height(&self) -> usize {
        self.height
    }

    /// Straight-alpha RGBA of one pixel, or `None` outside the surface.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[f64; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let [r, g, b, a] = self.pixels[y * self.width + x];
        if a <= 0.0 {
            return Some([0.0; 4]);
        }
        Some([r / a, g / a, b / a, a])
    }

    /// Straight-alpha RGBA8 buffer, row-major, `width * height * 4` bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        self.pixels
            .iter()
            .flat_map(|&[r, g, b, a]| {
                if a <= 0.0 {
                    [0, 0, 0, 0]
                } else {
                    [q(r / a), q(g / a), q(b / a), q(a)]
                }
            })
            .collect()
    }

    /// Number of pixels with any coverage, ignoring the background.
    pub fn painted_pixels(&self) -> usize {
        let base = self.background_pixel();
        self.pixels.iter().filter(|p| **p != base).count()
    }

    fn background_pixel(&self) -> [f64; 4] {
        match self.background {
            Some(c) => [c.r, c.g, c.b, 1.0],
            None => [0.0; 4],
        }
    }

    fn blend(&mut self, x: usize, y: usize, color: Srgb, alpha: f64) {
        let a = alpha.clamp(0.0, 1.0);
        let px = &mut self.pixels[y * self.width + x];
        let keep = 1.0 - a;
        px[0] = color.r * a + px[0] * keep;
        px[1] = color.g * a + px[1] * keep;
        px[2] = color.b * a + px[2] * keep;
        px[3] = a + px[3] * keep;
    }

    /// Flattens a path into closed device-space polygons.
    fn flatten(&self, path: &Path) -> Vec<Vec<DVec2>> {
        let mut polygons = Vec::new();
        let mut current: Vec<DVec2> = Vec::new();
        let flush = |poly: &mut Vec<DVec2>, out: &mut Vec<Vec<DVec2>>| {
            if poly.len() >= 3 {
                out.push(std::mem::take(poly));
            } else {
                poly.clear();
            }
        };
        for op in path.ops() {
            match op {
                PathOp::MoveTo(p) => {
                    flush(&mut current, &mut polygons);
                    current.push(self.transform.apply(*p));
                }
                PathOp::LineTo(p) => current.push(self.transform.apply(*p)),
                PathOp::Close => flush(&mut current, &mut polygons),
                PathOp::Circle { center, radius } => {
                    flush(&mut current, &mut polygons);
                    let ring = (0..CIRCLE_SEGMENTS)
                        .map(|i| {
                            let t = i as f64 * TAU / CIRCLE_SEGMENTS as f64;
                            self.transform
                                .apply(*center + DVec2::new(t.cos(), t.sin()) * *radius)
                        })
                        .collect();
                    polygons.push(ring);
                }
                PathOp::Rect { origin, size } => {
                    flush(&mut current, &mut polygons);
                    let corners = [
                        *origin,
                        *origin + DVec2::new(size.x, 0.0),
                        *origin + *size,
                        *origin + DVec2::new(0.0, size.y),
                    ];
                    polygons.push(corners.iter().map(|c| self.transform.apply(*c)).collect());
                }
            }
        }
        flush(&mut current, &mut polygons);
        polygons
    }

    /// Nonzero scanline fill of device-space polygons.
    fn fill_polygons(&mut self, polygons: &[Vec<DVec2>], color: Srgb, alpha: f64) {
        if polygons.is_empty() || self.width == 0 || self.height == 0 || alpha <= 0.0 {
            return;
        }
        let (min_y, max_y) = polygons
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        if !min_y.is_finite() || !max_y.is_finite() {
            return;
        }
        let row_start = min_y.floor().max(0.0) as usize;
        let row_end = (max_y.ceil().max(0.0) as usize).min(self.height);
        let mut crossings: Vec<(f64, i32)> = Vec::new();
        for row in row_start..row_end {
            let sy = row as f64 + 0.5;
            crossings.clear();
            for poly in polygons {
                for (i, a) in poly.iter().enumerate() {
                    let b = poly[(i + 1) % poly.len()];
                    if (a.y <= sy) == (b.y <= sy) {
                        continue;
                    }
                    let t = (sy - a.y) / (b.y - a.y);
                    let dir = if b.y > a.y { 1 } else { -1 };
                    crossings.push((a.x + t * (b.x - a.x), dir));
                }
            }
            crossings.sort_by(|l, r| l.0.total_cmp(&r.0));
            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding == 0 {
                    continue;
                }
                // Pixel centers x + 0.5 inside [x0, x1).
                let x0 = (pair[0].0 - 0.5).ceil().max(0.0) as usize;
                let x1 = ((pair[1].0 - 0.5).ceil().max(0.0) as usize).min(self.width);
                for x in x0..x1 {
                    self.blend(x, row, color, alpha);
                }
            }
        }
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> f64 {
        self.width as f64
    }

    fn height(&self) -> f64 {
        self.height as f64
    }

    fn clear(&mut self) {
        let base = self.background_pixel();
        self.pixels.fill(base);
    }

    fn save(&mut self) {
        self.transform.save();
    }

    fn restore(&mut self) {
        self.transform.restore();
    }

    fn translate(&mut self, offset: DVec2) {
        self.transform.translate(offset);
    }

    fn rotate(&mut self, radians: f64) {
        self.transform.rotate(radians);
    }

    fn fill_path(&mut self, path: &Path, paint: Paint) {
        let polygons = self.flatten(path);
        self.fill_polygons(&polygons, paint.color, paint.alpha);
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, stroke: Stroke) {
        let a = self.transform.apply(from);
        let b = self.transform.apply(to);
        let along = b - a;
        if along.length_squared() == 0.0 {
            return;
        }
        let half = stroke.width * self.transform.scale() / 2.0;
        let normal = along.perp().normalize() * half;
        let quad = vec![a + normal, b + normal, b - normal, a - normal];
        self.fill_polygons(&[quad], stroke.color, stroke.alpha);
    }

    fn fill_text(&mut self, _text: &str, font: &Font, paint: Paint) {
        let disc = Path::new().circle(DVec2::ZERO, font.size_px * GLYPH_DISC_RATIO);
        self.fill_path(&disc, paint);
    }
}
