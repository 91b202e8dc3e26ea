#![deny(unsafe_code)]
//! Offline surfaces for the backdrop: an RGBA rasterizer and an SVG writer,
//! plus snapshot output of a [`ParticleField`].
//!
//! Both the CLI and tests render through this crate so the browser canvas is
//! not the only way to look at a frame.

pub mod raster;
pub mod svg;
pub mod transform;

#[cfg(feature = "png")]
pub mod snapshot;

use std::fmt;
use std::path::Path;

use backdrop_core::color::Srgb;
use backdrop_core::error::BackdropError;
use backdrop_core::field::ParticleField;
use log::debug;

pub use raster::{RasterSurface, MAX_SIDE};
pub use svg::SvgSurface;

/// Snapshot file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Png,
    Svg,
}

const FORMAT_NAMES: &[&str] = &["png", "svg"];

impl Format {
    /// Parses a format name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self, BackdropError> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Ok(Format::Png),
            "svg" => Ok(Format::Svg),
            _ => Err(BackdropError::UnknownFormat(name.to_string())),
        }
    }

    /// Infers the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_name(ext).ok()
    }

    pub fn list_formats() -> &'static [&'static str] {
        FORMAT_NAMES
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Svg => "svg",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Pixel size of a raster covering the field.
fn raster_size(field: &ParticleField) -> (usize, usize) {
    let side = |v: f64| if v.is_finite() && v > 0.0 { v.ceil() as usize } else { 0 };
    (side(field.width()), side(field.height()))
}

/// Draws the field's current state onto a fresh raster.
pub fn rasterize(field: &ParticleField, background: Option<Srgb>) -> Result<RasterSurface, BackdropError> {
    let (w, h) = raster_size(field);
    let mut surface = RasterSurface::new(w, h, background)?;
    field.render(&mut surface);
    Ok(surface)
}

/// Draws the field's current state as an SVG document.
pub fn to_svg(field: &ParticleField, background: Option<Srgb>) -> String {
    let mut surface = SvgSurface::new(field.width(), field.height(), background);
    field.render(&mut surface);
    surface.finish()
}

/// Renders the field and writes it to `path` in `format`.
pub fn write_snapshot(
    field: &ParticleField,
    background: Option<Srgb>,
    format: Format,
    path: &Path,
) -> Result<(), BackdropError> {
    debug!(
        "writing {format} snapshot of {} particles to {}",
        field.len(),
        path.display()
    );
    match format {
        Format::Svg => {
            std::fs::write(path, to_svg(field, background)).map_err(|e| BackdropError::Io(e.to_string()))
        }
        #[cfg(feature = "png")]
        Format::Png => snapshot::write_png(&rasterize(field, background)?, path),
        #[cfg(not(feature = "png"))]
        Format::Png => Err(BackdropError::UnknownFormat(
            "png (built without the `png` feature)".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_core::color::DEFAULT_ACCENT;
    use backdrop_core::config::FieldConfig;
    use backdrop_core::prng::Xorshift64;

    fn field(w: f64, h: f64) -> ParticleField {
        ParticleField::new(w, h, DEFAULT_ACCENT, FieldConfig::default(), Xorshift64::new(7)).unwrap()
    }

    #[test]
    fn from_name_accepts_known_formats() {
        assert_eq!(Format::from_name("png").unwrap(), Format::Png);
        assert_eq!(Format::from_name("SVG").unwrap(), Format::Svg);
        assert!(matches!(
            Format::from_name("gif"),
            Err(BackdropError::UnknownFormat(_))
        ));
    }

    #[test]
    fn from_path_uses_extension() {
        assert_eq!(Format::from_path(Path::new("out/frame.svg")), Some(Format::Svg));
        assert_eq!(Format::from_path(Path::new("frame.PNG")), Some(Format::Png));
        assert_eq!(Format::from_path(Path::new("frame")), None);
    }

    #[test]
    fn list_formats_matches_from_name() {
        for name in Format::list_formats() {
            assert_eq!(Format::from_name(name).unwrap().extension(), *name);
        }
    }

    #[test]
    fn rasterize_matches_field_size_and_paints() {
        let f = field(200.0, 150.0);
        let surface = rasterize(&f, None).unwrap();
        assert_eq!(surface.pixel_width(), 200);
        assert_eq!(surface.pixel_height(), 150);
        assert!(surface.painted_pixels() > 0);
    }

    #[test]
    fn empty_field_rasterizes_to_background_only() {
        let f = field(50.0, 50.0);
        assert!(f.is_empty());
        let surface = rasterize(&f, Some(Srgb::from_rgb8(0, 0, 0))).unwrap();
        assert_eq!(surface.painted_pixels(), 0);
    }

    #[test]
    fn svg_has_one_shape_per_particle() {
        let f = field(300.0, 300.0);
        let doc = to_svg(&f, None);
        let shapes = doc.matches("<path").count() + doc.matches("<text").count();
        assert_eq!(shapes, f.len());
    }

    #[test]
    fn write_snapshot_svg() {
        let f = field(120.0, 100.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.svg");
        write_snapshot(&f, None, Format::Svg, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("<svg"));
    }

    #[cfg(feature = "png")]
    #[test]
    fn write_snapshot_png() {
        let f = field(120.0, 100.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        write_snapshot(&f, None, Format::Png, &path).unwrap();
        assert!(path.exists());
    }
}
