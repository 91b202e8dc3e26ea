//! PNG output of a [`RasterSurface`].
//!
//! Feature-gated behind `png` (default on) so hosts that only need the
//! surfaces do not pull in the `image` crate.

use std::path::Path;

use backdrop_core::error::BackdropError;

use crate::raster::RasterSurface;

/// Writes the surface as an RGBA PNG.
///
/// Returns `BackdropError::InvalidDimensions` if a side overflows `u32`,
/// or `BackdropError::Io` on write failure.
pub fn write_png(surface: &RasterSurface, path: &Path) -> Result<(), BackdropError> {
    let (width, height) = (surface.pixel_width(), surface.pixel_height());
    let invalid = || BackdropError::InvalidDimensions { width, height };
    let w = u32::try_from(width).map_err(|_| invalid())?;
    let h = u32::try_from(height).map_err(|_| invalid())?;
    let img = image::RgbaImage::from_raw(w, h, surface.to_rgba8())
        .ok_or_else(|| BackdropError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| BackdropError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_core::color::{Srgb, DEFAULT_ACCENT};
    use backdrop_core::surface::{Paint, Path as ShapePath, Surface};
    use glam::DVec2;

    #[test]
    fn write_png_round_trip() {
        let mut surface = RasterSurface::new(16, 8, Some(Srgb::from_rgb8(0xfa, 0xfa, 0xfa))).unwrap();
        surface.fill_path(
            &ShapePath::new().rect(DVec2::ZERO, DVec2::splat(4.0)),
            Paint {
                color: DEFAULT_ACCENT,
                alpha: 1.0,
            },
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        write_png(&surface, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 8);
        assert_eq!(img.get_pixel(1, 1).0, [220, 20, 60, 255]);
        assert_eq!(img.get_pixel(10, 6).0, [250, 250, 250, 255]);
    }

    #[test]
    fn write_png_to_missing_directory_is_io_error() {
        let surface = RasterSurface::new(2, 2, None).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        assert!(matches!(write_png(&surface, &path), Err(BackdropError::Io(_))));
    }
}
