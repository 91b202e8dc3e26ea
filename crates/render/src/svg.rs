//! SVG document surface.
//!
//! Fills and text carry the current transform as a `matrix(...)` attribute;
//! lines are mapped to device space up front so their stroke width is not
//! scaled.

use std::fmt::Write as _;

use backdrop_core::color::Srgb;
use backdrop_core::surface::{Font, Paint, Path, PathOp, Stroke, Surface};
use glam::{DAffine2, DVec2};

use crate::transform::TransformStack;

/// Accumulates SVG elements for one frame.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    background: Option<Srgb>,
    elements: Vec<String>,
    transform: TransformStack,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64, background: Option<Srgb>) -> Self {
        let mut surface = Self {
            width,
            height,
            background,
            elements: Vec::new(),
            transform: TransformStack::default(),
        };
        surface.clear();
        surface
    }

    /// Elements drawn since the last clear, background included.
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// The complete document.
    pub fn finish(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = num(self.width),
            h = num(self.height),
        );
        for element in &self.elements {
            out.push_str("  ");
            out.push_str(element);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        out
    }

    fn matrix_attr(&self) -> String {
        let t = self.transform.current();
        if t == DAffine2::IDENTITY {
            return String::new();
        }
        let m = t.matrix2;
        format!(
            r#" transform="matrix({} {} {} {} {} {})""#,
            num(m.x_axis.x),
            num(m.x_axis.y),
            num(m.y_axis.x),
            num(m.y_axis.y),
            num(t.translation.x),
            num(t.translation.y),
        )
    }
}

/// Formats a coordinate with at most three decimals and no trailing zeros.
fn num(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Path data for `path`, with circles as two half arcs.
fn path_data(path: &Path) -> String {
    let mut d = String::new();
    for op in path.ops() {
        if !d.is_empty() {
            d.push(' ');
        }
        match op {
            PathOp::MoveTo(p) => {
                let _ = write!(d, "M{} {}", num(p.x), num(p.y));
            }
            PathOp::LineTo(p) => {
                let _ = write!(d, "L{} {}", num(p.x), num(p.y));
            }
            PathOp::Close => d.push('Z'),
            PathOp::Circle { center, radius } => {
                let r = num(*radius);
                let _ = write!(
                    d,
                    "M{} {} A{r} {r} 0 1 0 {} {} A{r} {r} 0 1 0 {} {} Z",
                    num(center.x - radius),
                    num(center.y),
                    num(center.x + radius),
                    num(center.y),
                    num(center.x - radius),
                    num(center.y),
                );
            }
            PathOp::Rect { origin, size } => {
                let _ = write!(
                    d,
                    "M{} {} h{} v{} h{} Z",
                    num(origin.x),
                    num(origin.y),
                    num(size.x),
                    num(size.y),
                    num(-size.x),
                );
            }
        }
    }
    d
}

impl Surface for SvgSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self) {
        self.elements.clear();
        if let Some(bg) = self.background {
            self.elements.push(format!(
                r#"<rect width="{}" height="{}" fill="{}"/>"#,
                num(self.width),
                num(self.height),
                bg.to_hex(),
            ));
        }
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
        if path.is_empty() || paint.alpha <= 0.0 {
            return;
        }
        let element = format!(
            r#"<path d="{}" fill="{}" fill-opacity="{}"{}/>"#,
            path_data(path),
            paint.color.to_hex(),
            num(paint.alpha),
            self.matrix_attr(),
        );
        self.elements.push(element);
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, stroke: Stroke) {
        if stroke.alpha <= 0.0 {
            return;
        }
        let a = self.transform.apply(from);
        let b = self.transform.apply(to);
        let element = format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-opacity="{}" stroke-width="{}"/>"#,
            num(a.x),
            num(a.y),
            num(b.x),
            num(b.y),
            stroke.color.to_hex(),
            num(stroke.alpha),
            num(stroke.width * self.transform.scale()),
        );
        self.elements.push(element);
    }

    fn fill_text(&mut self, text: &str, font: &Font, paint: Paint) {
        if paint.alpha <= 0.0 {
            return;
        }
        let element = format!(
            r#"<text x="0" y="0" font-family="{}" font-size="{}" text-anchor="middle" dominant-baseline="central" fill="{}" fill-opacity="{}"{}>{}</text>"#,
            escape(&font.family),
            num(font.size_px),
            paint.color.to_hex(),
            num(paint.alpha),
            self.matrix_attr(),
            escape(text),
        );
        self.elements.push(element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_core::color::DEFAULT_ACCENT;
    use std::f64::consts::FRAC_PI_2;

    fn paint() -> Paint {
        Paint {
            color: DEFAULT_ACCENT,
            alpha: 0.5,
        }
    }

    #[test]
    fn num_trims_trailing_zeros() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(0.25), "0.25");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(2.12345), "2.123");
    }

    #[test]
    fn clear_emits_background_rect() {
        let svg = SvgSurface::new(10.0, 20.0, Some(Srgb::from_rgb8(0xfa, 0xfa, 0xfa)));
        assert_eq!(svg.elements().len(), 1);
        assert!(svg.elements()[0].contains(r##"fill="#fafafa""##));
        let bare = SvgSurface::new(10.0, 20.0, None);
        assert!(bare.elements().is_empty());
    }

    #[test]
    fn fill_carries_transform_matrix() {
        let mut svg = SvgSurface::new(100.0, 100.0, None);
        svg.translate(DVec2::new(30.0, 40.0));
        svg.rotate(FRAC_PI_2);
        svg.fill_path(&Path::new().rect(DVec2::ZERO, DVec2::ONE), paint());
        let el = &svg.elements()[0];
        assert!(el.contains(r#"transform="matrix(0 1 -1 0 30 40)""#), "{el}");
        assert!(el.contains(r#"fill-opacity="0.5""#));
    }

    #[test]
    fn untransformed_fill_has_no_matrix() {
        let mut svg = SvgSurface::new(10.0, 10.0, None);
        svg.fill_path(&Path::new().circle(DVec2::splat(5.0), 2.0), paint());
        let el = &svg.elements()[0];
        assert!(!el.contains("transform"));
        assert!(el.contains("M3 5 A2 2 0 1 0 7 5"), "{el}");
    }

    #[test]
    fn lines_are_in_device_space() {
        let mut svg = SvgSurface::new(100.0, 100.0, None);
        svg.translate(DVec2::new(10.0, 0.0));
        let stroke = Stroke {
            color: DEFAULT_ACCENT,
            alpha: 0.2,
            width: 1.0,
        };
        svg.stroke_line(DVec2::ZERO, DVec2::new(5.0, 5.0), stroke);
        let el = &svg.elements()[0];
        assert!(el.contains(r#"x1="10" y1="0" x2="15" y2="5""#), "{el}");
        assert!(el.contains(r#"stroke-width="1""#));
    }

    #[test]
    fn text_is_escaped_and_centered() {
        let mut svg = SvgSurface::new(10.0, 10.0, None);
        let font = Font {
            size_px: 12.0,
            family: "monospace".into(),
        };
        svg.fill_text("<>", &font, paint());
        let el = &svg.elements()[0];
        assert!(el.contains("&lt;&gt;</text>"));
        assert!(el.contains(r#"text-anchor="middle""#));
        assert!(el.contains(r#"dominant-baseline="central""#));
    }

    #[test]
    fn invisible_paint_is_skipped() {
        let mut svg = SvgSurface::new(10.0, 10.0, None);
        let clear = Paint {
            color: DEFAULT_ACCENT,
            alpha: 0.0,
        };
        svg.fill_path(&Path::new().rect(DVec2::ZERO, DVec2::ONE), clear);
        assert!(svg.elements().is_empty());
    }

    #[test]
    fn finish_wraps_document() {
        let mut svg = SvgSurface::new(64.0, 32.0, None);
        svg.fill_path(&Path::new().rect(DVec2::ZERO, DVec2::ONE), paint());
        let doc = svg.finish();
        assert!(doc.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"64\" height=\"32\""));
        assert!(doc.trim_end().ends_with("</svg>"));
        assert_eq!(doc.matches("<path").count(), 1);
    }
}
