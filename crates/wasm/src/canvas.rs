//! [`Surface`] over a browser `CanvasRenderingContext2d`.

use backdrop_core::surface::{Font, Paint, Path, PathOp, Stroke, Surface};
use glam::DVec2;
use log::debug;
use std::f64::consts::TAU;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or("2d canvas context unavailable")?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Resizes the backing store. This also resets the context state.
    pub fn set_size(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn trace(&self, path: &Path) {
        self.ctx.begin_path();
        for op in path.ops() {
            match op {
                PathOp::MoveTo(p) => self.ctx.move_to(p.x, p.y),
                PathOp::LineTo(p) => self.ctx.line_to(p.x, p.y),
                PathOp::Close => self.ctx.close_path(),
                PathOp::Circle { center, radius } => {
                    self.ctx.move_to(center.x + radius, center.y);
                    // Only fails for a negative radius.
                    if let Err(e) = self.ctx.arc(center.x, center.y, *radius, 0.0, TAU) {
                        debug!("arc r={radius}: {e:?}");
                    }
                }
                PathOp::Rect { origin, size } => self.ctx.rect(origin.x, origin.y, size.x, size.y),
            }
        }
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> f64 {
        f64::from(self.canvas.width())
    }

    fn height(&self) -> f64 {
        f64::from(self.canvas.height())
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width(), self.height());
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, offset: DVec2) {
        if let Err(e) = self.ctx.translate(offset.x, offset.y) {
            debug!("translate {offset}: {e:?}");
        }
    }

    fn rotate(&mut self, radians: f64) {
        if let Err(e) = self.ctx.rotate(radians) {
            debug!("rotate {radians}: {e:?}");
        }
    }

    fn fill_path(&mut self, path: &Path, paint: Paint) {
        self.trace(path);
        #[allow(deprecated)]
        self.ctx.set_fill_style(&JsValue::from_str(&paint.color.to_css()));
        self.ctx.set_global_alpha(paint.alpha);
        self.ctx.fill();
        self.ctx.set_global_alpha(1.0);
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, stroke: Stroke) {
        #[allow(deprecated)]
        self.ctx.set_stroke_style(&JsValue::from_str(&stroke.color.to_css()));
        self.ctx.set_global_alpha(stroke.alpha);
        self.ctx.set_line_width(stroke.width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
        self.ctx.set_global_alpha(1.0);
    }

    fn fill_text(&mut self, text: &str, font: &Font, paint: Paint) {
        #[allow(deprecated)]
        self.ctx.set_fill_style(&JsValue::from_str(&paint.color.to_css()));
        self.ctx.set_global_alpha(paint.alpha);
        self.ctx.set_font(&font.css());
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        if let Err(e) = self.ctx.fill_text(text, 0.0, 0.0) {
            debug!("fill_text {text:?}: {e:?}");
        }
        self.ctx.set_global_alpha(1.0);
    }
}
