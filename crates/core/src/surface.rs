//! The drawing-surface abstraction the field renders through.
//!
//! A [`Surface`] mirrors the subset of the canvas 2D context the backdrop
//! needs: a save/restore state stack, translate/rotate, filled paths,
//! stroked lines and filled text. Backends live elsewhere (browser canvas in
//! `backdrop-wasm`, raster and SVG in `backdrop-render`); [`Recorder`] keeps
//! the calls in memory for tests.
//!
//! Transform changes must always be undone. [`Scoped`] pairs `save` with a
//! `restore` in its `Drop`, so every exit path of a draw call restores state.

use std::ops::{Deref, DerefMut};

use glam::DVec2;

use crate::color::Srgb;

/// One drawing command of a [`Path`].
#[derive(Debug, Clone, PartialEq)]
pub enum PathOp {
    MoveTo(DVec2),
    LineTo(DVec2),
    /// Full circle around `center`.
    Circle { center: DVec2, radius: f64 },
    /// Axis-aligned rectangle with top-left `origin`.
    Rect { origin: DVec2, size: DVec2 },
    Close,
}

/// A sequence of path commands in the current (local) coordinate space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    ops: Vec<PathOp>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: DVec2) -> Self {
        self.ops.push(PathOp::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: DVec2) -> Self {
        self.ops.push(PathOp::LineTo(p));
        self
    }

    pub fn circle(mut self, center: DVec2, radius: f64) -> Self {
        self.ops.push(PathOp::Circle { center, radius });
        self
    }

    pub fn rect(mut self, origin: DVec2, size: DVec2) -> Self {
        self.ops.push(PathOp::Rect { origin, size });
        self
    }

    pub fn close(mut self) -> Self {
        self.ops.push(PathOp::Close);
        self
    }

    /// A closed polygon through `points`.
    pub fn polygon(points: impl IntoIterator<Item = DVec2>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::new();
        };
        points.fold(Self::new().move_to(first), Path::line_to).close()
    }

    pub fn ops(&self) -> &[PathOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Fill color with its alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Srgb,
    pub alpha: f64,
}

/// Stroke color, alpha and width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Srgb,
    pub alpha: f64,
    pub width: f64,
}

/// Font request for centered glyph text.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub size_px: f64,
    pub family: String,
}

impl Font {
    /// CSS shorthand, e.g. `"16px monospace"`.
    pub fn css(&self) -> String {
        format!("{}px {}", self.size_px, self.family)
    }
}

/// A 2D drawing target.
pub trait Surface {
    /// Surface width in pixels.
    fn width(&self) -> f64;

    /// Surface height in pixels.
    fn height(&self) -> f64;

    /// Clears every pixel to transparent (or to the backend's background).
    fn clear(&mut self);

    /// Pushes the current transform onto the state stack.
    fn save(&mut self);

    /// Pops the state stack. Unbalanced restores are ignored.
    fn restore(&mut self);

    fn translate(&mut self, offset: DVec2);

    fn rotate(&mut self, radians: f64);

    fn fill_path(&mut self, path: &Path, paint: Paint);

    fn stroke_line(&mut self, from: DVec2, to: DVec2, stroke: Stroke);

    /// Draws `text` centered on the local origin, both horizontally and
    /// vertically.
    fn fill_text(&mut self, text: &str, font: &Font, paint: Paint);
}

/// Saved surface state that restores itself when dropped.
pub struct Scoped<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: Surface + ?Sized> Scoped<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        surface.save();
        Self { surface }
    }
}

impl<S: Surface + ?Sized> Deref for Scoped<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for Scoped<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for Scoped<'_, S> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

/// A recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Clear,
    Save,
    Restore,
    Translate(DVec2),
    Rotate(f64),
    FillPath(Path, Paint),
    StrokeLine {
        from: DVec2,
        to: DVec2,
        stroke: Stroke,
    },
    FillText {
        text: String,
        font: Font,
        paint: Paint,
    },
}

/// In-memory surface that records every call.
#[derive(Debug, Clone)]
pub struct Recorder {
    width: f64,
    height: f64,
    commands: Vec<Command>,
}

impl Recorder {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drops everything recorded so far.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Number of line strokes recorded.
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::StrokeLine { .. }))
            .count()
    }

    /// Running save depth; zero when every save was matched.
    pub fn save_depth(&self) -> isize {
        self.commands.iter().fold(0, |depth, c| match c {
            Command::Save => depth + 1,
            Command::Restore => depth - 1,
            _ => depth,
        })
    }
}

impl Surface for Recorder {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self) {
        self.commands.push(Command::Clear);
    }

    fn save(&mut self) {
        self.commands.push(Command::Save);
    }

    fn restore(&mut self) {
        self.commands.push(Command::Restore);
    }

    fn translate(&mut self, offset: DVec2) {
        self.commands.push(Command::Translate(offset));
    }

    fn rotate(&mut self, radians: f64) {
        self.commands.push(Command::Rotate(radians));
    }

    fn fill_path(&mut self, path: &Path, paint: Paint) {
        self.commands.push(Command::FillPath(path.clone(), paint));
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, stroke: Stroke) {
        self.commands.push(Command::StrokeLine { from, to, stroke });
    }

    fn fill_text(&mut self, text: &str, font: &Font, paint: Paint) {
        self.commands.push(Command::FillText {
            text: text.to_string(),
            font: font.clone(),
            paint,
        });
    }
}
