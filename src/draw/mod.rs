//! 2D drawing surface shared by every game
//!
//! Games paint through the [`Surface`] trait so the same render code drives
//! the browser canvas and the in-memory [`Recorder`] used by tests and the
//! native demo.

mod color;
mod recorder;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
mod canvas;

pub use color::Color;
pub use recorder::{DrawOp, Recorder};

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use glam::Vec2;
use std::f32::consts::TAU;

use crate::Rect;

/// One step of a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo { ctrl: Vec2, to: Vec2 },
    CubicTo { c1: Vec2, c2: Vec2, to: Vec2 },
    Arc { center: Vec2, radius: f32, start: f32, end: f32 },
    Close,
}

/// Path built from move/line/curve commands
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub cmds: Vec<PathCmd>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: Vec2) -> Self {
        self.cmds.push(PathCmd::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: Vec2) -> Self {
        self.cmds.push(PathCmd::LineTo(p));
        self
    }

    pub fn quad_to(mut self, ctrl: Vec2, to: Vec2) -> Self {
        self.cmds.push(PathCmd::QuadTo { ctrl, to });
        self
    }

    pub fn cubic_to(mut self, c1: Vec2, c2: Vec2, to: Vec2) -> Self {
        self.cmds.push(PathCmd::CubicTo { c1, c2, to });
        self
    }

    pub fn arc(mut self, center: Vec2, radius: f32, start: f32, end: f32) -> Self {
        self.cmds.push(PathCmd::Arc {
            center,
            radius: radius.max(0.0),
            start,
            end,
        });
        self
    }

    pub fn close(mut self) -> Self {
        self.cmds.push(PathCmd::Close);
        self
    }

    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::new().arc(center, radius, 0.0, TAU)
    }

    pub fn rect(rect: Rect) -> Self {
        Self::new()
            .move_to(Vec2::new(rect.x, rect.y))
            .line_to(Vec2::new(rect.right(), rect.y))
            .line_to(Vec2::new(rect.right(), rect.bottom()))
            .line_to(Vec2::new(rect.x, rect.bottom()))
            .close()
    }

    /// Open polyline through `points`
    pub fn polyline(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut path = Self::new();
        for (i, p) in points.into_iter().enumerate() {
            path = if i == 0 { path.move_to(p) } else { path.line_to(p) };
        }
        path
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }
}

/// Fill style
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Linear {
        from: Vec2,
        to: Vec2,
        stops: Vec<(f32, Color)>,
    },
    Radial {
        center: Vec2,
        inner: f32,
        outer: f32,
        stops: Vec<(f32, Color)>,
    },
}

impl Paint {
    /// Two-stop vertical gradient over `rect`
    pub fn vertical(rect: Rect, top: Color, bottom: Color) -> Self {
        Paint::Linear {
            from: Vec2::new(rect.x, rect.y),
            to: Vec2::new(rect.x, rect.bottom()),
            stops: vec![(0.0, top), (1.0, bottom)],
        }
    }
}

impl From<Color> for Paint {
    fn from(c: Color) -> Self {
        Paint::Solid(c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// Font settings for [`Surface::text`]. Text is vertically centered on its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
    pub align: TextAlign,
    pub bold: bool,
}

impl TextStyle {
    pub const fn new(size: f32, color: Color) -> Self {
        Self {
            size,
            color,
            align: TextAlign::Center,
            bold: false,
        }
    }

    pub const fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub const fn align(self, align: TextAlign) -> Self {
        Self { align, ..self }
    }

    pub fn font(&self) -> String {
        let weight = if self.bold { "bold " } else { "" };
        format!("{}{}px sans-serif", weight, self.size.round())
    }
}

/// Minimal 2D paint API
pub trait Surface {
    /// Surface size in CSS pixels
    fn size(&self) -> Vec2;

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, factor: Vec2);
    /// Multiplies into the current global alpha until `restore`
    fn set_alpha(&mut self, alpha: f32);

    fn fill_rect(&mut self, rect: Rect, paint: &Paint);
    fn fill_path(&mut self, path: &Path, paint: &Paint);
    fn stroke_path(&mut self, path: &Path, color: Color, width: f32);
    fn text(&mut self, text: &str, pos: Vec2, style: &TextStyle);

    fn fill(&mut self, paint: &Paint) {
        let size = self.size();
        self.fill_rect(Rect::new(0.0, 0.0, size.x, size.y), paint);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.fill_path(&Path::circle(center, radius), paint);
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, width: f32) {
        self.stroke_path(&Path::circle(center, radius), color, width);
    }

    fn line(&mut self, a: Vec2, b: Vec2, color: Color, width: f32) {
        self.stroke_path(&Path::new().move_to(a).line_to(b), color, width);
    }
}
