//! In-memory surface that records draw calls

use glam::Vec2;

use super::{Color, Paint, Path, Surface, TextStyle};
use crate::Rect;

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f32),
    Scale(Vec2),
    Alpha(f32),
    FillRect(Rect, Paint),
    FillPath(Path, Paint),
    StrokePath(Path, Color, f32),
    Text(String, Vec2),
}

/// Headless [`Surface`] used by tests and the native demo
#[derive(Debug, Clone)]
pub struct Recorder {
    size: Vec2,
    pub ops: Vec<DrawOp>,
    depth: usize,
}

impl Recorder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            ops: Vec::new(),
            depth: 0,
        }
    }

    /// Drop recorded ops (keeps the size)
    pub fn reset(&mut self) {
        self.ops.clear();
        self.depth = 0;
    }

    /// All text strings drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(s, _) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    /// Number of fill operations (rects and paths)
    pub fn fill_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect(..) | DrawOp::FillPath(..)))
            .count()
    }

    /// True when every `save` was matched by a `restore`
    pub fn is_balanced(&self) -> bool {
        self.depth == 0
    }
}

impl Surface for Recorder {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn save(&mut self) {
        self.depth += 1;
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.ops.push(DrawOp::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.ops.push(DrawOp::Translate(offset));
    }

    fn rotate(&mut self, radians: f32) {
        self.ops.push(DrawOp::Rotate(radians));
    }

    fn scale(&mut self, factor: Vec2) {
        self.ops.push(DrawOp::Scale(factor));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ops.push(DrawOp::Alpha(alpha));
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        self.ops.push(DrawOp::FillRect(rect, paint.clone()));
    }

    fn fill_path(&mut self, path: &Path, paint: &Paint) {
        self.ops.push(DrawOp::FillPath(path.clone(), paint.clone()));
    }

    fn stroke_path(&mut self, path: &Path, color: Color, width: f32) {
        self.ops.push(DrawOp::StrokePath(path.clone(), color, width));
    }

    fn text(&mut self, text: &str, pos: Vec2, _style: &TextStyle) {
        self.ops.push(DrawOp::Text(text.to_string(), pos));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_and_balances() {
        let mut r = Recorder::new(800.0, 600.0);
        r.save();
        r.fill(&Paint::Solid(Color::WHITE));
        r.text("hi", Vec2::ZERO, &TextStyle::new(12.0, Color::BLACK));
        assert!(!r.is_balanced());
        r.restore();
        assert!(r.is_balanced());
        assert_eq!(r.fill_count(), 1);
        assert_eq!(r.texts(), vec!["hi"]);
        assert!(matches!(r.ops[1], DrawOp::FillRect(rect, _) if rect.w == 800.0));
    }
}
