//! Canvas 2D backend for [`Surface`]

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Color, Paint, Path, PathCmd, Surface, TextStyle};
use crate::Rect;

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    size: Vec2,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        ctx.set_text_baseline("middle");
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        Ok(Self {
            ctx,
            size: Vec2::new(canvas.width() as f32, canvas.height() as f32),
        })
    }

    /// Track a canvas resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = Vec2::new(width as f32, height as f32);
        // Resizing resets context state
        self.ctx.set_text_baseline("middle");
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
    }

    fn apply_fill(&self, paint: &Paint) {
        match paint {
            Paint::Solid(c) => self.ctx.set_fill_style_str(&c.css()),
            Paint::Linear { from, to, stops } => {
                let g = self.ctx.create_linear_gradient(
                    from.x as f64,
                    from.y as f64,
                    to.x as f64,
                    to.y as f64,
                );
                for (offset, color) in stops {
                    g.add_color_stop(*offset, &color.css()).ok();
                }
                self.ctx.set_fill_style_canvas_gradient(&g);
            }
            Paint::Radial {
                center,
                inner,
                outer,
                stops,
            } => {
                let Ok(g) = self.ctx.create_radial_gradient(
                    center.x as f64,
                    center.y as f64,
                    *inner as f64,
                    center.x as f64,
                    center.y as f64,
                    *outer as f64,
                ) else {
                    // Fall back to the first stop
                    let c = stops.first().map(|s| s.1).unwrap_or(Color::BLACK);
                    self.ctx.set_fill_style_str(&c.css());
                    return;
                };
                for (offset, color) in stops {
                    g.add_color_stop(*offset, &color.css()).ok();
                }
                self.ctx.set_fill_style_canvas_gradient(&g);
            }
        }
    }

    fn trace(&self, path: &Path) {
        self.ctx.begin_path();
        for cmd in &path.cmds {
            match *cmd {
                PathCmd::MoveTo(p) => self.ctx.move_to(p.x as f64, p.y as f64),
                PathCmd::LineTo(p) => self.ctx.line_to(p.x as f64, p.y as f64),
                PathCmd::QuadTo { ctrl, to } => self.ctx.quadratic_curve_to(
                    ctrl.x as f64,
                    ctrl.y as f64,
                    to.x as f64,
                    to.y as f64,
                ),
                PathCmd::CubicTo { c1, c2, to } => self.ctx.bezier_curve_to(
                    c1.x as f64,
                    c1.y as f64,
                    c2.x as f64,
                    c2.y as f64,
                    to.x as f64,
                    to.y as f64,
                ),
                PathCmd::Arc {
                    center,
                    radius,
                    start,
                    end,
                } => {
                    self.ctx
                        .arc(
                            center.x as f64,
                            center.y as f64,
                            radius as f64,
                            start as f64,
                            end as f64,
                        )
                        .ok();
                }
                PathCmd::Close => self.ctx.close_path(),
            }
        }
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, offset: Vec2) {
        self.ctx.translate(offset.x as f64, offset.y as f64).ok();
    }

    fn rotate(&mut self, radians: f32) {
        self.ctx.rotate(radians as f64).ok();
    }

    fn scale(&mut self, factor: Vec2) {
        self.ctx.scale(factor.x as f64, factor.y as f64).ok();
    }

    fn set_alpha(&mut self, alpha: f32) {
        let current = self.ctx.global_alpha();
        self.ctx
            .set_global_alpha(current * alpha.clamp(0.0, 1.0) as f64);
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        self.apply_fill(paint);
        self.ctx
            .fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
    }

    fn fill_path(&mut self, path: &Path, paint: &Paint) {
        self.apply_fill(paint);
        self.trace(path);
        self.ctx.fill();
    }

    fn stroke_path(&mut self, path: &Path, color: Color, width: f32) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.trace(path);
        self.ctx.stroke();
    }

    fn text(&mut self, text: &str, pos: Vec2, style: &TextStyle) {
        self.ctx.set_font(&style.font());
        self.ctx.set_text_align(style.align.as_str());
        self.ctx.set_fill_style_str(&style.color.css());
        self.ctx.fill_text(text, pos.x as f64, pos.y as f64).ok();
    }
}
