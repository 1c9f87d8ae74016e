//! Drag each shape into the box with its outline

use glam::Vec2;

use super::{GameKind, header};
use crate::anim::{Tween, bounce_scale, shake_offset};
use crate::audio::SoundEffect;
use crate::draw::{Color, Paint, Path, Surface, shapes as paths};
use crate::input::{Pointer, PointerPhase};
use crate::session::{Core, Game};
use crate::{Rect, hit_circle, hit_rect};

const SHAPE_SIZE: f32 = 60.0;
const PLACED_SCALE: f32 = 0.8;
const ZONE_SIZE: f32 = 120.0;
const ZONE_SPACING: f32 = 20.0;
const ZONE_TOP: f32 = 80.0;
const TOTAL_SHAPES: usize = 6;
const FINISH_DELAY_MS: f64 = 1000.0;
const SUCCESS_MS: f64 = 500.0;
const SHAKE_MS: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Circle,
    Square,
    Triangle,
}

impl ShapeType {
    pub const ALL: [ShapeType; 3] = [ShapeType::Circle, ShapeType::Square, ShapeType::Triangle];

    pub fn color(self) -> Color {
        match self {
            ShapeType::Circle => Color::rgb(0xef, 0x44, 0x44),
            ShapeType::Square => Color::rgb(0x3b, 0x82, 0xf6),
            ShapeType::Triangle => Color::rgb(0x10, 0xb9, 0x81),
        }
    }

    fn path(self, center: Vec2, size: f32) -> Path {
        match self {
            ShapeType::Circle => Path::circle(center, size / 2.0),
            ShapeType::Square => Path::rect(Rect::centered(center, size, size)),
            ShapeType::Triangle => paths::triangle(center, size),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DropZone {
    pub rect: Rect,
    pub kind: ShapeType,
    /// Shapes already sorted into this zone
    pub filled: usize,
}

impl DropZone {
    /// Where the n-th placed shape sits
    fn slot(&self, n: usize) -> Vec2 {
        let quarter = self.rect.w / 4.0;
        let x = if n % 2 == 0 { self.rect.x + quarter } else { self.rect.right() - quarter };
        let rows = 1 + n / 2;
        Vec2::new(x, self.rect.y + self.rect.h / 2.0 + (rows as f32 - 1.0) * 12.0)
    }
}

#[derive(Debug, Clone)]
pub struct Piece {
    pub pos: Vec2,
    pub home: Vec2,
    pub kind: ShapeType,
    pub placed: bool,
    success: Option<Tween>,
    shake: Option<Tween>,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    index: usize,
    offset: Vec2,
}

#[derive(Debug, Default)]
pub struct Shapes {
    pub zones: Vec<DropZone>,
    pub pieces: Vec<Piece>,
    drag: Option<Drag>,
}

impl Shapes {
    pub fn placed(&self) -> usize {
        self.pieces.iter().filter(|p| p.placed).count()
    }

    fn start_drag(&mut self, at: Vec2) {
        // Top of the draw order first
        let Some(index) = self
            .pieces
            .iter()
            .rposition(|p| !p.placed && hit_circle(at, p.pos, SHAPE_SIZE / 2.0))
        else {
            return;
        };
        // Bring to front
        let piece = self.pieces.remove(index);
        let offset = at - piece.pos;
        self.pieces.push(piece);
        self.drag = Some(Drag {
            index: self.pieces.len() - 1,
            offset,
        });
    }

    /// Zones are matched against the finger, not the piece centre
    fn end_drag(&mut self, core: &mut Core<()>, release: Vec2) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        let piece = &mut self.pieces[drag.index];
        piece.pos = release - drag.offset;

        match self.zones.iter_mut().find(|z| hit_rect(release, &z.rect)) {
            Some(zone) if zone.kind == piece.kind => {
                piece.pos = zone.slot(zone.filled);
                piece.placed = true;
                piece.success = Some(Tween::new(core.now, SUCCESS_MS));
                zone.filled += 1;
                core.score += 1;
                core.play(SoundEffect::Success);
                if self.pieces.iter().all(|p| p.placed) {
                    core.finish_after(FINISH_DELAY_MS);
                }
            }
            Some(_) => {
                piece.pos = piece.home;
                piece.shake = Some(Tween::new(core.now, SHAKE_MS));
                core.play(SoundEffect::Error);
            }
            None => piece.pos = piece.home,
        }
    }

    fn draw_piece(&self, core: &Core<()>, surface: &mut dyn Surface, piece: &Piece) {
        let mut scale = if piece.placed { PLACED_SCALE } else { 1.0 };
        if let Some(p) = piece.success.and_then(|t| t.progress(core.now)) {
            scale *= bounce_scale(p);
        }
        let mut pos = piece.pos;
        if !core.reduced_motion {
            if let Some(p) = piece.shake.and_then(|t| t.progress(core.now)) {
                pos.x += shake_offset(p, 10.0);
            }
        }
        let size = SHAPE_SIZE * scale;
        if !piece.placed {
            let shadow = piece.kind.path(pos + Vec2::new(0.0, 5.0), size);
            surface.fill_path(&shadow, &Paint::Solid(Color::BLACK.with_alpha(0.15)));
        }
        let outline = piece.kind.path(pos, size);
        surface.fill_path(&outline, &Paint::Solid(piece.kind.color()));
        surface.stroke_path(&outline, Color::WHITE, 3.0);
    }
}

impl Game for Shapes {
    type Event = ();

    fn kind(&self) -> GameKind {
        GameKind::Shapes
    }

    fn reset(&mut self, core: &mut Core<()>) {
        self.drag = None;

        let total = ZONE_SIZE * 3.0 + ZONE_SPACING * 2.0;
        let start_x = (core.width() - total) / 2.0;
        self.zones = ShapeType::ALL
            .iter()
            .enumerate()
            .map(|(i, &kind)| DropZone {
                rect: Rect::new(
                    start_x + (ZONE_SIZE + ZONE_SPACING) * i as f32,
                    ZONE_TOP,
                    ZONE_SIZE,
                    ZONE_SIZE,
                ),
                kind,
                filled: 0,
            })
            .collect();

        let row_x = (core.width() - 3.0 * 120.0) / 2.0 + 60.0;
        let start_y = core.height() - 200.0;
        self.pieces = (0..TOTAL_SHAPES)
            .map(|i| {
                let home = Vec2::new(
                    row_x + (i % 3) as f32 * 120.0,
                    start_y + (i / 3) as f32 * 100.0,
                );
                Piece {
                    pos: home,
                    home,
                    kind: ShapeType::ALL[i % 3],
                    placed: false,
                    success: None,
                    shake: None,
                }
            })
            .collect();
    }

    fn pointer(&mut self, core: &mut Core<()>, ev: Pointer) {
        match ev.phase {
            PointerPhase::Down => self.start_drag(ev.pos),
            PointerPhase::Move => {
                if let Some(drag) = self.drag {
                    self.pieces[drag.index].pos = ev.pos - drag.offset;
                }
            }
            PointerPhase::Up => self.end_drag(core, ev.pos),
        }
    }

    fn render(&self, core: &Core<()>, surface: &mut dyn Surface) {
        let size = surface.size();
        surface.fill(&Paint::vertical(
            Rect::new(0.0, 0.0, size.x, size.y),
            Color::rgb(0xfe, 0xf3, 0xc7),
            Color::rgb(0xfd, 0xe6, 0x8a),
        ));
        header(surface, "🔷 Sort the shapes! 🔷", None);

        for zone in &self.zones {
            let fill = if zone.filled > 0 {
                Color::rgb(0xe0, 0xf2, 0xfe)
            } else {
                Color::WHITE.with_alpha(0.5)
            };
            surface.fill_rect(zone.rect, &Paint::Solid(fill));
            surface.stroke_path(&Path::rect(zone.rect), zone.kind.color(), 4.0);
            // Ghost of the expected shape
            surface.save();
            surface.set_alpha(0.3);
            surface.fill_path(
                &zone.kind.path(zone.rect.center(), 50.0),
                &Paint::Solid(zone.kind.color()),
            );
            surface.restore();
        }

        // Placed pieces first so dragged ones stay on top
        for piece in self.pieces.iter().filter(|p| p.placed) {
            self.draw_piece(core, surface, piece);
        }
        for piece in self.pieces.iter().filter(|p| !p.placed) {
            self.draw_piece(core, surface, piece);
        }
    }
}
