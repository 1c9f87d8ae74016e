//! Tap the numbered circles in order, 1 up to n

use glam::Vec2;
use rand::Rng;
use std::slice;

use super::{GameKind, badge, header, span};
use crate::anim::{Tween, shake_offset};
use crate::audio::SoundEffect;
use crate::draw::{Color, Paint, Surface, TextStyle, shapes};
use crate::hit_circle;
use crate::input::{Pointer, PointerPhase};
use crate::particles::Burst;
use crate::session::{Core, Game};
use crate::Rect;

pub const LEVELS: u32 = 10;
const RADIUS: f32 = 60.0;
const MARGIN: f32 = 100.0;
const TOP_BAND: f32 = 120.0;
const MIN_DISTANCE: f32 = 150.0;
const MAX_ATTEMPTS: usize = 100;
const NEXT_LEVEL_MS: f64 = 2000.0;
const FINISH_DELAY_MS: f64 = 2500.0;
const SUCCESS_MS: f64 = 500.0;
const SHAKE_MS: f64 = 300.0;

const COLORS: [Color; 8] = [
    Color::rgb(0xef, 0x44, 0x44),
    Color::rgb(0x3b, 0x82, 0xf6),
    Color::rgb(0x10, 0xb9, 0x81),
    Color::rgb(0xfb, 0xbf, 0x24),
    Color::rgb(0xa8, 0x55, 0xf7),
    Color::rgb(0xec, 0x48, 0x99),
    Color::rgb(0xf9, 0x73, 0x16),
    Color::rgb(0x14, 0xb8, 0xa6),
];

/// How many circles a level has
pub fn count_for_level(level: u32) -> u32 {
    match level {
        0..=3 => 3,
        4..=6 => 4,
        _ => 5,
    }
}

/// Scatter `count` centers below the header, at least [`MIN_DISTANCE`]
/// apart when the surface has room. Each circle gets a bounded number of
/// tries; the last try is kept if none fits.
pub fn scatter<R: Rng>(rng: &mut R, count: usize, size: Vec2) -> Vec<Vec2> {
    let mut placed: Vec<Vec2> = Vec::with_capacity(count);
    for _ in 0..count {
        let mut candidate = Vec2::ZERO;
        for _ in 0..MAX_ATTEMPTS {
            candidate = Vec2::new(
                span(rng, MARGIN, size.x - MARGIN),
                span(rng, MARGIN + TOP_BAND, size.y - MARGIN),
            );
            if placed.iter().all(|p| p.distance(candidate) >= MIN_DISTANCE) {
                break;
            }
        }
        placed.push(candidate);
    }
    placed
}

#[derive(Debug, Clone)]
pub struct NumberCircle {
    pub number: u32,
    pub pos: Vec2,
    pub color: Color,
    pub completed: bool,
    phase: f32,
    success: Option<Tween>,
    shake: Option<Tween>,
}

#[derive(Debug, Clone, Copy)]
struct ConfettiPiece {
    pos: Vec2,
    vel: Vec2,
    angle: f32,
    spin: f32,
    color: Color,
    size: f32,
    life: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumbersEvent {
    NextLevel,
}

#[derive(Debug, Default)]
pub struct Numbers {
    pub circles: Vec<NumberCircle>,
    /// Next number to tap
    pub next: u32,
    confetti: Vec<ConfettiPiece>,
    stars: Vec<(Vec2, f32, f32)>,
}

impl Numbers {
    pub fn target_count(&self) -> u32 {
        self.circles.len() as u32
    }

    fn level_done(&self) -> bool {
        self.next > self.target_count()
    }

    fn build_level(&mut self, core: &mut Core<NumbersEvent>) {
        let n = count_for_level(core.level);
        let positions = scatter(&mut core.rng, n as usize, core.size);
        self.next = 1;
        self.circles = positions
            .into_iter()
            .enumerate()
            .map(|(i, pos)| NumberCircle {
                number: i as u32 + 1,
                pos,
                color: COLORS[i % COLORS.len()],
                completed: false,
                phase: core.rng.random_range(0.0..std::f32::consts::TAU),
                success: None,
                shake: None,
            })
            .collect();
    }

    fn rain_confetti(&mut self, core: &mut Core<NumbersEvent>) {
        let rng = &mut core.rng;
        for _ in 0..50 {
            self.confetti.push(ConfettiPiece {
                pos: Vec2::new(span(rng, 0.0, core.size.x), -20.0),
                vel: Vec2::new(rng.random_range(-2.0..2.0), rng.random_range(2.0..5.0)),
                angle: rng.random_range(0.0..std::f32::consts::TAU),
                spin: rng.random_range(-0.1..0.1),
                color: COLORS[rng.random_range(0..COLORS.len())],
                size: rng.random_range(8.0..16.0),
                life: 1.0,
            });
        }
    }

    fn draw_circle(surface: &mut dyn Surface, c: &NumberCircle, now: f64, reduced_motion: bool) {
        let mut scale = 1.0;
        if !c.completed {
            scale += ((now / 1000.0) as f32 * 3.0 + c.phase).sin() * 0.05;
        }
        if let Some(p) = c.success.and_then(|t| t.progress(now)) {
            scale *= if p < 0.5 { 1.0 + p * 0.6 } else { 1.3 - (p - 0.5) * 0.6 };
        }
        let mut pos = c.pos;
        if !reduced_motion {
            if let Some(p) = c.shake.and_then(|t| t.progress(now)) {
                pos.x += shake_offset(p, 15.0);
            }
        }
        let r = RADIUS * scale;
        let (light, base) = if c.completed {
            (Color::rgb(0xd1, 0xd5, 0xdb), Color::rgb(0x9c, 0xa3, 0xaf))
        } else {
            (c.color.lighten(30.0), c.color)
        };

        surface.fill_circle(pos + Vec2::new(0.0, 8.0), r, &Paint::Solid(Color::BLACK.with_alpha(0.2)));
        surface.fill_circle(
            pos,
            r,
            &Paint::Radial {
                center: pos - Vec2::splat(20.0),
                inner: 0.0,
                outer: r,
                stops: vec![(0.0, light), (1.0, base)],
            },
        );
        surface.stroke_circle(pos, r - 5.0, Color::WHITE.with_alpha(0.5), 4.0);

        let ink = if c.completed { Color::rgb(0x6b, 0x72, 0x80) } else { Color::WHITE };
        surface.text(&c.number.to_string(), pos, &TextStyle::new(48.0 * scale, ink).bold());
        if c.completed {
            surface.text(
                "✓",
                pos - Vec2::new(0.0, 5.0),
                &TextStyle::new(40.0, Color::rgb(0x10, 0xb9, 0x81)).bold(),
            );
        }
    }
}

impl Game for Numbers {
    type Event = NumbersEvent;

    fn kind(&self) -> GameKind {
        GameKind::Numbers
    }

    fn reset(&mut self, core: &mut Core<NumbersEvent>) {
        self.confetti.clear();
        self.stars = (0..30)
            .map(|_| {
                let pos = Vec2::new(
                    span(&mut core.rng, 0.0, core.size.x),
                    span(&mut core.rng, 0.0, core.size.y),
                );
                (pos, core.rng.random_range(1.0..3.0), core.rng.random_range(0.5..1.0))
            })
            .collect();
        self.build_level(core);
    }

    fn pointer(&mut self, core: &mut Core<NumbersEvent>, ev: Pointer) {
        if ev.phase != PointerPhase::Down || self.level_done() {
            return;
        }
        let next = self.next;
        let Some(circle) = self
            .circles
            .iter_mut()
            .find(|c| !c.completed && hit_circle(ev.pos, c.pos, RADIUS))
        else {
            return;
        };

        if circle.number != next {
            circle.shake = Some(Tween::new(core.now, SHAKE_MS));
            core.play(SoundEffect::Error);
            return;
        }

        circle.completed = true;
        circle.success = Some(Tween::new(core.now, SUCCESS_MS));
        let (at, color) = (circle.pos, circle.color);
        core.burst(at, &Burst::ring(20, slice::from_ref(&color)).with_size(3.0..7.0));
        core.play(SoundEffect::Success);
        self.next += 1;

        if self.level_done() {
            core.score += 1;
            self.rain_confetti(core);
            if core.level < LEVELS {
                core.level += 1;
                core.after(NEXT_LEVEL_MS, NumbersEvent::NextLevel);
            } else {
                core.finish_after(FINISH_DELAY_MS);
            }
        }
    }

    fn update(&mut self, _core: &mut Core<NumbersEvent>) {
        for c in &mut self.confetti {
            c.pos += c.vel;
            c.vel.y += 0.1;
            c.angle += c.spin;
            c.life -= 0.01;
        }
        self.confetti.retain(|c| c.life > 0.0);
    }

    fn on_timer(&mut self, core: &mut Core<NumbersEvent>, event: NumbersEvent) {
        match event {
            NumbersEvent::NextLevel => self.build_level(core),
        }
    }

    fn render(&self, core: &Core<NumbersEvent>, surface: &mut dyn Surface) {
        let size = surface.size();
        surface.fill(&Paint::vertical(
            Rect::new(0.0, 0.0, size.x, size.y),
            Color::rgb(0xfe, 0xf3, 0xc7),
            Color::rgb(0xfe, 0xd7, 0xaa),
        ));
        let secs = (core.now / 1000.0) as f32;
        for &(pos, r, speed) in &self.stars {
            let alpha = (secs * speed).sin().abs() * 0.25;
            surface.fill_circle(pos, r, &Paint::Solid(Color::rgba(245, 158, 11, alpha)));
        }

        header(surface, "🔢 Tap the numbers in order! 🔢", None);
        let cx = size.x / 2.0;
        badge(
            surface,
            Vec2::new(cx - 80.0, 70.0),
            &format!("Level {}/{}", core.level, LEVELS),
            Color::rgb(0xf5, 0x9e, 0x0b),
        );
        if !self.level_done() {
            badge(
                surface,
                Vec2::new(cx + 80.0, 70.0),
                &format!("Next: {}", self.next),
                Color::rgb(0x10, 0xb9, 0x81),
            );
        }

        for c in &self.circles {
            Self::draw_circle(surface, c, core.now, core.reduced_motion);
        }

        for piece in &self.confetti {
            surface.save();
            surface.translate(piece.pos);
            surface.rotate(piece.angle);
            surface.set_alpha(piece.life);
            surface.fill_path(
                &shapes::round_rect(Rect::centered(Vec2::ZERO, piece.size, piece.size * 0.5), 2.0),
                &Paint::Solid(piece.color),
            );
            surface.restore();
        }
    }
}
