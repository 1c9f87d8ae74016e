//! Find every circle of the target color

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;

use super::{GameKind, header, span};
use crate::anim::{Tween, pulse_scale, shake_offset};
use crate::audio::SoundEffect;
use crate::draw::{Color, Paint, Surface};
use crate::hit_circle;
use crate::input::{Pointer, PointerPhase};
use crate::session::{Core, Game};

const CIRCLES: usize = 8;
const TARGETS: usize = 3;
const FINISH_DELAY_MS: f64 = 500.0;
const PULSE_MS: f64 = 500.0;
const SHAKE_MS: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swatch {
    pub name: &'static str,
    pub color: Color,
}

pub const SWATCHES: [Swatch; 5] = [
    Swatch { name: "red", color: Color::rgb(0xef, 0x44, 0x44) },
    Swatch { name: "blue", color: Color::rgb(0x3b, 0x82, 0xf6) },
    Swatch { name: "green", color: Color::rgb(0x10, 0xb9, 0x81) },
    Swatch { name: "yellow", color: Color::rgb(0xfb, 0xbf, 0x24) },
    Swatch { name: "pink", color: Color::rgb(0xec, 0x48, 0x99) },
];

#[derive(Debug, Clone)]
pub struct Circle {
    pub pos: Vec2,
    pub radius: f32,
    pub swatch: usize,
    pub is_target: bool,
    pub collected: bool,
    pulse: Option<Tween>,
    shake: Option<Tween>,
}

#[derive(Debug, Default)]
pub struct Colors {
    pub circles: Vec<Circle>,
    pub target: usize,
}

impl Colors {
    pub fn remaining(&self) -> usize {
        self.circles
            .iter()
            .filter(|c| c.is_target && !c.collected)
            .count()
    }

    fn make_circle(core: &mut Core<()>, swatch: usize, is_target: bool) -> Circle {
        let (w, h) = (core.width(), core.height());
        Circle {
            pos: Vec2::new(
                span(&mut core.rng, 50.0, w - 50.0),
                span(&mut core.rng, 50.0, h - 50.0),
            ),
            radius: core.rng.random_range(40.0..60.0),
            swatch,
            is_target,
            collected: false,
            pulse: None,
            shake: None,
        }
    }
}

impl Game for Colors {
    type Event = ();

    fn kind(&self) -> GameKind {
        GameKind::Colors
    }

    fn reset(&mut self, core: &mut Core<()>) {
        self.target = core.rng.random_range(0..SWATCHES.len());
        self.circles.clear();
        for _ in 0..TARGETS {
            let c = Self::make_circle(core, self.target, true);
            self.circles.push(c);
        }
        for _ in TARGETS..CIRCLES {
            // Any color but the target
            let mut swatch = core.rng.random_range(0..SWATCHES.len() - 1);
            if swatch >= self.target {
                swatch += 1;
            }
            let c = Self::make_circle(core, swatch, false);
            self.circles.push(c);
        }
        self.circles.shuffle(&mut core.rng);
    }

    fn pointer(&mut self, core: &mut Core<()>, ev: Pointer) {
        if ev.phase != PointerPhase::Down {
            return;
        }
        let Some(circle) = self
            .circles
            .iter_mut()
            .find(|c| !c.collected && hit_circle(ev.pos, c.pos, c.radius))
        else {
            return;
        };

        if circle.is_target {
            circle.collected = true;
            circle.pulse = Some(Tween::new(core.now, PULSE_MS));
            core.score += 1;
            core.play(SoundEffect::Success);
            if self.remaining() == 0 {
                core.finish_after(FINISH_DELAY_MS);
            }
        } else {
            circle.shake = Some(Tween::new(core.now, SHAKE_MS));
            core.play(SoundEffect::Error);
        }
    }

    fn render(&self, core: &Core<()>, surface: &mut dyn Surface) {
        surface.fill(&Paint::Solid(Color::rgb(0xf8, 0xfa, 0xfc)));

        let remaining = self.remaining();
        let target = SWATCHES[self.target];
        let hint = format!(
            "{} {} left!",
            remaining,
            if remaining == 1 { "circle" } else { "circles" }
        );
        header(
            surface,
            &format!("🎨 Find all the {} circles! 🎨", target.name),
            Some((&hint, Color::rgb(0x10, 0xb9, 0x81))),
        );

        for c in &self.circles {
            let mut scale = 1.0;
            if c.collected {
                // Collected circles pulse out, then vanish
                match c.pulse.and_then(|t| t.progress(core.now)) {
                    Some(p) => scale = pulse_scale(p),
                    None => continue,
                }
            }
            let mut pos = c.pos;
            if !core.reduced_motion {
                if let Some(p) = c.shake.and_then(|t| t.progress(core.now)) {
                    pos.x += shake_offset(p, 10.0);
                }
            }

            let r = c.radius * scale;
            surface.fill_circle(
                pos + Vec2::new(0.0, 5.0),
                r,
                &Paint::Solid(Color::BLACK.with_alpha(0.15)),
            );
            surface.fill_circle(pos, r, &Paint::Solid(SWATCHES[c.swatch].color));
            surface.fill_circle(
                pos,
                r,
                &Paint::Radial {
                    center: pos - Vec2::splat(r * 0.3),
                    inner: 0.0,
                    outer: r,
                    stops: vec![
                        (0.0, Color::WHITE.with_alpha(0.4)),
                        (1.0, Color::WHITE.with_alpha(0.0)),
                    ],
                },
            );
        }
    }
}
