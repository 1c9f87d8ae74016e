//! Four cards, one of them is different. Find it.

use glam::Vec2;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::{CONFETTI, GameKind, badge, header, span};
use crate::anim::{Tween, shake_offset};
use crate::audio::SoundEffect;
use crate::draw::{Color, Paint, Path, Surface, shapes};
use crate::input::{Pointer, PointerPhase};
use crate::particles::Burst;
use crate::session::{Core, Game};
use crate::{Rect, hit_rect};

pub const LEVELS: u32 = 10;
const CARD_W: f32 = 140.0;
const CARD_H: f32 = 160.0;
const GRID_SPACING: f32 = 200.0;
const FIGURE_SIZE: f32 = 80.0;
const NEXT_LEVEL_MS: f64 = 1500.0;
const FINISH_DELAY_MS: f64 = 2000.0;
const SUCCESS_MS: f64 = 500.0;
const SHAKE_MS: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Figure {
    Circle,
    Square,
    Triangle,
    Star,
    Heart,
    Diamond,
}

impl Figure {
    pub const ALL: [Figure; 6] = [
        Figure::Circle,
        Figure::Square,
        Figure::Triangle,
        Figure::Star,
        Figure::Heart,
        Figure::Diamond,
    ];

    /// Outline fitting a `size` box around `center`
    pub fn path(self, center: Vec2, size: f32) -> Path {
        let half = size / 2.0;
        match self {
            Figure::Circle => Path::circle(center, half),
            Figure::Square => Path::rect(Rect::centered(center, size, size)),
            Figure::Triangle => shapes::triangle(center, size),
            Figure::Star => shapes::star(center, 5, half, half * 0.5),
            Figure::Heart => shapes::heart(center - Vec2::new(0.0, half * 0.9), size * 0.9),
            Figure::Diamond => shapes::diamond(center, half * 0.6, half),
        }
    }
}

pub const PALETTE: [Color; 8] = [
    Color::rgb(0xef, 0x44, 0x44),
    Color::rgb(0x3b, 0x82, 0xf6),
    Color::rgb(0x10, 0xb9, 0x81),
    Color::rgb(0xfb, 0xbf, 0x24),
    Color::rgb(0xa8, 0x55, 0xf7),
    Color::rgb(0xec, 0x48, 0x99),
    Color::rgb(0xf9, 0x73, 0x16),
    Color::rgb(0x14, 0xb8, 0xa6),
];

/// What sets the odd card apart at a given level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difference {
    Shape,
    Color,
    Both,
}

impl Difference {
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=4 => Difference::Shape,
            5..=7 => Difference::Color,
            _ => Difference::Both,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Card {
    pub pos: Vec2,
    pub figure: Figure,
    pub color: Color,
    pub odd: bool,
    phase: f32,
    success: Option<Tween>,
    shake: Option<Tween>,
}

impl Card {
    fn bounds(&self) -> Rect {
        Rect::centered(self.pos, CARD_W, CARD_H)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OddOneEvent {
    NextLevel,
}

#[derive(Debug, Default)]
pub struct OddOne {
    pub cards: Vec<Card>,
    /// Correct card found, waiting for the next level
    advancing: bool,
    stars: Vec<(Vec2, f32, f32)>,
}

/// Any item of `items` other than `not`
fn other<T: Copy + PartialEq, R: Rng>(rng: &mut R, items: &[T], not: T) -> T {
    let rest: Vec<T> = items.iter().copied().filter(|&i| i != not).collect();
    rest.choose(rng).copied().unwrap_or(not)
}

impl OddOne {
    fn build_level(&mut self, core: &mut Core<OddOneEvent>) {
        self.advancing = false;
        let rng = &mut core.rng;
        let figure = Figure::ALL[rng.random_range(0..Figure::ALL.len())];
        let color = PALETTE[rng.random_range(0..PALETTE.len())];
        let (odd_figure, odd_color) = match Difference::for_level(core.level) {
            Difference::Shape => (other(rng, &Figure::ALL, figure), color),
            Difference::Color => (figure, other(rng, &PALETTE, color)),
            Difference::Both => (
                other(rng, &Figure::ALL, figure),
                other(rng, &PALETTE, color),
            ),
        };

        let mut looks = [(figure, color, false); 4];
        looks[3] = (odd_figure, odd_color, true);
        looks.shuffle(rng);

        let center = Vec2::new(core.size.x / 2.0, core.size.y / 2.0 + 20.0);
        let d = GRID_SPACING / 2.0;
        let offsets = [
            Vec2::new(-d, -d),
            Vec2::new(d, -d),
            Vec2::new(-d, d),
            Vec2::new(d, d),
        ];
        self.cards = looks
            .into_iter()
            .zip(offsets)
            .map(|((figure, color, odd), off)| Card {
                pos: center + off,
                figure,
                color,
                odd,
                phase: core.rng.random_range(0.0..std::f32::consts::TAU),
                success: None,
                shake: None,
            })
            .collect();
    }

    fn draw_card(surface: &mut dyn Surface, card: &Card, now: f64, reduced_motion: bool) {
        let secs = (now / 1000.0) as f32;
        let mut scale = 1.0 + (card.phase + secs * 3.0).sin() * 0.03;
        let mut spin = 0.0;
        let mut pos = card.pos;
        if let Some(p) = card.success.and_then(|t| t.progress(now)) {
            scale *= if p < 0.5 { 1.0 + p * 0.8 } else { 1.4 - (p - 0.5) * 0.8 };
            spin = p * 3.0;
        }
        if !reduced_motion {
            if let Some(p) = card.shake.and_then(|t| t.progress(now)) {
                pos.x += shake_offset(p, 10.0);
            }
        }

        surface.save();
        surface.translate(pos);
        surface.scale(Vec2::splat(scale));
        let local = Rect::centered(Vec2::ZERO, CARD_W, CARD_H);
        surface.fill_path(
            &shapes::round_rect(local.inflate(4.0), 22.0),
            &Paint::Solid(Color::BLACK.with_alpha(0.1)),
        );
        surface.fill_path(&shapes::round_rect(local, 20.0), &Paint::Solid(Color::WHITE));
        surface.stroke_path(
            &shapes::round_rect(local.inflate(-8.0), 15.0),
            card.color.lighten(25.0),
            5.0,
        );

        surface.rotate(spin);
        let outline = card.figure.path(Vec2::ZERO, FIGURE_SIZE);
        let half = FIGURE_SIZE / 2.0;
        surface.fill_path(
            &outline,
            &Paint::Radial {
                center: Vec2::splat(-15.0),
                inner: 0.0,
                outer: half,
                stops: vec![(0.0, card.color.lighten(30.0)), (1.0, card.color)],
            },
        );
        surface.fill_path(
            &outline,
            &Paint::Radial {
                center: Vec2::splat(-half * 0.3),
                inner: 0.0,
                outer: half,
                stops: vec![
                    (0.0, Color::WHITE.with_alpha(0.8)),
                    (0.5, Color::WHITE.with_alpha(0.3)),
                    (1.0, Color::WHITE.with_alpha(0.0)),
                ],
            },
        );
        surface.restore();
    }
}

impl Game for OddOne {
    type Event = OddOneEvent;

    fn kind(&self) -> GameKind {
        GameKind::OddOne
    }

    fn reset(&mut self, core: &mut Core<OddOneEvent>) {
        self.stars = (0..25)
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

    fn pointer(&mut self, core: &mut Core<OddOneEvent>, ev: Pointer) {
        if ev.phase != PointerPhase::Down || self.advancing {
            return;
        }
        let Some(card) = self.cards.iter_mut().find(|c| hit_rect(ev.pos, &c.bounds())) else {
            return;
        };
        if !card.odd {
            card.shake = Some(Tween::new(core.now, SHAKE_MS));
            core.play(SoundEffect::Error);
            return;
        }

        card.success = Some(Tween::new(core.now, SUCCESS_MS));
        let at = card.pos;
        self.advancing = true;
        core.score += 1;
        core.play(SoundEffect::Success);
        core.burst(at, &Burst::ring(30, CONFETTI));
        if core.level < LEVELS {
            core.level += 1;
            core.after(NEXT_LEVEL_MS, OddOneEvent::NextLevel);
        } else {
            core.finish_after(FINISH_DELAY_MS);
        }
    }

    fn on_timer(&mut self, core: &mut Core<OddOneEvent>, event: OddOneEvent) {
        match event {
            OddOneEvent::NextLevel => self.build_level(core),
        }
    }

    fn render(&self, core: &Core<OddOneEvent>, surface: &mut dyn Surface) {
        let size = surface.size();
        surface.fill(&Paint::vertical(
            Rect::new(0.0, 0.0, size.x, size.y),
            Color::rgb(0xdd, 0xd6, 0xfe),
            Color::rgb(0xe9, 0xd5, 0xff),
        ));
        let secs = (core.now / 1000.0) as f32;
        for &(pos, r, speed) in &self.stars {
            let alpha = (secs * speed).sin().abs() * 0.25;
            surface.fill_circle(pos, r, &Paint::Solid(Color::rgba(168, 85, 247, alpha)));
        }

        header(surface, "🔍 Which one is different? 🔍", None);
        badge(
            surface,
            Vec2::new(size.x / 2.0, 70.0),
            &format!("Level {}/{}", core.level, LEVELS),
            Color::rgb(0xa8, 0x55, 0xf7),
        );

        for card in &self.cards {
            Self::draw_card(surface, card, core.now, core.reduced_motion);
        }
    }
}
