//! The mini-games
//!
//! Each module holds one [`Game`] implementation. [`create`] builds a fresh
//! boxed session for the host; a finished or stopped session is never reused.

pub mod balloons;
pub mod claw;
pub mod colors;
pub mod counting;
pub mod dodging;
pub mod jumping;
pub mod maze;
pub mod memory;
pub mod music;
pub mod numbers;
pub mod oddone;
pub mod shapes;

use glam::Vec2;
use rand::Rng;
use std::rc::Rc;

use crate::audio::TonePlayer;
use crate::draw::{Color, Paint, Surface, TextStyle, shapes as paths};
use crate::session::{Game, GameSession, Session};
use crate::settings::Settings;
use crate::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    Colors,
    Balloons,
    Shapes,
    Maze,
    Memory,
    OddOne,
    Numbers,
    Counting,
    Jumping,
    Music,
    Dodging,
    Claw,
}

impl GameKind {
    pub const ALL: [GameKind; 12] = [
        GameKind::Colors,
        GameKind::Balloons,
        GameKind::Shapes,
        GameKind::Maze,
        GameKind::Memory,
        GameKind::OddOne,
        GameKind::Numbers,
        GameKind::Counting,
        GameKind::Jumping,
        GameKind::Music,
        GameKind::Dodging,
        GameKind::Claw,
    ];

    /// Stable id used by menu buttons (`data-game`)
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Colors => "colors",
            GameKind::Balloons => "balloons",
            GameKind::Shapes => "shapes",
            GameKind::Maze => "maze",
            GameKind::Memory => "memory",
            GameKind::OddOne => "oddone",
            GameKind::Numbers => "numbers",
            GameKind::Counting => "counting",
            GameKind::Jumping => "jumping",
            GameKind::Music => "music",
            GameKind::Dodging => "dodging",
            GameKind::Claw => "claw",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameKind::Colors => "Colors",
            GameKind::Balloons => "Balloons",
            GameKind::Shapes => "Shapes",
            GameKind::Maze => "Maze",
            GameKind::Memory => "Memory",
            GameKind::OddOne => "Odd One Out",
            GameKind::Numbers => "Numbers",
            GameKind::Counting => "Counting",
            GameKind::Jumping => "Jumping",
            GameKind::Music => "Music",
            GameKind::Dodging => "Dodging",
            GameKind::Claw => "Claw Machine",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            GameKind::Colors => "🎨",
            GameKind::Balloons => "🎈",
            GameKind::Shapes => "🔷",
            GameKind::Maze => "🧭",
            GameKind::Memory => "🃏",
            GameKind::OddOne => "🔍",
            GameKind::Numbers => "🔢",
            GameKind::Counting => "🐞",
            GameKind::Jumping => "🦘",
            GameKind::Music => "🎵",
            GameKind::Dodging => "🚗",
            GameKind::Claw => "🧸",
        }
    }
}

fn boxed<G: Game + 'static>(
    game: G,
    audio: Rc<TonePlayer>,
    seed: u64,
    settings: &Settings,
) -> Box<dyn GameSession> {
    Box::new(Session::new(game, audio, seed).with_settings(settings))
}

/// Fresh, not yet started session for `kind`
pub fn create(
    kind: GameKind,
    audio: Rc<TonePlayer>,
    seed: u64,
    settings: &Settings,
) -> Box<dyn GameSession> {
    match kind {
        GameKind::Colors => boxed(colors::Colors::default(), audio, seed, settings),
        GameKind::Balloons => boxed(balloons::Balloons::default(), audio, seed, settings),
        GameKind::Shapes => boxed(shapes::Shapes::default(), audio, seed, settings),
        GameKind::Maze => boxed(maze::Maze::default(), audio, seed, settings),
        GameKind::Memory => boxed(memory::Memory::default(), audio, seed, settings),
        GameKind::OddOne => boxed(oddone::OddOne::default(), audio, seed, settings),
        GameKind::Numbers => boxed(numbers::Numbers::default(), audio, seed, settings),
        GameKind::Counting => boxed(counting::Counting::default(), audio, seed, settings),
        GameKind::Jumping => boxed(jumping::Jumping::default(), audio, seed, settings),
        GameKind::Music => boxed(music::Music::default(), audio, seed, settings),
        GameKind::Dodging => boxed(dodging::Dodging::default(), audio, seed, settings),
        GameKind::Claw => boxed(claw::ClawMachine::default(), audio, seed, settings),
    }
}

/// Uniform sample in `[lo, hi)`, or `lo` when the range is empty
pub(crate) fn span<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

// === Shared overlay widgets ===

/// Bright colors used for confetti
pub const CONFETTI: &[Color] = &[
    Color::rgb(0xff, 0xd7, 0x00),
    Color::rgb(0xff, 0xa5, 0x00),
    Color::rgb(0xff, 0x69, 0xb4),
    Color::rgb(0x00, 0xce, 0xd1),
];

const INK: Color = Color::rgb(0x1e, 0x29, 0x3b);

/// Title line plus an optional colored hint underneath
pub(crate) fn header(surface: &mut dyn Surface, title: &str, hint: Option<(&str, Color)>) {
    let cx = surface.size().x / 2.0;
    surface.text(title, Vec2::new(cx, 35.0), &TextStyle::new(28.0, INK).bold());
    if let Some((hint, color)) = hint {
        surface.text(hint, Vec2::new(cx, 70.0), &TextStyle::new(22.0, color).bold());
    }
}

/// Rounded pill with centered text
pub(crate) fn badge(surface: &mut dyn Surface, center: Vec2, text: &str, fill: Color) {
    let rect = Rect::centered(center, 120.0, 30.0);
    surface.fill_path(&paths::round_rect(rect, 15.0), &Paint::Solid(fill));
    surface.text(text, center, &TextStyle::new(16.0, Color::WHITE).bold());
}

/// Dimmed full-screen card used for game-over and celebration messages
pub(crate) fn banner(surface: &mut dyn Surface, title: &str, lines: &[&str]) {
    let size = surface.size();
    surface.fill(&Paint::Solid(Color::BLACK.with_alpha(0.5)));
    let center = size / 2.0;
    let card = Rect::centered(center, 320.0_f32.min(size.x - 20.0), 80.0 + 36.0 * lines.len() as f32);
    surface.fill_path(&paths::round_rect(card, 20.0), &Paint::Solid(Color::WHITE));
    let mut y = card.y + 40.0;
    surface.text(title, Vec2::new(center.x, y), &TextStyle::new(32.0, INK).bold());
    for line in lines {
        y += 36.0;
        surface.text(line, Vec2::new(center.x, y), &TextStyle::new(20.0, INK));
    }
}
