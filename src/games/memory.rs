//! Classic pairs: flip two cards, keep them if the colors match

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use std::f32::consts::PI;
use std::slice;

use super::{GameKind, header, span};
use crate::anim::{Tween, bounce_scale};
use crate::audio::SoundEffect;
use crate::draw::{Color, Paint, Path, Surface, TextStyle, shapes};
use crate::input::{Pointer, PointerPhase};
use crate::particles::Burst;
use crate::session::{Core, Game};
use crate::{Rect, hit_rect};

pub const PAIRS: usize = 6;
const COLS: usize = 4;
const CARD_W: f32 = 100.0;
const CARD_H: f32 = 130.0;
const SPACING: f32 = 20.0;
const CHECK_MS: f64 = 800.0;
const FLIP_BACK_MS: f64 = 500.0;
const FINISH_DELAY_MS: f64 = 1500.0;
const FLIP_MS: f64 = 300.0;
const MATCH_MS: f64 = 500.0;

/// Card faces: (base, light)
const FACES: [(Color, Color); PAIRS] = [
    (Color::rgb(0xef, 0x44, 0x44), Color::rgb(0xfc, 0xa5, 0xa5)),
    (Color::rgb(0x3b, 0x82, 0xf6), Color::rgb(0x93, 0xc5, 0xfd)),
    (Color::rgb(0x10, 0xb9, 0x81), Color::rgb(0x6e, 0xe7, 0xb7)),
    (Color::rgb(0xfb, 0xbf, 0x24), Color::rgb(0xfd, 0xe6, 0x8a)),
    (Color::rgb(0xa8, 0x55, 0xf7), Color::rgb(0xd8, 0xb4, 0xfe)),
    (Color::rgb(0xec, 0x48, 0x99), Color::rgb(0xf9, 0xa8, 0xd4)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryEvent {
    CheckMatch,
    FlipBack(usize, usize),
}

#[derive(Debug, Clone)]
pub struct Card {
    pub rect: Rect,
    /// Index into the face table; both cards of a pair share it
    pub face: usize,
    pub face_up: bool,
    pub matched: bool,
    flip: Option<Tween>,
    glow: Option<Tween>,
}

impl Card {
    /// 0 = back showing, 1 = face showing
    fn flip_progress(&self, now: f64) -> f32 {
        let p = self.flip.and_then(|t| t.progress(now)).unwrap_or(1.0);
        if self.face_up { p } else { 1.0 - p }
    }
}

#[derive(Debug, Clone, Copy)]
struct Star {
    pos: Vec2,
    size: f32,
    speed: f32,
}

#[derive(Debug, Default)]
pub struct Memory {
    pub cards: Vec<Card>,
    /// Face-up cards waiting to be compared
    pub flipped: Vec<usize>,
    pub matched_pairs: usize,
    pub moves: u32,
    stars: Vec<Star>,
}

impl Memory {
    fn can_flip(&self) -> bool {
        self.flipped.len() < 2
    }

    fn flip(&mut self, core: &mut Core<MemoryEvent>, index: usize) {
        let card = &mut self.cards[index];
        card.face_up = true;
        card.flip = Some(Tween::new(core.now, FLIP_MS));
        self.flipped.push(index);
        core.play(SoundEffect::Flip);

        if self.flipped.len() == 2 {
            self.moves += 1;
            core.after(CHECK_MS, MemoryEvent::CheckMatch);
        }
    }

    fn check_match(&mut self, core: &mut Core<MemoryEvent>) {
        let &[a, b] = self.flipped.as_slice() else {
            return;
        };
        if self.cards[a].face != self.cards[b].face {
            core.play(SoundEffect::Error);
            core.after(FLIP_BACK_MS, MemoryEvent::FlipBack(a, b));
            return;
        }

        self.flipped.clear();
        self.matched_pairs += 1;
        core.score += 1;
        core.play(SoundEffect::Success);
        for i in [a, b] {
            let card = &mut self.cards[i];
            card.matched = true;
            card.glow = Some(Tween::new(core.now, MATCH_MS));
            let (color, center) = (FACES[card.face].0, card.rect.center());
            core.burst(
                center,
                &Burst::ring(20, slice::from_ref(&color)).with_size(3.0..7.0),
            );
        }
        if self.matched_pairs == PAIRS {
            core.finish_after(FINISH_DELAY_MS);
        }
    }

    fn flip_back(&mut self, now: f64, a: usize, b: usize) {
        for i in [a, b] {
            let card = &mut self.cards[i];
            card.face_up = false;
            card.flip = Some(Tween::new(now, FLIP_MS));
        }
        self.flipped.clear();
    }

    fn draw_card(surface: &mut dyn Surface, card: &Card, now: f64) {
        let progress = card.flip_progress(now);
        let squash = (progress * PI).cos().abs();
        let grow = card.glow.and_then(|t| t.progress(now)).map_or(1.0, bounce_scale);

        surface.save();
        surface.translate(card.rect.center());
        surface.scale(Vec2::new(grow * squash.max(0.01), grow));
        let local = Rect::centered(Vec2::ZERO, card.rect.w, card.rect.h);
        let outline = shapes::round_rect(local, 15.0);

        if progress < 0.5 {
            surface.fill_path(
                &outline,
                &Paint::vertical(local, Color::rgb(0x63, 0x66, 0xf1), Color::rgb(0x4f, 0x46, 0xe5)),
            );
            let stripe = Color::WHITE.with_alpha(0.2);
            for i in 0..5 {
                let x = local.x + i as f32 * 25.0;
                surface.line(Vec2::new(x, local.y), Vec2::new(x + 50.0, local.bottom()), stripe, 3.0);
            }
            surface.text("?", Vec2::ZERO, &TextStyle::new(40.0, Color::WHITE.with_alpha(0.4)).bold());
        } else {
            let (base, light) = FACES[card.face];
            surface.fill_path(&outline, &Paint::vertical(local, light, base));
            surface.stroke_path(
                &shapes::round_rect(local.inflate(-5.0), 12.0),
                Color::WHITE.with_alpha(0.5),
                4.0,
            );
            surface.fill_path(
                &Path::circle(Vec2::ZERO, 30.0),
                &Paint::Radial {
                    center: Vec2::splat(-10.0),
                    inner: 0.0,
                    outer: 30.0,
                    stops: vec![
                        (0.0, Color::WHITE.with_alpha(0.8)),
                        (0.5, base),
                        (1.0, base.darken(20.0)),
                    ],
                },
            );
        }

        if let Some(p) = card.glow.and_then(|t| t.progress(now)) {
            surface.stroke_path(&outline, FACES[card.face].0.with_alpha(1.0 - p), 5.0);
        }
        surface.restore();
    }
}

impl Game for Memory {
    type Event = MemoryEvent;

    fn kind(&self) -> GameKind {
        GameKind::Memory
    }

    fn reset(&mut self, core: &mut Core<MemoryEvent>) {
        self.flipped.clear();
        self.matched_pairs = 0;
        self.moves = 0;

        let mut faces: Vec<usize> = (0..PAIRS).flat_map(|i| [i, i]).collect();
        faces.shuffle(&mut core.rng);

        let rows = faces.len().div_ceil(COLS);
        let total_w = COLS as f32 * CARD_W + (COLS - 1) as f32 * SPACING;
        let total_h = rows as f32 * CARD_H + (rows - 1) as f32 * SPACING;
        let origin = Vec2::new(
            (core.width() - total_w) / 2.0,
            (core.height() - total_h) / 2.0 + 30.0,
        );
        self.cards = faces
            .into_iter()
            .enumerate()
            .map(|(i, face)| {
                let (col, row) = ((i % COLS) as f32, (i / COLS) as f32);
                Card {
                    rect: Rect::new(
                        origin.x + col * (CARD_W + SPACING),
                        origin.y + row * (CARD_H + SPACING),
                        CARD_W,
                        CARD_H,
                    ),
                    face,
                    face_up: false,
                    matched: false,
                    flip: None,
                    glow: None,
                }
            })
            .collect();

        self.stars = (0..20)
            .map(|_| Star {
                pos: Vec2::new(
                    span(&mut core.rng, 0.0, core.size.x),
                    span(&mut core.rng, 0.0, core.size.y),
                ),
                size: core.rng.random_range(1.0..3.0),
                speed: core.rng.random_range(0.5..1.0),
            })
            .collect();
    }

    fn pointer(&mut self, core: &mut Core<MemoryEvent>, ev: Pointer) {
        if ev.phase != PointerPhase::Down || !self.can_flip() {
            return;
        }
        let hit = self
            .cards
            .iter()
            .position(|c| !c.matched && !c.face_up && hit_rect(ev.pos, &c.rect));
        if let Some(index) = hit {
            self.flip(core, index);
        }
    }

    fn on_timer(&mut self, core: &mut Core<MemoryEvent>, event: MemoryEvent) {
        match event {
            MemoryEvent::CheckMatch => self.check_match(core),
            MemoryEvent::FlipBack(a, b) => self.flip_back(core.now, a, b),
        }
    }

    fn render(&self, core: &Core<MemoryEvent>, surface: &mut dyn Surface) {
        let size = surface.size();
        surface.fill(&Paint::vertical(
            Rect::new(0.0, 0.0, size.x, size.y),
            Color::rgb(0xfe, 0xf3, 0xc7),
            Color::rgb(0xfd, 0xe6, 0x8a),
        ));
        let secs = (core.now / 1000.0) as f32;
        for star in &self.stars {
            let alpha = (secs * star.speed).sin().abs() * 0.3;
            surface.fill_circle(star.pos, star.size, &Paint::Solid(Color::rgba(251, 146, 60, alpha)));
        }

        header(surface, "🎴 Find all the pairs! 🎴", None);
        let cx = size.x / 2.0;
        surface.text(
            &format!("Moves: {}", self.moves),
            Vec2::new(cx - 80.0, 70.0),
            &TextStyle::new(20.0, Color::rgb(0xf9, 0x73, 0x16)).bold(),
        );
        surface.text(
            &format!("Pairs: {}/{}", self.matched_pairs, PAIRS),
            Vec2::new(cx + 80.0, 70.0),
            &TextStyle::new(20.0, Color::rgb(0x10, 0xb9, 0x81)).bold(),
        );

        for card in &self.cards {
            Self::draw_card(surface, card, core.now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GameSession;
    use crate::session::testing::Harness;

    fn center(h: &Harness<Memory>, i: usize) -> Vec2 {
        h.game().cards[i].rect.center()
    }

    /// Indices of the two cards showing `face`
    fn pair(h: &Harness<Memory>, face: usize) -> (usize, usize) {
        let idx: Vec<usize> = h
            .game()
            .cards
            .iter()
            .enumerate()
            .filter(|(_, c)| c.face == face)
            .map(|(i, _)| i)
            .collect();
        (idx[0], idx[1])
    }

    #[test]
    fn test_deck_has_every_pair_twice() {
        let h = Harness::new(Memory::default(), 1);
        assert_eq!(h.game().cards.len(), PAIRS * 2);
        for face in 0..PAIRS {
            assert_eq!(h.game().cards.iter().filter(|c| c.face == face).count(), 2);
        }
    }

    #[test]
    fn test_match_stays_face_up() {
        let mut h = Harness::new(Memory::default(), 2);
        let (a, b) = pair(&h, 0);
        let (pa, pb) = (center(&h, a), center(&h, b));
        h.tap(pa);
        h.tap(pb);
        assert_eq!(h.game().moves, 1);
        h.run_ms(CHECK_MS + 20.0);
        assert_eq!(h.game().matched_pairs, 1);
        assert!(h.game().cards[a].matched && h.game().cards[b].matched);
        assert!(h.sink.heard(SoundEffect::Success));
        assert!(!h.core().particles.is_empty());
    }

    #[test]
    fn test_mismatch_flips_back() {
        let mut h = Harness::new(Memory::default(), 3);
        let (a, _) = pair(&h, 0);
        let (b, _) = pair(&h, 1);
        let (pa, pb) = (center(&h, a), center(&h, b));
        h.tap(pa);
        h.tap(pb);

        // A third card is refused while two are showing
        let (c, _) = pair(&h, 2);
        let pc = center(&h, c);
        h.tap(pc);
        assert!(!h.game().cards[c].face_up);

        h.run_ms(CHECK_MS + 20.0);
        assert!(h.sink.heard(SoundEffect::Error));
        assert!(h.game().cards[a].face_up);
        h.run_ms(FLIP_BACK_MS);
        assert!(!h.game().cards[a].face_up && !h.game().cards[b].face_up);
        assert!(h.game().flipped.is_empty());
    }

    #[test]
    fn test_same_card_twice_is_ignored() {
        let mut h = Harness::new(Memory::default(), 4);
        let p = center(&h, 0);
        h.tap(p);
        h.tap(p);
        assert_eq!(h.game().flipped, vec![0]);
        assert_eq!(h.game().moves, 0);
    }

    #[test]
    fn test_all_pairs_complete() {
        let mut h = Harness::new(Memory::default(), 5);
        for face in 0..PAIRS {
            let (a, b) = pair(&h, face);
            let (pa, pb) = (center(&h, a), center(&h, b));
            h.tap(pa);
            h.tap(pb);
            h.run_ms(CHECK_MS + 20.0);
        }
        assert_eq!(h.session.score(), PAIRS as u32);
        assert_eq!(h.game().moves, PAIRS as u32);
        assert_eq!(h.completions(), 0);
        h.run_ms(FINISH_DELAY_MS);
        assert_eq!(h.completions(), 1);
    }
}
