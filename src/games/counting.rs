//! Count one kind of animal in a crowd and pick the right number

use glam::Vec2;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::{CONFETTI, GameKind, badge, header, span};
use crate::anim::{Tween, bounce_scale, shake_offset};
use crate::audio::SoundEffect;
use crate::draw::{Color, Paint, Surface, TextStyle, shapes};
use crate::input::{Pointer, PointerPhase};
use crate::particles::Burst;
use crate::session::{Core, Game};
use crate::{Rect, hit_rect};

pub const LEVELS: u32 = 10;
/// Highest number offered on a button
pub const MAX_ANSWER: u32 = 10;
const OPTIONS: usize = 4;
const BUTTON_SIZE: f32 = 80.0;
const BUTTON_SPACING: f32 = 20.0;
const FIELD_MARGIN: f32 = 50.0;
const FIELD_TOP: f32 = 180.0;
const ANIMAL_SIZE: f32 = 50.0;
const NEXT_LEVEL_MS: f64 = 2000.0;
const FINISH_DELAY_MS: f64 = 2500.0;
const SUCCESS_MS: f64 = 500.0;
const SHAKE_MS: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animal {
    pub emoji: &'static str,
    pub plural: &'static str,
    pub color: Color,
}

pub const ANIMALS: [Animal; 8] = [
    Animal { emoji: "🐱", plural: "cats", color: Color::rgb(0xf9, 0x73, 0x16) },
    Animal { emoji: "🐶", plural: "dogs", color: Color::rgb(0xf5, 0x9e, 0x0b) },
    Animal { emoji: "🐟", plural: "fish", color: Color::rgb(0x3b, 0x82, 0xf6) },
    Animal { emoji: "🐦", plural: "birds", color: Color::rgb(0x14, 0xb8, 0xa6) },
    Animal { emoji: "🐰", plural: "bunnies", color: Color::rgb(0xa8, 0x55, 0xf7) },
    Animal { emoji: "🐸", plural: "frogs", color: Color::rgb(0x10, 0xb9, 0x81) },
    Animal { emoji: "🦋", plural: "butterflies", color: Color::rgb(0xec, 0x48, 0x99) },
    Animal { emoji: "🐢", plural: "turtles", color: Color::rgb(0x84, 0xcc, 0x16) },
];

/// Most animals of one type at `level`
pub fn max_count(level: u32) -> u32 {
    (2 + level).min(7)
}

/// Different animal types mixed together at `level`
pub fn types_for_level(level: u32) -> usize {
    if level <= 3 { 2 } else { 3 }
}

/// Four distinct answers in `1..=MAX_ANSWER`, one of them `correct`, in
/// random order. Wrong answers stay within three of the right one.
pub fn answer_options<R: Rng>(rng: &mut R, correct: u32) -> Vec<u32> {
    let correct = correct.clamp(1, MAX_ANSWER);
    let near: Vec<u32> = (correct.saturating_sub(3).max(1)..=(correct + 3).min(MAX_ANSWER))
        .filter(|&n| n != correct)
        .collect();
    let mut options: Vec<u32> = near.choose_multiple(rng, OPTIONS - 1).copied().collect();
    options.push(correct);
    options.shuffle(rng);
    options
}

#[derive(Debug, Clone)]
pub struct Critter {
    pub kind: usize,
    pub pos: Vec2,
    tilt: f32,
    phase: f32,
}

#[derive(Debug, Clone)]
pub struct AnswerButton {
    pub value: u32,
    pub rect: Rect,
    success: Option<Tween>,
    shake: Option<Tween>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountingEvent {
    NextLevel,
}

#[derive(Debug, Default)]
pub struct Counting {
    pub critters: Vec<Critter>,
    pub buttons: Vec<AnswerButton>,
    /// Animal type being counted
    pub question: usize,
    pub answer: u32,
    advancing: bool,
    stars: Vec<(Vec2, f32, f32)>,
}

impl Counting {
    fn build_level(&mut self, core: &mut Core<CountingEvent>) {
        self.advancing = false;
        let level = core.level;
        let rng = &mut core.rng;

        let mut pool: Vec<usize> = (0..ANIMALS.len()).collect();
        pool.shuffle(rng);
        let kinds = &pool[..types_for_level(level)];

        let mut critters = Vec::new();
        let mut counts = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let n = rng.random_range(1..=max_count(level));
            counts.push(n);
            for _ in 0..n {
                critters.push(Critter {
                    kind,
                    pos: Vec2::ZERO,
                    tilt: rng.random_range(-0.15..0.15),
                    phase: rng.random_range(0.0..std::f32::consts::TAU),
                });
            }
        }
        critters.shuffle(rng);

        let pick = rng.random_range(0..kinds.len());
        self.question = kinds[pick];
        self.answer = counts[pick];
        self.critters = critters;
        self.layout_critters(core);

        let options = answer_options(&mut core.rng, self.answer);
        let total = BUTTON_SIZE * OPTIONS as f32 + BUTTON_SPACING * (OPTIONS - 1) as f32;
        let start_x = (core.size.x - total) / 2.0;
        let y = core.size.y - 120.0;
        self.buttons = options
            .into_iter()
            .enumerate()
            .map(|(i, value)| AnswerButton {
                value,
                rect: Rect::new(
                    start_x + i as f32 * (BUTTON_SIZE + BUTTON_SPACING),
                    y,
                    BUTTON_SIZE,
                    BUTTON_SIZE,
                ),
                success: None,
                shake: None,
            })
            .collect();
    }

    /// Spread the crowd over a grid with a little jitter per cell
    fn layout_critters(&mut self, core: &mut Core<CountingEvent>) {
        let n = self.critters.len().max(1);
        let w = (core.size.x - FIELD_MARGIN * 2.0).max(1.0);
        let h = (core.size.y - FIELD_TOP - 200.0).max(1.0);
        let cols = ((n as f32 * (w / h)).sqrt().ceil() as usize).clamp(1, n);
        let rows = n.div_ceil(cols);
        let cell = Vec2::new(w / cols as f32, h / rows as f32);
        let rng = &mut core.rng;
        for (i, c) in self.critters.iter_mut().enumerate() {
            let jitter = Vec2::new(
                rng.random_range(-0.15..0.15) * cell.x,
                rng.random_range(-0.15..0.15) * cell.y,
            );
            let (col, row) = ((i % cols) as f32, (i / cols) as f32);
            c.pos = Vec2::new(FIELD_MARGIN, FIELD_TOP) + cell * Vec2::new(col + 0.5, row + 0.5) + jitter;
        }
    }
}

impl Game for Counting {
    type Event = CountingEvent;

    fn kind(&self) -> GameKind {
        GameKind::Counting
    }

    fn reset(&mut self, core: &mut Core<CountingEvent>) {
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

    fn pointer(&mut self, core: &mut Core<CountingEvent>, ev: Pointer) {
        if ev.phase != PointerPhase::Down || self.advancing {
            return;
        }
        let answer = self.answer;
        let Some(button) = self.buttons.iter_mut().find(|b| hit_rect(ev.pos, &b.rect)) else {
            return;
        };
        if button.value != answer {
            button.shake = Some(Tween::new(core.now, SHAKE_MS));
            core.play(SoundEffect::Error);
            return;
        }

        button.success = Some(Tween::new(core.now, SUCCESS_MS));
        let at = button.rect.center();
        self.advancing = true;
        core.score += 1;
        core.play(SoundEffect::Success);
        core.burst(at, &Burst::ring(30, CONFETTI));
        if core.level < LEVELS {
            core.level += 1;
            core.after(NEXT_LEVEL_MS, CountingEvent::NextLevel);
        } else {
            core.finish_after(FINISH_DELAY_MS);
        }
    }

    fn on_timer(&mut self, core: &mut Core<CountingEvent>, event: CountingEvent) {
        match event {
            CountingEvent::NextLevel => self.build_level(core),
        }
    }

    fn render(&self, core: &Core<CountingEvent>, surface: &mut dyn Surface) {
        let size = surface.size();
        surface.fill(&Paint::vertical(
            Rect::new(0.0, 0.0, size.x, size.y),
            Color::rgb(0xd9, 0xf9, 0x9d),
            Color::rgb(0xbe, 0xf2, 0x64),
        ));
        let secs = (core.now / 1000.0) as f32;
        for &(pos, r, speed) in &self.stars {
            let alpha = (secs * speed).sin().abs() * 0.25;
            surface.fill_circle(pos, r, &Paint::Solid(Color::rgba(132, 204, 22, alpha)));
        }

        header(surface, "🐾 Count the animals! 🐾", None);
        let cx = size.x / 2.0;
        badge(
            surface,
            Vec2::new(cx, 70.0),
            &format!("⭐ Level {}/{}", core.level, LEVELS),
            Color::rgb(0x84, 0xcc, 0x16),
        );
        let animal = ANIMALS[self.question];
        surface.text(
            &format!("How many {}?", animal.plural),
            Vec2::new(cx, 115.0),
            &TextStyle::new(26.0, animal.color).bold(),
        );
        surface.text(animal.emoji, Vec2::new(cx, 155.0), &TextStyle::new(40.0, Color::BLACK));

        for c in &self.critters {
            surface.save();
            surface.translate(c.pos);
            surface.rotate(c.tilt);
            surface.scale(Vec2::splat(1.0 + (secs * 3.0 + c.phase).sin() * 0.05));
            surface.text(
                ANIMALS[c.kind].emoji,
                Vec2::ZERO,
                &TextStyle::new(ANIMAL_SIZE, Color::BLACK),
            );
            surface.restore();
        }

        for b in &self.buttons {
            let scale = b.success.and_then(|t| t.progress(core.now)).map_or(1.0, bounce_scale);
            let mut center = b.rect.center();
            if !core.reduced_motion {
                if let Some(p) = b.shake.and_then(|t| t.progress(core.now)) {
                    center.x += shake_offset(p, 10.0);
                }
            }
            let rect = Rect::centered(center, b.rect.w * scale, b.rect.h * scale);
            surface.fill_path(
                &shapes::round_rect(rect, 15.0),
                &Paint::vertical(rect, Color::rgb(0xfb, 0xbf, 0x24), Color::rgb(0xf5, 0x9e, 0x0b)),
            );
            surface.stroke_path(
                &shapes::round_rect(rect.inflate(-3.0), 12.0),
                Color::WHITE.with_alpha(0.5),
                3.0,
            );
            surface.text(&b.value.to_string(), center, &TextStyle::new(36.0, Color::WHITE).bold());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GameSession;
    use crate::session::testing::Harness;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn button_for(h: &Harness<Counting>, value: u32) -> Vec2 {
        h.game().buttons.iter().find(|b| b.value == value).unwrap().rect.center()
    }

    fn wrong_button(h: &Harness<Counting>) -> Vec2 {
        let answer = h.game().answer;
        h.game().buttons.iter().find(|b| b.value != answer).unwrap().rect.center()
    }

    proptest! {
        #[test]
        fn prop_options_are_distinct_and_in_range(seed in any::<u64>(), correct in 1u32..=10) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let opts = answer_options(&mut rng, correct);
            prop_assert_eq!(opts.len(), OPTIONS);
            prop_assert!(opts.contains(&correct));
            prop_assert!(opts.iter().all(|&n| (1..=MAX_ANSWER).contains(&n)));
            let mut sorted = opts.clone();
            sorted.sort_unstable();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), OPTIONS);
        }
    }

    #[test]
    fn test_level_difficulty() {
        assert_eq!(max_count(1), 3);
        assert_eq!(max_count(5), 7);
        assert_eq!(max_count(10), 7);
        assert_eq!(types_for_level(3), 2);
        assert_eq!(types_for_level(4), 3);
    }

    #[test]
    fn test_answer_matches_crowd() {
        for seed in 0..20 {
            let h = Harness::new(Counting::default(), seed);
            let g = h.game();
            let counted = g.critters.iter().filter(|c| c.kind == g.question).count() as u32;
            assert_eq!(counted, g.answer);
            assert!((1..=max_count(1)).contains(&g.answer));
            assert_eq!(g.buttons.iter().filter(|b| b.value == g.answer).count(), 1);
        }
    }

    #[test]
    fn test_wrong_answer_keeps_level() {
        let mut h = Harness::new(Counting::default(), 2);
        let p = wrong_button(&h);
        h.tap(p);
        assert_eq!(h.session.level(), 1);
        assert!(h.sink.heard(SoundEffect::Error));
    }

    #[test]
    fn test_input_blocked_while_advancing() {
        let mut h = Harness::new(Counting::default(), 3);
        let p = button_for(&h, h.game().answer);
        h.tap(p);
        h.tap(p);
        assert_eq!(h.session.score(), 1);
        assert_eq!(h.session.level(), 2);
        h.run_ms(NEXT_LEVEL_MS + 20.0);
        let p = button_for(&h, h.game().answer);
        h.tap(p);
        assert_eq!(h.session.score(), 2);
    }

    #[test]
    fn test_ten_levels_complete() {
        let mut h = Harness::new(Counting::default(), 4);
        for _ in 0..LEVELS {
            let p = button_for(&h, h.game().answer);
            h.tap(p);
            h.run_ms(NEXT_LEVEL_MS + 20.0);
        }
        assert_eq!(h.session.score(), LEVELS);
        h.run_ms(FINISH_DELAY_MS);
        assert_eq!(h.completions(), 1);
    }
}
