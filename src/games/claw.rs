//! Claw machine seen from above: aim, drop, and carry toys to the chute

use glam::Vec2;
use rand::Rng;

use super::{GameKind, span};
use crate::audio::SoundEffect;
use crate::draw::{Color, Paint, Path, Surface, TextAlign, TextStyle, shapes};
use crate::input::{Key, Pointer, PointerPhase};
use crate::particles::Burst;
use crate::session::{Core, Game};
use crate::{Rect, hit_rect};

/// Toys to collect before the round ends
pub const TARGET: u32 = 5;
pub const TOY_COUNT: usize = 10;
/// Nearest toy within this distance of the claw tip is grabbed
pub const GRAB_RADIUS: f32 = 100.0;
const CLAW_SPEED: f32 = 8.0;
const CLOSE_RATE: f32 = 0.12;
const OPEN_RATE: f32 = 0.05;
const CLAW_WIDTH: f32 = 80.0;
const CLAW_Y: f32 = 60.0;
/// Taps above this line aim the claw
const AIM_STRIP: f32 = 90.0;
const FINISH_MS: f64 = 1000.0;

/// (emoji, color, size, points)
const TOYS: [(&str, Color, f32, u32); 8] = [
    ("🧸", Color::rgb(0xf5, 0x9e, 0x0b), 50.0, 10),
    ("🐻", Color::rgb(0x92, 0x40, 0x0e), 50.0, 10),
    ("🐰", Color::rgb(0xec, 0x48, 0x99), 45.0, 10),
    ("🦁", Color::rgb(0xfb, 0xbf, 0x24), 50.0, 15),
    ("🐯", Color::rgb(0xf9, 0x73, 0x16), 50.0, 15),
    ("🐼", Color::rgb(0x1e, 0x29, 0x3b), 50.0, 15),
    ("⭐", Color::rgb(0xfb, 0xbf, 0x24), 45.0, 30),
    ("💎", Color::rgb(0x3b, 0x82, 0xf6), 40.0, 50),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClawState {
    #[default]
    Idle,
    Lowering,
    Closing,
    Raising,
    Returning,
}

#[derive(Debug, Clone)]
pub struct Toy {
    pub pos: Vec2,
    pub look: usize,
    pub caught: bool,
    wobble: f32,
}

impl Toy {
    pub fn points(&self) -> u32 {
        TOYS[self.look].3
    }

    fn color(&self) -> Color {
        TOYS[self.look].1
    }
}

#[derive(Debug, Clone, Default)]
pub struct Claw {
    pub pos: Vec2,
    pub target_x: f32,
    pub state: ClawState,
    /// 1 is fully open
    pub open: f32,
    /// Index into the toy list
    pub held: Option<usize>,
}

#[derive(Debug, Default)]
pub struct ClawMachine {
    pub claw: Claw,
    pub toys: Vec<Toy>,
    pub caught: u32,
    pub bin: Rect,
}

impl ClawMachine {
    fn grab_button(size: Vec2) -> Rect {
        Rect::new(size.x / 2.0 - 75.0, size.y - 80.0, 150.0, 60.0)
    }

    fn fill_bin(&mut self, core: &mut Core<()>) {
        let bin = self.bin;
        let rng = &mut core.rng;
        self.toys = (0..TOY_COUNT)
            .map(|_| {
                let look = rng.random_range(0..TOYS.len());
                let pad = TOYS[look].2 / 2.0 + 20.0;
                Toy {
                    pos: Vec2::new(
                        span(rng, bin.x + pad, bin.right() - pad),
                        span(rng, bin.y + pad, bin.bottom() - pad),
                    ),
                    look,
                    caught: false,
                    wobble: rng.random_range(0.0..std::f32::consts::TAU),
                }
            })
            .collect();
    }

    fn aim(&mut self, x: f32) {
        let lo = self.bin.x + 40.0;
        let hi = self.bin.right() - 40.0;
        self.claw.target_x = x.min(hi).max(lo);
    }

    fn drop_claw(&mut self, core: &mut Core<()>) {
        if self.claw.state != ClawState::Idle {
            return;
        }
        self.claw.state = ClawState::Lowering;
        self.claw.open = 1.0;
        core.play(SoundEffect::Click);
    }

    fn try_grab(&mut self, core: &mut Core<()>) {
        let tip = self.claw.pos + Vec2::new(0.0, 40.0);
        let nearest = self
            .toys
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.caught)
            .map(|(i, t)| (i, t.pos.distance(tip)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match nearest {
            Some((i, dist)) if dist < GRAB_RADIUS => {
                let toy = &mut self.toys[i];
                toy.caught = true;
                let (pos, color) = (toy.pos, toy.color());
                self.claw.held = Some(i);
                core.play(SoundEffect::Success);
                core.burst(pos, &sparkle(&color));
            }
            _ => core.play(SoundEffect::Error),
        }
    }

    fn carry(&mut self) {
        if let Some(i) = self.claw.held {
            self.toys[i].pos = self.claw.pos + Vec2::new(0.0, 60.0);
        }
    }

    fn collect(&mut self, core: &mut Core<()>) {
        let Some(i) = self.claw.held.take() else {
            return;
        };
        let toy = self.toys.remove(i);
        self.caught += 1;
        core.score += toy.points();
        core.play(SoundEffect::Score);
        core.burst(self.claw.pos + Vec2::new(0.0, 20.0), &sparkle(&toy.color()));
        log::debug!("claw collected {} ({}/{TARGET})", TOYS[toy.look].0, self.caught);
        if self.caught >= TARGET {
            core.finish_after(FINISH_MS);
        }
    }

    fn draw_claw(&self, surface: &mut dyn Surface) {
        let Claw { pos, open, .. } = self.claw;
        surface.line(Vec2::new(pos.x, 10.0), pos, Color::rgb(0x64, 0x74, 0x8b), 3.0);

        surface.save();
        surface.translate(pos);
        let body = Rect::new(-CLAW_WIDTH / 3.0, -15.0, CLAW_WIDTH * 0.66, 30.0);
        surface.fill_rect(
            body,
            &Paint::Linear {
                from: Vec2::new(-CLAW_WIDTH / 2.0, -CLAW_WIDTH / 2.0),
                to: Vec2::new(CLAW_WIDTH / 2.0, CLAW_WIDTH / 2.0),
                stops: vec![
                    (0.0, Color::rgb(0x94, 0xa3, 0xb8)),
                    (1.0, Color::rgb(0x64, 0x74, 0x8b)),
                ],
            },
        );

        let spread = CLAW_WIDTH / 2.0 * open;
        let prong = Paint::Solid(Color::rgb(0x47, 0x55, 0x69));
        for side in [-1.0, 1.0] {
            let finger = Path::polyline([
                Vec2::new(side * spread, 15.0),
                Vec2::new(side * (spread + 20.0), 15.0),
                Vec2::new(side * (spread + 25.0), 45.0),
                Vec2::new(side * (spread + 10.0), 45.0),
            ])
            .close();
            surface.fill_path(&finger, &prong);
        }
        surface.fill_rect(
            Rect::new(-CLAW_WIDTH / 3.0 + 3.0, -12.0, CLAW_WIDTH * 0.2, 25.0),
            &Paint::Solid(Color::WHITE.with_alpha(0.3)),
        );
        surface.restore();
    }

    fn draw_toy(surface: &mut dyn Surface, toy: &Toy) {
        let (emoji, color, size, _) = TOYS[toy.look];
        surface.save();
        surface.translate(toy.pos + Vec2::new(toy.wobble.sin() * 2.0, (toy.wobble * 1.2).cos()));
        surface.fill_path(
            &shapes::ellipse(Vec2::new(0.0, size / 2.0 + 5.0), size / 3.0, size / 6.0),
            &Paint::Solid(Color::BLACK.with_alpha(0.3)),
        );
        surface.fill_circle(
            Vec2::ZERO,
            size / 2.0,
            &Paint::Radial {
                center: Vec2::new(-10.0, -10.0),
                inner: 0.0,
                outer: size / 2.0,
                stops: vec![(0.0, color.lighten(50.0)), (0.6, color), (1.0, color.darken(20.0))],
            },
        );
        surface.fill_circle(
            Vec2::splat(-size / 6.0),
            size / 3.0,
            &Paint::Radial {
                center: Vec2::splat(-size / 4.0),
                inner: 0.0,
                outer: size / 3.0,
                stops: vec![
                    (0.0, Color::WHITE.with_alpha(0.8)),
                    (1.0, Color::WHITE.with_alpha(0.0)),
                ],
            },
        );
        surface.text(emoji, Vec2::ZERO, &TextStyle::new(size * 0.7, Color::WHITE));
        surface.restore();
    }
}

fn sparkle(color: &Color) -> Burst<'_> {
    Burst::ring(20, std::slice::from_ref(color))
        .with_size(3.0..7.0)
        .with_lift(-2.0)
}

impl Game for ClawMachine {
    type Event = ();

    fn kind(&self) -> GameKind {
        GameKind::Claw
    }

    fn reset(&mut self, core: &mut Core<()>) {
        let size = core.size;
        self.bin = Rect::new(size.x * 0.1, 100.0, size.x * 0.8, size.y * 0.7);
        self.claw = Claw {
            pos: Vec2::new(size.x / 2.0, CLAW_Y),
            target_x: size.x / 2.0,
            state: ClawState::Idle,
            open: 1.0,
            held: None,
        };
        self.caught = 0;
        self.fill_bin(core);
    }

    fn pointer(&mut self, core: &mut Core<()>, ev: Pointer) {
        if ev.phase != PointerPhase::Down || self.claw.state != ClawState::Idle {
            return;
        }
        if hit_rect(ev.pos, &Self::grab_button(core.size)) {
            self.drop_claw(core);
        } else if ev.pos.y < AIM_STRIP {
            self.aim(ev.pos.x);
        }
    }

    fn key(&mut self, core: &mut Core<()>, key: Key) {
        if self.claw.state != ClawState::Idle {
            return;
        }
        match key {
            Key::Left => self.aim(self.claw.target_x - 60.0),
            Key::Right => self.aim(self.claw.target_x + 60.0),
            Key::Down | Key::Space | Key::Enter => self.drop_claw(core),
            _ => {}
        }
    }

    fn update(&mut self, core: &mut Core<()>) {
        let claw = &mut self.claw;
        match claw.state {
            ClawState::Idle => {
                let dx = claw.target_x - claw.pos.x;
                if dx.abs() > 1.0 {
                    claw.pos.x += dx * 0.15;
                }
            }
            ClawState::Lowering => {
                let floor = self.bin.y + 50.0;
                claw.pos.y = (claw.pos.y + CLAW_SPEED).min(floor);
                if claw.pos.y >= floor {
                    claw.state = ClawState::Closing;
                }
            }
            ClawState::Closing => {
                claw.open = (claw.open - CLOSE_RATE).max(0.0);
                if claw.open <= 0.0 {
                    claw.state = ClawState::Raising;
                    self.try_grab(core);
                }
            }
            ClawState::Raising => {
                claw.pos.y = (claw.pos.y - CLAW_SPEED).max(CLAW_Y);
                if claw.pos.y <= CLAW_Y {
                    claw.state = ClawState::Returning;
                }
                self.carry();
            }
            ClawState::Returning => {
                claw.open = (claw.open + OPEN_RATE).min(1.0);
                let dx = core.size.x / 2.0 - claw.pos.x;
                if dx.abs() > 2.0 {
                    claw.pos.x += dx * 0.1;
                    self.carry();
                } else {
                    self.collect(core);
                    self.claw.state = ClawState::Idle;
                    self.claw.open = 1.0;
                }
            }
        }

        for toy in self.toys.iter_mut().filter(|t| !t.caught) {
            toy.wobble += 0.03;
        }
    }

    fn render(&self, core: &Core<()>, surface: &mut dyn Surface) {
        let size = surface.size();
        surface.fill(&Paint::Linear {
            from: Vec2::ZERO,
            to: Vec2::new(0.0, size.y),
            stops: vec![
                (0.0, Color::rgb(0x1e, 0x1b, 0x4b)),
                (0.5, Color::rgb(0x5b, 0x21, 0xb6)),
                (1.0, Color::rgb(0x7c, 0x3a, 0xed)),
            ],
        });

        let yellow = Color::rgb(0xfd, 0xe0, 0x47);
        surface.text("🎪 Claw Machine 🎪", Vec2::new(size.x / 2.0, 35.0), &TextStyle::new(32.0, yellow).bold());
        surface.text(
            &format!("⭐ {}", core.score),
            Vec2::new(15.0, 70.0),
            &TextStyle::new(24.0, yellow).bold().align(TextAlign::Left),
        );
        surface.text(
            &format!("{}/{TARGET}", self.caught),
            Vec2::new(size.x - 15.0, 70.0),
            &TextStyle::new(24.0, Color::rgb(0x10, 0xb9, 0x81)).bold().align(TextAlign::Right),
        );

        let blue = Color::rgb(0x3b, 0x82, 0xf6);
        surface.fill_rect(self.bin, &Paint::Solid(blue.with_alpha(0.2)));
        surface.stroke_path(&Path::rect(self.bin), blue, 4.0);
        let grid = blue.with_alpha(0.2);
        let mut x = self.bin.x;
        while x <= self.bin.right() {
            surface.line(Vec2::new(x, self.bin.y), Vec2::new(x, self.bin.bottom()), grid, 2.0);
            x += 60.0;
        }
        let mut y = self.bin.y;
        while y <= self.bin.bottom() {
            surface.line(Vec2::new(self.bin.x, y), Vec2::new(self.bin.right(), y), grid, 2.0);
            y += 60.0;
        }

        for (i, toy) in self.toys.iter().enumerate() {
            if toy.caught && self.claw.held != Some(i) {
                continue;
            }
            Self::draw_toy(surface, toy);
        }
        self.draw_claw(surface);

        if self.claw.state == ClawState::Idle {
            let button = Self::grab_button(size);
            surface.fill_path(
                &shapes::round_rect(button, 15.0),
                &Paint::vertical(button, Color::rgb(0x10, 0xb9, 0x81), Color::rgb(0x05, 0x96, 0x69)),
            );
            surface.text("GRAB! 👇", button.center(), &TextStyle::new(26.0, Color::WHITE).bold());
            if self.caught == 0 {
                surface.text(
                    "👆 Tap up here to move the claw! 👆",
                    Vec2::new(size.x / 2.0, 95.0),
                    &TextStyle::new(20.0, Color::WHITE.with_alpha(0.9)).bold(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GameSession;
    use crate::session::testing::Harness;

    fn grab_at(h: &Harness<ClawMachine>) -> Vec2 {
        ClawMachine::grab_button(h.core().size).center()
    }

    /// Leave a single toy right under the claw's resting drop point
    fn plant(h: &mut Harness<ClawMachine>, look: usize) {
        let x = h.game().claw.pos.x;
        let y = h.game().bin.y + 50.0 + 40.0;
        h.game_mut().toys = vec![Toy {
            pos: Vec2::new(x, y),
            look,
            caught: false,
            wobble: 0.0,
        }];
    }

    fn run_until_idle(h: &mut Harness<ClawMachine>) {
        for _ in 0..600 {
            h.frame();
            if h.game().claw.state == ClawState::Idle {
                return;
            }
        }
        panic!("claw never came back");
    }

    #[test]
    fn test_bin_starts_full() {
        let h = Harness::new(ClawMachine::default(), 1);
        assert_eq!(h.game().toys.len(), TOY_COUNT);
        for toy in &h.game().toys {
            assert!(h.game().bin.contains(toy.pos));
        }
    }

    #[test]
    fn test_aim_only_in_top_strip() {
        let mut h = Harness::new(ClawMachine::default(), 2);
        h.tap(Vec2::new(10.0, 50.0));
        let lo = h.game().bin.x + 40.0;
        assert_eq!(h.game().claw.target_x, lo);

        h.tap(Vec2::new(600.0, 300.0));
        assert_eq!(h.game().claw.target_x, lo);

        h.key(Key::Right);
        assert_eq!(h.game().claw.target_x, lo + 60.0);
        h.frames(60);
        assert!((h.game().claw.pos.x - (lo + 60.0)).abs() <= 1.0);
    }

    #[test]
    fn test_grab_and_collect() {
        let mut h = Harness::new(ClawMachine::default(), 3);
        plant(&mut h, 7);
        let button = grab_at(&h);
        h.tap(button);
        assert_eq!(h.game().claw.state, ClawState::Lowering);
        assert!(h.sink.heard(SoundEffect::Click));

        // Busy claw ignores input
        h.tap(Vec2::new(10.0, 50.0));
        assert_eq!(h.game().claw.target_x, 400.0);

        run_until_idle(&mut h);
        assert!(h.sink.heard(SoundEffect::Success));
        assert!(h.sink.heard(SoundEffect::Score));
        assert_eq!(h.game().caught, 1);
        assert_eq!(h.session.score(), 50);
        assert!(h.game().toys.is_empty());
        assert_eq!(h.game().claw.held, None);
    }

    #[test]
    fn test_miss_plays_error() {
        let mut h = Harness::new(ClawMachine::default(), 4);
        h.game_mut().toys.clear();
        h.tap(grab_at(&h));
        run_until_idle(&mut h);
        assert!(h.sink.heard(SoundEffect::Error));
        assert_eq!(h.game().caught, 0);
        assert_eq!(h.session.score(), 0);
    }

    #[test]
    fn test_five_toys_complete_round() {
        let mut h = Harness::new(ClawMachine::default(), 5);
        for _ in 0..TARGET {
            plant(&mut h, 0);
            h.tap(grab_at(&h));
            run_until_idle(&mut h);
        }
        assert_eq!(h.game().caught, TARGET);
        assert_eq!(h.completions(), 0);
        h.run_ms(FINISH_MS + 50.0);
        assert_eq!(h.completions(), 1);
        assert!(!h.session.is_running());
    }
}
