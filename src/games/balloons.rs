//! Pop as many rising balloons as possible in 30 seconds

use glam::Vec2;
use rand::Rng;

use super::{GameKind, header, span};
use crate::anim::{Tween, pop_scale};
use crate::audio::SoundEffect;
use crate::draw::{Color, Paint, Path, Surface, shapes};
use crate::input::{Pointer, PointerPhase};
use crate::session::{Core, Game};
use crate::{Rect, hit_rect};

/// Round length in ticks (30 s)
const ROUND_TICKS: u64 = 30 * 60;
/// A new balloon every second
const SPAWN_EVERY: u64 = 60;
const BALLOON_W: f32 = 50.0;
const BALLOON_H: f32 = 70.0;
const STRING_LEN: f32 = 30.0;
const POP_MS: f64 = 300.0;

const COLORS: [Color; 6] = [
    Color::rgb(0xef, 0x44, 0x44),
    Color::rgb(0x3b, 0x82, 0xf6),
    Color::rgb(0x10, 0xb9, 0x81),
    Color::rgb(0xfb, 0xbf, 0x24),
    Color::rgb(0xec, 0x48, 0x99),
    Color::rgb(0x8b, 0x5c, 0xf6),
];

#[derive(Debug, Clone)]
pub struct Balloon {
    /// Knot position; the body hangs above it
    pub pos: Vec2,
    pub color: Color,
    pub speed: f32,
    pub sway: f32,
    pub popped: Option<Tween>,
}

impl Balloon {
    /// Tap region: body plus string
    fn bounds(&self) -> Rect {
        Rect::new(
            self.pos.x - BALLOON_W / 2.0,
            self.pos.y - BALLOON_H,
            BALLOON_W,
            BALLOON_H + STRING_LEN,
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Cloud {
    pos: Vec2,
    size: f32,
    speed: f32,
}

#[derive(Debug, Default)]
pub struct Balloons {
    pub balloons: Vec<Balloon>,
    clouds: Vec<Cloud>,
}

impl Balloons {
    fn remaining_seconds(ticks: u64) -> u64 {
        ROUND_TICKS.saturating_sub(ticks).div_ceil(60)
    }

    fn spawn(&mut self, core: &mut Core<()>) {
        let x = span(&mut core.rng, 50.0, core.size.x - 50.0);
        let color = COLORS[core.rng.random_range(0..COLORS.len())];
        let speed = core.rng.random_range(1.0..2.5);
        let sway = core.rng.random_range(-0.1..0.1);
        self.balloons.push(Balloon {
            pos: Vec2::new(x, core.height() + 50.0),
            color,
            speed,
            sway,
            popped: None,
        });
    }

    fn draw_balloon(surface: &mut dyn Surface, b: &Balloon, now: f64, ticks: u64) {
        surface.save();
        surface.translate(b.pos);
        surface.rotate(b.sway + (ticks as f32 * 0.02 + b.pos.x).sin() * 0.08);
        if let Some(p) = b.popped.and_then(|t| t.progress(now)) {
            surface.set_alpha(1.0 - p);
            surface.scale(Vec2::splat(pop_scale(p)));
        }

        surface.line(Vec2::ZERO, Vec2::new(0.0, STRING_LEN), Color::rgb(0x64, 0x74, 0x8b), 2.0);

        let body = Vec2::new(0.0, -BALLOON_H / 2.0);
        let outline = shapes::ellipse(body, BALLOON_W / 2.0, BALLOON_H / 2.0);
        surface.fill_path(&outline, &Paint::Solid(b.color));
        surface.fill_path(
            &outline,
            &Paint::Radial {
                center: Vec2::new(-BALLOON_W * 0.2, -BALLOON_H * 0.6),
                inner: 0.0,
                outer: BALLOON_H / 2.0,
                stops: vec![
                    (0.0, Color::WHITE.with_alpha(0.6)),
                    (0.5, Color::WHITE.with_alpha(0.2)),
                    (1.0, Color::WHITE.with_alpha(0.0)),
                ],
            },
        );
        surface.fill_path(
            &shapes::ellipse(Vec2::ZERO, 6.0, 8.0),
            &Paint::Solid(Color::rgb(0x47, 0x55, 0x69)),
        );
        surface.restore();
    }
}

impl Game for Balloons {
    type Event = ();

    fn kind(&self) -> GameKind {
        GameKind::Balloons
    }

    fn reset(&mut self, core: &mut Core<()>) {
        self.balloons.clear();
        self.clouds = (0..5)
            .map(|_| Cloud {
                pos: Vec2::new(
                    span(&mut core.rng, 0.0, core.size.x),
                    span(&mut core.rng, 0.0, core.size.y * 0.4),
                ),
                size: core.rng.random_range(40.0..80.0),
                speed: core.rng.random_range(0.2..0.5),
            })
            .collect();
    }

    fn pointer(&mut self, core: &mut Core<()>, ev: Pointer) {
        if ev.phase != PointerPhase::Down {
            return;
        }
        // Topmost (newest) balloon first, one pop per tap
        let hit = self
            .balloons
            .iter_mut()
            .rev()
            .find(|b| b.popped.is_none() && hit_rect(ev.pos, &b.bounds()));
        if let Some(balloon) = hit {
            balloon.popped = Some(Tween::new(core.now, POP_MS));
            core.score += 1;
            core.play(SoundEffect::Pop);
        }
    }

    fn update(&mut self, core: &mut Core<()>) {
        if core.ticks >= ROUND_TICKS {
            core.finish_after(0.0);
            return;
        }
        if core.ticks > 0 && core.ticks % SPAWN_EVERY == 0 {
            self.spawn(core);
        }

        let width = core.width();
        for cloud in &mut self.clouds {
            cloud.pos.x += cloud.speed;
            if cloud.pos.x > width + cloud.size {
                cloud.pos.x = -cloud.size;
            }
        }

        let now = core.now;
        for b in &mut self.balloons {
            if b.popped.is_none() {
                b.pos.y -= b.speed;
            }
        }
        self.balloons.retain(|b| match b.popped {
            Some(t) => !t.is_done(now),
            None => b.pos.y >= -100.0,
        });
    }

    fn render(&self, core: &Core<()>, surface: &mut dyn Surface) {
        let size = surface.size();
        surface.fill(&Paint::vertical(
            Rect::new(0.0, 0.0, size.x, size.y),
            Color::rgb(0xbf, 0xdb, 0xfe),
            Color::rgb(0xe0, 0xf2, 0xfe),
        ));

        let cloud_paint = Paint::Solid(Color::WHITE.with_alpha(0.8));
        for c in &self.clouds {
            let path = Path::circle(c.pos, c.size * 0.5);
            surface.fill_path(&path, &cloud_paint);
            surface.fill_circle(c.pos + Vec2::new(c.size * 0.4, 0.0), c.size * 0.4, &cloud_paint);
            surface.fill_circle(c.pos + Vec2::new(c.size * 0.8, 0.0), c.size * 0.5, &cloud_paint);
        }

        let remaining = Self::remaining_seconds(core.ticks);
        header(
            surface,
            "🎈 Pop the balloons! 🎈",
            Some((&format!("⏰ {remaining} seconds left!"), Color::rgb(0xef, 0x44, 0x44))),
        );

        for b in &self.balloons {
            Self::draw_balloon(surface, b, core.now, core.ticks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GameSession;
    use crate::session::testing::Harness;

    #[test]
    fn test_spawns_one_per_second() {
        let mut h = Harness::new(Balloons::default(), 1);
        h.frames(59);
        assert!(h.game().balloons.is_empty());
        h.frames(2);
        assert_eq!(h.game().balloons.len(), 1);
        h.frames(60);
        assert_eq!(h.game().balloons.len(), 2);
    }

    #[test]
    fn test_tap_pops_with_padding() {
        let mut h = Harness::new(Balloons::default(), 2);
        h.frames(61);
        let b = h.game().balloons[0].clone();
        // Just right of the body, inside the forgiving margin
        h.tap(Vec2::new(b.pos.x + BALLOON_W / 2.0 + 8.0, b.pos.y - 20.0));
        assert_eq!(h.session.score(), 1);
        assert!(h.sink.heard(SoundEffect::Pop));

        // Popped balloons can't be popped again and fade out in 300 ms
        let pos = h.game().balloons[0].pos;
        h.tap(pos - Vec2::new(0.0, 20.0));
        assert_eq!(h.session.score(), 1);
        h.run_ms(320.0);
        assert!(h.game().balloons.iter().all(|b| b.popped.is_none()));
    }

    #[test]
    fn test_miss_is_noop() {
        let mut h = Harness::new(Balloons::default(), 3);
        h.frames(61);
        h.tap(Vec2::new(-500.0, -500.0));
        assert_eq!(h.session.score(), 0);
        assert!(h.sink.played().is_empty());
    }

    #[test]
    fn test_round_ends_after_thirty_seconds() {
        let mut h = Harness::new(Balloons::default(), 4);
        h.frames(ROUND_TICKS as usize - 10);
        assert_eq!(h.completions(), 0);
        assert!(h.surface.has_text("1 seconds left"));
        h.frames(20);
        assert_eq!(h.completions(), 1);
        assert!(!h.session.is_running());
    }

    #[test]
    fn test_balloons_rise_and_leave() {
        let mut h = Harness::new(Balloons::default(), 5);
        h.frames(61);
        let y0 = h.game().balloons[0].pos.y;
        h.frames(10);
        let y1 = h.game().balloons[0].pos.y;
        assert!(y1 < y0 - 9.0 && y1 > y0 - 26.0);
    }
}
