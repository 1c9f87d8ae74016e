//! Three-lane road: steer left and right around the traffic

use glam::Vec2;
use rand::Rng;

use super::{GameKind, banner};
use crate::audio::SoundEffect;
use crate::draw::{Color, Paint, Surface, TextAlign, TextStyle};
use crate::input::{Key, Pointer, PointerPhase};
use crate::particles::Burst;
use crate::session::{Core, Game};
use crate::Rect;

pub const LANES: usize = 3;
pub const MAX_LEVEL: u32 = 10;
/// Passed objects per level
const LEVEL_EVERY: u32 = 15;
const PLAYER_SIZE: f32 = 60.0;
const OBJECT_SIZE: f32 = 50.0;
/// Player hitbox shrinks by this much on every side
const HIT_INSET: f32 = 10.0;
const STEER: f32 = 0.2;

const PASS_GREEN: &[Color] = &[Color::rgb(0x10, 0xb9, 0x81)];
const FIRE: &[Color] = &[
    Color::rgb(0xef, 0x44, 0x44),
    Color::rgb(0xf5, 0x9e, 0x0b),
    Color::rgb(0xfb, 0xbf, 0x24),
];
const PARTY: &[Color] = &[
    Color::rgb(0xfb, 0xbf, 0x24),
    Color::rgb(0xf5, 0x9e, 0x0b),
    Color::rgb(0x10, 0xb9, 0x81),
];

/// (emoji, points)
const TRAFFIC: [(&str, u32); 6] = [
    ("🚙", 1),
    ("🚕", 1),
    ("🚌", 2),
    ("🚛", 2),
    ("🏍️", 1),
    ("🚑", 2),
];

/// Fall speed in px per tick
pub fn fall_speed(level: u32) -> f32 {
    2.0 + level.saturating_sub(1) as f32 * 0.3
}

/// Ticks between spawns
pub fn spawn_interval(level: u32) -> u32 {
    100u32.saturating_sub(level.saturating_sub(1) * 5).max(60)
}

#[derive(Debug, Clone)]
pub struct Falling {
    /// Center
    pub pos: Vec2,
    pub lane: usize,
    pub look: usize,
    pub points: u32,
    spin: f32,
}

#[derive(Debug, Default)]
pub struct Dodging {
    /// Player center
    pub player: Vec2,
    pub target_lane: usize,
    pub objects: Vec<Falling>,
    pub passed: u32,
    pub game_over: bool,
    pub best: u32,
    spawn_timer: u32,
    lane_width: f32,
    frame: u64,
}

impl Dodging {
    fn lane_x(&self, lane: usize) -> f32 {
        self.lane_width * lane as f32 + self.lane_width / 2.0
    }

    fn restart(&mut self, core: &mut Core<()>) {
        core.score = 0;
        core.level = 1;
        core.particles.clear();
        self.lane_width = core.size.x / LANES as f32;
        self.target_lane = LANES / 2;
        self.player = Vec2::new(self.lane_x(self.target_lane), core.size.y - 100.0);
        self.objects.clear();
        self.passed = 0;
        self.spawn_timer = 0;
        self.game_over = false;
    }

    fn steer(&mut self, core: &mut Core<()>, right: bool) {
        let lane = if right {
            (self.target_lane + 1).min(LANES - 1)
        } else {
            self.target_lane.saturating_sub(1)
        };
        if lane != self.target_lane {
            self.target_lane = lane;
            core.play(SoundEffect::Click);
        }
    }

    fn hits_player(&self, obj: &Falling) -> bool {
        let body = Rect::centered(self.player, PLAYER_SIZE, PLAYER_SIZE).inflate(-HIT_INSET);
        body.overlaps(&Rect::centered(obj.pos, OBJECT_SIZE, OBJECT_SIZE))
    }

    fn spawn(&mut self, core: &mut Core<()>) {
        let lane = core.rng.random_range(0..LANES);
        let look = core.rng.random_range(0..TRAFFIC.len());
        self.objects.push(Falling {
            pos: Vec2::new(self.lane_x(lane), -50.0),
            lane,
            look,
            points: TRAFFIC[look].1,
            spin: 0.0,
        });
    }

    fn crash(&mut self, core: &mut Core<()>) {
        self.game_over = true;
        self.best = self.best.max(core.score);
        core.play(SoundEffect::GameOver);
        core.burst(self.player, &Burst::scatter(30, FIRE, 2.0..7.0).with_size(4.0..10.0));
        log::debug!("crashed on level {} with {} points", core.level, core.score);
    }

    fn pass(&mut self, core: &mut Core<()>, obj: &Falling) {
        core.score += obj.points;
        self.passed += 1;
        core.play(SoundEffect::Score);
        core.burst(
            Vec2::new(obj.pos.x, core.size.y - 50.0),
            &Burst::scatter(5, PASS_GREEN, 2.0..4.0).with_lift(-2.0),
        );
        if self.passed % LEVEL_EVERY == 0 && core.level < MAX_LEVEL {
            core.level += 1;
            let center = core.size / 2.0;
            core.burst(center, &Burst::scatter(50, PARTY, 3.0..7.0).with_size(5.0..10.0));
            log::debug!("dodging level {}", core.level);
        }
    }
}

impl Game for Dodging {
    type Event = ();

    /// Sparks fly straight out
    const PARTICLE_GRAVITY: f32 = 0.0;

    fn kind(&self) -> GameKind {
        GameKind::Dodging
    }

    fn reset(&mut self, core: &mut Core<()>) {
        self.restart(core);
    }

    fn pointer(&mut self, core: &mut Core<()>, ev: Pointer) {
        if ev.phase != PointerPhase::Down {
            return;
        }
        if self.game_over {
            self.restart(core);
            return;
        }
        let right = ev.pos.x >= core.size.x / 2.0;
        self.steer(core, right);
    }

    fn key(&mut self, core: &mut Core<()>, key: Key) {
        if self.game_over {
            return;
        }
        match key {
            Key::Left => self.steer(core, false),
            Key::Right => self.steer(core, true),
            _ => {}
        }
    }

    fn update(&mut self, core: &mut Core<()>) {
        self.frame += 1;
        if self.game_over {
            return;
        }

        self.spawn_timer += 1;
        if self.spawn_timer >= spawn_interval(core.level) {
            self.spawn_timer = 0;
            self.spawn(core);
        }

        let target = self.lane_x(self.target_lane);
        self.player.x += (target - self.player.x) * STEER;

        let speed = fall_speed(core.level);
        let height = core.size.y;
        let mut i = 0;
        while i < self.objects.len() {
            self.objects[i].pos.y += speed;
            self.objects[i].spin += 0.02;
            if self.hits_player(&self.objects[i]) {
                self.objects.remove(i);
                self.crash(core);
                return;
            }
            if self.objects[i].pos.y > height {
                let obj = self.objects.remove(i);
                self.pass(core, &obj);
                continue;
            }
            i += 1;
        }
    }

    fn render(&self, core: &Core<()>, surface: &mut dyn Surface) {
        let size = surface.size();
        surface.fill(&Paint::vertical(
            Rect::new(0.0, 0.0, size.x, size.y),
            Color::rgb(0x6b, 0x72, 0x80),
            Color::rgb(0x4b, 0x55, 0x63),
        ));
        let grass = Paint::Solid(Color::rgb(0x10, 0xb9, 0x81));
        surface.fill_rect(Rect::new(0.0, 0.0, 30.0, size.y), &grass);
        surface.fill_rect(Rect::new(size.x - 30.0, 0.0, 30.0, size.y), &grass);

        // Dashed lane markings scrolling toward the player
        let offset = (self.frame * 3 % 40) as f32;
        for lane in 1..LANES {
            let x = self.lane_width * lane as f32;
            let mut y = offset - 40.0;
            while y < size.y {
                surface.line(Vec2::new(x, y), Vec2::new(x, y + 20.0), Color::WHITE, 4.0);
                y += 40.0;
            }
        }

        for obj in &self.objects {
            surface.save();
            surface.translate(obj.pos);
            surface.rotate(obj.spin.sin() * 0.1);
            surface.text(TRAFFIC[obj.look].0, Vec2::ZERO, &TextStyle::new(OBJECT_SIZE, Color::BLACK));
            surface.restore();
        }
        surface.text("🚗", self.player, &TextStyle::new(PLAYER_SIZE, Color::BLACK));

        surface.fill_rect(Rect::new(0.0, 0.0, size.x, 80.0), &Paint::Solid(Color::BLACK.with_alpha(0.5)));
        surface.text(
            &format!("Level {}", core.level),
            Vec2::new(20.0, 30.0),
            &TextStyle::new(24.0, Color::rgb(0xfb, 0xbf, 0x24)).bold().align(TextAlign::Left),
        );
        surface.text(
            &format!("Points: {}", core.score),
            Vec2::new(size.x / 2.0, 30.0),
            &TextStyle::new(24.0, Color::rgb(0x10, 0xb9, 0x81)).bold(),
        );
        if self.best > 0 {
            surface.text(
                &format!("Best: {}", self.best),
                Vec2::new(size.x - 20.0, 30.0),
                &TextStyle::new(24.0, Color::rgb(0xec, 0x48, 0x99)).bold().align(TextAlign::Right),
            );
        }
        surface.text(
            "⬅️ Tap left or right ➡️",
            Vec2::new(size.x / 2.0, 62.0),
            &TextStyle::new(18.0, Color::WHITE),
        );

        if self.game_over {
            banner(
                surface,
                "Crash!",
                &[&format!("Points: {}", core.score), "Tap to play again"],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GameSession;
    use crate::session::testing::Harness;

    fn drop_in(h: &mut Harness<Dodging>, lane: usize, y: f32, points: u32) {
        let x = h.game().lane_x(lane);
        h.game_mut().objects.push(Falling {
            pos: Vec2::new(x, y),
            lane,
            look: 0,
            points,
            spin: 0.0,
        });
    }

    #[test]
    fn test_difficulty_curve() {
        assert_eq!(fall_speed(1), 2.0);
        assert!((fall_speed(10) - 4.7).abs() < 1e-5);
        assert_eq!(spawn_interval(1), 100);
        assert_eq!(spawn_interval(5), 80);
        assert_eq!(spawn_interval(10), 60);
        assert_eq!(spawn_interval(30), 60);
    }

    #[test]
    fn test_steering_by_half_and_keys() {
        let mut h = Harness::new(Dodging::default(), 1);
        assert_eq!(h.game().target_lane, 1);
        h.tap(Vec2::new(100.0, 300.0));
        assert_eq!(h.game().target_lane, 0);
        assert!(h.sink.heard(SoundEffect::Click));

        // Already at the edge
        h.sink.clear();
        h.key(Key::Left);
        assert_eq!(h.game().target_lane, 0);
        assert!(h.sink.played().is_empty());

        h.key(Key::Right);
        h.tap(Vec2::new(700.0, 300.0));
        assert_eq!(h.game().target_lane, 2);

        h.frames(40);
        assert!((h.game().player.x - h.game().lane_x(2)).abs() < 1.0);
    }

    #[test]
    fn test_spawn_cadence() {
        let mut h = Harness::new(Dodging::default(), 2);
        h.frames(99);
        assert!(h.game().objects.is_empty());
        h.frame();
        assert_eq!(h.game().objects.len(), 1);
    }

    #[test]
    fn test_pass_scores_points_and_levels_up() {
        let mut h = Harness::new(Dodging::default(), 3);
        h.game_mut().passed = LEVEL_EVERY - 1;
        drop_in(&mut h, 0, 599.0, 2);
        h.frame();
        assert_eq!(h.session.score(), 2);
        assert_eq!(h.game().passed, LEVEL_EVERY);
        assert_eq!(h.session.level(), 2);
        assert!(h.sink.heard(SoundEffect::Score));
    }

    #[test]
    fn test_level_is_capped() {
        let mut h = Harness::new(Dodging::default(), 3);
        h.core_mut().level = MAX_LEVEL;
        h.game_mut().passed = LEVEL_EVERY * 9 - 1;
        drop_in(&mut h, 2, 599.0, 1);
        h.frame();
        assert_eq!(h.session.level(), MAX_LEVEL);
    }

    #[test]
    fn test_crash_and_restart() {
        let mut h = Harness::new(Dodging::default(), 4);
        h.core_mut().score = 12;
        let y = h.game().player.y;
        drop_in(&mut h, 1, y - 40.0, 1);
        h.frame();
        assert!(h.game().game_over);
        assert_eq!(h.game().best, 12);
        assert!(h.sink.heard(SoundEffect::GameOver));

        // Keys do nothing while crashed
        h.key(Key::Left);
        assert_eq!(h.game().target_lane, 1);

        h.tap(Vec2::new(100.0, 300.0));
        assert!(!h.game().game_over);
        assert_eq!(h.session.score(), 0);
        assert_eq!(h.session.level(), 1);
        assert_eq!(h.game().target_lane, 1);
        assert_eq!(h.game().best, 12);
    }

    #[test]
    fn test_neighbouring_lane_is_safe() {
        let mut h = Harness::new(Dodging::default(), 5);
        let y = h.game().player.y;
        drop_in(&mut h, 0, y - 60.0, 1);
        h.frames(40);
        assert!(!h.game().game_over);
    }
}
