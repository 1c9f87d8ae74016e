//! Endless runner: tap to hop over the obstacles

use glam::Vec2;
use rand::Rng;

use super::{GameKind, banner, span};
use crate::audio::SoundEffect;
use crate::draw::{Color, Paint, Surface, TextAlign, TextStyle, shapes};
use crate::input::{Key, Pointer, PointerPhase};
use crate::particles::{Burst, Spread};
use crate::session::{Core, Game};
use crate::Rect;

pub const GRAVITY: f32 = 0.4;
pub const JUMP_VELOCITY: f32 = -15.0;
pub const START_SPEED: f32 = 1.5;
pub const MAX_SPEED: f32 = 2.5;
const SPEED_STEP: f32 = 0.1;
/// Points between speed-ups
const SPEED_EVERY: u32 = 20;
const FIRST_INTERVAL: u32 = 200;
const PLAYER_X: f32 = 100.0;
const PLAYER_SIZE: f32 = 40.0;
const OBSTACLE_SIZE: f32 = 25.0;
const GROUND_HEIGHT: f32 = 100.0;
/// Hitboxes shrink by this much on every side
const HIT_INSET: f32 = 5.0;

const GOLD: &[Color] = &[Color::rgb(0xfb, 0xbf, 0x24)];
const RED: &[Color] = &[Color::rgb(0xef, 0x44, 0x44)];

const OBSTACLES: [(&str, Color); 5] = [
    ("🌳", Color::rgb(0x10, 0xb9, 0x81)),
    ("🪨", Color::rgb(0x3b, 0x82, 0xf6)),
    ("🌺", Color::rgb(0xa8, 0x55, 0xf7)),
    ("🍄", Color::rgb(0xf5, 0x9e, 0x0b)),
    ("🦋", Color::rgb(0xec, 0x48, 0x99)),
];

#[derive(Debug, Clone)]
pub struct Obstacle {
    pub rect: Rect,
    pub look: usize,
    pub passed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Runner {
    /// Top-left corner
    pub pos: Vec2,
    pub vel_y: f32,
    pub airborne: bool,
    pub spin: f32,
}

impl Runner {
    fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, PLAYER_SIZE, PLAYER_SIZE)
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, 0.0),
            vel_y: 0.0,
            airborne: false,
            spin: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cloud {
    pos: Vec2,
    size: f32,
    speed: f32,
}

#[derive(Debug, Default)]
pub struct Jumping {
    pub runner: Runner,
    pub obstacles: Vec<Obstacle>,
    pub speed: f32,
    pub game_over: bool,
    /// Best score across restarts within this session
    pub best: u32,
    spawn_timer: u32,
    spawn_interval: u32,
    ground_y: f32,
    clouds: Vec<Cloud>,
}

/// Axis-aligned overlap after shrinking both boxes by [`HIT_INSET`]
fn collides(a: &Rect, b: &Rect) -> bool {
    a.inflate(-HIT_INSET).overlaps(&b.inflate(-HIT_INSET))
}

impl Jumping {
    fn restart(&mut self, core: &mut Core<()>) {
        self.ground_y = core.size.y - GROUND_HEIGHT;
        self.runner = Runner {
            pos: Vec2::new(PLAYER_X, self.ground_y - PLAYER_SIZE),
            ..Runner::default()
        };
        self.obstacles.clear();
        self.speed = START_SPEED;
        self.spawn_timer = 0;
        self.spawn_interval = FIRST_INTERVAL;
        self.game_over = false;
        core.score = 0;
        core.particles.clear();

        let ground = self.ground_y.max(1.0);
        self.clouds = (0..5)
            .map(|_| Cloud {
                pos: Vec2::new(
                    span(&mut core.rng, 0.0, core.size.x),
                    span(&mut core.rng, 0.0, ground * 0.5),
                ),
                size: core.rng.random_range(30.0..60.0),
                speed: core.rng.random_range(0.3..0.8),
            })
            .collect();
    }

    fn jump(&mut self, core: &mut Core<()>) {
        if self.game_over {
            self.restart(core);
            return;
        }
        if self.runner.airborne {
            return;
        }
        self.runner.vel_y = JUMP_VELOCITY;
        self.runner.airborne = true;
        core.play(SoundEffect::Jump);
        let feet = self.runner.pos + Vec2::new(PLAYER_SIZE / 2.0, PLAYER_SIZE);
        core.burst(
            feet,
            &Burst {
                spread: Spread::Fountain { drift: 4.0 },
                ..Burst::scatter(10, GOLD, 0.0..3.0)
            },
        );
    }

    fn update_runner(&mut self) {
        let r = &mut self.runner;
        r.vel_y += GRAVITY;
        r.pos.y += r.vel_y;
        r.spin = if r.airborne { r.spin + 0.15 } else { 0.0 };
        let floor = self.ground_y - PLAYER_SIZE;
        if r.pos.y >= floor {
            r.pos.y = floor;
            r.vel_y = 0.0;
            r.airborne = false;
            r.spin = 0.0;
        }
    }

    fn update_obstacles(&mut self, core: &mut Core<()>) {
        for o in &mut self.obstacles {
            o.rect.x -= self.speed;
            if !o.passed && o.rect.right() < self.runner.pos.x {
                o.passed = true;
                core.score += 1;
                core.play(SoundEffect::Score);
                if core.score % SPEED_EVERY == 0 && self.speed < MAX_SPEED {
                    self.speed = (self.speed + SPEED_STEP).min(MAX_SPEED);
                }
            }
        }
        self.obstacles.retain(|o| o.rect.right() >= 0.0);

        self.spawn_timer += 1;
        if self.spawn_timer >= self.spawn_interval {
            self.spawn_timer = 0;
            self.spawn_interval = core.rng.random_range(180..=300);
            self.obstacles.push(Obstacle {
                rect: Rect::new(
                    core.size.x,
                    self.ground_y - OBSTACLE_SIZE,
                    OBSTACLE_SIZE,
                    OBSTACLE_SIZE,
                ),
                look: core.rng.random_range(0..OBSTACLES.len()),
                passed: false,
            });
        }
    }

    fn check_collision(&mut self, core: &mut Core<()>) {
        let body = self.runner.rect();
        if !self.obstacles.iter().any(|o| collides(&body, &o.rect)) {
            return;
        }
        self.game_over = true;
        self.best = self.best.max(core.score);
        core.play(SoundEffect::GameOver);
        core.burst(body.center(), &Burst::ring(20, RED).with_size(3.0..7.0));
        log::debug!("runner crashed at {} points", core.score);
    }
}

impl Game for Jumping {
    type Event = ();

    /// Dust settles a little faster than the usual confetti
    const PARTICLE_GRAVITY: f32 = 0.3;

    fn kind(&self) -> GameKind {
        GameKind::Jumping
    }

    fn reset(&mut self, core: &mut Core<()>) {
        self.restart(core);
    }

    fn pointer(&mut self, core: &mut Core<()>, ev: Pointer) {
        if ev.phase == PointerPhase::Down {
            self.jump(core);
        }
    }

    fn key(&mut self, core: &mut Core<()>, key: Key) {
        if matches!(key, Key::Space | Key::Up) {
            self.jump(core);
        }
    }

    fn update(&mut self, core: &mut Core<()>) {
        let width = core.size.x;
        for c in &mut self.clouds {
            c.pos.x -= c.speed;
            if c.pos.x < -c.size * 2.0 {
                c.pos.x = width + c.size;
            }
        }
        if self.game_over {
            return;
        }
        self.update_runner();
        self.update_obstacles(core);
        self.check_collision(core);
    }

    fn render(&self, core: &Core<()>, surface: &mut dyn Surface) {
        let size = surface.size();
        let sky = Rect::new(0.0, 0.0, size.x, size.y);
        surface.fill_rect(
            sky,
            &Paint::Linear {
                from: Vec2::ZERO,
                to: Vec2::new(0.0, size.y),
                stops: vec![
                    (0.0, Color::rgb(0x93, 0xc5, 0xfd)),
                    (0.6, Color::rgb(0xbf, 0xdb, 0xfe)),
                    (1.0, Color::rgb(0xdb, 0xea, 0xfe)),
                ],
            },
        );
        let puff = Paint::Solid(Color::WHITE.with_alpha(0.6));
        for c in &self.clouds {
            surface.fill_circle(c.pos, c.size * 0.5, &puff);
            surface.fill_circle(c.pos + Vec2::new(c.size * 0.4, 0.0), c.size * 0.4, &puff);
            surface.fill_circle(c.pos + Vec2::new(c.size * 0.8, 0.0), c.size * 0.5, &puff);
        }

        let ground = Rect::new(0.0, self.ground_y, size.x, size.y - self.ground_y);
        surface.fill_rect(
            ground,
            &Paint::vertical(ground, Color::rgb(0x22, 0xc5, 0x5e), Color::rgb(0x15, 0x80, 0x3d)),
        );
        let flowers = ["🌼", "🌻", "🌸", "🌺"];
        let mut x = 0.0;
        let mut i = 0;
        while x < size.x {
            surface.text(flowers[i % 4], Vec2::new(x, self.ground_y + 20.0), &TextStyle::new(16.0, Color::BLACK));
            x += 80.0;
            i += 1;
        }

        for o in &self.obstacles {
            let (emoji, color) = OBSTACLES[o.look];
            surface.fill_path(
                &shapes::round_rect(o.rect, 6.0),
                &Paint::vertical(o.rect, color.lighten(30.0), color),
            );
            surface.text(emoji, o.rect.center(), &TextStyle::new(OBSTACLE_SIZE * 0.5, Color::BLACK));
        }

        let body = self.runner.rect();
        surface.save();
        surface.translate(body.center());
        surface.rotate(self.runner.spin);
        let local = Rect::centered(Vec2::ZERO, PLAYER_SIZE, PLAYER_SIZE);
        surface.fill_path(
            &shapes::round_rect(local, 10.0),
            &Paint::Radial {
                center: Vec2::new(0.0, -5.0),
                inner: 5.0,
                outer: PLAYER_SIZE / 2.0,
                stops: vec![
                    (0.0, Color::rgb(0xfd, 0xe0, 0x47)),
                    (0.7, Color::rgb(0xfb, 0xbf, 0x24)),
                    (1.0, Color::rgb(0xf5, 0x9e, 0x0b)),
                ],
            },
        );
        let eye = Paint::Solid(Color::rgb(0x1e, 0x29, 0x3b));
        surface.fill_circle(Vec2::new(-8.0, -5.0), 4.0, &eye);
        surface.fill_circle(Vec2::new(8.0, -5.0), 4.0, &eye);
        surface.restore();

        let ink = Color::rgb(0x1e, 0x29, 0x3b);
        surface.text(
            &format!("Points: {}", core.score),
            Vec2::new(20.0, 40.0),
            &TextStyle::new(32.0, ink).bold().align(TextAlign::Left),
        );
        if self.best > 0 {
            surface.text(
                &format!("Best: {}", self.best),
                Vec2::new(20.0, 70.0),
                &TextStyle::new(20.0, Color::rgb(0xf5, 0x9e, 0x0b)).bold().align(TextAlign::Left),
            );
        }
        if core.score == 0 && !self.game_over {
            surface.text(
                "🦘 Tap to jump! 🦘",
                Vec2::new(size.x / 2.0, 100.0),
                &TextStyle::new(24.0, ink).bold(),
            );
        }
        if self.game_over {
            banner(
                surface,
                "Oops!",
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

    fn place_obstacle(h: &mut Harness<Jumping>, x: f32) {
        let ground = h.game().ground_y;
        h.game_mut().obstacles.push(Obstacle {
            rect: Rect::new(x, ground - OBSTACLE_SIZE, OBSTACLE_SIZE, OBSTACLE_SIZE),
            look: 0,
            passed: false,
        });
    }

    #[test]
    fn test_jump_arc_lands_back_on_ground() {
        let mut h = Harness::new(Jumping::default(), 1);
        let floor = h.game().runner.pos.y;
        h.tap(Vec2::new(400.0, 300.0));
        assert!(h.game().runner.airborne);
        assert!(h.sink.heard(SoundEffect::Jump));

        // Double jumps are ignored mid-air
        h.frames(5);
        let vel = h.game().runner.vel_y;
        h.tap(Vec2::new(400.0, 300.0));
        assert_eq!(h.game().runner.vel_y, vel);

        // v0 = 15, g = 0.4: airborne for about 75 ticks, peak near 281 px
        let mut peak = floor;
        for _ in 0..80 {
            h.frame();
            peak = peak.min(h.game().runner.pos.y);
        }
        assert!(floor - peak > 250.0);
        assert!(!h.game().runner.airborne);
        assert_eq!(h.game().runner.pos.y, floor);
    }

    #[test]
    fn test_first_obstacle_after_interval() {
        let mut h = Harness::new(Jumping::default(), 2);
        h.frames(FIRST_INTERVAL as usize - 1);
        assert!(h.game().obstacles.is_empty());
        h.frame();
        assert_eq!(h.game().obstacles.len(), 1);
        assert!((180..=300).contains(&h.game().spawn_interval));
    }

    #[test]
    fn test_passing_scores_and_speeds_up() {
        let mut h = Harness::new(Jumping::default(), 3);
        h.core_mut().score = SPEED_EVERY - 1;
        place_obstacle(&mut h, PLAYER_X - OBSTACLE_SIZE - 0.5);
        h.frame();
        assert_eq!(h.session.score(), SPEED_EVERY);
        assert!(h.sink.heard(SoundEffect::Score));
        assert!((h.game().speed - (START_SPEED + SPEED_STEP)).abs() < 1e-5);
    }

    #[test]
    fn test_speed_is_capped() {
        let mut h = Harness::new(Jumping::default(), 3);
        h.game_mut().speed = MAX_SPEED;
        h.core_mut().score = SPEED_EVERY - 1;
        place_obstacle(&mut h, PLAYER_X - OBSTACLE_SIZE - 3.0);
        h.frame();
        assert_eq!(h.game().speed, MAX_SPEED);
    }

    #[test]
    fn test_grazing_contact_is_forgiven() {
        let mut h = Harness::new(Jumping::default(), 4);
        // Overlaps the raw box by 3 px, inside the inset
        place_obstacle(&mut h, PLAYER_X + PLAYER_SIZE - 3.0 + START_SPEED);
        h.frame();
        assert!(!h.game().game_over);
    }

    #[test]
    fn test_crash_then_tap_restarts_with_initial_values() {
        let mut h = Harness::new(Jumping::default(), 5);
        h.core_mut().score = 7;
        h.game_mut().speed = 2.0;
        place_obstacle(&mut h, PLAYER_X + 10.0);
        h.frame();
        assert!(h.game().game_over);
        assert_eq!(h.game().best, 7);
        assert!(h.sink.heard(SoundEffect::GameOver));

        // World freezes while game over
        let x = h.game().obstacles[0].rect.x;
        h.frames(10);
        assert_eq!(h.game().obstacles[0].rect.x, x);
        assert!(h.session.is_running());

        h.key(Key::Space);
        assert!(!h.game().game_over);
        assert!(h.game().obstacles.is_empty());
        assert_eq!(h.session.score(), 0);
        assert_eq!(h.game().speed, START_SPEED);
        assert_eq!(h.game().spawn_interval, FIRST_INTERVAL);
        assert_eq!(h.game().best, 7);
        assert_eq!(h.completions(), 0);
    }
}
