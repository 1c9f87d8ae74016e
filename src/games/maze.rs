//! Drag the ball through ten mazes without touching a wall

use glam::Vec2;
use rand::Rng;

use super::{CONFETTI, GameKind, badge, header, span};
use crate::anim::{Tween, shake_offset};
use crate::audio::SoundEffect;
use crate::draw::{Color, Paint, Surface, TextStyle};
use crate::input::{Pointer, PointerPhase};
use crate::particles::Burst;
use crate::session::{Core, Game};
use crate::{hit_circle, point_segment_distance};

pub const LEVELS: u32 = 10;
const MARGIN: f32 = 60.0;
const HEADER: f32 = 100.0;
const PLAYER_RADIUS: f32 = 15.0;
const GOAL_RADIUS: f32 = 25.0;
const TRAIL_LEN: usize = 20;
const NEXT_LEVEL_MS: f64 = 1500.0;
const FINISH_DELAY_MS: f64 = 2000.0;
const SHAKE_MS: f64 = 300.0;

const BLUE: Color = Color::rgb(0x3b, 0x82, 0xf6);
const PINK: Color = Color::rgb(0xec, 0x48, 0x99);
const GREEN: Color = Color::rgb(0x10, 0xb9, 0x81);
const AMBER: Color = Color::rgb(0xf5, 0x9e, 0x0b);
const VIOLET: Color = Color::rgb(0x8b, 0x5c, 0xf6);
const CYAN: Color = Color::rgb(0x06, 0xb6, 0xd4);
const TEAL: Color = Color::rgb(0x14, 0xb8, 0xa6);
const PURPLE: Color = Color::rgb(0xa8, 0x55, 0xf7);
const ORANGE: Color = Color::rgb(0xf9, 0x73, 0x16);
const SKY: Color = Color::rgb(0x0e, 0xa5, 0xe9);
const LIME: Color = Color::rgb(0x84, 0xcc, 0x16);
const ROSE: Color = Color::rgb(0xf4, 0x3f, 0x5e);
const ERROR_RED: &[Color] = &[Color::rgb(0xef, 0x44, 0x44)];

/// Inner wall as fractions of the play area: (x1, y1, x2, y2, color)
type WallSpec = (f32, f32, f32, f32, Color);

const LAYOUTS: [&[WallSpec]; LEVELS as usize] = [
    &[(0.3, 0.0, 0.3, 0.7, VIOLET), (0.7, 0.3, 0.7, 1.0, CYAN)],
    &[
        (0.25, 0.0, 0.25, 0.6, VIOLET),
        (0.5, 0.4, 0.5, 1.0, CYAN),
        (0.75, 0.0, 0.75, 0.6, AMBER),
    ],
    &[
        (0.2, 0.0, 0.2, 0.5, VIOLET),
        (0.4, 0.3, 0.4, 1.0, CYAN),
        (0.6, 0.0, 0.6, 0.7, AMBER),
        (0.8, 0.3, 0.8, 1.0, PINK),
    ],
    &[
        (0.3, 0.0, 0.3, 0.45, VIOLET),
        (0.0, 0.3, 0.5, 0.3, CYAN),
        (0.6, 0.5, 0.6, 1.0, AMBER),
        (0.4, 0.7, 1.0, 0.7, PINK),
    ],
    &[
        (0.2, 0.0, 0.2, 0.6, VIOLET),
        (0.35, 0.4, 0.35, 1.0, CYAN),
        (0.5, 0.0, 0.5, 0.7, AMBER),
        (0.65, 0.3, 0.65, 1.0, PINK),
        (0.8, 0.0, 0.8, 0.6, TEAL),
    ],
    &[
        (0.25, 0.0, 0.25, 0.5, VIOLET),
        (0.0, 0.25, 0.4, 0.25, CYAN),
        (0.5, 0.4, 0.5, 1.0, AMBER),
        (0.6, 0.75, 1.0, 0.75, PINK),
        (0.75, 0.0, 0.75, 0.6, TEAL),
    ],
    &[
        (0.15, 0.0, 0.15, 0.4, VIOLET),
        (0.0, 0.35, 0.4, 0.35, CYAN),
        (0.4, 0.25, 0.4, 0.65, AMBER),
        (0.3, 0.65, 0.7, 0.65, PINK),
        (0.7, 0.35, 0.7, 1.0, TEAL),
        (0.6, 0.35, 1.0, 0.35, PURPLE),
    ],
    &[
        (0.2, 0.0, 0.2, 0.35, VIOLET),
        (0.0, 0.3, 0.35, 0.3, CYAN),
        (0.35, 0.2, 0.35, 0.55, AMBER),
        (0.25, 0.55, 0.55, 0.55, PINK),
        (0.55, 0.45, 0.55, 0.8, TEAL),
        (0.45, 0.8, 0.8, 0.8, PURPLE),
        (0.7, 0.0, 0.7, 0.7, ORANGE),
    ],
    &[
        (0.15, 0.0, 0.15, 0.4, VIOLET),
        (0.3, 0.25, 0.3, 0.55, CYAN),
        (0.0, 0.5, 0.45, 0.5, AMBER),
        (0.45, 0.35, 0.45, 0.7, PINK),
        (0.35, 0.7, 0.65, 0.7, TEAL),
        (0.6, 0.0, 0.6, 0.45, PURPLE),
        (0.55, 0.3, 0.8, 0.3, ORANGE),
        (0.75, 0.5, 0.75, 1.0, SKY),
    ],
    &[
        (0.12, 0.0, 0.12, 0.35, VIOLET),
        (0.0, 0.25, 0.25, 0.25, CYAN),
        (0.25, 0.15, 0.25, 0.5, AMBER),
        (0.15, 0.45, 0.4, 0.45, PINK),
        (0.4, 0.35, 0.4, 0.65, TEAL),
        (0.3, 0.65, 0.6, 0.65, PURPLE),
        (0.55, 0.0, 0.55, 0.4, ORANGE),
        (0.5, 0.3, 0.75, 0.3, SKY),
        (0.7, 0.5, 0.7, 0.85, LIME),
        (0.6, 0.8, 1.0, 0.8, ROSE),
    ],
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub a: Vec2,
    pub b: Vec2,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MazeEvent {
    NextLevel,
}

#[derive(Debug, Clone, Copy)]
struct TrailPoint {
    pos: Vec2,
    life: f32,
}

#[derive(Debug, Clone, Copy)]
struct Star {
    pos: Vec2,
    size: f32,
    speed: f32,
}

#[derive(Debug, Default)]
pub struct Maze {
    pub walls: Vec<Wall>,
    pub start: Vec2,
    pub goal: Vec2,
    pub player: Vec2,
    pub attempts: u32,
    dragging: bool,
    /// Goal reached, waiting for the next layout
    advancing: bool,
    trail: Vec<TrailPoint>,
    stars: Vec<Star>,
    shake: Option<Tween>,
}

impl Maze {
    fn build_level(&mut self, size: Vec2, level: u32) {
        let origin = Vec2::new(MARGIN, MARGIN + HEADER);
        let area = Vec2::new(
            (size.x - MARGIN * 2.0).max(0.0),
            (size.y - MARGIN * 2.0 - HEADER).max(0.0),
        );
        let at = |fx: f32, fy: f32| origin + area * Vec2::new(fx, fy);
        let r = 20.0_f32.min(area.x / 2.0).min(area.y / 2.0);

        // Border with open rounded corners
        self.walls = vec![
            Wall { a: at(0.0, 0.0) + Vec2::new(r, 0.0), b: at(1.0, 0.0) - Vec2::new(r, 0.0), color: BLUE },
            Wall { a: at(1.0, 0.0) + Vec2::new(0.0, r), b: at(1.0, 1.0) - Vec2::new(0.0, r), color: PINK },
            Wall { a: at(1.0, 1.0) - Vec2::new(r, 0.0), b: at(0.0, 1.0) + Vec2::new(r, 0.0), color: GREEN },
            Wall { a: at(0.0, 1.0) - Vec2::new(0.0, r), b: at(0.0, 0.0) + Vec2::new(0.0, r), color: AMBER },
        ];
        let idx = (level.clamp(1, LEVELS) - 1) as usize;
        self.walls.extend(LAYOUTS[idx].iter().map(|&(x1, y1, x2, y2, color)| Wall {
            a: at(x1, y1),
            b: at(x2, y2),
            color,
        }));

        self.start = at(0.0, 0.5) + Vec2::new(30.0, 0.0);
        self.goal = at(1.0, 0.5) - Vec2::new(30.0, 0.0);
        self.player = self.start;
        self.dragging = false;
        self.advancing = false;
        self.trail.clear();
    }

    fn touches_wall(&self, p: Vec2) -> bool {
        self.walls
            .iter()
            .any(|w| point_segment_distance(p, w.a, w.b) < PLAYER_RADIUS)
    }

    /// Check the whole path from the current position to `to`, so fast
    /// drags can't tunnel through a wall
    fn path_blocked(&self, to: Vec2) -> bool {
        let from = self.player;
        let dist = from.distance(to);
        let steps = (dist / (PLAYER_RADIUS / 2.0)).ceil().max(1.0) as usize;
        (1..=steps).any(|i| self.touches_wall(from.lerp(to, i as f32 / steps as f32)))
    }

    fn hit_wall(&mut self, core: &mut Core<MazeEvent>) {
        let at = self.player;
        self.player = self.start;
        self.dragging = false;
        self.attempts += 1;
        self.trail.clear();
        self.shake = Some(Tween::new(core.now, SHAKE_MS));
        core.play(SoundEffect::Error);
        core.burst(at, &Burst::scatter(15, ERROR_RED, 1.0..3.0).with_size(2.0..5.0));
    }

    fn reach_goal(&mut self, core: &mut Core<MazeEvent>) {
        self.dragging = false;
        self.advancing = true;
        core.score += 1;
        core.play(SoundEffect::Success);
        core.burst(self.goal, &Burst::ring(30, CONFETTI));
        if core.level < LEVELS {
            core.level += 1;
            core.after(NEXT_LEVEL_MS, MazeEvent::NextLevel);
        } else {
            core.finish_after(FINISH_DELAY_MS);
        }
    }

    fn move_player(&mut self, core: &mut Core<MazeEvent>, to: Vec2) {
        self.trail.push(TrailPoint {
            pos: self.player,
            life: 1.0,
        });
        if self.trail.len() > TRAIL_LEN {
            self.trail.remove(0);
        }

        if self.path_blocked(to) {
            self.hit_wall(core);
            return;
        }
        self.player = to;
        if self.player.distance(self.goal) <= PLAYER_RADIUS + GOAL_RADIUS {
            self.reach_goal(core);
        }
    }
}

impl Game for Maze {
    type Event = MazeEvent;

    fn kind(&self) -> GameKind {
        GameKind::Maze
    }

    fn reset(&mut self, core: &mut Core<MazeEvent>) {
        self.attempts = 0;
        self.shake = None;
        self.stars = (0..30)
            .map(|_| Star {
                pos: Vec2::new(
                    span(&mut core.rng, 0.0, core.size.x),
                    span(&mut core.rng, 0.0, core.size.y),
                ),
                size: core.rng.random_range(1.0..3.0),
                speed: core.rng.random_range(0.5..1.0),
            })
            .collect();
        self.build_level(core.size, core.level);
    }

    fn pointer(&mut self, core: &mut Core<MazeEvent>, ev: Pointer) {
        if self.advancing {
            return;
        }
        match ev.phase {
            PointerPhase::Down => {
                self.dragging = hit_circle(ev.pos, self.player, PLAYER_RADIUS);
            }
            PointerPhase::Move if self.dragging => self.move_player(core, ev.pos),
            PointerPhase::Move => {}
            PointerPhase::Up => self.dragging = false,
        }
    }

    fn update(&mut self, _core: &mut Core<MazeEvent>) {
        for p in &mut self.trail {
            p.life -= 0.05;
        }
        self.trail.retain(|p| p.life > 0.0);
    }

    fn on_timer(&mut self, core: &mut Core<MazeEvent>, event: MazeEvent) {
        match event {
            MazeEvent::NextLevel => self.build_level(core.size, core.level),
        }
    }

    fn render(&self, core: &Core<MazeEvent>, surface: &mut dyn Surface) {
        let size = surface.size();
        let secs = (core.now / 1000.0) as f32;
        surface.fill(&Paint::vertical(
            crate::Rect::new(0.0, 0.0, size.x, size.y),
            Color::rgb(0xe0, 0xf2, 0xfe),
            Color::rgb(0xf0, 0xfd, 0xf4),
        ));
        for star in &self.stars {
            let alpha = (secs * star.speed).sin().abs() * 0.3;
            surface.fill_circle(
                star.pos,
                star.size,
                &Paint::Solid(Color::rgba(147, 51, 234, alpha)),
            );
        }

        header(surface, "🌀 Drag the ball to the goal! 🌀", None);
        badge(
            surface,
            Vec2::new(size.x / 2.0, 65.0),
            &format!("⭐ Level {}/{}", core.level, LEVELS),
            VIOLET,
        );
        if self.attempts > 0 {
            surface.text(
                &format!("Tries: {}", self.attempts),
                Vec2::new(size.x / 2.0, 95.0),
                &TextStyle::new(16.0, ERROR_RED[0]).bold(),
            );
        }

        for w in &self.walls {
            surface.line(w.a, w.b, w.color, 8.0);
        }

        for p in &self.trail {
            surface.fill_circle(
                p.pos,
                8.0 * p.life,
                &Paint::Solid(PINK.with_alpha(p.life * 0.3)),
            );
        }

        // Goal: pulsing rings around a target
        let pulse = secs * 4.8;
        let goal_r = GOAL_RADIUS + pulse.sin() * 5.0;
        for i in 0..3 {
            let alpha = (1.0 - i as f32 / 3.0) * 0.3 * (pulse + i as f32).sin().abs();
            surface.stroke_circle(self.goal, goal_r + 10.0 + i as f32 * 8.0, GREEN.with_alpha(alpha), 3.0);
        }
        surface.fill_circle(
            self.goal,
            goal_r,
            &Paint::Radial {
                center: self.goal - Vec2::splat(10.0),
                inner: 0.0,
                outer: goal_r,
                stops: vec![(0.0, Color::rgb(0x6e, 0xe7, 0xb7)), (1.0, GREEN)],
            },
        );
        surface.text("🎯", self.goal, &TextStyle::new(28.0, Color::BLACK));

        // Start pad
        surface.fill_circle(self.start, 25.0, &Paint::Solid(BLUE.with_alpha(0.3)));

        let mut pos = self.player;
        if !core.reduced_motion {
            if let Some(p) = self.shake.and_then(|t| t.progress(core.now)) {
                pos.x += shake_offset(p, 10.0);
            }
        }
        surface.fill_circle(
            pos,
            PLAYER_RADIUS,
            &Paint::Radial {
                center: pos - Vec2::splat(5.0),
                inner: 0.0,
                outer: PLAYER_RADIUS,
                stops: vec![(0.0, Color::rgb(0xf9, 0xa8, 0xd4)), (1.0, PINK)],
            },
        );
        if self.dragging {
            surface.stroke_circle(pos, PLAYER_RADIUS + 4.0, Color::WHITE, 3.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GameSession;
    use crate::session::testing::Harness;

    /// Drag along a list of waypoints in small steps
    fn drag_path(h: &mut Harness<Maze>, points: &[Vec2]) {
        let start = h.game().player;
        h.press(start);
        let mut prev = start;
        for &p in points {
            for i in 1..=20 {
                h.drag_to(prev.lerp(p, i as f32 / 20.0));
            }
            prev = p;
        }
        h.release(prev);
    }

    #[test]
    fn test_wall_resets_to_start() {
        let mut h = Harness::new(Maze::default(), 1);
        let start = h.game().start;
        // Level 1 has a wall at 30% width reaching from the top to 70%
        let goal = h.game().goal;
        drag_path(&mut h, &[goal]);
        assert_eq!(h.game().player, start);
        assert_eq!(h.game().attempts, 1);
        assert!(h.sink.heard(SoundEffect::Error));
        assert!(!h.core().particles.is_empty());
    }

    #[test]
    fn test_fast_drag_cannot_tunnel() {
        let mut h = Harness::new(Maze::default(), 1);
        let goal = h.game().goal;
        let start = h.game().start;
        h.press(start);
        h.drag_to(goal);
        assert_eq!(h.game().player, start);
        assert_eq!(h.game().attempts, 1);
    }

    #[test]
    fn test_drag_must_start_on_ball() {
        let mut h = Harness::new(Maze::default(), 1);
        let start = h.game().start;
        h.press(start + Vec2::new(0.0, 60.0));
        h.drag_to(start + Vec2::new(5.0, 60.0));
        assert_eq!(h.game().player, start);
    }

    /// Route through level 1: under the first wall, over the second
    fn level_one_route(h: &Harness<Maze>) -> Vec<Vec2> {
        let origin = Vec2::new(MARGIN, MARGIN + HEADER);
        let area = Vec2::new(800.0 - 2.0 * MARGIN, 600.0 - 2.0 * MARGIN - HEADER);
        let at = |fx: f32, fy: f32| origin + area * Vec2::new(fx, fy);
        vec![
            Vec2::new(h.game().start.x, at(0.0, 0.85).y),
            at(0.5, 0.85),
            at(0.5, 0.15),
            at(0.85, 0.15),
            h.game().goal,
        ]
    }

    #[test]
    fn test_goal_advances_level_after_delay() {
        let mut h = Harness::new(Maze::default(), 1);
        let route = level_one_route(&h);
        drag_path(&mut h, &route);
        assert_eq!(h.game().attempts, 0);
        assert_eq!(h.session.level(), 2);
        assert_eq!(h.session.score(), 1);
        assert!(h.sink.heard(SoundEffect::Success));

        // Layout swaps only after the pause
        assert_eq!(h.game().walls.len(), 4 + 2);
        h.run_ms(NEXT_LEVEL_MS + 20.0);
        assert_eq!(h.game().walls.len(), 4 + 3);
        assert_eq!(h.game().player, h.game().start);
    }

    #[test]
    fn test_last_level_completes() {
        let mut h = Harness::new(Maze::default(), 1);
        h.core_mut().level = LEVELS;
        let size = h.core().size;
        h.game_mut().build_level(size, LEVELS);
        // Teleport next to the goal and nudge in
        let goal = h.game().goal;
        h.game_mut().player = goal - Vec2::new(45.0, 0.0);
        h.press(goal - Vec2::new(45.0, 0.0));
        h.drag_to(goal - Vec2::new(30.0, 0.0));
        assert_eq!(h.session.level(), LEVELS);
        h.run_ms(FINISH_DELAY_MS + 20.0);
        assert_eq!(h.completions(), 1);
    }

    #[test]
    fn test_trail_is_capped() {
        let mut h = Harness::new(Maze::default(), 1);
        let start = h.game().start;
        h.press(start);
        for i in 1..=40 {
            h.drag_to(start + Vec2::new(i as f32 * 0.5, 0.0));
        }
        assert_eq!(h.game().trail.len(), TRAIL_LEN);
        h.frames(25);
        assert!(h.game().trail.is_empty());
    }
}
