//! Playroom - mini-games for small children
//!
//! Core modules:
//! - `session`: Uniform game-session lifecycle (start/frame/stop, deferred callbacks)
//! - `games`: The individual mini-games
//! - `particles`: Decorative particle bursts
//! - `audio`: Synthesized sound effects, injected into every session
//! - `gate`: Parental PIN / countdown / puzzle gate
//! - `host`: Screen switching between gate, menu and the active game
//! - `draw`: 2D surface abstraction and shared path builders

pub mod anim;
pub mod audio;
pub mod draw;
pub mod games;
pub mod gate;
pub mod host;
pub mod input;
pub mod particles;
pub mod session;
pub mod settings;

pub use audio::{SoundEffect, TonePlayer};
pub use games::GameKind;
pub use host::{Host, Screen};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep. All per-tick tuning values assume 60 Hz.
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Same step in milliseconds
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Extra tolerance (pixels) added around every tappable region
    pub const HIT_SLOP: f32 = 10.0;

    /// Particle life lost per tick
    pub const PARTICLE_DECAY: f32 = 0.02;
    /// Default downward pull on particles (pixels/tick²)
    pub const PARTICLE_GRAVITY: f32 = 0.2;

    /// Parental gate PIN
    pub const GATE_PIN: &str = "2552";
    /// Play durations a parent may pick (minutes)
    pub const ALLOWED_MINUTES: [u32; 5] = [5, 10, 15, 20, 30];
    /// Remaining time at which the countdown turns to warning state
    pub const WARNING_SECONDS: u32 = 60;
    /// Delay before a correct puzzle answer unlocks the dashboard
    pub const PUZZLE_CORRECT_DELAY_MS: f64 = 1000.0;
    /// Delay before a wrong puzzle answer is replaced by a new puzzle
    pub const PUZZLE_WRONG_DELAY_MS: f64 = 800.0;
}

/// Axis-aligned rectangle in surface pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size centered on `center`
    pub fn centered(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Grow (or shrink, with a negative margin) on every side
    pub fn inflate(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.w + margin * 2.0,
            self.h + margin * 2.0,
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Forgiving tap test against a rectangle
#[inline]
pub fn hit_rect(p: Vec2, rect: &Rect) -> bool {
    rect.inflate(consts::HIT_SLOP).contains(p)
}

/// Forgiving tap test against a circle
#[inline]
pub fn hit_circle(p: Vec2, center: Vec2, radius: f32) -> bool {
    p.distance(center) <= radius + consts::HIT_SLOP
}

/// Shortest distance from `p` to the segment `a`-`b`
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Unit vector for an angle (radians)
#[inline]
pub fn from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_and_inflate() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Vec2::new(15.0, 15.0)));
        assert!(!r.contains(Vec2::new(35.0, 15.0)));
        assert!(r.inflate(10.0).contains(Vec2::new(35.0, 15.0)));
        assert_eq!(r.center(), Vec2::new(20.0, 20.0));
    }

    #[test]
    fn test_hit_tests_are_forgiving() {
        let center = Vec2::new(100.0, 100.0);
        // Just outside the visual radius still counts
        assert!(hit_circle(Vec2::new(145.0, 100.0), center, 40.0));
        assert!(!hit_circle(Vec2::new(160.0, 100.0), center, 40.0));

        let r = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert!(hit_rect(Vec2::new(55.0, 25.0), &r));
        assert!(!hit_rect(Vec2::new(70.0, 25.0), &r));
    }

    #[test]
    fn test_point_segment_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!((point_segment_distance(Vec2::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-5);
        // Beyond the end clamps to the endpoint
        assert!((point_segment_distance(Vec2::new(14.0, 3.0), a, b) - 5.0).abs() < 1e-5);
        // Degenerate segment
        assert!((point_segment_distance(Vec2::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_rect_overlaps() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
    }
}
