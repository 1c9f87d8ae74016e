//! Time-based one-shot animations
//!
//! A tween is a start timestamp plus a duration. Games store tweens on their
//! entities and evaluate them while rendering, so an animation can never
//! outlive the session that owns it.

use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub start: f64,
    pub duration: f64,
}

impl Tween {
    pub fn new(start: f64, duration_ms: f64) -> Self {
        Self {
            start,
            duration: duration_ms.max(1.0),
        }
    }

    /// Progress in [0, 1), or `None` once finished
    pub fn progress(&self, now: f64) -> Option<f32> {
        let t = ((now - self.start) / self.duration).max(0.0);
        (t < 1.0).then_some(t as f32)
    }

    pub fn is_done(&self, now: f64) -> bool {
        self.progress(now).is_none()
    }
}

/// Grow to 1.2 then shrink to nothing
pub fn pulse_scale(p: f32) -> f32 {
    if p < 0.5 {
        1.0 + p * 0.4
    } else {
        (1.2 - (p - 0.5) * 2.4).max(0.0)
    }
}

/// Swell to 1.2 and settle back to 1
pub fn bounce_scale(p: f32) -> f32 {
    if p < 0.5 { 1.0 + p * 0.4 } else { 1.2 - (p - 0.5) * 0.4 }
}

/// Horizontal wobble that dies out over the tween
pub fn shake_offset(p: f32, amplitude: f32) -> f32 {
    (p * PI * 4.0).sin() * amplitude * (1.0 - p)
}

/// Quick scale-up used for pops
pub fn pop_scale(p: f32) -> f32 {
    1.0 + p * 0.5
}

/// Smooth 0..1 ease
pub fn ease_out(p: f32) -> f32 {
    1.0 - (1.0 - p.clamp(0.0, 1.0)).powi(2)
}
