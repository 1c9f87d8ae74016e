//! Decorative particle bursts
//!
//! Particles never feed back into game logic. Each session owns one pool,
//! updated once per fixed tick and culled as soon as `life` runs out.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;
use std::ops::Range;

use crate::consts::{PARTICLE_DECAY, PARTICLE_GRAVITY};
use crate::draw::{Color, Paint, Surface};
use crate::from_angle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in (0, 1]
    pub life: f32,
    pub color: Color,
    pub size: f32,
}

/// How launch directions are chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spread {
    /// Evenly spaced around the full circle
    Ring,
    /// Uniformly random angles
    Random,
    /// Random horizontal drift with an upward kick (dust from feet)
    Fountain { drift: f32 },
}

/// Parameters for [`ParticlePool::spawn_burst`]
#[derive(Debug, Clone, PartialEq)]
pub struct Burst<'a> {
    pub count: usize,
    pub palette: &'a [Color],
    pub speed: Range<f32>,
    pub size: Range<f32>,
    pub spread: Spread,
    /// Extra initial vertical velocity (negative is up)
    pub lift: f32,
}

impl<'a> Burst<'a> {
    /// Ring burst with the usual celebratory speed and size
    pub fn ring(count: usize, palette: &'a [Color]) -> Self {
        Self {
            count,
            palette,
            speed: 2.0..5.0,
            size: 3.0..8.0,
            spread: Spread::Ring,
            lift: 0.0,
        }
    }

    /// Random-angle burst
    pub fn scatter(count: usize, palette: &'a [Color], speed: Range<f32>) -> Self {
        Self {
            count,
            palette,
            speed,
            size: 3.0..6.0,
            spread: Spread::Random,
            lift: 0.0,
        }
    }

    pub fn with_size(self, size: Range<f32>) -> Self {
        Self { size, ..self }
    }

    pub fn with_lift(self, lift: f32) -> Self {
        Self { lift, ..self }
    }
}

/// Per-session particle collection
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    gravity: f32,
    capacity: usize,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new(PARTICLE_GRAVITY, 500)
    }
}

impl ParticlePool {
    pub fn new(gravity: f32, capacity: usize) -> Self {
        Self {
            particles: Vec::new(),
            gravity,
            capacity,
        }
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.particles.truncate(capacity);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Emit `burst.count` particles from `origin`, dropping any beyond capacity
    pub fn spawn_burst<R: Rng>(&mut self, rng: &mut R, origin: Vec2, burst: &Burst) {
        if burst.palette.is_empty() {
            return;
        }
        let room = self.capacity.saturating_sub(self.particles.len());
        let count = burst.count.min(room);

        for i in 0..count {
            let speed = sample(rng, &burst.speed);
            let vel = match burst.spread {
                Spread::Ring => from_angle(TAU * i as f32 / burst.count as f32) * speed,
                Spread::Random => from_angle(rng.random_range(0.0..TAU)) * speed,
                Spread::Fountain { drift } => Vec2::new(
                    (rng.random::<f32>() - 0.5) * drift,
                    -rng.random::<f32>() * speed,
                ),
            } + Vec2::new(0.0, burst.lift);

            let color = burst.palette[rng.random_range(0..burst.palette.len())];
            self.particles.push(Particle {
                pos: origin,
                vel,
                life: 1.0,
                color,
                size: sample(rng, &burst.size),
            });
        }
    }

    /// One tick: integrate, age, cull
    pub fn update(&mut self) {
        let gravity = self.gravity;
        for p in &mut self.particles {
            p.pos += p.vel;
            p.vel.y += gravity;
            p.life -= PARTICLE_DECAY;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        for p in &self.particles {
            let color = p.color.with_alpha(p.life.clamp(0.0, 1.0) * p.color.a);
            surface.fill_circle(p.pos, p.size.max(0.0), &Paint::Solid(color));
        }
    }
}

fn sample<R: Rng>(rng: &mut R, range: &Range<f32>) -> f32 {
    if range.end > range.start {
        rng.random_range(range.clone())
    } else {
        range.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::Recorder;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const PALETTE: &[Color] = &[Color::rgb(255, 0, 0), Color::rgb(0, 0, 255)];

    #[test]
    fn test_burst_starts_at_origin_with_full_life() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool = ParticlePool::default();
        pool.spawn_burst(&mut rng, Vec2::new(50.0, 60.0), &Burst::ring(20, PALETTE));
        assert_eq!(pool.len(), 20);
        for p in pool.iter() {
            assert_eq!(p.pos, Vec2::new(50.0, 60.0));
            assert_eq!(p.life, 1.0);
            assert!(PALETTE.contains(&p.color));
            let speed = p.vel.length();
            assert!((2.0..5.0 + 1e-4).contains(&speed), "speed {speed}");
        }
    }

    #[test]
    fn test_capacity_caps_spawns() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut pool = ParticlePool::new(0.2, 25);
        pool.spawn_burst(&mut rng, Vec2::ZERO, &Burst::ring(20, PALETTE));
        pool.spawn_burst(&mut rng, Vec2::ZERO, &Burst::ring(20, PALETTE));
        assert_eq!(pool.len(), 25);

        pool.set_capacity(0);
        assert!(pool.is_empty());
        pool.spawn_burst(&mut rng, Vec2::ZERO, &Burst::ring(5, PALETTE));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_all_particles_gone_after_fifty_ticks() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut pool = ParticlePool::default();
        pool.spawn_burst(&mut rng, Vec2::ZERO, &Burst::ring(10, PALETTE));
        for _ in 0..49 {
            pool.update();
        }
        assert_eq!(pool.len(), 10);
        // 1.0 - 50 * 0.02 lands on (or just below) zero
        pool.update();
        pool.update();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut pool = ParticlePool::new(0.3, 10);
        let mut rng = Pcg32::seed_from_u64(4);
        let burst = Burst {
            count: 1,
            palette: PALETTE,
            speed: 0.0..0.0,
            size: 4.0..4.0,
            spread: Spread::Random,
            lift: 0.0,
        };
        pool.spawn_burst(&mut rng, Vec2::ZERO, &burst);
        pool.update();
        pool.update();
        let p = pool.iter().next().copied().unwrap();
        // Tick 1 moves 0, tick 2 moves 0.3
        assert!((p.pos.y - 0.3).abs() < 1e-5);
        assert!((p.vel.y - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_fountain_goes_up() {
        let mut pool = ParticlePool::new(0.0, 100);
        let mut rng = Pcg32::seed_from_u64(5);
        let burst = Burst {
            count: 10,
            palette: PALETTE,
            speed: 3.0..3.0,
            size: 3.0..6.0,
            spread: Spread::Fountain { drift: 4.0 },
            lift: 0.0,
        };
        pool.spawn_burst(&mut rng, Vec2::ZERO, &burst);
        for p in pool.iter() {
            assert!(p.vel.y <= 0.0);
            assert!(p.vel.x.abs() <= 2.0);
        }
    }

    #[test]
    fn test_lifetime_is_fifty_ticks() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut pool = ParticlePool::new(0.0, 100);
        pool.spawn_burst(&mut rng, Vec2::ZERO, &Burst::ring(12, PALETTE));
        for _ in 0..49 {
            pool.update();
        }
        assert_eq!(pool.len(), 12);
        pool.update();
        pool.update();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_render_draws_one_circle_each() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut pool = ParticlePool::default();
        pool.spawn_burst(&mut rng, Vec2::ZERO, &Burst::scatter(7, PALETTE, 1.0..3.0));
        let mut rec = Recorder::new(100.0, 100.0);
        pool.render(&mut rec);
        assert_eq!(rec.fill_count(), 7);
    }

    proptest! {
        #[test]
        fn prop_life_strictly_decreases_until_removed(
            seed in any::<u64>(),
            count in 1usize..60,
            ticks in 1usize..80,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut pool = ParticlePool::new(0.2, 1000);
            pool.spawn_burst(&mut rng, Vec2::ZERO, &Burst::scatter(count, PALETTE, 1.0..4.0));

            let mut prev: Vec<f32> = pool.iter().map(|p| p.life).collect();
            for _ in 0..ticks {
                pool.update();
                let now: Vec<f32> = pool.iter().map(|p| p.life).collect();
                // Survivors keep their order; every survivor lost life
                prop_assert!(now.len() <= prev.len());
                for (i, life) in now.iter().enumerate() {
                    prop_assert!(*life > 0.0);
                    prop_assert!(*life < prev[i]);
                }
                prev = now;
            }
            // All particles spawn together, so they expire together.
            // The 50th step lands on zero give or take float error.
            if ticks < 50 {
                prop_assert_eq!(pool.len(), count);
            } else if ticks > 50 {
                prop_assert!(pool.is_empty());
            } else {
                prop_assert!(pool.is_empty() || pool.len() == count);
            }
        }
    }
}
