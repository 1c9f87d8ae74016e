//! Slowly rising shapes behind the game menu

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::draw::{Color, Paint, Surface, shapes};
use crate::Rect;

const SHAPE_COUNT: usize = 15;
const ALPHA: f32 = 0.15;

/// Pastel palette shared with the success confetti
pub const PASTELS: &[Color] = &[
    Color::rgb(0xfd, 0xe6, 0x8a),
    Color::rgb(0xbb, 0xf7, 0xd0),
    Color::rgb(0xbf, 0xdb, 0xfe),
    Color::rgb(0xfb, 0xcf, 0xe8),
    Color::rgb(0xfc, 0xa5, 0xa5),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outline {
    Circle,
    Square,
    Star,
}

#[derive(Debug, Clone)]
pub struct Floater {
    pub pos: Vec2,
    pub size: f32,
    pub outline: Outline,
    pub color: Color,
    pub speed: f32,
    pub angle: f32,
    pub spin: f32,
}

#[derive(Debug, Default)]
pub struct Backdrop {
    pub floaters: Vec<Floater>,
    size: Vec2,
}

impl Backdrop {
    pub fn new<R: Rng>(rng: &mut R, size: Vec2) -> Self {
        let floaters = (0..SHAPE_COUNT)
            .map(|_| Floater {
                pos: Vec2::new(
                    rng.random::<f32>() * size.x,
                    rng.random::<f32>() * size.y,
                ),
                size: rng.random_range(20.0..60.0),
                outline: *[Outline::Circle, Outline::Square, Outline::Star]
                    .choose(rng)
                    .unwrap_or(&Outline::Circle),
                color: *PASTELS.choose(rng).unwrap_or(&Color::WHITE),
                speed: rng.random_range(0.2..0.7),
                angle: rng.random_range(0.0..std::f32::consts::TAU),
                spin: rng.random_range(0.01..0.03),
            })
            .collect();
        Self { floaters, size }
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Rise and spin; shapes leaving the top re-enter at the bottom
    pub fn update<R: Rng>(&mut self, rng: &mut R) {
        for f in &mut self.floaters {
            f.pos.y -= f.speed;
            f.angle += f.spin;
            if f.pos.y < -f.size {
                f.pos.y = self.size.y + f.size;
                f.pos.x = rng.random::<f32>() * self.size.x;
            }
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        for f in &self.floaters {
            surface.save();
            surface.translate(f.pos);
            surface.rotate(f.angle);
            surface.set_alpha(ALPHA);
            let paint = Paint::Solid(f.color);
            match f.outline {
                Outline::Circle => surface.fill_circle(Vec2::ZERO, f.size / 2.0, &paint),
                Outline::Square => {
                    surface.fill_rect(Rect::centered(Vec2::ZERO, f.size, f.size), &paint)
                }
                Outline::Star => {
                    surface.fill_path(&shapes::star(Vec2::ZERO, 5, f.size / 2.0, f.size / 4.0), &paint)
                }
            }
            surface.restore();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::Recorder;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_shapes_wrap_to_bottom() {
        let mut rng = Pcg32::seed_from_u64(5);
        let size = Vec2::new(400.0, 300.0);
        let mut backdrop = Backdrop::new(&mut rng, size);
        assert_eq!(backdrop.floaters.len(), SHAPE_COUNT);

        backdrop.floaters[0].pos.y = -backdrop.floaters[0].size + 0.1;
        backdrop.update(&mut rng);
        let f = &backdrop.floaters[0];
        assert_eq!(f.pos.y, size.y + f.size);
        assert!(f.pos.x >= 0.0 && f.pos.x <= size.x);

        for _ in 0..5000 {
            backdrop.update(&mut rng);
        }
        for f in &backdrop.floaters {
            assert!(f.pos.y >= -f.size && f.pos.y <= size.y + f.size);
        }
    }

    #[test]
    fn test_render_is_balanced() {
        let mut rng = Pcg32::seed_from_u64(6);
        let backdrop = Backdrop::new(&mut rng, Vec2::new(400.0, 300.0));
        let mut surface = Recorder::new(400.0, 300.0);
        backdrop.render(&mut surface);
        assert_eq!(surface.fill_count(), SHAPE_COUNT);
        assert!(surface.is_balanced());
    }
}
