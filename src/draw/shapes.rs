//! Path builders for the primitives the games share

use glam::Vec2;
use std::f32::consts::PI;

use super::Path;
use crate::{Rect, from_angle};

/// Rectangle with quadratic-curve corners. Radius is clamped to half the
/// shorter side.
pub fn round_rect(rect: Rect, radius: f32) -> Path {
    let r = radius.min(rect.w / 2.0).min(rect.h / 2.0).max(0.0);
    let (x, y, w, h) = (rect.x, rect.y, rect.w, rect.h);
    Path::new()
        .move_to(Vec2::new(x + r, y))
        .line_to(Vec2::new(x + w - r, y))
        .quad_to(Vec2::new(x + w, y), Vec2::new(x + w, y + r))
        .line_to(Vec2::new(x + w, y + h - r))
        .quad_to(Vec2::new(x + w, y + h), Vec2::new(x + w - r, y + h))
        .line_to(Vec2::new(x + r, y + h))
        .quad_to(Vec2::new(x, y + h), Vec2::new(x, y + h - r))
        .line_to(Vec2::new(x, y + r))
        .quad_to(Vec2::new(x, y), Vec2::new(x + r, y))
        .close()
}

/// Axis-aligned ellipse from four cubic arcs
pub fn ellipse(center: Vec2, rx: f32, ry: f32) -> Path {
    const K: f32 = 0.552_284_8;
    let (kx, ky) = (rx * K, ry * K);
    let c = center;
    Path::new()
        .move_to(c + Vec2::new(rx, 0.0))
        .cubic_to(c + Vec2::new(rx, ky), c + Vec2::new(kx, ry), c + Vec2::new(0.0, ry))
        .cubic_to(c + Vec2::new(-kx, ry), c + Vec2::new(-rx, ky), c + Vec2::new(-rx, 0.0))
        .cubic_to(c + Vec2::new(-rx, -ky), c + Vec2::new(-kx, -ry), c + Vec2::new(0.0, -ry))
        .cubic_to(c + Vec2::new(kx, -ry), c + Vec2::new(rx, -ky), c + Vec2::new(rx, 0.0))
        .close()
}

/// Star with `points` tips, first tip pointing up
pub fn star(center: Vec2, points: u32, outer: f32, inner: f32) -> Path {
    let points = points.max(2);
    let mut path = Path::new();
    for i in 0..points * 2 {
        let radius = if i % 2 == 0 { outer } else { inner };
        let angle = i as f32 * PI / points as f32 - PI / 2.0;
        let p = center + from_angle(angle) * radius;
        path = if i == 0 { path.move_to(p) } else { path.line_to(p) };
    }
    path.close()
}

/// Heart whose top dip sits at `top` and whose point is `size` below it
pub fn heart(top: Vec2, size: f32) -> Path {
    let (x, y) = (top.x, top.y);
    let curve = size * 0.3;
    let half = size / 2.0;
    let v = |dx: f32, dy: f32| Vec2::new(x + dx, y + dy);
    Path::new()
        .move_to(v(0.0, curve))
        .cubic_to(v(0.0, 0.0), v(-half, 0.0), v(-half, curve))
        .cubic_to(
            v(-half, (size + curve) / 2.0),
            v(0.0, (size + curve) / 1.5),
            v(0.0, size),
        )
        .cubic_to(
            v(0.0, (size + curve) / 1.5),
            v(half, (size + curve) / 2.0),
            v(half, curve),
        )
        .cubic_to(v(half, 0.0), v(0.0, 0.0), v(0.0, curve))
        .close()
}

/// Upward-pointing isosceles triangle inscribed in a `size` box
pub fn triangle(center: Vec2, size: f32) -> Path {
    let half = size / 2.0;
    Path::new()
        .move_to(center + Vec2::new(0.0, -half))
        .line_to(center + Vec2::new(half, half))
        .line_to(center + Vec2::new(-half, half))
        .close()
}

/// Rhombus with the given half extents
pub fn diamond(center: Vec2, half_w: f32, half_h: f32) -> Path {
    Path::new()
        .move_to(center + Vec2::new(0.0, -half_h))
        .line_to(center + Vec2::new(half_w, 0.0))
        .line_to(center + Vec2::new(0.0, half_h))
        .line_to(center + Vec2::new(-half_w, 0.0))
        .close()
}

/// Regular polygon with one vertex pointing up
pub fn polygon(center: Vec2, sides: u32, radius: f32) -> Path {
    let sides = sides.max(3);
    let mut path = Path::new();
    for i in 0..sides {
        let angle = i as f32 * 2.0 * PI / sides as f32 - PI / 2.0;
        let p = center + from_angle(angle) * radius;
        path = if i == 0 { path.move_to(p) } else { path.line_to(p) };
    }
    path.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::PathCmd;

    fn vertices(path: &Path) -> Vec<Vec2> {
        path.cmds
            .iter()
            .filter_map(|c| match c {
                PathCmd::MoveTo(p) | PathCmd::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_star_alternates_radii() {
        let path = star(Vec2::ZERO, 5, 10.0, 5.0);
        let pts = vertices(&path);
        assert_eq!(pts.len(), 10);
        for (i, p) in pts.iter().enumerate() {
            let expected = if i % 2 == 0 { 10.0 } else { 5.0 };
            assert!((p.length() - expected).abs() < 1e-4);
        }
        // First tip points up
        assert!((pts[0] - Vec2::new(0.0, -10.0)).length() < 1e-4);
    }

    #[test]
    fn test_round_rect_radius_clamped() {
        let path = round_rect(Rect::new(0.0, 0.0, 20.0, 10.0), 50.0);
        // Radius clamps to 5, so the first point is (5, 0)
        assert_eq!(path.cmds[0], PathCmd::MoveTo(Vec2::new(5.0, 0.0)));
        assert_eq!(path.cmds.last(), Some(&PathCmd::Close));
    }

    #[test]
    fn test_heart_ends_at_start() {
        let path = heart(Vec2::new(50.0, 50.0), 40.0);
        let PathCmd::MoveTo(start) = path.cmds[0] else {
            panic!("heart must start with a move");
        };
        assert!((start - Vec2::new(50.0, 62.0)).length() < 1e-4);
        assert!(matches!(path.cmds[4], PathCmd::CubicTo { to, .. } if to == start));
    }

    #[test]
    fn test_ellipse_closes_on_start() {
        let path = ellipse(Vec2::new(10.0, 10.0), 5.0, 8.0);
        assert_eq!(path.cmds[0], PathCmd::MoveTo(Vec2::new(15.0, 10.0)));
        assert!(matches!(path.cmds[4], PathCmd::CubicTo { to, .. } if to == Vec2::new(15.0, 10.0)));
    }

    #[test]
    fn test_polygon_vertex_count() {
        assert_eq!(vertices(&polygon(Vec2::ZERO, 6, 10.0)).len(), 6);
        assert_eq!(vertices(&polygon(Vec2::ZERO, 1, 10.0)).len(), 3);
    }
}
