//! Shape generation for 2D primitives
//!
//! Everything draws as triangle lists in world coordinates; the pipeline
//! maps world space to NDC on the CPU.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;

/// Generate vertices for a filled circle (triangle fan from the center)
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a regular polygon, rotated by `rotation`
pub fn regular_polygon(
    center: Vec2,
    radius: f32,
    sides: u32,
    rotation: f32,
    color: [f32; 4],
) -> Vec<Vertex> {
    let sides = sides.max(3);
    let mut vertices = Vec::with_capacity((sides * 3) as usize);

    for i in 0..sides {
        let theta1 = rotation + (i as f32 / sides as f32) * TAU;
        let theta2 = rotation + ((i + 1) as f32 / sides as f32) * TAU;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Quad given in a local frame (min/max corners), rotated around `origin`
/// and translated to it. Used for tank barrels and square enemies.
pub fn oriented_quad(
    origin: Vec2,
    rotation: f32,
    local_min: Vec2,
    local_max: Vec2,
    color: [f32; 4],
) -> Vec<Vertex> {
    let rot = Vec2::from_angle(rotation);
    let corner = |local: Vec2| origin + rot.rotate(local);

    let a = corner(local_min);
    let b = corner(Vec2::new(local_max.x, local_min.y));
    let c = corner(local_max);
    let d = corner(Vec2::new(local_min.x, local_max.y));

    vec![
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(a.x, a.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(d.x, d.y, color),
    ]
}

/// Axis-aligned rectangle from min/max corners (health bars, fills)
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    oriented_quad(Vec2::ZERO, 0.0, min, max, color)
}

/// Thin quad along a segment (grid lines)
pub fn line(a: Vec2, b: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (b - a).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);

    let p1 = a + perp;
    let p2 = a - perp;
    let p3 = b - perp;
    let p4 = b + perp;

    vec![
        Vertex::new(p1.x, p1.y, color),
        Vertex::new(p2.x, p2.y, color),
        Vertex::new(p3.x, p3.y, color),
        Vertex::new(p1.x, p1.y, color),
        Vertex::new(p3.x, p3.y, color),
        Vertex::new(p4.x, p4.y, color),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_produces_one_triangle_per_segment() {
        let verts = circle(Vec2::ZERO, 10.0, [1.0; 4], 24);
        assert_eq!(verts.len(), 24 * 3);
    }

    #[test]
    fn polygon_clamps_to_at_least_a_triangle() {
        let verts = regular_polygon(Vec2::ZERO, 10.0, 1, 0.0, [1.0; 4]);
        assert_eq!(verts.len(), 3 * 3);
    }

    #[test]
    fn oriented_quad_rotates_around_the_origin() {
        // Unit square rotated 90°: the corner (1, 0) lands on (0, 1)
        let verts = oriented_quad(
            Vec2::ZERO,
            std::f32::consts::FRAC_PI_2,
            Vec2::ZERO,
            Vec2::ONE,
            [1.0; 4],
        );
        let b = verts[1];
        assert!(b.position[0].abs() < 1e-5);
        assert!((b.position[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn degenerate_line_stays_finite() {
        let verts = line(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0), 1.0, [1.0; 4]);
        assert!(verts
            .iter()
            .all(|v| v.position[0].is_finite() && v.position[1].is_finite()));
    }
}
