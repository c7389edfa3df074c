//! Frame assembly: the world as one triangle list
//!
//! Pure read of the game state; no mutation. Draw order is background grid,
//! then entities in store order (with health bars riding along), then the
//! player composite on top. Anything whose bounding circle falls outside
//! the viewport expanded by `CULL_MARGIN` is skipped.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::sim::{EnemyClass, Entity, EntityKind, GameState};

const CIRCLE_SEGMENTS: u32 = 24;
const PARTICLE_SEGMENTS: u32 = 10;
/// How far shape outlines extend past the fill, matching a 4px stroke
/// centered on the edge
const OUTLINE: f32 = 2.0;
const HEALTH_BAR_HEIGHT: f32 = 5.0;

/// Particle tint lookup by the palette index carried in the sim
fn palette(color: u32) -> [f32; 4] {
    match color {
        0 => colors::SQUARE,
        1 => colors::TRIANGLE,
        2 => colors::PENTAGON,
        3 => colors::BOSS,
        _ => colors::OUTLINE,
    }
}

fn enemy_color(class: EnemyClass) -> [f32; 4] {
    match class {
        EnemyClass::Square => colors::SQUARE,
        EnemyClass::Triangle => colors::TRIANGLE,
        EnemyClass::Pentagon => colors::PENTAGON,
        EnemyClass::Boss => colors::BOSS,
    }
}

/// Cheap AABB cull against the expanded viewport, not an exact test
fn visible(pos: Vec2, radius: f32, camera: Vec2, viewport: Vec2) -> bool {
    let half = viewport * 0.5 + Vec2::splat(CULL_MARGIN);
    pos.x + radius >= camera.x - half.x
        && pos.x - radius <= camera.x + half.x
        && pos.y + radius >= camera.y - half.y
        && pos.y - radius <= camera.y + half.y
}

/// Build the full frame as world-space vertices
pub fn build_scene(state: &GameState, viewport: Vec2) -> Vec<Vertex> {
    let camera = state.camera.pos;
    let mut verts = Vec::with_capacity(4096);

    push_grid(&mut verts, camera, viewport);

    for e in &state.entities {
        if e.remove || !visible(e.pos, e.radius, camera, viewport) {
            continue;
        }
        push_entity(&mut verts, e);
    }

    push_player(&mut verts, state);

    verts
}

/// Tiled background grid over the visible region, clipped to world bounds
fn push_grid(out: &mut Vec<Vertex>, camera: Vec2, viewport: Vec2) {
    let left = camera.x - viewport.x / 2.0;
    let top = camera.y - viewport.y / 2.0;

    let y0 = (top - GRID_SIZE).max(0.0);
    let y1 = (top + viewport.y + GRID_SIZE).min(WORLD_HEIGHT);
    let x0 = (left - GRID_SIZE).max(0.0);
    let x1 = (left + viewport.x + GRID_SIZE).min(WORLD_WIDTH);

    let start_x = (left / GRID_SIZE).floor() * GRID_SIZE;
    let cols = (viewport.x / GRID_SIZE).ceil() as i32 + 2;
    for i in 0..cols {
        let gx = start_x + i as f32 * GRID_SIZE;
        if gx < 0.0 || gx > WORLD_WIDTH {
            continue;
        }
        out.extend(shapes::line(
            Vec2::new(gx, y0),
            Vec2::new(gx, y1),
            1.0,
            colors::GRID,
        ));
    }

    let start_y = (top / GRID_SIZE).floor() * GRID_SIZE;
    let rows = (viewport.y / GRID_SIZE).ceil() as i32 + 2;
    for i in 0..rows {
        let gy = start_y + i as f32 * GRID_SIZE;
        if gy < 0.0 || gy > WORLD_HEIGHT {
            continue;
        }
        out.extend(shapes::line(
            Vec2::new(x0, gy),
            Vec2::new(x1, gy),
            1.0,
            colors::GRID,
        ));
    }
}

fn push_entity(out: &mut Vec<Vertex>, e: &Entity) {
    match e.kind {
        EntityKind::Bullet { .. } => {
            out.extend(shapes::circle(
                e.pos,
                e.radius + OUTLINE,
                colors::OUTLINE,
                CIRCLE_SEGMENTS,
            ));
            out.extend(shapes::circle(e.pos, e.radius, colors::BULLET, CIRCLE_SEGMENTS));
        }
        EntityKind::Particle { color, .. } => {
            out.extend(shapes::circle(
                e.pos,
                e.radius,
                palette(color),
                PARTICLE_SEGMENTS,
            ));
        }
        EntityKind::Enemy { class, hp, max_hp } => {
            let fill = enemy_color(class);
            match class {
                EnemyClass::Square => {
                    let half = Vec2::splat(e.radius);
                    let outline_half = Vec2::splat(e.radius + OUTLINE);
                    out.extend(shapes::oriented_quad(
                        e.pos,
                        e.angle,
                        -outline_half,
                        outline_half,
                        colors::OUTLINE,
                    ));
                    out.extend(shapes::oriented_quad(e.pos, e.angle, -half, half, fill));
                }
                _ => {
                    let sides = class.sides();
                    out.extend(shapes::regular_polygon(
                        e.pos,
                        e.radius + OUTLINE,
                        sides,
                        e.angle,
                        colors::OUTLINE,
                    ));
                    out.extend(shapes::regular_polygon(e.pos, e.radius, sides, e.angle, fill));
                }
            }

            // Two-layer health bar above damaged enemies
            if hp < max_hp {
                push_health_bar(out, e.pos, e.radius, hp / max_hp);
            }
        }
    }
}

fn push_health_bar(out: &mut Vec<Vertex>, pos: Vec2, radius: f32, fraction: f32) {
    let width = radius * 1.5;
    let top = pos.y - radius - 10.0 - HEALTH_BAR_HEIGHT;
    let min = Vec2::new(pos.x - width / 2.0, top);
    let max = Vec2::new(pos.x + width / 2.0, top + HEALTH_BAR_HEIGHT);
    out.extend(shapes::rect(min, max, colors::HEALTH_BG));

    let fraction = fraction.clamp(0.0, 1.0);
    let fill_min = min + Vec2::splat(1.0);
    let fill_max = Vec2::new(min.x + 1.0 + (width - 2.0) * fraction, max.y - 1.0);
    if fill_max.x > fill_min.x {
        out.extend(shapes::rect(fill_min, fill_max, colors::HEALTH_FILL));
    }
}

/// Player composite: barrel quad under the body circle
fn push_player(out: &mut Vec<Vertex>, state: &GameState) {
    let p = &state.player;

    let barrel_min = Vec2::new(0.0, -p.radius * 0.4);
    let barrel_max = Vec2::new(p.radius * 2.2, p.radius * 0.4);
    out.extend(shapes::oriented_quad(
        p.pos,
        p.angle,
        barrel_min - Vec2::splat(OUTLINE),
        barrel_max + Vec2::splat(OUTLINE),
        colors::OUTLINE,
    ));
    out.extend(shapes::oriented_quad(
        p.pos,
        p.angle,
        barrel_min,
        barrel_max,
        colors::BARREL,
    ));

    out.extend(shapes::circle(
        p.pos,
        p.radius + OUTLINE,
        colors::OUTLINE,
        CIRCLE_SEGMENTS,
    ));
    out.extend(shapes::circle(p.pos, p.radius, colors::PLAYER, CIRCLE_SEGMENTS));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameState;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn offscreen_entities_are_culled() {
        let mut state = GameState::new(1);
        // Player sits at world center; drop an enemy in the far corner
        state.spawn_enemy(EnemyClass::Square, Vec2::new(60.0, 60.0));
        let with_far = build_scene(&state, VIEWPORT).len();

        let mut near = GameState::new(1);
        near.spawn_enemy(EnemyClass::Square, near.player.pos + Vec2::new(100.0, 0.0));
        let with_near = build_scene(&near, VIEWPORT).len();

        assert!(with_near > with_far);
    }

    #[test]
    fn removed_entities_are_not_drawn() {
        let mut state = GameState::new(2);
        let id = state.spawn_enemy(EnemyClass::Square, state.player.pos + Vec2::new(100.0, 0.0));
        let before = build_scene(&state, VIEWPORT).len();

        state.mark_removed(id);
        let after = build_scene(&state, VIEWPORT).len();
        assert!(after < before);
    }

    #[test]
    fn damaged_enemies_get_a_health_bar() {
        let mut state = GameState::new(3);
        state.spawn_enemy(EnemyClass::Pentagon, state.player.pos + Vec2::new(100.0, 0.0));
        let healthy = build_scene(&state, VIEWPORT).len();

        if let EntityKind::Enemy { hp, .. } = &mut state.entities[0].kind {
            *hp -= 10.0;
        }
        let damaged = build_scene(&state, VIEWPORT).len();
        // Background quad + fill quad
        assert_eq!(damaged, healthy + 12);
    }

    #[test]
    fn vertices_stay_finite() {
        let mut state = GameState::new(4);
        state.spawn_enemy(EnemyClass::Boss, state.player.pos + Vec2::new(200.0, 0.0));
        state.spawn_bullet(state.player.pos, 0.5, 480.0, 12.0);
        state.spawn_particle_burst(state.player.pos, 0, 8);

        let verts = build_scene(&state, VIEWPORT);
        assert!(verts
            .iter()
            .all(|v| v.position[0].is_finite() && v.position[1].is_finite()));
    }
}
