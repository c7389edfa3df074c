//! Enemy spawn scheduling and placement
//!
//! The regular spawner drops enemies at a random angle around the player,
//! beyond the visible viewport, at an interval that shrinks with the player
//! level. A scripted boss spawn runs on its own elapsed-tick schedule and
//! ignores the population cap.

use glam::Vec2;
use rand::Rng;

use super::state::{EnemyClass, GameEvent, GameState};
use crate::consts::*;

/// Ticks between regular spawns at the given player level, floored so the
/// arena never turns into a bullet-hell faucet
pub fn spawn_interval(level: u32) -> u32 {
    SPAWN_INTERVAL_BASE
        .saturating_sub(SPAWN_INTERVAL_PER_LEVEL * level)
        .max(SPAWN_INTERVAL_MIN)
}

/// Weighted class roll: squares common, triangles uncommon, pentagons rare
fn class_for_roll(roll: f32) -> EnemyClass {
    if roll > 0.92 {
        EnemyClass::Pentagon
    } else if roll > 0.75 {
        EnemyClass::Triangle
    } else {
        EnemyClass::Square
    }
}

/// Pick a spawn point at a random angle around the player, far enough out
/// to be off-screen, clamped back inside the world rectangle
fn spawn_position(state: &mut GameState, viewport: Vec2) -> Vec2 {
    let dist = viewport.x.max(viewport.y) / 1.2
        + state.rng.random::<f32>() * SPAWN_DISTANCE_JITTER;
    let angle = state.rng.random::<f32>() * std::f32::consts::TAU;
    let pos = state.player.pos + Vec2::from_angle(angle) * dist;
    pos.clamp(
        Vec2::splat(SPAWN_MARGIN),
        Vec2::new(WORLD_WIDTH - SPAWN_MARGIN, WORLD_HEIGHT - SPAWN_MARGIN),
    )
}

/// Run the regular spawner and the scripted boss schedule for this tick
pub fn run_spawners(state: &mut GameState, viewport: Vec2) {
    let interval = u64::from(spawn_interval(state.player.level));
    if state.time_ticks % interval == 0 && state.entities.len() < MAX_LIVE_ENTITIES {
        let pos = spawn_position(state, viewport);
        let class = class_for_roll(state.rng.random::<f32>());
        state.spawn_enemy(class, pos);
    }

    // The boss schedule is independent of the spawner and its cap
    if state.time_ticks > 0 && state.time_ticks % BOSS_INTERVAL_TICKS == 0 {
        let pos = Vec2::new(state.player.pos.x, 200.0);
        state.spawn_enemy(EnemyClass::Boss, pos);
        let text_pos = state.player.pos - Vec2::new(0.0, 150.0);
        state.add_text("THE GUARDIAN", text_pos, 40.0);
        state.camera.add_shake(10.0);
        state.events.push(GameEvent::BossSpawned);
        log::info!("Boss spawned at tick {}", state.time_ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EntityKind;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn interval_shrinks_with_level_down_to_a_floor() {
        assert_eq!(spawn_interval(1), 98);
        assert!(spawn_interval(10) < spawn_interval(1));
        assert_eq!(spawn_interval(40), SPAWN_INTERVAL_MIN);
        assert_eq!(spawn_interval(1000), SPAWN_INTERVAL_MIN);
    }

    #[test]
    fn roll_thresholds_pick_the_expected_classes() {
        assert_eq!(class_for_roll(0.0), EnemyClass::Square);
        assert_eq!(class_for_roll(0.75), EnemyClass::Square);
        assert_eq!(class_for_roll(0.76), EnemyClass::Triangle);
        assert_eq!(class_for_roll(0.93), EnemyClass::Pentagon);
    }

    #[test]
    fn spawn_positions_stay_inside_the_world() {
        let mut state = GameState::new(11);
        for _ in 0..200 {
            let pos = spawn_position(&mut state, VIEWPORT);
            assert!(pos.x >= SPAWN_MARGIN && pos.x <= WORLD_WIDTH - SPAWN_MARGIN);
            assert!(pos.y >= SPAWN_MARGIN && pos.y <= WORLD_HEIGHT - SPAWN_MARGIN);
        }
    }

    #[test]
    fn spawner_respects_the_population_cap() {
        let mut state = GameState::new(12);
        for _ in 0..MAX_LIVE_ENTITIES {
            state.spawn_enemy(EnemyClass::Square, Vec2::new(100.0, 100.0));
        }
        state.time_ticks = u64::from(spawn_interval(state.player.level));

        run_spawners(&mut state, VIEWPORT);
        assert_eq!(state.entities.len(), MAX_LIVE_ENTITIES);
    }

    #[test]
    fn boss_spawn_ignores_the_cap_and_announces_itself() {
        let mut state = GameState::new(13);
        for _ in 0..MAX_LIVE_ENTITIES {
            state.spawn_enemy(EnemyClass::Square, Vec2::new(100.0, 100.0));
        }
        state.time_ticks = BOSS_INTERVAL_TICKS;

        run_spawners(&mut state, VIEWPORT);

        let boss_count = state
            .entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Enemy { class: EnemyClass::Boss, .. }))
            .count();
        assert_eq!(boss_count, 1);
        assert_eq!(state.texts.len(), 1);
        assert!(state.events.contains(&GameEvent::BossSpawned));
        assert!(state.camera.shake >= 10.0);
    }
}
