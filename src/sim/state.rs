//! Game state and core simulation types
//!
//! `GameState` is the one explicit session-state value: created at session
//! start, passed by reference into the tick and the renderer, discarded at
//! teardown. Nothing about a run lives outside it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Frozen; toggled by the pause input
    Paused,
    /// Run ended (only reachable under `DeathPolicy::EndRun`)
    GameOver,
}

/// What happens when the player's health reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeathPolicy {
    /// The run resets in place and the session keeps running; the player
    /// entity is reset, never recreated, so the camera follow target
    /// survives the death
    #[default]
    ResetInPlace,
    /// Round-based variant: the session freezes in `GameOver` until an
    /// explicit restart
    EndRun,
}

/// Enemy archetypes with their fixed tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyClass {
    Square,
    Triangle,
    Pentagon,
    Boss,
}

impl EnemyClass {
    pub fn max_hp(self) -> f32 {
        match self {
            EnemyClass::Square => 10.0,
            EnemyClass::Triangle => 30.0,
            EnemyClass::Pentagon => 100.0,
            EnemyClass::Boss => 3000.0,
        }
    }

    pub fn score_value(self) -> u64 {
        match self {
            EnemyClass::Square => 100,
            EnemyClass::Triangle => 300,
            EnemyClass::Pentagon => 1000,
            EnemyClass::Boss => 10000,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            EnemyClass::Square => 24.0,
            EnemyClass::Triangle => 30.0,
            EnemyClass::Pentagon => 48.0,
            EnemyClass::Boss => 90.0,
        }
    }

    /// Damage dealt on contact with the player (scaled per tick of overlap)
    pub fn contact_damage(self) -> f32 {
        match self {
            EnemyClass::Square => 8.0,
            EnemyClass::Triangle => 15.0,
            EnemyClass::Pentagon => 25.0,
            EnemyClass::Boss => 40.0,
        }
    }

    /// Steering speed cap, px/sec
    pub fn max_speed(self) -> f32 {
        match self {
            EnemyClass::Square => 60.0,
            EnemyClass::Triangle => 132.0,
            EnemyClass::Pentagon => 36.0,
            EnemyClass::Boss => 48.0,
        }
    }

    /// Polygon side count for rendering
    pub fn sides(self) -> u32 {
        match self {
            EnemyClass::Square => 4,
            EnemyClass::Triangle => 3,
            EnemyClass::Pentagon | EnemyClass::Boss => 5,
        }
    }

    /// Palette index for particle bursts (color lookup happens in the renderer)
    pub fn palette_index(self) -> u32 {
        match self {
            EnemyClass::Square => 0,
            EnemyClass::Triangle => 1,
            EnemyClass::Pentagon => 2,
            EnemyClass::Boss => 3,
        }
    }
}

/// Variant payloads: only projectiles and particles carry a TTL, only
/// enemies carry health
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    Bullet { damage: f32, ttl: u32 },
    Enemy { class: EnemyClass, hp: f32, max_hp: f32 },
    Particle { ttl: u32, color: u32 },
}

/// A simulated object participating in the per-frame update
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub radius: f32,
    /// Lazy deletion marker; marked entities are skipped by the collision
    /// and render passes and physically deleted by `GameState::compact`
    pub remove: bool,
    pub kind: EntityKind,
}

impl Entity {
    pub fn is_bullet(&self) -> bool {
        matches!(self.kind, EntityKind::Bullet { .. })
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, EntityKind::Enemy { .. })
    }

    pub fn is_particle(&self) -> bool {
        matches!(self.kind, EntityKind::Particle { .. })
    }

    /// (hp, max_hp) for damageable entities; drives the health bar
    pub fn health(&self) -> Option<(f32, f32)> {
        match self.kind {
            EntityKind::Enemy { hp, max_hp, .. } => Some((hp, max_hp)),
            _ => None,
        }
    }
}

/// Per-stat upgrade kinds, bound to hotkeys 1-4 and the HUD bars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeKind {
    BulletSpeed,
    Reload,
    MoveSpeed,
    Damage,
}

/// Upgrade tier per stat, each in `[0, MAX_UPGRADE_TIER]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Upgrades {
    pub bullet_speed: u8,
    pub reload: u8,
    pub move_speed: u8,
    pub damage: u8,
}

impl Upgrades {
    pub fn tier(&self, kind: UpgradeKind) -> u8 {
        match kind {
            UpgradeKind::BulletSpeed => self.bullet_speed,
            UpgradeKind::Reload => self.reload,
            UpgradeKind::MoveSpeed => self.move_speed,
            UpgradeKind::Damage => self.damage,
        }
    }

    fn raise(&mut self, kind: UpgradeKind) {
        match kind {
            UpgradeKind::BulletSpeed => self.bullet_speed += 1,
            UpgradeKind::Reload => self.reload += 1,
            UpgradeKind::MoveSpeed => self.move_speed += 1,
            UpgradeKind::Damage => self.damage += 1,
        }
    }

    /// Derived player stats. Stats are a pure function of the tier map and
    /// are never stored anywhere.
    pub fn stats(&self) -> PlayerStats {
        PlayerStats {
            bullet_speed: BULLET_SPEED_BASE + BULLET_SPEED_PER_TIER * f32::from(self.bullet_speed),
            reload_ticks: RELOAD_BASE_TICKS
                .saturating_sub(RELOAD_TICKS_PER_TIER * u32::from(self.reload))
                .max(RELOAD_MIN_TICKS),
            move_accel: MOVE_ACCEL_BASE + MOVE_ACCEL_PER_TIER * f32::from(self.move_speed),
            bullet_damage: BULLET_DAMAGE_BASE + BULLET_DAMAGE_PER_TIER * f32::from(self.damage),
            // Max hp rides the damage tier; there is no separate hp stat
            max_hp: PLAYER_BASE_HP + HP_PER_DAMAGE_TIER * f32::from(self.damage),
        }
    }
}

/// Effective player stats for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStats {
    pub bullet_speed: f32,
    pub reload_ticks: u32,
    pub move_accel: f32,
    pub bullet_damage: f32,
    pub max_hp: f32,
}

/// The player tank. A singleton: reset in place on death, never recreated,
/// which keeps the camera follow target stable across a death-reset.
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing angle toward the pointer
    pub angle: f32,
    pub radius: f32,
    pub hp: f32,
    pub score: u64,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub upgrade_points: u32,
    pub upgrades: Upgrades,
}

impl Player {
    fn new() -> Self {
        Self {
            pos: Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0),
            vel: Vec2::ZERO,
            angle: 0.0,
            radius: PLAYER_RADIUS,
            hp: PLAYER_BASE_HP,
            score: 0,
            level: 1,
            xp: 0,
            xp_to_next: XP_BASE_THRESHOLD,
            upgrade_points: 0,
            upgrades: Upgrades::default(),
        }
    }

    pub fn stats(&self) -> PlayerStats {
        self.upgrades.stats()
    }
}

/// Soft-follow camera with a decaying shake magnitude
#[derive(Debug, Clone)]
pub struct Camera {
    pub pos: Vec2,
    /// Shake magnitude in pixels; the renderer samples jitter from it
    pub shake: f32,
}

impl Camera {
    fn new() -> Self {
        Self {
            pos: Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0),
            shake: 0.0,
        }
    }

    /// First-order lag toward the target, not physically simulated
    pub fn follow(&mut self, target: Vec2) {
        self.pos += (target - self.pos) * CAMERA_SMOOTHING;
    }

    pub fn add_shake(&mut self, amount: f32) {
        self.shake += amount;
    }

    /// Geometric decay, snapped to zero below an epsilon
    pub fn decay_shake(&mut self) {
        self.shake *= SHAKE_DECAY;
        if self.shake < 0.1 {
            self.shake = 0.0;
        }
    }
}

/// Lifetime of announcement labels, in ticks
pub const FLOATING_TEXT_LIFE_TICKS: u32 = 50;

/// Ephemeral world-anchored label; not collidable
#[derive(Debug, Clone)]
pub struct FloatingText {
    pub text: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
}

impl FloatingText {
    /// Opacity fraction for rendering
    pub fn alpha(&self) -> f32 {
        self.life as f32 / self.max_life.max(1) as f32
    }
}

/// Things that happened during a tick. The driver drains these once per
/// frame and reacts (sound effects, high-score persistence); the sim never
/// touches the platform directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Shot,
    BulletHit,
    EnemyDestroyed { class: EnemyClass },
    LevelUp { level: u32 },
    BossSpawned,
    /// A run finished (death reset or game over); carries the final score
    /// so the driver can update the persisted high score
    RunEnded { score: u64 },
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Session RNG; all simulation randomness flows through here
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub death_policy: DeathPolicy,
    /// Monotonic tick counter; cooldowns compare against it by subtraction
    pub time_ticks: u64,
    pub last_shot_tick: u64,
    pub player: Player,
    pub camera: Camera,
    /// Bullets, enemies and particles, in spawn (id) order
    pub entities: Vec<Entity>,
    pub texts: Vec<FloatingText>,
    /// Pending events for the driver; drained via `take_events`
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new session with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_death_policy(seed, DeathPolicy::default())
    }

    pub fn with_death_policy(seed: u64, death_policy: DeathPolicy) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            death_policy,
            time_ticks: 0,
            last_shot_tick: 0,
            player: Player::new(),
            camera: Camera::new(),
            entities: Vec::new(),
            texts: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Hand the pending events to the driver
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn spawn_bullet(&mut self, pos: Vec2, angle: f32, speed: f32, damage: f32) -> u32 {
        let id = self.next_entity_id();
        self.entities.push(Entity {
            id,
            pos,
            vel: Vec2::from_angle(angle) * speed,
            angle,
            radius: BULLET_RADIUS,
            remove: false,
            kind: EntityKind::Bullet {
                damage,
                ttl: BULLET_TTL_TICKS,
            },
        });
        id
    }

    pub fn spawn_enemy(&mut self, class: EnemyClass, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.entities.push(Entity {
            id,
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            radius: class.radius(),
            remove: false,
            kind: EntityKind::Enemy {
                class,
                hp: class.max_hp(),
                max_hp: class.max_hp(),
            },
        });
        id
    }

    /// Scatter `count` short-lived particles at a death position. Eviction
    /// past the population cap is mark-based so in-flight index loops over
    /// the entity list stay valid.
    pub fn spawn_particle_burst(&mut self, pos: Vec2, color: u32, count: usize) {
        let mut live = self
            .entities
            .iter()
            .filter(|e| e.is_particle() && !e.remove)
            .count();
        for _ in 0..count {
            if live >= MAX_PARTICLES {
                if let Some(oldest) = self
                    .entities
                    .iter_mut()
                    .find(|e| e.is_particle() && !e.remove)
                {
                    oldest.remove = true;
                    live -= 1;
                }
            }
            let radius = 2.0 + self.rng.random::<f32>() * 6.0;
            let vel = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * 600.0,
                (self.rng.random::<f32>() - 0.5) * 600.0,
            );
            let ttl = 15 + (self.rng.random::<f32>() * 15.0) as u32;
            let id = self.next_entity_id();
            self.entities.push(Entity {
                id,
                pos,
                vel,
                angle: 0.0,
                radius,
                remove: false,
                kind: EntityKind::Particle { ttl, color },
            });
            live += 1;
        }
    }

    /// Announce something at a world position (level-ups, boss arrivals)
    pub fn add_text(&mut self, text: &str, pos: Vec2, size: f32) {
        let vel = Vec2::new((self.rng.random::<f32>() - 0.5) * 60.0, -90.0);
        self.texts.push(FloatingText {
            text: text.to_owned(),
            pos,
            vel,
            life: FLOATING_TEXT_LIFE_TICKS,
            max_life: FLOATING_TEXT_LIFE_TICKS,
            size,
        });
    }

    pub fn mark_removed(&mut self, id: u32) {
        if let Some(e) = self.entities.iter_mut().find(|e| e.id == id) {
            e.remove = true;
        }
    }

    /// Delete all marked entities in one pass, preserving the relative
    /// order of survivors. Runs once at end of frame; nothing is ever
    /// removed mid-iteration.
    pub fn compact(&mut self) {
        self.entities.retain(|e| !e.remove);
    }

    /// Award XP and run the level-up loop. Large awards can cross several
    /// thresholds; each level grants a point, grows the threshold and fully
    /// heals the player.
    pub fn grant_xp(&mut self, amount: u32) {
        self.player.xp += amount;
        while self.player.xp >= self.player.xp_to_next {
            self.player.xp -= self.player.xp_to_next;
            self.player.level += 1;
            self.player.xp_to_next = (self.player.xp_to_next as f32 * XP_LEVEL_FACTOR) as u32;
            self.player.upgrade_points += 1;
            self.player.hp = self.player.stats().max_hp;
            let pos = self.player.pos - Vec2::new(0.0, 50.0);
            self.add_text("Level Up!", pos, 36.0);
            self.events.push(GameEvent::LevelUp {
                level: self.player.level,
            });
        }
    }

    /// Spend one upgrade point on a stat. Validated here, not in the HUD:
    /// a spend with no points, or on a maxed stat, is a no-op.
    pub fn spend_upgrade(&mut self, kind: UpgradeKind) -> bool {
        if self.player.upgrade_points == 0 || self.player.upgrades.tier(kind) >= MAX_UPGRADE_TIER {
            return false;
        }
        self.player.upgrades.raise(kind);
        self.player.upgrade_points -= 1;
        let max_hp = self.player.stats().max_hp;
        self.player.hp = self.player.hp.min(max_hp);
        true
    }

    /// Hard restart-in-place: score, level and entity population return to
    /// initial values; the player (and camera follow target) keeps its
    /// identity, and upgrades survive the death.
    pub fn reset_run(&mut self) {
        self.events.push(GameEvent::RunEnded {
            score: self.player.score,
        });
        self.player.pos = Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0);
        self.player.vel = Vec2::ZERO;
        self.player.hp = self.player.stats().max_hp;
        self.player.score = 0;
        self.player.level = 1;
        self.player.xp = 0;
        self.player.xp_to_next = XP_BASE_THRESHOLD;
        self.entities.clear();
        self.camera.add_shake(10.0);
    }

    /// Terminal variant: freeze the session in `GameOver`
    pub fn end_run(&mut self) {
        self.events.push(GameEvent::RunEnded {
            score: self.player.score,
        });
        self.phase = GamePhase::GameOver;
        self.camera.add_shake(10.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_preserves_survivor_order() {
        let mut state = GameState::new(1);
        let a = state.spawn_enemy(EnemyClass::Square, Vec2::new(100.0, 100.0));
        let b = state.spawn_enemy(EnemyClass::Triangle, Vec2::new(200.0, 100.0));
        let c = state.spawn_enemy(EnemyClass::Pentagon, Vec2::new(300.0, 100.0));

        state.mark_removed(b);
        state.compact();

        let ids: Vec<u32> = state.entities.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn stats_are_pure_function_of_tiers() {
        let base = Upgrades::default().stats();
        assert_eq!(base.bullet_speed, BULLET_SPEED_BASE);
        assert_eq!(base.reload_ticks, RELOAD_BASE_TICKS);
        assert_eq!(base.bullet_damage, BULLET_DAMAGE_BASE);
        assert_eq!(base.max_hp, PLAYER_BASE_HP);

        let maxed = Upgrades {
            bullet_speed: 8,
            reload: 8,
            move_speed: 8,
            damage: 8,
        }
        .stats();
        assert_eq!(maxed.bullet_speed, BULLET_SPEED_BASE + 8.0 * BULLET_SPEED_PER_TIER);
        assert_eq!(maxed.reload_ticks, 6);
        assert!(maxed.reload_ticks >= RELOAD_MIN_TICKS);
        assert_eq!(maxed.max_hp, PLAYER_BASE_HP + 8.0 * HP_PER_DAMAGE_TIER);
    }

    #[test]
    fn grant_xp_crosses_multiple_thresholds_in_one_call() {
        let mut state = GameState::new(2);
        // 100 + 150 = two full thresholds, no overflow
        state.grant_xp(250);
        assert_eq!(state.player.level, 3);
        assert_eq!(state.player.xp, 0);
        assert_eq!(state.player.upgrade_points, 2);
        // Threshold grew twice: 100 -> 150 -> 225
        assert_eq!(state.player.xp_to_next, 225);
        // Each level-up fully heals
        assert_eq!(state.player.hp, state.player.stats().max_hp);
        assert_eq!(state.texts.len(), 2);
    }

    #[test]
    fn spend_upgrade_requires_points_and_respects_tier_cap() {
        let mut state = GameState::new(3);
        assert!(!state.spend_upgrade(UpgradeKind::Damage));

        state.player.upgrade_points = 1;
        assert!(state.spend_upgrade(UpgradeKind::Damage));
        assert_eq!(state.player.upgrades.damage, 1);
        assert_eq!(state.player.upgrade_points, 0);

        state.player.upgrades.damage = MAX_UPGRADE_TIER;
        state.player.upgrade_points = 1;
        assert!(!state.spend_upgrade(UpgradeKind::Damage));
        assert_eq!(state.player.upgrade_points, 1);
    }

    #[test]
    fn particle_population_is_capped_by_mark_eviction() {
        let mut state = GameState::new(4);
        for _ in 0..40 {
            state.spawn_particle_burst(Vec2::new(500.0, 500.0), 0, 8);
        }
        let live = state
            .entities
            .iter()
            .filter(|e| e.is_particle() && !e.remove)
            .count();
        assert!(live <= MAX_PARTICLES);
        // Evicted particles are only marked, never yanked mid-list
        assert!(state.entities.iter().any(|e| e.remove));
    }

    #[test]
    fn reset_run_restores_initial_progression_but_keeps_upgrades() {
        let mut state = GameState::new(5);
        state.player.score = 12345;
        state.player.level = 7;
        state.player.xp = 80;
        state.player.xp_to_next = 1139;
        state.player.upgrades.damage = 3;
        state.player.upgrade_points = 2;
        state.spawn_enemy(EnemyClass::Boss, Vec2::new(100.0, 100.0));

        state.reset_run();

        assert_eq!(state.player.score, 0);
        assert_eq!(state.player.level, 1);
        assert_eq!(state.player.xp, 0);
        assert_eq!(state.player.xp_to_next, XP_BASE_THRESHOLD);
        assert!(state.entities.is_empty());
        assert_eq!(state.player.upgrades.damage, 3);
        assert_eq!(state.player.upgrade_points, 2);
        assert_eq!(
            state.events,
            vec![GameEvent::RunEnded { score: 12345 }]
        );
    }

    #[test]
    fn health_accessor_only_reports_enemies() {
        let mut state = GameState::new(6);
        state.spawn_enemy(EnemyClass::Square, Vec2::new(100.0, 100.0));
        state.spawn_bullet(Vec2::new(0.0, 0.0), 0.0, 480.0, 12.0);

        assert_eq!(state.entities[0].health(), Some((10.0, 10.0)));
        assert_eq!(state.entities[1].health(), None);
    }
}
