//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and
//! platform-free:
//! - Seeded RNG only (owned by `GameState`)
//! - Explicit per-tick input, explicit `dt`
//! - Stable iteration order (spawn order, preserved by compaction)
//! - No rendering or platform dependencies; side effects surface as
//!   `GameEvent`s for the driver

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{circles_overlap, impulse_along, push_apart};
pub use spawn::{run_spawners, spawn_interval};
pub use state::{
    Camera, DeathPolicy, EnemyClass, Entity, EntityKind, FloatingText, GameEvent, GamePhase,
    GameState, Player, PlayerStats, UpgradeKind, Upgrades, FLOATING_TEXT_LIFE_TICKS,
};
pub use tick::{TickInput, tick};
