//! Read-only scalar projection of the session state for the overlay
//!
//! The DOM HUD is a pure render of the latest snapshot; it never reaches
//! into the simulation. Upgrade-spend commands travel the other way through
//! `TickInput::upgrade` and are validated inside the tick.

use crate::sim::{GamePhase, GameState, UpgradeKind, Upgrades};

/// Published once per frame for the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudSnapshot {
    pub score: u64,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub hp: f32,
    pub max_hp: f32,
    pub upgrade_points: u32,
    pub upgrades: Upgrades,
    pub phase: GamePhase,
}

impl HudSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let p = &state.player;
        Self {
            score: p.score,
            level: p.level,
            xp: p.xp,
            xp_to_next: p.xp_to_next,
            hp: p.hp.max(0.0),
            max_hp: p.stats().max_hp,
            upgrade_points: p.upgrade_points,
            upgrades: p.upgrades,
            phase: state.phase,
        }
    }

    pub fn xp_fraction(&self) -> f32 {
        self.xp as f32 / self.xp_to_next.max(1) as f32
    }

    pub fn hp_fraction(&self) -> f32 {
        (self.hp / self.max_hp).clamp(0.0, 1.0)
    }
}

/// The stats the HUD can spend points on, in hotkey order (1-4)
pub const UPGRADE_ORDER: [UpgradeKind; 4] = [
    UpgradeKind::BulletSpeed,
    UpgradeKind::Reload,
    UpgradeKind::MoveSpeed,
    UpgradeKind::Damage,
];
