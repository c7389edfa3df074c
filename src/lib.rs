//! Geo Tank - a top-down arena survival tank shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, progression)
//! - `renderer`: WebGPU rendering pipeline
//! - `audio`: Procedural Web Audio sound effects (wasm only)
//! - `hud`: Read-only scalar snapshots for the DOM overlay
//! - `highscore`: The single persisted high score
//! - `settings`: Player preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscore;
pub mod hud;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscore::HighScore;
pub use settings::Settings;

/// Game configuration constants
///
/// Continuous quantities are px/sec and px/sec² and get scaled by the tick's
/// `dt`; discrete timers (reload, TTL, spawn schedules) are integer ticks.
/// Per-tick damping factors (friction, drag, shake decay) apply once per
/// tick, so the feel stays tied to the nominal 60 Hz tick.
pub mod consts {
    /// Nominal frame duration; the driver runs one tick per display refresh
    pub const TICK_DT: f32 = 1.0 / 60.0;

    /// World bounds (origin at top-left, +y down, like the canvas)
    pub const WORLD_WIDTH: f32 = 2000.0;
    pub const WORLD_HEIGHT: f32 = 2000.0;

    /// Player tuning
    pub const PLAYER_RADIUS: f32 = 20.0;
    pub const PLAYER_BASE_HP: f32 = 100.0;
    /// Velocity kept per tick; drift-and-coast feel, not instant stop
    pub const PLAYER_FRICTION: f32 = 0.93;
    /// Velocity reflected at this fraction when clamped into a wall
    pub const WALL_RESTITUTION: f32 = 0.5;

    /// Upgrade tiers and the stats derived from them
    pub const MAX_UPGRADE_TIER: u8 = 8;
    pub const BULLET_SPEED_BASE: f32 = 480.0;
    pub const BULLET_SPEED_PER_TIER: f32 = 90.0;
    pub const RELOAD_BASE_TICKS: u32 = 30;
    pub const RELOAD_TICKS_PER_TIER: u32 = 3;
    pub const RELOAD_MIN_TICKS: u32 = 5;
    pub const MOVE_ACCEL_BASE: f32 = 1440.0;
    pub const MOVE_ACCEL_PER_TIER: f32 = 172.8;
    pub const BULLET_DAMAGE_BASE: f32 = 12.0;
    pub const BULLET_DAMAGE_PER_TIER: f32 = 5.0;
    pub const HP_PER_DAMAGE_TIER: f32 = 10.0;

    /// Bullets
    pub const BULLET_RADIUS: f32 = 10.0;
    pub const BULLET_TTL_TICKS: u32 = 120;
    /// Total random angular spread applied per shot (±half)
    pub const BULLET_SPREAD: f32 = 0.05;
    /// Barrel length in player radii; bullets spawn at the tip
    pub const BARREL_LENGTH: f32 = 1.6;
    pub const RECOIL_BASE: f32 = 30.0;
    pub const RECOIL_PER_DAMAGE: f32 = 3.0;

    /// Enemies
    pub const ENEMY_ACCEL: f32 = 108.0;
    /// Decorative rotation, radians per tick, decoupled from motion
    pub const ENEMY_SPIN: f32 = 0.02;
    pub const KNOCKBACK_IMPULSE: f32 = 120.0;
    pub const CONTACT_PUSH: f32 = 240.0;
    /// Fraction of the class contact damage applied per tick of overlap
    pub const CONTACT_DAMAGE_SCALE: f32 = 0.1;

    /// Spawning
    pub const SPAWN_INTERVAL_BASE: u32 = 100;
    pub const SPAWN_INTERVAL_PER_LEVEL: u32 = 2;
    pub const SPAWN_INTERVAL_MIN: u32 = 20;
    pub const SPAWN_MARGIN: f32 = 50.0;
    pub const SPAWN_DISTANCE_JITTER: f32 = 300.0;
    /// The regular spawner stops at this many live entities (boss is exempt)
    pub const MAX_LIVE_ENTITIES: usize = 50;
    pub const BOSS_INTERVAL_TICKS: u64 = 3600;

    /// Progression
    pub const XP_BASE_THRESHOLD: u32 = 100;
    pub const XP_LEVEL_FACTOR: f32 = 1.5;

    /// Particles
    pub const DEATH_BURST_PARTICLES: usize = 8;
    pub const PARTICLE_DRAG: f32 = 0.9;
    pub const MAX_PARTICLES: usize = 256;

    /// Camera
    pub const CAMERA_SMOOTHING: f32 = 0.08;
    pub const SHAKE_DECAY: f32 = 0.9;
    /// Entities outside the viewport expanded by this margin are culled
    pub const CULL_MARGIN: f32 = 100.0;

    /// Background grid spacing
    pub const GRID_SIZE: f32 = 40.0;
}
