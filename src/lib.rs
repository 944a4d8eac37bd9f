//! Target Practice - a whack-a-mole reflex game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, clicks, timers)
//! - `session`: Single update entry point wrapping the simulation
//! - `settings`: Tunable configuration
//! - `web`: Browser bindings (wasm32 only)

pub mod session;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use session::{MusicPlayer, NullMusic, Session, SessionInput, Snapshot};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Host tick cadence (the simulation itself is driven by timestamps)
    pub const TICK_INTERVAL_MS: u64 = 20;

    /// Default panel dimensions
    pub const DEFAULT_PANEL_WIDTH: f32 = 600.0;
    pub const DEFAULT_PANEL_HEIGHT: f32 = 400.0;

    /// Base target size (S); other kinds scale from this
    pub const TARGET_SIZE: f32 = 50.0;
    /// Target speed in pixels per tick; each velocity axis is drawn from ±speed/2
    pub const TARGET_SPEED: f32 = 4.0;
    /// Bosses move slower than regular targets
    pub const BOSS_SPEED_SCALE: f32 = 0.75;
    pub const BOSS_HEALTH: u8 = 5;
    pub const BOSS_BONUS: u64 = 10;
    /// Rotation per tick, degrees
    pub const ROTATION_STEP: f32 = 3.0;

    /// Unclicked targets expire after this long
    pub const TARGET_LIFESPAN_MS: u64 = 45_000;
    /// Removal animation delay for popping targets
    pub const POP_DELAY_MS: u64 = 300;
    pub const POWERUP_LIFETIME_MS: u64 = 5_000;
    pub const DEFAULT_FREEZE_MS: u64 = 5_000;
    pub const DEFAULT_LASER_FADE_MS: u64 = 450;

    /// Spawner cadence
    pub const TARGET_SPAWN_INTERVAL_MS: u64 = 750;
    pub const POWERUP_SPAWN_INTERVAL_MS: u64 = 2_500;
    pub const BOSS_RAMP_INTERVAL_MS: u64 = 30_000;

    /// Boss spawn probability ramp: base + floor(score / 100) * step, capped
    pub const BOSS_RATE_BASE: f32 = 0.03;
    pub const BOSS_RATE_STEP: f32 = 0.02;
    pub const BOSS_RATE_CAP: f32 = 0.2;

    /// Combo above this doubles the per-hit score
    pub const COMBO_THRESHOLD: u32 = 5;
    pub const DOUBLE_POINTS_BONUS: u64 = 10;
    pub const LAVA_SHIELD_LIVES: i32 = 2;
}
