//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only arrives as a millisecond timestamp argument
//! - Randomness only through an injected `RandomSource`
//! - Deferred effects are scheduled events, never free-running timers
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod click;
pub mod collision;
pub mod rng;
pub mod schedule;
pub mod spawn;
pub mod state;
pub mod tick;

pub use click::{ClickOutcome, click};
pub use collision::{hit_test, reflect_in_bounds};
pub use rng::{RandomSource, ScriptedSource};
pub use schedule::{EventQueue, Reward, ScheduledEvent, ScheduledEventKind};
pub use state::{
    ClickEffect, Difficulty, GameEvent, GamePhase, GameState, LaserTrail, PowerUp, PowerUpKind, Target,
    TargetKind,
};
pub use tick::tick;
