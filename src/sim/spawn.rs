//! Target and power-up spawning
//!
//! Every decision draws from the injected `RandomSource`, in a fixed order, so
//! a scripted source pins the outcome exactly.

use glam::Vec2;

use super::rng::RandomSource;
use super::schedule::ScheduledEventKind;
use super::state::{GameEvent, GameState, PowerUp, PowerUpKind, Target, TargetKind};
use crate::consts::*;

/// Uniform velocity with each axis in `[-speed/2, speed/2) * scale`
pub fn random_velocity(rng: &mut dyn RandomSource, scale: f32) -> Vec2 {
    let half = TARGET_SPEED / 2.0;
    Vec2::new(rng.range(-half, half), rng.range(-half, half)) * scale
}

/// Uniform top-left position keeping an entity of `size` inside `bounds`
pub fn random_position(rng: &mut dyn RandomSource, size: f32, bounds: Vec2) -> Vec2 {
    let max = (bounds - Vec2::splat(size)).max(Vec2::ZERO);
    Vec2::new(rng.range(0.0, max.x), rng.range(0.0, max.y))
}

/// Pick the kind of the next target
pub fn roll_target_kind(rng: &mut dyn RandomSource, boss_spawn_rate: f32) -> TargetKind {
    if rng.unit() < boss_spawn_rate {
        return TargetKind::Boss;
    }
    match rng.unit() {
        r if r < 0.1 => TargetKind::Slime,
        r if r < 0.2 => TargetKind::Mini,
        _ => TargetKind::Normal,
    }
}

/// Boss probability for the current score
pub fn boss_rate_for_score(score: u64) -> f32 {
    let steps = (score / 100) as f32;
    (BOSS_RATE_BASE + steps * BOSS_RATE_STEP).min(BOSS_RATE_CAP)
}

/// Velocity for a new target, honouring an active time-freeze
fn spawn_velocity(state: &GameState, rng: &mut dyn RandomSource, kind: TargetKind) -> Vec2 {
    let vel = random_velocity(rng, kind.speed_scale());
    if state.is_frozen() { Vec2::ZERO } else { vel }
}

/// Add a target of `kind` at `pos`
pub fn push_target(
    state: &mut GameState,
    rng: &mut dyn RandomSource,
    kind: TargetKind,
    pos: Vec2,
) -> u32 {
    let vel = spawn_velocity(state, rng, kind);
    let id = state.next_entity_id();
    state.targets.push(Target::new(id, kind, pos, vel, state.now_ms));
    state.events.push(GameEvent::TargetSpawned { id, kind });
    id
}

/// Spawn one target with a rolled kind at a random position
pub fn spawn_target(state: &mut GameState, rng: &mut dyn RandomSource) -> u32 {
    let kind = roll_target_kind(rng, state.boss_spawn_rate);
    let pos = random_position(rng, kind.size(), state.bounds);
    let id = push_target(state, rng, kind, pos);
    log::debug!("Spawned {:?} target {} at ({:.0}, {:.0})", kind, id, pos.x, pos.y);
    id
}

/// Replace a slime with two minis at its position
pub fn split_slime(state: &mut GameState, rng: &mut dyn RandomSource, pos: Vec2) -> [u32; 2] {
    [
        push_target(state, rng, TargetKind::Mini, pos),
        push_target(state, rng, TargetKind::Mini, pos),
    ]
}

/// Spawn one power-up and schedule its expiry
pub fn spawn_power_up(state: &mut GameState, rng: &mut dyn RandomSource) -> u32 {
    let kind = PowerUpKind::ALL[rng.index(PowerUpKind::ALL.len())];
    let pos = random_position(rng, TARGET_SIZE, state.bounds);
    let vel = random_velocity(rng, 1.0);
    let id = state.next_entity_id();
    state
        .power_ups
        .push(PowerUp::new(id, kind, pos, vel, state.now_ms));
    state.schedule.schedule(
        state.now_ms + POWERUP_LIFETIME_MS,
        ScheduledEventKind::ExpirePowerUp { id },
    );
    log::debug!("Spawned {:?} power-up {}", kind, id);
    id
}

/// Recompute the boss spawn rate from the current score
pub fn ramp_boss_rate(state: &mut GameState) {
    let rate = boss_rate_for_score(state.score);
    if rate != state.boss_spawn_rate {
        log::debug!("Boss spawn rate {:.2} -> {:.2}", state.boss_spawn_rate, rate);
    }
    state.boss_spawn_rate = rate;
}

/// Queue the first firing of every recurring spawner timer
pub fn schedule_spawners(state: &mut GameState) {
    let now = state.now_ms;
    for kind in [
        ScheduledEventKind::SpawnTarget,
        ScheduledEventKind::SpawnPowerUp,
        ScheduledEventKind::RampBossRate,
    ] {
        if let Some(interval) = kind.interval_ms() {
            state.schedule.schedule(now + interval, kind);
        }
    }
}
