//! Per-frame simulation tick
//!
//! Core game loop that advances the simulation to a timestamp.

use super::collision::reflect_in_bounds;
use super::rng::RandomSource;
use super::schedule::{Reward, ScheduledEvent, ScheduledEventKind};
use super::spawn::{self, random_velocity};
use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Advance the game state to `now_ms`
pub fn tick(state: &mut GameState, now_ms: u64, rng: &mut dyn RandomSource) {
    if !state.is_running() {
        return;
    }
    state.now_ms = state.now_ms.max(now_ms);
    let now = state.now_ms;

    // Deferred effects first, in due order
    while let Some(event) = state.schedule.pop_due(now) {
        apply_scheduled(state, &event, rng);
        if !state.is_running() {
            // Ending the session cleared the queue; nothing else may fire
            return;
        }
        state.schedule.reschedule(&event, now);
    }

    // Integrate targets
    let bounds = state.bounds;
    for target in state.targets.iter_mut() {
        (target.pos, target.vel) = reflect_in_bounds(target.pos, target.vel, target.size, bounds);
        target.advance_rotation();
    }

    // Integrate power-ups (expiry is scheduled, not checked here)
    for power_up in state.power_ups.iter_mut() {
        (power_up.pos, power_up.vel) =
            reflect_in_bounds(power_up.pos, power_up.vel, power_up.size, bounds);
    }

    // Expire unclicked targets: pop now, charge lives after the animation
    let expired: Vec<u32> = state
        .targets
        .iter_mut()
        .filter(|t| t.is_active() && t.is_expired(now))
        .map(|t| {
            t.popping = true;
            t.id
        })
        .collect();
    if !expired.is_empty() {
        log::debug!("{} target(s) expired", expired.len());
        state.schedule.schedule(
            now + POP_DELAY_MS,
            ScheduledEventKind::RemoveExpired { ids: expired },
        );
    }

    state.normalize_order();
}

/// Apply one deferred effect
fn apply_scheduled(state: &mut GameState, event: &ScheduledEvent, rng: &mut dyn RandomSource) {
    match &event.kind {
        ScheduledEventKind::SpawnTarget => {
            spawn::spawn_target(state, rng);
        }
        ScheduledEventKind::SpawnPowerUp => {
            spawn::spawn_power_up(state, rng);
        }
        ScheduledEventKind::RampBossRate => spawn::ramp_boss_rate(state),
        ScheduledEventKind::PopTarget { id, reward } => {
            if state.remove_target(*id).is_some() {
                let points = match reward {
                    Reward::Combo => {
                        let points = if state.combo > COMBO_THRESHOLD { 2 } else { 1 };
                        state.combo += 1;
                        points
                    }
                    Reward::Flat(points) => *points,
                };
                state.score += points;
                state.events.push(GameEvent::TargetRemoved { id: *id, points });
            }
        }
        ScheduledEventKind::RemoveExpired { ids } => {
            let removed = ids
                .iter()
                .filter(|id| state.remove_target(**id).is_some())
                .count() as u32;
            if removed > 0 {
                state.events.push(GameEvent::TargetsExpired { count: removed });
                state.lose_lives(removed as i32);
            }
        }
        ScheduledEventKind::ExpirePowerUp { id } => {
            let before = state.power_ups.len();
            state.power_ups.retain(|p| p.id != *id);
            if state.power_ups.len() < before {
                state.events.push(GameEvent::PowerUpExpired { id: *id });
            }
        }
        ScheduledEventKind::EndFreeze => {
            // A later freeze pushed the end time out; its own event thaws
            if state.frozen_until_ms.is_some_and(|until| until <= event.due_ms) {
                state.frozen_until_ms = None;
                for target in state.targets.iter_mut() {
                    target.vel = random_velocity(rng, target.kind.speed_scale());
                }
                state.events.push(GameEvent::FreezeEnded);
            }
        }
    }
}
