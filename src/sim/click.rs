//! Click resolution
//!
//! A click resolves against at most one entity: the topmost active target
//! under the cursor, else the topmost power-up, else it is a miss.

use glam::Vec2;

use super::collision::hit_test;
use super::rng::RandomSource;
use super::schedule::{Reward, ScheduledEventKind};
use super::spawn;
use super::state::{ClickEffect, GameEvent, GameState, LaserTrail, PowerUpKind};
use crate::consts::*;

/// What a click landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Target(u32),
    PowerUp(PowerUpKind),
    Miss,
    /// Session not running
    Ignored,
}

/// Resolve a click at panel coordinates `point`
pub fn click(
    state: &mut GameState,
    point: Vec2,
    now_ms: u64,
    rng: &mut dyn RandomSource,
) -> ClickOutcome {
    if !state.is_running() {
        return ClickOutcome::Ignored;
    }
    state.now_ms = state.now_ms.max(now_ms);
    state.laser = Some(LaserTrail {
        from: state.cursor.unwrap_or(point),
        to: point,
        fired_ms: state.now_ms,
    });

    // Newest entities are drawn on top
    let target = state
        .targets
        .iter()
        .rev()
        .find(|t| t.is_active() && hit_test(point, t.center(), t.size))
        .map(|t| t.id);
    if let Some(id) = target {
        hit_target(state, id, rng);
        return ClickOutcome::Target(id);
    }

    let power_up = state
        .power_ups
        .iter()
        .rposition(|p| hit_test(point, p.center(), p.size));
    if let Some(idx) = power_up {
        let kind = state.power_ups.remove(idx).kind;
        collect_power_up(state, kind);
        return ClickOutcome::PowerUp(kind);
    }

    state.events.push(GameEvent::Miss);
    state.lose_lives(1);
    ClickOutcome::Miss
}

/// Mark a target popping and schedule its removal
fn start_pop(state: &mut GameState, id: u32, reward: Reward) {
    if let Some(target) = state.target_mut(id) {
        target.popping = true;
    }
    let due = state.now_ms + POP_DELAY_MS;
    state
        .schedule
        .schedule(due, ScheduledEventKind::PopTarget { id, reward });
}

fn hit_target(state: &mut GameState, id: u32, rng: &mut dyn RandomSource) {
    let Some(target) = state.target(id) else {
        return;
    };
    let kind = target.kind;
    let pos = target.pos;
    state.events.push(GameEvent::TargetHit { id, kind });

    match kind.click_effect() {
        ClickEffect::Pop => start_pop(state, id, Reward::Combo),
        ClickEffect::Split => {
            state.remove_target(id);
            spawn::split_slime(state, rng, pos);
            state.events.push(GameEvent::SlimeSplit { id });
        }
        ClickEffect::Damage => {
            let Some(target) = state.target_mut(id) else {
                return;
            };
            let health = target.health.unwrap_or(1).saturating_sub(1);
            target.health = Some(health);
            state.events.push(GameEvent::BossDamaged { id, health });
            if health == 0 {
                log::debug!("Boss {} defeated", id);
                start_pop(state, id, Reward::Flat(BOSS_BONUS));
            }
        }
    }
}

fn collect_power_up(state: &mut GameState, kind: PowerUpKind) {
    log::debug!("Collected {:?}", kind);
    state.events.push(GameEvent::PowerUpCollected { kind });

    match kind {
        PowerUpKind::ExtraLife => state.lives += 1,
        PowerUpKind::DoublePoints => state.score += DOUBLE_POINTS_BONUS,
        PowerUpKind::TimeFreeze => {
            state.combo = 0;
            for target in state.targets.iter_mut() {
                target.vel = Vec2::ZERO;
            }
            let until = state.now_ms + state.freeze_duration_ms;
            state.frozen_until_ms = Some(until);
            state.schedule.schedule(until, ScheduledEventKind::EndFreeze);
        }
        PowerUpKind::Skull => {
            state.lives = (state.lives - 1).max(0);
            if state.combo_resets_on_life_loss {
                state.combo = 0;
            }
            if state.lives == 0 {
                state.end_session();
            }
        }
        PowerUpKind::Lightning => {
            let ids: Vec<u32> = state
                .targets
                .iter()
                .filter(|t| t.is_active() && !t.immune)
                .map(|t| t.id)
                .collect();
            for id in ids {
                start_pop(state, id, Reward::Flat(1));
            }
        }
        PowerUpKind::LavaShield => {
            // Targets are kept sorted by id, so the first half is stable
            let candidates: Vec<u32> = state
                .targets
                .iter()
                .filter(|t| t.is_active() && !t.immune)
                .map(|t| t.id)
                .collect();
            let half = candidates.len().div_ceil(2);
            for &id in &candidates[..half] {
                start_pop(state, id, Reward::Flat(1));
            }
            state.lives += LAVA_SHIELD_LIVES;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::ScriptedSource;
    use crate::sim::state::{Difficulty, GamePhase, PowerUp, Target, TargetKind};
    use crate::sim::tick::tick;

    fn running(difficulty: Difficulty) -> GameState {
        let mut state = GameState::new(difficulty);
        state.phase = GamePhase::Running;
        state
    }

    fn add(state: &mut GameState, kind: TargetKind, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        state
            .targets
            .push(Target::new(id, kind, pos, Vec2::new(1.0, 1.0), state.now_ms));
        id
    }

    fn add_power_up(state: &mut GameState, kind: PowerUpKind, pos: Vec2) -> Vec2 {
        let id = state.next_entity_id();
        let p = PowerUp::new(id, kind, pos, Vec2::ZERO, state.now_ms);
        let center = p.center();
        state.power_ups.push(p);
        center
    }

    fn rng() -> ScriptedSource {
        ScriptedSource::new(vec![0.9, 0.1, 0.7, 0.3])
    }

    #[test]
    fn test_click_ignored_when_not_running() {
        let mut state = GameState::new(Difficulty::Normal);
        let outcome = click(&mut state, Vec2::new(5.0, 5.0), 10, &mut rng());
        assert_eq!(outcome, ClickOutcome::Ignored);
        assert_eq!(state.lives, 3);
        assert!(state.laser.is_none());
    }

    #[test]
    fn test_miss_costs_life_and_fires_laser() {
        let mut state = running(Difficulty::Normal);
        state.cursor = Some(Vec2::new(1.0, 2.0));
        let outcome = click(&mut state, Vec2::new(300.0, 300.0), 40, &mut rng());
        assert_eq!(outcome, ClickOutcome::Miss);
        assert_eq!(state.lives, 2);
        let laser = state.laser.unwrap();
        assert_eq!(laser.from, Vec2::new(1.0, 2.0));
        assert_eq!(laser.to, Vec2::new(300.0, 300.0));
        assert_eq!(laser.fired_ms, 40);
    }

    #[test]
    fn test_normal_hit_scores_after_pop_delay() {
        let mut state = running(Difficulty::Normal);
        let id = add(&mut state, TargetKind::Normal, Vec2::new(100.0, 100.0));
        let center = state.target(id).unwrap().center();

        assert_eq!(click(&mut state, center, 0, &mut rng()), ClickOutcome::Target(id));
        assert!(state.target(id).unwrap().popping);
        assert_eq!(state.score, 0);

        // A second click on the popping target is a miss, never a second score
        assert_eq!(click(&mut state, center, 10, &mut rng()), ClickOutcome::Miss);

        tick(&mut state, POP_DELAY_MS, &mut rng());
        assert!(state.target(id).is_none());
        assert_eq!(state.score, 1);
        assert_eq!(state.combo, 1);
    }

    #[test]
    fn test_topmost_target_wins() {
        let mut state = running(Difficulty::Normal);
        let below = add(&mut state, TargetKind::Normal, Vec2::new(100.0, 100.0));
        let above = add(&mut state, TargetKind::Normal, Vec2::new(110.0, 110.0));
        let outcome = click(&mut state, Vec2::new(130.0, 130.0), 0, &mut rng());
        assert_eq!(outcome, ClickOutcome::Target(above));
        assert!(!state.target(below).unwrap().popping);
    }

    #[test]
    fn test_slime_splits_without_score() {
        let mut state = running(Difficulty::Normal);
        let id = add(&mut state, TargetKind::Slime, Vec2::new(100.0, 100.0));
        let center = state.target(id).unwrap().center();
        click(&mut state, center, 0, &mut rng());

        assert!(state.target(id).is_none());
        let minis: Vec<_> = state
            .targets
            .iter()
            .filter(|t| t.kind == TargetKind::Mini)
            .collect();
        assert_eq!(minis.len(), 2);
        assert!(minis.iter().all(|m| m.pos == Vec2::new(100.0, 100.0)));
        assert_eq!(state.score, 0);
        assert_eq!(state.combo, 0);
        assert!(state.schedule.is_empty());
    }

    #[test]
    fn test_boss_needs_five_hits() {
        let mut state = running(Difficulty::Normal);
        let id = add(&mut state, TargetKind::Boss, Vec2::new(100.0, 100.0));
        state.combo = 3;
        let center = state.target(id).unwrap().center();

        for expected in (1..BOSS_HEALTH).rev() {
            click(&mut state, center, 0, &mut rng());
            let boss = state.target(id).unwrap();
            assert_eq!(boss.health, Some(expected));
            assert!(!boss.popping);
        }
        click(&mut state, center, 0, &mut rng());
        assert!(state.target(id).unwrap().popping);

        tick(&mut state, POP_DELAY_MS, &mut rng());
        assert!(state.target(id).is_none());
        assert_eq!(state.score, BOSS_BONUS);
        assert_eq!(state.combo, 3);
    }

    #[test]
    fn test_extra_life_and_double_points() {
        let mut state = running(Difficulty::Normal);
        let c = add_power_up(&mut state, PowerUpKind::ExtraLife, Vec2::new(0.0, 0.0));
        assert_eq!(
            click(&mut state, c, 0, &mut rng()),
            ClickOutcome::PowerUp(PowerUpKind::ExtraLife)
        );
        assert_eq!(state.lives, 4);

        let c = add_power_up(&mut state, PowerUpKind::DoublePoints, Vec2::new(200.0, 0.0));
        click(&mut state, c, 0, &mut rng());
        assert_eq!(state.score, DOUBLE_POINTS_BONUS);
        assert!(state.power_ups.is_empty());
    }

    #[test]
    fn test_time_freeze_zeroes_and_restores_velocity() {
        let mut state = running(Difficulty::Normal);
        state.combo = 7;
        let id = add(&mut state, TargetKind::Normal, Vec2::new(300.0, 200.0));
        let c = add_power_up(&mut state, PowerUpKind::TimeFreeze, Vec2::new(0.0, 0.0));
        click(&mut state, c, 1_000, &mut rng());

        assert_eq!(state.combo, 0);
        assert_eq!(state.target(id).unwrap().vel, Vec2::ZERO);
        let frozen_pos = state.target(id).unwrap().pos;

        tick(&mut state, 1_000 + DEFAULT_FREEZE_MS - 1, &mut rng());
        assert_eq!(state.target(id).unwrap().pos, frozen_pos);

        tick(&mut state, 1_000 + DEFAULT_FREEZE_MS, &mut rng());
        assert!(!state.is_frozen());
        assert_ne!(state.target(id).unwrap().vel, Vec2::ZERO);
    }

    #[test]
    fn test_skull_ends_session_at_one_life() {
        let mut state = running(Difficulty::Hard);
        let c = add_power_up(&mut state, PowerUpKind::Skull, Vec2::new(0.0, 0.0));
        click(&mut state, c, 0, &mut rng());
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::Over);
    }

    #[test]
    fn test_skull_clamps_at_zero() {
        let mut state = running(Difficulty::Normal);
        state.lives = -1;
        let c = add_power_up(&mut state, PowerUpKind::Skull, Vec2::new(0.0, 0.0));
        click(&mut state, c, 0, &mut rng());
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::Over);
    }

    #[test]
    fn test_lightning_spares_boss() {
        let mut state = running(Difficulty::Normal);
        let boss = add(&mut state, TargetKind::Boss, Vec2::new(400.0, 200.0));
        for i in 0..3 {
            add(&mut state, TargetKind::Normal, Vec2::new(100.0 + i as f32 * 60.0, 300.0));
        }
        let c = add_power_up(&mut state, PowerUpKind::Lightning, Vec2::new(0.0, 0.0));
        click(&mut state, c, 0, &mut rng());

        tick(&mut state, POP_DELAY_MS, &mut rng());
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.targets[0].id, boss);
        assert_eq!(state.score, 3);
        assert_eq!(state.combo, 0);
    }

    #[test]
    fn test_lava_shield_takes_half_rounded_up() {
        let mut state = running(Difficulty::Normal);
        let ids: Vec<u32> = (0..3)
            .map(|i| add(&mut state, TargetKind::Normal, Vec2::new(100.0 + i as f32 * 60.0, 300.0)))
            .collect();
        let c = add_power_up(&mut state, PowerUpKind::LavaShield, Vec2::new(0.0, 0.0));
        click(&mut state, c, 0, &mut rng());

        let popping: Vec<u32> = state.targets.iter().filter(|t| t.popping).map(|t| t.id).collect();
        assert_eq!(popping, ids[..2].to_vec());
        assert_eq!(state.lives, 3 + LAVA_SHIELD_LIVES);
    }

    #[test]
    fn test_combo_reset_on_miss_is_optional() {
        let mut state = running(Difficulty::Easy);
        state.combo = 4;
        click(&mut state, Vec2::new(500.0, 350.0), 0, &mut rng());
        assert_eq!(state.combo, 4);

        state.combo_resets_on_life_loss = true;
        click(&mut state, Vec2::new(500.0, 350.0), 0, &mut rng());
        assert_eq!(state.combo, 0);
    }
}
