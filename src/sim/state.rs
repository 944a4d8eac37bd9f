//! Game state and core simulation types
//!
//! Everything a frame needs to render or a click needs to resolve lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::schedule::EventQueue;
use crate::consts::*;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to start
    #[default]
    NotStarted,
    /// Active gameplay
    Running,
    /// Out of lives
    Over,
}

/// Difficulty fixes the starting lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    BonusMode,
}

impl Difficulty {
    pub fn starting_lives(&self) -> i32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Normal => 3,
            Difficulty::Hard => 1,
            Difficulty::BonusMode => 50,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::BonusMode => "Bonus Mode",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "bonus" | "bonus-mode" | "bonus mode" | "bonusmode" => Some(Difficulty::BonusMode),
            _ => None,
        }
    }
}

/// Target types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetKind {
    #[default]
    Normal,
    /// Splits into two minis when clicked
    Slime,
    Mini,
    /// Takes several hits, immune to area effects
    Boss,
}

/// What a click on a target of a given kind does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickEffect {
    /// Pop and score through the combo
    Pop,
    /// Replace with two minis, no score
    Split,
    /// Lose one health, pop for the boss bonus at zero
    Damage,
}

impl TargetKind {
    pub fn size(&self) -> f32 {
        match self {
            TargetKind::Normal => TARGET_SIZE,
            TargetKind::Slime => TARGET_SIZE * 1.2,
            TargetKind::Mini => TARGET_SIZE * 0.5,
            TargetKind::Boss => TARGET_SIZE * 2.0,
        }
    }

    pub fn click_effect(&self) -> ClickEffect {
        match self {
            TargetKind::Normal | TargetKind::Mini => ClickEffect::Pop,
            TargetKind::Slime => ClickEffect::Split,
            TargetKind::Boss => ClickEffect::Damage,
        }
    }

    pub fn is_immune(&self) -> bool {
        *self == TargetKind::Boss
    }

    pub fn speed_scale(&self) -> f32 {
        if *self == TargetKind::Boss {
            BOSS_SPEED_SCALE
        } else {
            1.0
        }
    }
}

/// A clickable moving target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub kind: TargetKind,
    /// Top-left corner
    pub pos: Vec2,
    /// Displacement per tick
    pub vel: Vec2,
    pub size: f32,
    /// Degrees, [0, 360)
    pub rotation: f32,
    pub spawn_ms: u64,
    /// Boss only
    pub health: Option<u8>,
    pub immune: bool,
    /// Removal animation in progress (never reverts)
    pub popping: bool,
}

impl Target {
    pub fn new(id: u32, kind: TargetKind, pos: Vec2, vel: Vec2, spawn_ms: u64) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            size: kind.size(),
            rotation: 0.0,
            spawn_ms,
            health: (kind == TargetKind::Boss).then_some(BOSS_HEALTH),
            immune: kind.is_immune(),
            popping: false,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    /// Clickable and not yet on its way out
    pub fn is_active(&self) -> bool {
        !self.popping
    }

    pub fn advance_rotation(&mut self) {
        self.rotation = (self.rotation + ROTATION_STEP) % 360.0;
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.spawn_ms) > TARGET_LIFESPAN_MS
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    ExtraLife,
    TimeFreeze,
    DoublePoints,
    Skull,
    Lightning,
    LavaShield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 6] = [
        PowerUpKind::ExtraLife,
        PowerUpKind::TimeFreeze,
        PowerUpKind::DoublePoints,
        PowerUpKind::Skull,
        PowerUpKind::Lightning,
        PowerUpKind::LavaShield,
    ];
}

/// A temporary collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub spawn_ms: u64,
}

impl PowerUp {
    pub fn new(id: u32, kind: PowerUpKind, pos: Vec2, vel: Vec2, spawn_ms: u64) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            size: TARGET_SIZE,
            spawn_ms,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }
}

/// Cosmetic laser line drawn for every click
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaserTrail {
    pub from: Vec2,
    pub to: Vec2,
    pub fired_ms: u64,
}

impl LaserTrail {
    /// Remaining opacity (1 at fire time, 0 once faded)
    pub fn opacity(&self, now_ms: u64, fade_ms: u64) -> f32 {
        if fade_ms == 0 {
            return 0.0;
        }
        let elapsed = now_ms.saturating_sub(self.fired_ms) as f32;
        (1.0 - elapsed / fade_ms as f32).max(0.0)
    }
}

/// Cues for the render/audio layer, drained after every input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    TargetSpawned { id: u32, kind: TargetKind },
    TargetHit { id: u32, kind: TargetKind },
    SlimeSplit { id: u32 },
    BossDamaged { id: u32, health: u8 },
    TargetRemoved { id: u32, points: u64 },
    TargetsExpired { count: u32 },
    PowerUpCollected { kind: PowerUpKind },
    PowerUpExpired { id: u32 },
    FreezeEnded,
    Miss,
    GameOver { score: u64 },
}

/// Complete session state (single owned value, no globals)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub difficulty: Difficulty,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: i32,
    /// Consecutive successful hits
    pub combo: u32,
    pub boss_spawn_rate: f32,
    /// Panel size
    pub bounds: Vec2,
    /// Active targets (sorted by id)
    pub targets: Vec<Target>,
    /// Active power-ups (sorted by id)
    pub power_ups: Vec<PowerUp>,
    /// Time-freeze end, if one is active
    pub frozen_until_ms: Option<u64>,
    /// Freeze length applied by time-freeze pickups
    pub freeze_duration_ms: u64,
    /// Miss and expiry reset the combo as well
    pub combo_resets_on_life_loss: bool,
    pub laser: Option<LaserTrail>,
    pub cursor: Option<Vec2>,
    pub started_ms: u64,
    pub now_ms: u64,
    /// Pending deferred effects
    pub schedule: EventQueue,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

impl GameState {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            phase: GamePhase::NotStarted,
            score: 0,
            lives: difficulty.starting_lives(),
            combo: 0,
            boss_spawn_rate: BOSS_RATE_BASE,
            bounds: Vec2::new(DEFAULT_PANEL_WIDTH, DEFAULT_PANEL_HEIGHT),
            targets: Vec::new(),
            power_ups: Vec::new(),
            frozen_until_ms: None,
            freeze_duration_ms: DEFAULT_FREEZE_MS,
            combo_resets_on_life_loss: false,
            laser: None,
            cursor: None,
            started_ms: 0,
            now_ms: 0,
            schedule: EventQueue::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen_until_ms.is_some()
    }

    pub fn target(&self, id: u32) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn target_mut(&mut self, id: u32) -> Option<&mut Target> {
        self.targets.iter_mut().find(|t| t.id == id)
    }

    pub fn remove_target(&mut self, id: u32) -> Option<Target> {
        let idx = self.targets.iter().position(|t| t.id == id)?;
        Some(self.targets.remove(idx))
    }

    /// Restore counters and clear the world for `difficulty`
    pub fn reset_world(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.score = 0;
        self.lives = difficulty.starting_lives();
        self.combo = 0;
        self.boss_spawn_rate = BOSS_RATE_BASE;
        self.targets.clear();
        self.power_ups.clear();
        self.frozen_until_ms = None;
        self.laser = None;
        self.schedule.clear();
    }

    /// Deduct lives; ends the session (once) when they run out
    pub fn lose_lives(&mut self, count: i32) {
        if count <= 0 || !self.is_running() {
            return;
        }
        self.lives -= count;
        if self.combo_resets_on_life_loss {
            self.combo = 0;
        }
        if self.lives <= 0 {
            self.end_session();
        }
    }

    /// Transition to `Over`, cancelling every pending effect
    pub fn end_session(&mut self) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.phase = GamePhase::Over;
        self.schedule.clear();
        self.frozen_until_ms = None;
        log::info!("Game over: score {}", self.score);
        self.events.push(GameEvent::GameOver { score: self.score });
    }

    /// Ensure deterministic iteration order
    pub fn normalize_order(&mut self) {
        self.targets.sort_by_key(|t| t.id);
        self.power_ups.sort_by_key(|p| p.id);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_lives() {
        assert_eq!(Difficulty::Easy.starting_lives(), 10);
        assert_eq!(Difficulty::Normal.starting_lives(), 3);
        assert_eq!(Difficulty::Hard.starting_lives(), 1);
        assert_eq!(Difficulty::BonusMode.starting_lives(), 50);
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("bonus-mode"), Some(Difficulty::BonusMode));
        assert_eq!(Difficulty::from_str("insane"), None);
    }

    #[test]
    fn test_target_sizes_and_boss_fields() {
        let boss = Target::new(1, TargetKind::Boss, Vec2::ZERO, Vec2::ZERO, 0);
        assert_eq!(boss.size, TARGET_SIZE * 2.0);
        assert_eq!(boss.health, Some(BOSS_HEALTH));
        assert!(boss.immune);

        let slime = Target::new(2, TargetKind::Slime, Vec2::ZERO, Vec2::ZERO, 0);
        assert!((slime.size - 60.0).abs() < 1e-4);
        assert_eq!(slime.health, None);
        assert!(!slime.immune);
        assert_eq!(TargetKind::Mini.size(), 25.0);
    }

    #[test]
    fn test_rotation_wraps() {
        let mut t = Target::new(1, TargetKind::Normal, Vec2::ZERO, Vec2::ZERO, 0);
        t.rotation = 358.5;
        t.advance_rotation();
        assert!(t.rotation < 360.0);
        assert!((t.rotation - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_expiry_threshold() {
        let t = Target::new(1, TargetKind::Normal, Vec2::ZERO, Vec2::ZERO, 1_000);
        assert!(!t.is_expired(1_000 + TARGET_LIFESPAN_MS));
        assert!(t.is_expired(1_001 + TARGET_LIFESPAN_MS));
    }

    #[test]
    fn test_laser_fades() {
        let laser = LaserTrail {
            from: Vec2::ZERO,
            to: Vec2::ONE,
            fired_ms: 100,
        };
        assert_eq!(laser.opacity(100, 400), 1.0);
        assert!((laser.opacity(300, 400) - 0.5).abs() < 1e-4);
        assert_eq!(laser.opacity(600, 400), 0.0);
    }

    #[test]
    fn test_end_session_only_once() {
        let mut state = GameState::new(Difficulty::Hard);
        state.phase = GamePhase::Running;
        state.lose_lives(1);
        state.lose_lives(1);
        assert_eq!(state.phase, GamePhase::Over);
        let overs = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
    }
}
