//! Session: the single update entry point
//!
//! Owns the simulation state, the seeded RNG and the music collaborator.
//! Every host stimulus becomes a `SessionInput` applied in order, so each
//! input sees the effects of all earlier ones.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::settings::Settings;
use crate::sim::collision::clamp_to_bounds;
use crate::sim::{
    self, Difficulty, GameEvent, GamePhase, GameState, PowerUp, Target, spawn,
};

/// Audio widget seen from the game: it is only told what to do
pub trait MusicPlayer {
    fn play(&mut self) -> anyhow::Result<()>;
    fn pause(&mut self) -> anyhow::Result<()>;
    /// Switch the background track (takes effect on the next `play`)
    fn select_track(&mut self, _index: usize, _source: &str) -> anyhow::Result<()> {
        Ok(())
    }

    /// Playback as the player itself last observed it, for players whose
    /// `play` can still fail after returning (browser autoplay policy).
    /// `None` means the player has no view of its own.
    fn is_playing(&self) -> Option<bool> {
        None
    }
}

/// Silent stand-in for hosts without audio
#[derive(Debug, Default)]
pub struct NullMusic;

impl MusicPlayer for NullMusic {
    fn play(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn pause(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Everything the host can tell the game
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionInput {
    Tick { now_ms: u64 },
    Click { x: f32, y: f32, now_ms: u64 },
    PointerMove { x: f32, y: f32 },
    Start(Difficulty),
    Reset,
    SelectDifficulty(Difficulty),
    SelectSong(usize),
    Resize { width: f32, height: f32 },
}

/// Laser line with its fade already applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LaserView {
    pub from: Vec2,
    pub to: Vec2,
    pub opacity: f32,
}

/// Read-only view for rendering
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub difficulty: Difficulty,
    pub score: u64,
    pub lives: i32,
    pub combo: u32,
    pub frozen: bool,
    /// Session time since start, held at its final value once over
    pub elapsed_ms: u64,
    pub width: f32,
    pub height: f32,
    pub targets: Vec<Target>,
    pub power_ups: Vec<PowerUp>,
    pub laser: Option<LaserView>,
    pub song: usize,
}

pub struct Session {
    state: GameState,
    rng: Pcg32,
    settings: Settings,
    music: Box<dyn MusicPlayer>,
    music_playing: bool,
    song: usize,
    /// Latest host timestamp, observed in every phase
    clock_ms: u64,
    events: Vec<GameEvent>,
}

impl Session {
    pub fn new(seed: u64, settings: Settings, music: Box<dyn MusicPlayer>) -> Self {
        let mut state = GameState::new(settings.difficulty);
        state.bounds = Vec2::new(settings.panel_width, settings.panel_height);
        state.freeze_duration_ms = settings.freeze_duration_ms;
        state.combo_resets_on_life_loss = settings.combo_resets_on_life_loss;
        Self {
            state,
            rng: Pcg32::seed_from_u64(seed),
            settings,
            music,
            music_playing: false,
            song: 0,
            clock_ms: 0,
            events: Vec::new(),
        }
    }

    /// Apply one input. Returns false when the request was rejected.
    pub fn apply(&mut self, input: SessionInput) -> bool {
        let accepted = match input {
            SessionInput::Tick { now_ms } => {
                self.observe(now_ms);
                sim::tick(&mut self.state, now_ms, &mut self.rng);
                true
            }
            SessionInput::Click { x, y, now_ms } => {
                self.observe(now_ms);
                sim::click(&mut self.state, Vec2::new(x, y), now_ms, &mut self.rng);
                true
            }
            SessionInput::PointerMove { x, y } => {
                self.state.cursor = Some(Vec2::new(x, y));
                true
            }
            SessionInput::Start(difficulty) => self.start(difficulty),
            SessionInput::Reset => {
                self.reset();
                true
            }
            SessionInput::SelectDifficulty(difficulty) => self.select_difficulty_inner(difficulty),
            SessionInput::SelectSong(index) => self.select_song_inner(index),
            SessionInput::Resize { width, height } => {
                self.resize_inner(width, height);
                true
            }
        };
        self.collect_events();
        accepted
    }

    pub fn on_tick(&mut self, now_ms: u64) {
        self.apply(SessionInput::Tick { now_ms });
    }

    pub fn on_click(&mut self, x: f32, y: f32, now_ms: u64) {
        self.apply(SessionInput::Click { x, y, now_ms });
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.apply(SessionInput::PointerMove { x, y });
    }

    pub fn start_session(&mut self, difficulty: Difficulty) -> bool {
        self.apply(SessionInput::Start(difficulty))
    }

    pub fn reset_session(&mut self) {
        self.apply(SessionInput::Reset);
    }

    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> bool {
        self.apply(SessionInput::SelectDifficulty(difficulty))
    }

    pub fn select_song(&mut self, index: usize) -> bool {
        self.apply(SessionInput::SelectSong(index))
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.apply(SessionInput::Resize { width, height });
    }

    /// Current state for rendering, with the laser fade resolved at `now_ms`
    pub fn snapshot(&self, now_ms: u64) -> Snapshot {
        let state = &self.state;
        let laser = state.laser.and_then(|laser| {
            let opacity = laser.opacity(now_ms, self.settings.laser_fade_ms);
            (opacity > 0.0).then_some(LaserView {
                from: laser.from,
                to: laser.to,
                opacity,
            })
        });
        let elapsed_ms = match state.phase {
            GamePhase::NotStarted => 0,
            GamePhase::Running | GamePhase::Over => state.now_ms.saturating_sub(state.started_ms),
        };
        Snapshot {
            phase: state.phase,
            difficulty: state.difficulty,
            score: state.score,
            lives: state.lives,
            combo: state.combo,
            frozen: state.is_frozen(),
            elapsed_ms,
            width: state.bounds.x,
            height: state.bounds.y,
            targets: state.targets.clone(),
            power_ups: state.power_ups.clone(),
            laser,
            song: self.song,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for staging scenarios in tests; bypasses `apply`
    #[doc(hidden)]
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_music_playing(&self) -> bool {
        self.music_playing && self.music.is_playing().unwrap_or(true)
    }

    /// Events produced since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn observe(&mut self, now_ms: u64) {
        self.clock_ms = self.clock_ms.max(now_ms);
    }

    fn start(&mut self, difficulty: Difficulty) -> bool {
        if self.state.is_running() {
            log::warn!("Ignoring start: a session is already running");
            return false;
        }
        self.state.reset_world(difficulty);
        self.state.now_ms = self.clock_ms;
        self.state.started_ms = self.clock_ms;
        self.state.phase = GamePhase::Running;
        spawn::schedule_spawners(&mut self.state);
        log::info!(
            "Session started on {} with {} lives",
            difficulty.as_str(),
            self.state.lives
        );
        self.play_music();
        true
    }

    fn reset(&mut self) {
        let difficulty = self.state.difficulty;
        self.state.reset_world(difficulty);
        self.state.phase = GamePhase::NotStarted;
        self.state.events.clear();
        log::info!("Session reset");
        if self.music_playing {
            self.pause_music();
        }
    }

    fn select_difficulty_inner(&mut self, difficulty: Difficulty) -> bool {
        if self.state.phase != GamePhase::NotStarted {
            log::warn!("Difficulty can only change before a session starts");
            return false;
        }
        self.state.difficulty = difficulty;
        self.state.lives = difficulty.starting_lives();
        true
    }

    fn select_song_inner(&mut self, index: usize) -> bool {
        let Some(source) = self.settings.songs.get(index).cloned() else {
            log::warn!("No song at index {}", index);
            return false;
        };
        self.song = index;
        if let Err(err) = self.music.select_track(index, &source) {
            log::warn!("Failed to select track {}: {:#}", source, err);
        }
        if self.music_playing {
            // Song change while playing restarts playback on the new track
            self.pause_music();
            self.play_music();
        }
        true
    }

    fn resize_inner(&mut self, width: f32, height: f32) {
        let bounds = Vec2::new(width.max(0.0), height.max(0.0));
        self.state.bounds = bounds;
        for target in self.state.targets.iter_mut() {
            target.pos = clamp_to_bounds(target.pos, target.size, bounds);
        }
        for power_up in self.state.power_ups.iter_mut() {
            power_up.pos = clamp_to_bounds(power_up.pos, power_up.size, bounds);
        }
    }

    fn collect_events(&mut self) {
        let events = self.state.drain_events();
        if self.music_playing && events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })) {
            self.pause_music();
        }
        self.events.extend(events);
    }

    fn play_music(&mut self) {
        match self.music.play() {
            Ok(()) => self.music_playing = true,
            Err(err) => log::warn!("Music failed to start: {:#}", err),
        }
    }

    fn pause_music(&mut self) {
        if let Err(err) = self.music.pause() {
            log::warn!("Music failed to pause: {:#}", err);
        }
        self.music_playing = false;
    }
}
