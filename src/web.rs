//! Browser bindings
//!
//! The page owns the canvas, the timers and the DOM chrome. It forwards
//! ticks, clicks and pointer moves here and draws whatever `snapshot_json`
//! returns.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

use crate::session::{MusicPlayer, NullMusic, Session};
use crate::settings::Settings;
use crate::sim::Difficulty;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Target Practice starting...");
}

fn js_error(err: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{:?}", err)
}

/// Background music through a looping `<audio>` element
pub struct HtmlAudioMusic {
    audio: HtmlAudioElement,
    /// Cleared when the browser refuses the latest `play()`
    playing: Rc<Cell<bool>>,
    /// Bumped on every play/pause so a stale rejection is ignored
    attempt: Rc<Cell<u32>>,
}

impl HtmlAudioMusic {
    pub fn new(source: &str, volume: f32) -> anyhow::Result<Self> {
        let audio = HtmlAudioElement::new_with_src(source).map_err(js_error)?;
        audio.set_loop(true);
        audio.set_volume(volume.clamp(0.0, 1.0) as f64);
        Ok(Self {
            audio,
            playing: Rc::new(Cell::new(false)),
            attempt: Rc::new(Cell::new(0)),
        })
    }

    fn next_attempt(&self) -> u32 {
        let attempt = self.attempt.get().wrapping_add(1);
        self.attempt.set(attempt);
        attempt
    }
}

impl MusicPlayer for HtmlAudioMusic {
    fn play(&mut self) -> anyhow::Result<()> {
        let promise = self.audio.play().map_err(js_error)?;
        let attempt = self.next_attempt();
        self.playing.set(true);

        // Autoplay refusal and load errors arrive as a rejected promise
        let playing = Rc::clone(&self.playing);
        let latest = Rc::clone(&self.attempt);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                log::warn!("Music playback refused: {:?}", err);
                if latest.get() == attempt {
                    playing.set(false);
                }
            }
        });
        Ok(())
    }

    fn pause(&mut self) -> anyhow::Result<()> {
        self.next_attempt();
        self.playing.set(false);
        self.audio.pause().map_err(js_error)
    }

    fn select_track(&mut self, _index: usize, source: &str) -> anyhow::Result<()> {
        self.audio.set_src(source);
        Ok(())
    }

    fn is_playing(&self) -> Option<bool> {
        Some(self.playing.get())
    }
}

fn parse_difficulty(name: &str) -> Option<Difficulty> {
    let difficulty = Difficulty::from_str(name);
    if difficulty.is_none() {
        log::warn!("Unknown difficulty {:?}", name);
    }
    difficulty
}

fn to_ms(now: f64) -> u64 {
    if now.is_finite() && now > 0.0 { now as u64 } else { 0 }
}

#[wasm_bindgen]
pub struct WebGame {
    session: Session,
}

#[wasm_bindgen]
impl WebGame {
    /// Create a game from optional JSON settings
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> WebGame {
        let settings = match settings_json.as_deref().map(Settings::from_json) {
            Some(Ok(settings)) => settings,
            Some(Err(err)) => {
                log::warn!("Invalid settings, using defaults: {}", err);
                Settings::default()
            }
            None => Settings::default(),
        };

        let music: Box<dyn MusicPlayer> = match settings.songs.first() {
            Some(source) => match HtmlAudioMusic::new(source, settings.music_volume) {
                Ok(music) => Box::new(music),
                Err(err) => {
                    log::warn!("Music unavailable: {:#}", err);
                    Box::new(NullMusic)
                }
            },
            None => Box::new(NullMusic),
        };

        let seed = js_sys::Date::now() as u64;
        WebGame {
            session: Session::new(seed, settings, music),
        }
    }

    pub fn tick(&mut self, now_ms: f64) {
        self.session.on_tick(to_ms(now_ms));
    }

    pub fn click(&mut self, x: f32, y: f32, now_ms: f64) {
        self.session.on_click(x, y, to_ms(now_ms));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.session.on_pointer_move(x, y);
    }

    pub fn start(&mut self, difficulty: &str) -> bool {
        parse_difficulty(difficulty).is_some_and(|d| self.session.start_session(d))
    }

    pub fn reset(&mut self) {
        self.session.reset_session();
    }

    pub fn select_difficulty(&mut self, difficulty: &str) -> bool {
        parse_difficulty(difficulty).is_some_and(|d| self.session.select_difficulty(d))
    }

    pub fn select_song(&mut self, index: usize) -> bool {
        self.session.select_song(index)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.session.resize(width, height);
    }

    /// False once the browser has refused playback (e.g. autoplay policy)
    pub fn music_playing(&self) -> bool {
        self.session.is_music_playing()
    }

    /// Render state as JSON
    pub fn snapshot_json(&self, now_ms: f64) -> String {
        serde_json::to_string(&self.session.snapshot(to_ms(now_ms))).unwrap_or_default()
    }

    /// Game events since the last call, as a JSON array
    pub fn events_json(&mut self) -> String {
        serde_json::to_string(&self.session.take_events()).unwrap_or_default()
    }
}
