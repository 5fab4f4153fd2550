//! Browser glue: `localStorage` persistence, the frame loop, and the functions
//! the page calls.
//!
//! The engine lives in a thread-local cell. A `requestAnimationFrame` loop feeds
//! it `performance.now()` every frame, which is what runs the countdown, target
//! activation and the transient clears. Page code reads state with `snapshot()`
//! and `drain_events()` (both JSON strings) and reports taps with
//! `register_hit(slot)`.

use std::cell::RefCell;
use std::rc::Rc;

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Storage, window};

use crate::config::GameConfig;
use crate::engine::Engine;
use crate::error::StoreError;
use crate::scoreboard::ScoreStore;
use crate::state::Difficulty;

/// `window.localStorage`, or nothing when the browser refuses access (private
/// mode, sandboxed iframes). Without storage the scoreboard still works for the
/// session; writes fail and get logged.
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn open() -> Self {
        let storage = window().and_then(|w| w.local_storage().ok()).flatten();
        if storage.is_none() {
            warn!("localStorage unavailable; scores will not survive a reload");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StoreError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("localStorage".to_string()))
    }
}

impl ScoreStore for LocalStorageStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let Some(storage) = self.storage.as_ref() else {
            return Ok(None);
        };
        storage.get_item(key).map_err(|e| StoreError::ReadFailed {
            key: key.to_string(),
            reason: format!("{e:?}"),
        })
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::WriteRejected {
                key: key.to_string(),
                reason: format!("{e:?}"),
            })
    }
}

thread_local! {
    static GAME: RefCell<Option<Engine<LocalStorageStore>>> = const { RefCell::new(None) };
    static LOOP_RUNNING: RefCell<bool> = const { RefCell::new(false) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second init (hot reload) fails harmlessly.
    console_log::init_with_level(log::Level::Info).ok();
}

/// Create the engine (reading the saved scoreboard) and start the frame loop.
/// `config_json` may override any subset of the default tunables.
#[wasm_bindgen]
pub fn init_game(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(json) => GameConfig::from_json(&json),
        None => Ok(GameConfig::default()),
    }
    .map_err(to_js)?;
    let engine = Engine::new(config, LocalStorageStore::open()).map_err(to_js)?;
    GAME.with(|g| g.replace(Some(engine)));
    start_frame_loop();
    Ok(())
}

/// Start a round on `"easy" | "normal" | "hard"`. `false` when one is running.
#[wasm_bindgen]
pub fn start_round(difficulty: &str) -> Result<bool, JsValue> {
    let difficulty: Difficulty = difficulty.parse().map_err(to_js)?;
    let now = performance_now();
    with_engine(|e| e.start_round(difficulty, now))
}

#[wasm_bindgen]
pub fn register_hit(slot: usize) -> Result<bool, JsValue> {
    let now = performance_now();
    with_engine(|e| e.register_hit(slot, now))
}

#[wasm_bindgen]
pub fn set_player_name(name: String) -> Result<(), JsValue> {
    with_engine(|e| e.set_player_name(name))
}

/// Current state as JSON (see `Snapshot`).
#[wasm_bindgen]
pub fn snapshot() -> Result<String, JsValue> {
    with_engine(|e| serde_json::to_string(&e.snapshot()))?.map_err(to_js)
}

/// Events since the last call, as a JSON array.
#[wasm_bindgen]
pub fn drain_events() -> Result<String, JsValue> {
    with_engine(|e| serde_json::to_string(&e.drain_events()))?.map_err(to_js)
}

fn with_engine<T>(f: impl FnOnce(&mut Engine<LocalStorageStore>) -> T) -> Result<T, JsValue> {
    GAME.with(|g| {
        g.borrow_mut()
            .as_mut()
            .map(f)
            .ok_or_else(|| JsValue::from_str("init_game has not been called"))
    })
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn start_frame_loop() {
    if LOOP_RUNNING.with(|r| r.replace(true)) {
        return;
    }
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        GAME.with(|cell| {
            if let Some(engine) = cell.borrow_mut().as_mut() {
                engine.tick(ts);
            }
        });
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}

fn request_frame(cb: &FrameCallback) {
    if let (Some(w), Some(closure)) = (window(), cb.borrow().as_ref()) {
        let _ = w.request_animation_frame(closure.as_ref().unchecked_ref());
    }
}
