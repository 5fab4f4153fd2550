//! Whack-a-mole core crate.
//!
//! The round engine ([`Engine`]) is plain Rust and runs anywhere; it is advanced
//! by explicit millisecond timestamps. On `wasm32` the `web` module keeps one
//! engine per page, drives it from `requestAnimationFrame`, and persists the
//! scoreboard in `localStorage`. Rendering, sound and effects stay on
//! the JS side and read the engine through snapshots and the event feed.

pub mod config;
pub mod engine;
pub mod error;
pub mod scoreboard;
pub mod state;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{DifficultySettings, GameConfig};
pub use engine::Engine;
pub use error::{ConfigError, PersistenceError, StoreError};
pub use scoreboard::{MemoryStore, ScoreStore, Scoreboard};
pub use state::{
    ActivePowerUp, Difficulty, GameEvent, GameState, GameStats, HighScoreEntry, PowerUpKind,
    Snapshot,
};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;
