//! High-score list and lifetime statistics, persisted through a key-value port.
//!
//! The browser build plugs `window.localStorage` in behind [`ScoreStore`]; tests
//! and native callers use [`MemoryStore`]. Stored data is read once when the
//! scoreboard is built and written after every finished round. Missing or
//! malformed payloads fall back to empty defaults and are only logged.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{PersistenceError, StoreError};
use crate::state::{GameStats, HighScoreEntry};

pub const HIGH_SCORES_KEY: &str = "highScores";
pub const GAME_STATS_KEY: &str = "gameStats";

/// Durable string key-value storage (the shape of `localStorage`).
pub trait ScoreStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }
}

impl ScoreStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct Scoreboard<S: ScoreStore> {
    store: S,
    high_scores: Vec<HighScoreEntry>,
    stats: GameStats,
    capacity: usize,
}

impl<S: ScoreStore> Scoreboard<S> {
    /// Load persisted scores and stats, substituting defaults for anything
    /// missing or unreadable.
    pub fn load(store: S, capacity: usize) -> Self {
        let mut high_scores: Vec<HighScoreEntry> =
            load_or_default(&store, HIGH_SCORES_KEY).unwrap_or_default();
        let stats: GameStats = load_or_default(&store, GAME_STATS_KEY).unwrap_or_default();
        sort_and_truncate(&mut high_scores, capacity);
        debug!(
            "scoreboard loaded: {} high scores, {} games played",
            high_scores.len(),
            stats.total_games
        );
        Self {
            store,
            high_scores,
            stats,
            capacity,
        }
    }

    pub fn high_scores(&self) -> &[HighScoreEntry] {
        &self.high_scores
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fold a finished round into the list and the aggregates, then persist both.
    /// Persistence is best-effort: a failed write is logged and the in-memory
    /// scoreboard stays updated.
    pub fn record_round(
        &mut self,
        player_name: &str,
        score: u32,
        streak: u32,
        timestamp: DateTime<Utc>,
    ) {
        self.high_scores.push(HighScoreEntry {
            player_name: player_name.to_string(),
            score,
            timestamp,
        });
        sort_and_truncate(&mut self.high_scores, self.capacity);
        self.stats.record(score, streak);

        if let Err(e) = self.flush() {
            warn!("could not persist scoreboard: {e}");
        }
    }

    fn flush(&mut self) -> Result<(), PersistenceError> {
        save(&mut self.store, HIGH_SCORES_KEY, &self.high_scores)?;
        save(&mut self.store, GAME_STATS_KEY, &self.stats)?;
        Ok(())
    }
}

/// Descending by score; ties keep insertion order, so an older entry stays
/// ahead of a newer one with the same score.
fn sort_and_truncate(entries: &mut Vec<HighScoreEntry>, capacity: usize) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(capacity);
}

fn load_or_default<T: DeserializeOwned>(store: &impl ScoreStore, key: &'static str) -> Option<T> {
    match load(store, key) {
        Ok(value) => value,
        Err(e) => {
            warn!("ignoring stored `{key}`, using defaults: {e}");
            None
        }
    }
}

fn load<T: DeserializeOwned>(
    store: &impl ScoreStore,
    key: &'static str,
) -> Result<Option<T>, PersistenceError> {
    let Some(raw) = store.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| PersistenceError::Malformed { key, source })
}

fn save<T: Serialize>(
    store: &mut impl ScoreStore,
    key: &'static str,
    value: &T,
) -> Result<(), PersistenceError> {
    let json =
        serde_json::to_string(value).map_err(|source| PersistenceError::Encode { key, source })?;
    store.write(key, &json)?;
    Ok(())
}
