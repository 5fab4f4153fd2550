//! Plain data shared between the engine, the scoreboard and the JS side.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Temporary modifiers rolled on a successful hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerUpKind {
    DoublePoints,
    SlowMotion,
    /// Instantaneous: adds bonus seconds and never lingers as the active power-up.
    ExtraTime,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::DoublePoints,
        PowerUpKind::SlowMotion,
        PowerUpKind::ExtraTime,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub duration_ms: u32,
}

/// Per-round state. Only the engine mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub score: u32,
    pub time_left: u32,
    pub streak: u32,
    pub active_power_up: Option<ActivePowerUp>,
    pub difficulty: Difficulty,
}

impl GameState {
    pub fn fresh(difficulty: Difficulty, base_duration_secs: u32) -> Self {
        Self {
            score: 0,
            time_left: base_duration_secs,
            streak: 0,
            active_power_up: None,
            difficulty,
        }
    }

    pub fn power_up_is(&self, kind: PowerUpKind) -> bool {
        self.active_power_up.is_some_and(|p| p.kind == kind)
    }
}

/// One scoreboard row. Field names on disk follow the browser save format
/// (`name`, `score`, `date`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    #[serde(rename = "name")]
    pub player_name: String,
    pub score: u32,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
}

/// Lifetime aggregates. Every field only ever grows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub total_games: u32,
    pub total_score: u64,
    pub best_score: u32,
    pub longest_streak: u32,
}

impl GameStats {
    /// Fold one finished round into the aggregates.
    pub fn record(&mut self, final_score: u32, final_streak: u32) {
        self.total_games = self.total_games.saturating_add(1);
        self.total_score = self.total_score.saturating_add(final_score as u64);
        self.best_score = self.best_score.max(final_score);
        self.longest_streak = self.longest_streak.max(final_streak);
    }
}

/// Things that happened since presentation last drained the feed. Used for
/// one-off cues (sounds, vibration, confetti); the state itself is read directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    RoundStarted { difficulty: Difficulty },
    TargetActivated { slot: usize },
    Hit { slot: usize, points: u32 },
    HitCleared { slot: usize },
    PowerUpActivated { kind: PowerUpKind },
    PowerUpExpired { kind: PowerUpKind },
    RoundEnded { score: u32, streak: u32 },
}

/// Everything the presentation layer renders from, in one serializable value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub state: GameState,
    pub is_running: bool,
    pub active_slot: Option<usize>,
    pub hit_slot: Option<usize>,
    pub is_hit_showing: bool,
    pub slot_count: usize,
    pub high_scores: Vec<HighScoreEntry>,
    pub stats: GameStats,
}
