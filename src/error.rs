//! Error types for the fallible plumbing around the engine.
//!
//! Gameplay itself never fails: a miss or an out-of-turn call is a no-op that
//! returns `false`. Only storage, stored-data decoding and configuration parsing
//! produce these errors.

use thiserror::Error;

/// Failure talking to the key-value store backing the scoreboard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage rejected write for key `{key}`: {reason}")]
    WriteRejected { key: String, reason: String },
    #[error("storage read failed for key `{key}`: {reason}")]
    ReadFailed { key: String, reason: String },
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("stored value under `{key}` is malformed")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode `{key}`")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid game config JSON")]
    Parse(#[from] serde_json::Error),
    #[error("slot_count must be at least 1")]
    NoSlots,
    #[error("base_duration_secs must be at least 1")]
    ZeroDuration,
    #[error("powerup_chance must lie in [0, 1], got {0}")]
    PowerUpChance(f64),
    #[error("slow_motion_factor must be >= 1, got {0}")]
    SlowMotionFactor(f64),
    #[error("hit_display_ms must be a positive number of milliseconds, got {0}")]
    HitDisplay(f64),
    #[error("max_high_scores must be at least 1")]
    NoHighScores,
    #[error("difficulty `{harder}` must cycle faster and pay more than `{easier}`")]
    DifficultyOrder {
        easier: &'static str,
        harder: &'static str,
    },
    #[error("unknown difficulty `{0}` (expected easy, normal or hard)")]
    UnknownDifficulty(String),
}
