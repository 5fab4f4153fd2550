//! Tunables for a round. Defaults reproduce the shipped game; the JS side may pass
//! a partial JSON object to override any of them.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::state::{Difficulty, PowerUpKind};

pub const SLOT_COUNT: usize = 9;
pub const BASE_DURATION_SECS: u32 = 30;
pub const COUNTDOWN_PERIOD_MS: f64 = 1000.0;
pub const HIT_DISPLAY_MS: f64 = 500.0;
pub const POWERUP_CHANCE: f64 = 0.1;
pub const EXTRA_TIME_BONUS_SECS: u32 = 5;
pub const SLOW_MOTION_FACTOR: f64 = 1.5;
pub const MAX_HIGH_SCORES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct DifficultySettings {
    pub target_cycle_interval_ms: f64,
    pub points_per_hit: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    pub easy: DifficultySettings,
    pub normal: DifficultySettings,
    pub hard: DifficultySettings,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultySettings {
                target_cycle_interval_ms: 1200.0,
                points_per_hit: 1,
            },
            normal: DifficultySettings {
                target_cycle_interval_ms: 800.0,
                points_per_hit: 2,
            },
            hard: DifficultySettings {
                target_cycle_interval_ms: 600.0,
                points_per_hit: 3,
            },
        }
    }
}

impl DifficultyTable {
    pub fn get(&self, difficulty: Difficulty) -> &DifficultySettings {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }
}

/// Effect lengths in milliseconds. Extra time is instantaneous and has none.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PowerUpDurations {
    pub double_points_ms: u32,
    pub slow_motion_ms: u32,
}

impl Default for PowerUpDurations {
    fn default() -> Self {
        Self {
            double_points_ms: 5000,
            slow_motion_ms: 5000,
        }
    }
}

impl PowerUpDurations {
    pub fn get(&self, kind: PowerUpKind) -> u32 {
        match kind {
            PowerUpKind::DoublePoints => self.double_points_ms,
            PowerUpKind::SlowMotion => self.slow_motion_ms,
            PowerUpKind::ExtraTime => 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub slot_count: usize,
    pub base_duration_secs: u32,
    pub hit_display_ms: f64,
    pub powerup_chance: f64,
    pub extra_time_bonus_secs: u32,
    pub slow_motion_factor: f64,
    pub max_high_scores: usize,
    pub difficulties: DifficultyTable,
    pub power_up_durations: PowerUpDurations,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            slot_count: SLOT_COUNT,
            base_duration_secs: BASE_DURATION_SECS,
            hit_display_ms: HIT_DISPLAY_MS,
            powerup_chance: POWERUP_CHANCE,
            extra_time_bonus_secs: EXTRA_TIME_BONUS_SECS,
            slow_motion_factor: SLOW_MOTION_FACTOR,
            max_high_scores: MAX_HIGH_SCORES,
            difficulties: DifficultyTable::default(),
            power_up_durations: PowerUpDurations::default(),
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON object over the defaults and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_count == 0 {
            return Err(ConfigError::NoSlots);
        }
        if self.base_duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if !(0.0..=1.0).contains(&self.powerup_chance) {
            return Err(ConfigError::PowerUpChance(self.powerup_chance));
        }
        // NaN fails this comparison as well.
        if !(self.slow_motion_factor >= 1.0) {
            return Err(ConfigError::SlowMotionFactor(self.slow_motion_factor));
        }
        if !(self.hit_display_ms > 0.0 && self.hit_display_ms.is_finite()) {
            return Err(ConfigError::HitDisplay(self.hit_display_ms));
        }
        if self.max_high_scores == 0 {
            return Err(ConfigError::NoHighScores);
        }
        for pair in Difficulty::ALL.windows(2) {
            let (easier, harder) = (pair[0], pair[1]);
            let e = self.difficulties.get(easier);
            let h = self.difficulties.get(harder);
            let faster = h.target_cycle_interval_ms > 0.0
                && h.target_cycle_interval_ms < e.target_cycle_interval_ms;
            if !faster || h.points_per_hit <= e.points_per_hit {
                return Err(ConfigError::DifficultyOrder {
                    easier: easier.as_str(),
                    harder: harder.as_str(),
                });
            }
        }
        Ok(())
    }

    pub fn settings(&self, difficulty: Difficulty) -> &DifficultySettings {
        self.difficulties.get(difficulty)
    }

    /// Period of the target-activation timer for the given round conditions.
    pub fn current_speed_ms(&self, difficulty: Difficulty, slow_motion: bool) -> f64 {
        let base = self.settings(difficulty).target_cycle_interval_ms;
        if slow_motion {
            base * self.slow_motion_factor
        } else {
            base
        }
    }
}
