//! The round engine: countdown, target activation, hit scoring and power-ups.
//!
//! The engine never reads a clock on its own. The caller passes the current time
//! in milliseconds to every operation (`performance.now()` from the frame loop in
//! the browser, plain numbers in tests) and `tick` fires whatever timers have come
//! due since the last call. All timers of a round live in one [`RoundSession`];
//! ending the round drops it, so nothing scheduled for an old round can touch a
//! new one.

mod session;

use chrono::Utc;
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::scoreboard::{ScoreStore, Scoreboard};
use crate::state::{
    ActivePowerUp, Difficulty, GameEvent, GameState, GameStats, HighScoreEntry, PowerUpKind,
    Snapshot,
};
use session::{DueTimer, RoundSession, TimerKind};

pub struct Engine<S: ScoreStore> {
    config: GameConfig,
    state: GameState,
    session: Option<RoundSession>,
    generation: u64,
    active_slot: Option<usize>,
    hit_slot: Option<usize>,
    player_name: String,
    scoreboard: Scoreboard<S>,
    rng: SmallRng,
    events: Vec<GameEvent>,
}

impl<S: ScoreStore> Engine<S> {
    /// Build an engine with an entropy-seeded RNG. Reads the scoreboard from
    /// `store` once.
    pub fn new(config: GameConfig, store: S) -> Result<Self, ConfigError> {
        Self::with_rng(config, store, SmallRng::from_entropy())
    }

    /// Deterministic target and power-up rolls, for tests and replays.
    pub fn with_seed(config: GameConfig, store: S, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, store, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, store: S, rng: SmallRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let scoreboard = Scoreboard::load(store, config.max_high_scores);
        Ok(Self {
            state: GameState::fresh(Difficulty::default(), config.base_duration_secs),
            config,
            session: None,
            generation: 0,
            active_slot: None,
            hit_slot: None,
            player_name: String::new(),
            scoreboard,
            rng,
            events: Vec::new(),
        })
    }

    // --- Observable state -------------------------------------------------

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn active_slot(&self) -> Option<usize> {
        self.active_slot
    }

    pub fn hit_slot(&self) -> Option<usize> {
        self.hit_slot
    }

    pub fn high_scores(&self) -> &[HighScoreEntry] {
        self.scoreboard.high_scores()
    }

    pub fn stats(&self) -> &GameStats {
        self.scoreboard.stats()
    }

    pub fn scoreboard(&self) -> &Scoreboard<S> {
        &self.scoreboard
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = name.into();
    }

    /// Period of the target-activation timer under the current round conditions.
    pub fn current_speed_ms(&self) -> f64 {
        self.config.current_speed_ms(
            self.state.difficulty,
            self.state.power_up_is(PowerUpKind::SlowMotion),
        )
    }

    /// Take every event recorded since the previous drain. Events nobody drained
    /// are dropped when the next round starts.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            is_running: self.is_running(),
            active_slot: self.active_slot,
            hit_slot: self.hit_slot,
            is_hit_showing: self.hit_slot.is_some(),
            slot_count: self.config.slot_count,
            high_scores: self.high_scores().to_vec(),
            stats: *self.stats(),
        }
    }

    // --- Operations -------------------------------------------------------

    /// Begin a round. Only valid while idle; returns `false` otherwise.
    pub fn start_round(&mut self, difficulty: Difficulty, now_ms: f64) -> bool {
        if self.is_running() {
            debug!("start_round ignored: a round is already running");
            return false;
        }
        self.state = GameState::fresh(difficulty, self.config.base_duration_secs);
        self.events.clear();
        self.active_slot = None;
        self.hit_slot = None;
        self.generation += 1;
        self.session = Some(RoundSession::new(
            self.generation,
            now_ms,
            self.current_speed_ms(),
        ));
        info!(
            "round {} started on {difficulty} ({}s)",
            self.generation, self.state.time_left
        );
        self.events.push(GameEvent::RoundStarted { difficulty });
        true
    }

    /// Try to hit `slot`. Anything other than the active slot of a running
    /// round is a miss and changes nothing.
    pub fn register_hit(&mut self, slot: usize, now_ms: f64) -> bool {
        self.tick(now_ms);
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if self.active_slot != Some(slot) {
            return false;
        }

        let mut points = self.config.settings(self.state.difficulty).points_per_hit;
        if self.state.power_up_is(PowerUpKind::DoublePoints) {
            points *= 2;
        }
        self.state.score = self.state.score.saturating_add(points);
        self.state.streak = self.state.streak.saturating_add(1);

        self.hit_slot = Some(slot);
        self.active_slot = None;
        session.schedule_hit_clear(now_ms + self.config.hit_display_ms);
        debug!(
            "hit slot {slot} for {points} (score {}, streak {})",
            self.state.score, self.state.streak
        );
        self.events.push(GameEvent::Hit { slot, points });

        if self.rng.gen_bool(self.config.powerup_chance) {
            let kind = PowerUpKind::ALL[self.rng.gen_range(0..PowerUpKind::ALL.len())];
            self.activate_power_up(kind, now_ms);
        }
        true
    }

    /// Apply a power-up, replacing whichever one is active. Returns `false`
    /// when no round is running.
    pub fn activate_power_up(&mut self, kind: PowerUpKind, now_ms: f64) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let next = match kind {
            PowerUpKind::ExtraTime => {
                self.state.time_left = self
                    .state
                    .time_left
                    .saturating_add(self.config.extra_time_bonus_secs);
                session.cancel_power_up_clear();
                None
            }
            PowerUpKind::DoublePoints | PowerUpKind::SlowMotion => {
                let duration_ms = self.config.power_up_durations.get(kind);
                session.schedule_power_up_clear(now_ms + duration_ms as f64);
                Some(ActivePowerUp { kind, duration_ms })
            }
        };
        debug!("power-up {kind:?} activated");
        self.replace_power_up(next, now_ms);
        self.events.push(GameEvent::PowerUpActivated { kind });
        true
    }

    /// Fire every timer due at or before `now_ms`, earliest first.
    pub fn tick(&mut self, now_ms: f64) {
        while let Some(due) = self.session.as_ref().and_then(|s| s.next_due(now_ms)) {
            self.fire(due);
        }
    }

    // --- Timer handlers ---------------------------------------------------

    fn fire(&mut self, due: DueTimer) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.generation() != due.generation {
            return;
        }
        session.consume(due.kind);

        match due.kind {
            TimerKind::Countdown => self.count_down(),
            TimerKind::Activation => self.activate_target(),
            TimerKind::HitClear => {
                if let Some(slot) = self.hit_slot.take() {
                    self.events.push(GameEvent::HitCleared { slot });
                }
            }
            TimerKind::PowerUpClear => {
                if let Some(expired) = self.state.active_power_up {
                    self.replace_power_up(None, due.due_ms);
                    debug!("power-up {:?} expired", expired.kind);
                    self.events.push(GameEvent::PowerUpExpired { kind: expired.kind });
                }
            }
        }
    }

    fn count_down(&mut self) {
        if self.state.time_left <= 1 {
            self.state.time_left = 0;
            self.end_round();
        } else {
            self.state.time_left -= 1;
        }
    }

    fn activate_target(&mut self) {
        let slot = self.rng.gen_range(0..self.config.slot_count);
        self.active_slot = Some(slot);
        self.events.push(GameEvent::TargetActivated { slot });
    }

    /// Swap the active power-up; a change of kind changes the activation speed
    /// inputs, so the activation timer restarts from `now_ms`.
    fn replace_power_up(&mut self, next: Option<ActivePowerUp>, now_ms: f64) {
        let before = self.state.active_power_up.map(|p| p.kind);
        self.state.active_power_up = next;
        if before != next.map(|p| p.kind) {
            let speed = self.current_speed_ms();
            if let Some(session) = self.session.as_mut() {
                session.restart_activation(speed, now_ms);
            }
        }
    }

    /// Leave `Running`: drop every timer of the round in one go, then record the
    /// result. Runs once per round because the session is gone afterwards.
    fn end_round(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.active_slot = None;
        self.hit_slot = None;
        self.state.active_power_up = None;

        let (score, streak) = (self.state.score, self.state.streak);
        info!(
            "round {} over: score {score}, streak {streak}",
            session.generation()
        );
        self.scoreboard
            .record_round(&self.player_name, score, streak, Utc::now());
        self.events.push(GameEvent::RoundEnded { score, streak });
    }
}
