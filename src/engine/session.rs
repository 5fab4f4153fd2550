//! Timers owned by one running round.
//!
//! Every timer is a deadline in the same millisecond timebase the caller feeds to
//! `Engine::tick` (`performance.now()` in the browser). Dropping the session
//! cancels all of them at once.

use crate::config::COUNTDOWN_PERIOD_MS;

/// Repeating timer. `next_due_ms` advances by whole periods so a late tick
/// catches up on every missed firing in order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Interval {
    period_ms: f64,
    next_due_ms: f64,
}

impl Interval {
    fn new(period_ms: f64, now: f64) -> Self {
        Self {
            period_ms,
            next_due_ms: now + period_ms,
        }
    }

    #[cfg(test)]
    pub(crate) fn period_ms(&self) -> f64 {
        self.period_ms
    }

    /// Restart from `now` with a new period (first firing one full period later).
    fn restart(&mut self, period_ms: f64, now: f64) {
        *self = Self::new(period_ms, now);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TimerKind {
    HitClear,
    PowerUpClear,
    Activation,
    Countdown,
}

/// A timer that has come due, stamped with the round it was scheduled in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DueTimer {
    pub kind: TimerKind,
    pub due_ms: f64,
    pub generation: u64,
}

#[derive(Debug)]
pub(crate) struct RoundSession {
    generation: u64,
    countdown: Interval,
    activation: Interval,
    hit_clear_ms: Option<f64>,
    power_up_clear_ms: Option<f64>,
}

impl RoundSession {
    pub(crate) fn new(generation: u64, now: f64, activation_period_ms: f64) -> Self {
        Self {
            generation,
            countdown: Interval::new(COUNTDOWN_PERIOD_MS, now),
            activation: Interval::new(activation_period_ms, now),
            hit_clear_ms: None,
            power_up_clear_ms: None,
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    #[cfg(test)]
    pub(crate) fn activation(&self) -> &Interval {
        &self.activation
    }

    pub(crate) fn restart_activation(&mut self, period_ms: f64, now: f64) {
        self.activation.restart(period_ms, now);
    }

    /// Replaces any pending hit-clear.
    pub(crate) fn schedule_hit_clear(&mut self, due_ms: f64) {
        self.hit_clear_ms = Some(due_ms);
    }

    /// Replaces any pending power-up clear.
    pub(crate) fn schedule_power_up_clear(&mut self, due_ms: f64) {
        self.power_up_clear_ms = Some(due_ms);
    }

    pub(crate) fn cancel_power_up_clear(&mut self) {
        self.power_up_clear_ms = None;
    }

    /// Earliest timer due at or before `now`. Equal deadlines resolve in
    /// `TimerKind` order, so clears run before a new target and the countdown
    /// always runs last.
    pub(crate) fn next_due(&self, now: f64) -> Option<DueTimer> {
        let candidates = [
            (TimerKind::HitClear, self.hit_clear_ms),
            (TimerKind::PowerUpClear, self.power_up_clear_ms),
            (TimerKind::Activation, Some(self.activation.next_due_ms)),
            (TimerKind::Countdown, Some(self.countdown.next_due_ms)),
        ];
        let mut best: Option<DueTimer> = None;
        for (kind, due) in candidates {
            let Some(due_ms) = due else { continue };
            if due_ms > now {
                continue;
            }
            if best.is_some_and(|b| b.due_ms <= due_ms) {
                continue;
            }
            best = Some(DueTimer {
                kind,
                due_ms,
                generation: self.generation,
            });
        }
        best
    }

    /// Mark a due timer as fired: one-shots are disarmed, intervals move on by
    /// one period.
    pub(crate) fn consume(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::HitClear => self.hit_clear_ms = None,
            TimerKind::PowerUpClear => self.power_up_clear_ms = None,
            TimerKind::Activation => {
                self.activation.next_due_ms += self.activation.period_ms;
            }
            TimerKind::Countdown => {
                self.countdown.next_due_ms += self.countdown.period_ms;
            }
        }
    }
}
