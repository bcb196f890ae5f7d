// File: src/timer.rs
use crate::core::types::Millis;
use std::time::{Duration, Instant};

/// A cancellable point in time. Polled, never slept on.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    due: Option<Instant>,
}

impl Deadline {
    /// Arms (or re-arms) the deadline `ms` after `now`, replacing any
    /// pending one so it cannot fire twice.
    pub fn arm(&mut self, now: Instant, ms: Millis) {
        self.due = Some(now + Duration::from_millis(ms));
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    pub fn expired(&self, now: Instant) -> bool {
        self.due.is_some_and(|due| now >= due)
    }

    /// Consumes an expired deadline; true at most once per arm.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.expired(now) {
            self.due = None;
            true
        } else {
            false
        }
    }

    pub fn remaining_ms(&self, now: Instant) -> Option<Millis> {
        self.due
            .map(|due| due.saturating_duration_since(now).as_millis() as Millis)
    }
}

/// The timers a front-end keeps for one round: the round clock, the turn
/// countdown, and the failed-submission cue.
#[derive(Debug, Clone, Copy)]
pub struct RoundClock {
    started: Instant,
    pub turn: Deadline,
    pub fail_cue: Deadline,
}

impl RoundClock {
    pub fn start(now: Instant, turn_budget_ms: Millis) -> Self {
        let mut turn = Deadline::default();
        turn.arm(now, turn_budget_ms);
        Self { started: now, turn, fail_cue: Deadline::default() }
    }

    pub fn elapsed_ms(&self, now: Instant) -> Millis {
        now.saturating_duration_since(self.started).as_millis() as Millis
    }

    pub fn cancel_all(&mut self) {
        self.turn.cancel();
        self.fail_cue.cancel();
    }
}
