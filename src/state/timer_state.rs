//! Bell timer state machine
//!
//! Pure transition logic with the current instant passed in. Scheduling the
//! chime is left to the caller: every transition returns the delay after which
//! the next chime is due, or nothing when no chime should be pending.

use std::{fmt, time::Duration};

use serde::Serialize;
use tokio::time::Instant;

use super::IntervalMinutes;
use crate::error::TransitionError;

/// Name of the current state, without its associated data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Timer state with the data valid in each phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running {
        active_cycle: IntervalMinutes,
        next_fire_at: Instant,
    },
    Paused {
        active_cycle: IntervalMinutes,
        /// Time left until the chime, captured when pausing
        remaining: Option<Duration>,
    },
}

impl TimerState {
    pub fn phase(&self) -> TimerPhase {
        match self {
            TimerState::Idle => TimerPhase::Idle,
            TimerState::Running { .. } => TimerPhase::Running,
            TimerState::Paused { .. } => TimerPhase::Paused,
        }
    }

    /// Lock in `interval` as the active cycle and return the delay to the first chime
    pub fn start(&mut self, interval: IntervalMinutes, now: Instant) -> Result<Duration, TransitionError> {
        if !matches!(self, TimerState::Idle) {
            return Err(TransitionError::NotIdle(self.phase()));
        }
        let delay = interval.cycle();
        *self = TimerState::Running {
            active_cycle: interval,
            next_fire_at: now + delay,
        };
        Ok(delay)
    }

    /// Capture the remaining time and return it. Overdue chimes clamp to zero.
    pub fn pause(&mut self, now: Instant) -> Result<Duration, TransitionError> {
        let TimerState::Running { active_cycle, next_fire_at } = *self else {
            return Err(TransitionError::NotRunning(self.phase()));
        };
        let remaining = next_fire_at.saturating_duration_since(now);
        *self = TimerState::Paused {
            active_cycle,
            remaining: Some(remaining),
        };
        Ok(remaining)
    }

    /// Continue from the captured remaining time and return the delay to the next chime
    pub fn resume(&mut self, now: Instant) -> Result<Duration, TransitionError> {
        let TimerState::Paused { active_cycle, remaining } = *self else {
            return Err(TransitionError::NotPaused(self.phase()));
        };
        let delay = remaining.unwrap_or_else(|| active_cycle.cycle());
        *self = TimerState::Running {
            active_cycle,
            next_fire_at: now + delay,
        };
        Ok(delay)
    }

    /// Return to idle, clearing the active cycle. Yields the phase that was left.
    pub fn stop(&mut self) -> Result<TimerPhase, TransitionError> {
        let previous = self.phase();
        if previous == TimerPhase::Idle {
            return Err(TransitionError::AlreadyIdle);
        }
        *self = TimerState::Idle;
        Ok(previous)
    }

    /// Chime fired: start a fresh full cycle from `now`.
    ///
    /// Returns `None` when not running, in which case the fire is stale.
    pub fn fire(&mut self, now: Instant) -> Option<Duration> {
        let TimerState::Running { active_cycle, .. } = *self else {
            return None;
        };
        let delay = active_cycle.cycle();
        *self = TimerState::Running {
            active_cycle,
            next_fire_at: now + delay,
        };
        Some(delay)
    }

    /// Cycle governing the running or paused timer
    pub fn active_cycle(&self) -> Option<IntervalMinutes> {
        match *self {
            TimerState::Idle => None,
            TimerState::Running { active_cycle, .. } | TimerState::Paused { active_cycle, .. } => {
                Some(active_cycle)
            }
        }
    }

    pub fn next_fire_at(&self) -> Option<Instant> {
        match *self {
            TimerState::Running { next_fire_at, .. } => Some(next_fire_at),
            _ => None,
        }
    }

    /// Time left until the next chime as seen at `now`
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match *self {
            TimerState::Idle => None,
            TimerState::Running { next_fire_at, .. } => Some(next_fire_at.saturating_duration_since(now)),
            TimerState::Paused { active_cycle, remaining } => {
                Some(remaining.unwrap_or_else(|| active_cycle.cycle()))
            }
        }
    }

    /// Percentage of the current cycle already elapsed, in `[0, 100]`
    pub fn progress(&self, now: Instant) -> f64 {
        match (self.remaining(now), self.active_cycle()) {
            (Some(remaining), Some(cycle)) => progress_percent(remaining, cycle.cycle()),
            _ => 0.0,
        }
    }
}

/// `100 × (1 − remaining / total)`, clamped to `[0, 100]`
pub fn progress_percent(remaining: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    let elapsed = 1.0 - remaining.as_secs_f64() / total.as_secs_f64();
    (elapsed * 100.0).clamp(0.0, 100.0)
}
