//! Error types for the bell controller and its input boundary

use thiserror::Error;

use crate::state::TimerPhase;

/// A control action was invoked in a state that does not allow it.
///
/// Rejections never change state; the HTTP layer reports them as conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot start: timer is {0}")]
    NotIdle(TimerPhase),
    #[error("cannot pause: timer is {0}")]
    NotRunning(TimerPhase),
    #[error("cannot resume: timer is {0}")]
    NotPaused(TimerPhase),
    #[error("cannot stop: timer is already idle")]
    AlreadyIdle,
}

/// Interval input rejected at the boundary, before it reaches the state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("interval must be a positive number of minutes, got {0}")]
    NotPositive(i64),
    #[error("interval must be at most {max} minutes, got {got}")]
    TooLong { got: i64, max: u32 },
    #[error("interval is not a whole number of minutes: {0:?}")]
    NotNumeric(String),
    #[error("{0} minutes is not a quick preset")]
    UnknownPreset(u32),
}
