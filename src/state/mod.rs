//! State management module
//! 
//! The bell's timer state machine, the interval selection and the shared
//! application state that drives them.

pub mod app_state;
pub mod interval;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, BellSnapshot};
pub use interval::{IntervalMinutes, QUICK_PRESETS};
pub use timer_state::{TimerPhase, TimerState};
