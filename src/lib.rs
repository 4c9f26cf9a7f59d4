//! Interval Bell - A state-managed interval timer that chimes on a fixed cycle
//! 
//! This library provides the bell's timer state machine, the single-slot chime
//! scheduler, the audio collaborator and an HTTP control surface.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{IntervalError, TransitionError};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
