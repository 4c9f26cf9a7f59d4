//! Background tasks module
//! 
//! This module contains the chime scheduler and the clock tick task that run
//! alongside the HTTP server.

pub mod chime_scheduler;
pub mod clock_tick;

// Re-export main items
pub use chime_scheduler::ChimeScheduler;
pub use clock_tick::clock_tick_task;
