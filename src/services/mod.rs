//! External collaborator module
//! 
//! This module contains the audio player that sounds the chime.

pub mod audio;

// Re-export main items
pub use audio::{load_player, AudioError, AudioPlayer, TerminalBell};
