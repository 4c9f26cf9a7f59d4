//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::state::IntervalMinutes;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "interval-bell")]
#[command(about = "An interval bell: a live clock and a chime every N minutes")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Initial interval selection in minutes
    #[arg(short, long, default_value = "15")]
    pub interval: IntervalMinutes,

    /// Sound file played on every chime
    #[arg(short, long, default_value = "ding.wav")]
    pub sound: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
