//! Display helpers: pure formatting of clock readings and timer values

use std::{fmt::Display, time::Duration};

use chrono::{DateTime, TimeZone};

use crate::state::IntervalMinutes;

/// Format a wall-clock reading as `HH:MM:SS`
pub fn format_clock<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format("%H:%M:%S").to_string()
}

/// Wall-clock time of a chime `remaining` from `now`
pub fn chime_wall_time<Tz: TimeZone>(now: &DateTime<Tz>, remaining: Duration) -> Option<DateTime<Tz>> {
    let delta = chrono::Duration::from_std(remaining).ok()?;
    now.clone().checked_add_signed(delta)
}

/// Format a countdown as `MM:SS`, or `H:MM:SS` from one hour up
pub fn format_countdown(remaining: Duration) -> String {
    let total_secs = remaining.as_secs();
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

/// Label for the cycle indicator, e.g. `15m cycle`
pub fn cycle_label(cycle: IntervalMinutes) -> String {
    format!("{} cycle", cycle)
}
