//! Interval selection: validated minutes and the quick presets

use std::{fmt, num::NonZeroU32, str::FromStr, time::Duration};

use crate::error::IntervalError;

/// Quick-select preset values in minutes
pub const QUICK_PRESETS: [u32; 8] = [5, 10, 15, 20, 30, 60, 90, 120];

/// Upper bound for a single cycle (one week)
pub const MAX_INTERVAL_MINUTES: u32 = 7 * 24 * 60;

const DEFAULT_MINUTES: NonZeroU32 = match NonZeroU32::new(15) {
    Some(minutes) => minutes,
    None => panic!("default interval must be non-zero"),
};

/// A positive whole number of minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntervalMinutes(NonZeroU32);

impl IntervalMinutes {
    /// Validate a raw minute count
    pub fn new(minutes: i64) -> Result<Self, IntervalError> {
        if minutes < 1 {
            return Err(IntervalError::NotPositive(minutes));
        }
        if minutes > i64::from(MAX_INTERVAL_MINUTES) {
            return Err(IntervalError::TooLong {
                got: minutes,
                max: MAX_INTERVAL_MINUTES,
            });
        }
        // Bounds checked above
        let value = NonZeroU32::new(minutes as u32).ok_or(IntervalError::NotPositive(minutes))?;
        Ok(Self(value))
    }

    /// Look up one of the quick presets
    pub fn preset(minutes: u32) -> Result<Self, IntervalError> {
        if !QUICK_PRESETS.contains(&minutes) {
            return Err(IntervalError::UnknownPreset(minutes));
        }
        Self::new(i64::from(minutes))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Length of one full cycle
    pub fn cycle(self) -> Duration {
        Duration::from_secs(u64::from(self.get()) * 60)
    }

    pub fn is_preset(self) -> bool {
        QUICK_PRESETS.contains(&self.get())
    }
}

impl Default for IntervalMinutes {
    fn default() -> Self {
        Self(DEFAULT_MINUTES)
    }
}

impl FromStr for IntervalMinutes {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let minutes: i64 = s
            .trim()
            .parse()
            .map_err(|_| IntervalError::NotNumeric(s.to_string()))?;
        Self::new(minutes)
    }
}

impl fmt::Display for IntervalMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.get())
    }
}
