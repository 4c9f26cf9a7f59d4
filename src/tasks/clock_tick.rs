//! Once-per-second wall clock refresh

use std::{sync::Arc, time::Duration};
use chrono::Local;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, trace};

use crate::{state::AppState, utils::display::format_clock};

/// Background task that samples the wall clock every second
pub async fn clock_tick_task(state: Arc<AppState>) {
    info!("Starting clock tick task");

    let mut interval = interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let now = Local::now();
        state.record_clock(now);
        trace!("Clock tick {}", format_clock(&now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::audio::testing::RecordingPlayer, state::IntervalMinutes};

    #[tokio::test(start_paused = true)]
    async fn tick_publishes_readings() {
        let state = Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            IntervalMinutes::default(),
            Arc::new(RecordingPlayer::default()),
        ));
        let mut rx = state.subscribe_clock();
        assert!(state.clock_reading().is_none());

        let handle = tokio::spawn(clock_tick_task(Arc::clone(&state)));
        rx.changed().await.unwrap();
        assert!(state.clock_reading().is_some());

        handle.abort();
    }
}
