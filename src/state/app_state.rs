//! Bell controller shared by the HTTP handlers and background tasks

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use chrono::{DateTime, Local, Utc};
use tokio::{sync::watch, time::Instant};
use tracing::{debug, info};

use super::{IntervalMinutes, TimerPhase, TimerState};
use crate::{
    error::{IntervalError, TransitionError},
    services::AudioPlayer,
    tasks::ChimeScheduler,
};

/// Timer state, interval selection and the pending chime, guarded together
/// so every transition and its scheduling happen in one critical section
#[derive(Debug)]
struct Controller {
    timer: TimerState,
    selected: IntervalMinutes,
    scheduler: ChimeScheduler,
    chimes: u64,
}

/// Point-in-time view of the bell, taken under the controller lock
#[derive(Debug, Clone, PartialEq)]
pub struct BellSnapshot {
    pub timer: TimerState,
    /// Editable interval selection (not necessarily the active cycle)
    pub selected: IntervalMinutes,
    pub remaining: Option<Duration>,
    pub progress: f64,
    /// Chimes played since the process started
    pub chimes: u64,
    pub chime_pending: bool,
    pub taken_at: Instant,
}

impl BellSnapshot {
    pub fn phase(&self) -> TimerPhase {
        self.timer.phase()
    }

    pub fn active_cycle(&self) -> Option<IntervalMinutes> {
        self.timer.active_cycle()
    }

    /// The cycle a display should show: the active one, or the selection when idle
    pub fn displayed_cycle(&self) -> IntervalMinutes {
        self.active_cycle().unwrap_or(self.selected)
    }
}

/// Main application state: the bell controller plus server metadata
pub struct AppState {
    controller: Mutex<Controller>,
    audio: Arc<dyn AudioPlayer>,
    /// Latest wall-clock reading from the tick task; `None` until the first tick
    clock_tx: watch::Sender<Option<DateTime<Local>>>,
    /// Server metadata
    pub start_time: std::time::Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Create an idle bell with `interval` preselected
    pub fn new(port: u16, host: String, interval: IntervalMinutes, audio: Arc<dyn AudioPlayer>) -> Self {
        let (clock_tx, _) = watch::channel(None);

        Self {
            controller: Mutex::new(Controller {
                timer: TimerState::Idle,
                selected: interval,
                scheduler: ChimeScheduler::new(),
                chimes: 0,
            }),
            audio,
            clock_tx,
            start_time: std::time::Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Controller> {
        self.controller.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start with the current interval selection
    pub fn start(self: &Arc<Self>) -> Result<BellSnapshot, TransitionError> {
        let selected = self.lock().selected;
        self.start_with(selected)
    }

    /// Lock in `interval` as the active cycle and schedule the first chime
    pub fn start_with(self: &Arc<Self>, interval: IntervalMinutes) -> Result<BellSnapshot, TransitionError> {
        let mut ctl = self.lock();
        ctl.timer.start(interval, Instant::now())?;
        self.schedule_chime(&mut ctl);
        info!("Timer started with a {} cycle", interval);
        let snapshot = Self::snapshot_of(&ctl);
        drop(ctl);

        self.record_action("start");
        Ok(snapshot)
    }

    /// Pause, keeping the time left until the next chime
    pub fn pause(&self) -> Result<BellSnapshot, TransitionError> {
        let mut ctl = self.lock();
        let remaining = ctl.timer.pause(Instant::now())?;
        ctl.scheduler.cancel();
        info!("Timer paused with {:?} remaining", remaining);
        let snapshot = Self::snapshot_of(&ctl);
        drop(ctl);

        self.record_action("pause");
        Ok(snapshot)
    }

    /// Resume from the remaining time captured at pause
    pub fn resume(self: &Arc<Self>) -> Result<BellSnapshot, TransitionError> {
        let mut ctl = self.lock();
        let delay = ctl.timer.resume(Instant::now())?;
        self.schedule_chime(&mut ctl);
        info!("Timer resumed, next chime in {:?}", delay);
        let snapshot = Self::snapshot_of(&ctl);
        drop(ctl);

        self.record_action("resume");
        Ok(snapshot)
    }

    /// Cancel any pending chime and return to idle
    pub fn stop(&self) -> Result<BellSnapshot, TransitionError> {
        let mut ctl = self.lock();
        ctl.scheduler.cancel();
        let previous = ctl.timer.stop()?;
        info!("Timer stopped (was {})", previous);
        let snapshot = Self::snapshot_of(&ctl);
        drop(ctl);

        self.record_action("stop");
        Ok(snapshot)
    }

    /// Change the interval selection. A running or paused timer keeps its cycle.
    pub fn set_interval(&self, interval: IntervalMinutes) -> BellSnapshot {
        let mut ctl = self.lock();
        ctl.selected = interval;
        match ctl.timer.active_cycle() {
            Some(active) if active != interval => {
                info!("Interval set to {}, active {} cycle applies until the next start", interval, active)
            }
            _ => info!("Interval set to {}", interval),
        }
        let snapshot = Self::snapshot_of(&ctl);
        drop(ctl);

        self.record_action("interval");
        snapshot
    }

    /// Select one of the quick presets
    pub fn select_preset(&self, minutes: u32) -> Result<BellSnapshot, IntervalError> {
        let interval = IntervalMinutes::preset(minutes)?;
        Ok(self.set_interval(interval))
    }

    /// Current view of the bell
    pub fn snapshot(&self) -> BellSnapshot {
        Self::snapshot_of(&self.lock())
    }

    fn snapshot_of(ctl: &Controller) -> BellSnapshot {
        let now = Instant::now();
        BellSnapshot {
            timer: ctl.timer,
            selected: ctl.selected,
            remaining: ctl.timer.remaining(now),
            progress: ctl.timer.progress(now),
            chimes: ctl.chimes,
            chime_pending: ctl.scheduler.is_pending(),
            taken_at: now,
        }
    }

    /// Arm the scheduler for the running timer's `next_fire_at`
    fn schedule_chime(self: &Arc<Self>, ctl: &mut Controller) {
        let Some(deadline) = ctl.timer.next_fire_at() else {
            return;
        };
        // Weak so a pending chime never keeps a torn-down state alive
        let state = Arc::downgrade(self);
        ctl.scheduler.schedule_at(deadline, move |epoch| {
            if let Some(state) = state.upgrade() {
                state.on_chime(epoch);
            }
        });
    }

    /// Chime fired: play the sound and schedule the next full cycle
    fn on_chime(self: &Arc<Self>, epoch: u64) {
        let mut ctl = self.lock();
        if !ctl.scheduler.is_current(epoch) {
            debug!("Discarding stale chime #{}", epoch);
            return;
        }
        let Some(delay) = ctl.timer.fire(Instant::now()) else {
            debug!("Chime #{} fired while {}, ignoring", epoch, ctl.timer.phase());
            return;
        };
        ctl.chimes += 1;
        let chime = ctl.chimes;
        self.schedule_chime(&mut ctl);
        drop(ctl);

        // Playback runs outside the controller lock
        info!("Chime {} played, next in {:?}", chime, delay);
        if let Err(e) = self.audio.play_from_start() {
            debug!("Chime playback failed, ignoring: {}", e);
        }
    }

    /// Store the latest wall-clock reading
    pub fn record_clock(&self, now: DateTime<Local>) {
        self.clock_tx.send_replace(Some(now));
    }

    /// Latest wall-clock reading, `None` until the first tick
    pub fn clock_reading(&self) -> Option<DateTime<Local>> {
        *self.clock_tx.borrow()
    }

    /// Watch clock readings as they arrive
    pub fn subscribe_clock(&self) -> watch::Receiver<Option<DateTime<Local>>> {
        self.clock_tx.subscribe()
    }

    /// Cancel the pending chime and release the audio output
    pub fn shutdown(&self) {
        if self.lock().scheduler.cancel() {
            info!("Cancelled pending chime");
        }
        self.audio.shutdown();
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
