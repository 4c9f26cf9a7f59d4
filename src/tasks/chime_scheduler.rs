//! Single-slot chime scheduler

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{sleep_until, Instant},
};
use tracing::debug;

/// Holds at most one pending chime.
///
/// Every `schedule` and `cancel` advances the epoch; a fire callback receives
/// the epoch it was scheduled under so the owner can discard fires that lost
/// a race with a later transition.
#[derive(Debug, Default)]
pub struct ChimeScheduler {
    handle: Option<JoinHandle<()>>,
    epoch: u64,
}

impl ChimeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending chime with one that calls `on_fire` after `delay`
    pub fn schedule<F>(&mut self, delay: Duration, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.schedule_at(Instant::now() + delay, on_fire)
    }

    /// Replace any pending chime with one that calls `on_fire` at `deadline`.
    ///
    /// The deadline is fixed here, not when the spawned task is first polled.
    pub fn schedule_at<F>(&mut self, deadline: Instant, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        let epoch = self.epoch;
        debug!(
            "Scheduling chime #{} in {:?}",
            epoch,
            deadline.saturating_duration_since(Instant::now())
        );
        self.handle = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            on_fire(epoch);
        }));
        epoch
    }

    /// Abort the pending chime, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.epoch = self.epoch.wrapping_add(1);
        match self.handle.take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    /// Epoch of the most recent schedule or cancel
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether `epoch` belongs to the chime that is currently scheduled
    pub fn is_current(&self, epoch: u64) -> bool {
        self.handle.is_some() && self.epoch == epoch
    }

    /// Whether a scheduled chime has not fired yet
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ChimeScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use tokio::time;

    use super::*;

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce(u64) + Send>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let shared = Arc::clone(&fired);
        let make = move || {
            let fired = Arc::clone(&shared);
            Box::new(move |_epoch: u64| {
                fired.fetch_add(1, Ordering::SeqCst);
            }) as Box<dyn FnOnce(u64) + Send>
        };
        (fired, make)
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let (fired, make) = counter();
        let mut scheduler = ChimeScheduler::new();
        scheduler.schedule(Duration::from_secs(60), make());
        assert!(scheduler.is_pending());

        time::advance(Duration::from_secs(59)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_fire() {
        let (fired, make) = counter();
        let mut scheduler = ChimeScheduler::new();
        scheduler.schedule(Duration::from_secs(10), make());
        assert!(scheduler.cancel());
        assert!(!scheduler.is_pending());
        assert!(!scheduler.cancel());

        time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_replaces_pending() {
        let (fired, make) = counter();
        let mut scheduler = ChimeScheduler::new();
        let first = scheduler.schedule(Duration::from_secs(10), make());
        let second = scheduler.schedule(Duration::from_secs(30), make());
        assert_ne!(first, second);
        assert!(!scheduler.is_current(first));
        assert!(scheduler.is_current(second));

        time::advance(Duration::from_secs(20)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        time::advance(Duration::from_secs(11)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_counts_from_schedule_call() {
        let (fired, make) = counter();
        let mut scheduler = ChimeScheduler::new();
        scheduler.schedule(Duration::from_secs(60), make());

        // The clock moves before the spawned task is ever polled
        time::advance(Duration::from_secs(30)).await;
        time::advance(Duration::from_secs(30) + Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_at_fires_on_deadline() {
        let (fired, make) = counter();
        let mut scheduler = ChimeScheduler::new();
        let deadline = Instant::now() + Duration::from_secs(60);

        time::advance(Duration::from_secs(45)).await;
        scheduler.schedule_at(deadline, make());
        time::advance(Duration::from_secs(14)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        time::advance(Duration::from_secs(1) + Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn past_deadline_fires_on_next_turn() {
        let (fired, make) = counter();
        let mut scheduler = ChimeScheduler::new();
        let deadline = Instant::now();
        time::advance(Duration::from_secs(5)).await;

        scheduler.schedule_at(deadline, make());
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_fires_on_next_turn() {
        let (fired, make) = counter();
        let mut scheduler = ChimeScheduler::new();
        scheduler.schedule(Duration::ZERO, make());
        time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending() {
        let (fired, make) = counter();
        let mut scheduler = ChimeScheduler::new();
        scheduler.schedule(Duration::from_secs(1), make());
        drop(scheduler);

        time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
