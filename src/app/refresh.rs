//! Recurring list refresh: a throttled trigger and a polling trigger.
//!
//! Both end in [`ListStateStore::fetch_list`]. Their timers are owned by the
//! caller through explicit handles; there is no global timer registry.
//!
//! # Throttle
//!
//! Leading edge. The first trigger in a window runs immediately; triggers
//! that arrive before the window has elapsed are dropped, and nothing runs
//! when the window closes. Five triggers within 1000 ms therefore cause exactly
//! one list fetch.
//!
//! # Poll
//!
//! Immediate, then every period. Starting a 5000 ms poll fetches at t = 0,
//! 5000, 10000, ... so 12000 ms of runtime yields three fetches. Stopping waits
//! for a fetch that is already in flight and then dispatches nothing more.

use super::store::ListStateStore;
use crate::domain::error::Result;
use crate::notify::Notifier;
use crate::service::KbService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Leading-edge gate: lets one call through per window.
#[derive(Debug)]
pub struct Throttle {
    window: Duration,
    last_fired: Mutex<Option<Instant>>,
    stopped: AtomicBool,
}

impl Throttle {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: Mutex::new(None),
            stopped: AtomicBool::new(false),
        }
    }

    /// Returns `true` if the caller may run now, and opens a new window.
    pub fn try_acquire(&self) -> bool {
        if self.stopped.load(Ordering::Acquire) {
            return false;
        }

        let now = Instant::now();
        let mut last = self.last_fired.lock().unwrap_or_else(PoisonError::into_inner);
        match *last {
            Some(fired) if now.duration_since(fired) < self.window => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Refuses every later call.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// List refresh behind a [`Throttle`].
pub struct ThrottledRefresh<S, N> {
    store: Arc<ListStateStore<S, N>>,
    gate: Throttle,
}

impl<S: KbService, N: Notifier> ThrottledRefresh<S, N> {
    #[must_use]
    pub fn new(store: Arc<ListStateStore<S, N>>, window: Duration) -> Self {
        Self {
            store,
            gate: Throttle::new(window),
        }
    }

    /// Fetches the list of `kb_id` unless a fetch already went out in the
    /// current window. Returns `None` when the call was coalesced.
    ///
    /// # Errors
    ///
    /// Propagates errors from the list fetch.
    pub async fn trigger(&self, kb_id: &str) -> Result<Option<i64>> {
        if !self.gate.try_acquire() {
            tracing::debug!(kb_id = %kb_id, "list refresh throttled");
            return Ok(None);
        }
        self.store.fetch_list(kb_id).await.map(Some)
    }

    /// Stops the trigger; later calls are dropped.
    pub fn stop(&self) {
        self.gate.stop();
    }
}

/// Owner handle of a running poll. Dropping it also stops the poll.
#[derive(Debug)]
pub struct PollHandle {
    kb_id: String,
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollHandle {
    #[must_use]
    pub fn kb_id(&self) -> &str {
        &self.kb_id
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops polling and waits until the poll task has exited.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::warn!(kb_id = %self.kb_id, error = %e, "poll task ended abnormally");
        }
    }
}

/// Starts polling the list of `kb_id` every `period`, beginning immediately.
///
/// Must be called from within a tokio runtime.
pub fn start_poll<S, N>(store: Arc<ListStateStore<S, N>>, kb_id: impl Into<String>, period: Duration) -> PollHandle
where
    S: KbService + 'static,
    N: Notifier + 'static,
{
    let kb_id = kb_id.into();
    let period = period.max(MIN_POLL_INTERVAL);
    let (stop_tx, stop_rx) = oneshot::channel();

    tracing::debug!(kb_id = %kb_id, period = ?period, "starting list poll");
    let task = tokio::spawn(poll_loop(store, kb_id.clone(), period, stop_rx));

    PollHandle {
        kb_id,
        stop_tx: Some(stop_tx),
        task,
    }
}

async fn poll_loop<S, N>(
    store: Arc<ListStateStore<S, N>>,
    kb_id: String,
    period: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) where
    S: KbService,
    N: Notifier,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Resolves on an explicit stop and when the handle is dropped.
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {}
        }

        match store.fetch_list(&kb_id).await {
            Ok(retcode) => tracing::trace!(kb_id = %kb_id, retcode, "poll fetch finished"),
            Err(e) => tracing::warn!(kb_id = %kb_id, error = %e, "poll fetch failed"),
        }
    }

    tracing::debug!(kb_id = %kb_id, "list poll stopped");
}

impl<S, N> ListStateStore<S, N>
where
    S: KbService + 'static,
    N: Notifier + 'static,
{
    /// Throttled list refresh over this store.
    #[must_use]
    pub fn throttled_refresh(self: &Arc<Self>, window: Duration) -> ThrottledRefresh<S, N> {
        ThrottledRefresh::new(Arc::clone(self), window)
    }

    /// Starts polling the list of `kb_id`. See [`start_poll`].
    pub fn start_poll(self: &Arc<Self>, kb_id: impl Into<String>, period: Duration) -> PollHandle {
        start_poll(Arc::clone(self), kb_id, period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn throttle_opens_a_new_window_after_it_elapses() {
        let gate = Throttle::new(Duration::from_millis(1000));

        assert!(gate.try_acquire());
        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(!gate.try_acquire());
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(gate.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_calls_do_not_extend_the_window() {
        let gate = Throttle::new(Duration::from_millis(1000));

        assert!(gate.try_acquire());
        for _ in 0..9 {
            tokio::time::advance(Duration::from_millis(100)).await;
            assert!(!gate.try_acquire());
        }
        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(gate.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_throttle_refuses_everything() {
        let gate = Throttle::new(Duration::from_millis(10));
        gate.stop();
        assert!(gate.is_stopped());
        assert!(!gate.try_acquire());
    }
}
