//! Delayed follow-up tasks scheduled after a failed optimistic update.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::debug;

#[derive(Clone)]
pub struct Reconciler {
    delay: Duration,
    token: Arc<Mutex<CancellationToken>>,
    tracker: TaskTracker,
    idle: Arc<Notify>,
}

impl Reconciler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            token: Arc::new(Mutex::new(CancellationToken::new())),
            tracker: TaskTracker::new(),
            idle: Arc::new(Notify::new()),
        }
    }

    /// Runs `task` once after the delay unless cancelled first.
    pub fn schedule<F>(&self, label: String, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.current_token().child_token();
        let delay = self.delay;
        debug!(%label, delay_ms = delay.as_millis() as u64, "reconciliation scheduled");
        let tracked = self.tracker.track_future(async move {
            tokio::select! {
                _ = token.cancelled() => debug!(%label, "reconciliation cancelled"),
                _ = sleep(delay) => task.await,
            }
        });
        let idle = self.idle.clone();
        tokio::spawn(async move {
            tracked.await;
            // the tracker count has dropped by the time waiters look again
            idle.notify_waiters();
        });
    }

    /// Cancels everything scheduled so far; later schedules are unaffected.
    pub fn cancel_all(&self) {
        let mut guard = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        guard.cancel();
        *guard = CancellationToken::new();
    }

    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Resolves once no scheduled task is pending. Any number of callers may
    /// wait at once.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.tracker.is_empty() {
                return;
            }
            notified.await;
        }
    }

    fn current_token(&self) -> CancellationToken {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
