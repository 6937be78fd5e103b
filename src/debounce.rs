//! Cancellable quiet-period timer for search-as-you-type
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// Holds at most one pending task; scheduling a new one cancels the old
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` after the quiet period unless another call supersedes it
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Drop the pending task, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            if !handle.is_finished() {
                trace!("Cancelling pending search");
            }
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().map_or(false, |handle| !handle.is_finished())
    }

    /// Wait for the pending task to fire
    pub async fn flush(&mut self) {
        if let Some(handle) = self.pending.take() {
            match handle.await {
                Ok(()) => {}
                Err(e) if e.is_panic() => warn!("⚠️ Debounced task panicked: {}", e),
                Err(_) => trace!("Pending search was cancelled"),
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
