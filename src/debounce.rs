//! Cancellable delayed actions.
//!
//! A [`Debouncer`] holds at most one scheduled action. Scheduling a new one
//! cancels the previous timer, and dropping the debouncer cancels whatever
//! is still waiting. Cancellation only ever stops the timer: once an action
//! has fired it runs to completion on its own task.

use std::future::Future;
use tokio::task::JoinHandle;
use tokio::time::Duration;

#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Run `action` after `delay`, superseding any action not yet fired
    pub fn schedule<F>(&mut self, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detach so a later cancel cannot abort an action that already fired
            tokio::spawn(action);
        });

        self.pending = Some(handle);
    }

    /// Cancel the waiting action. Returns `true` if one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Pending (timer scheduled) versus idle
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
