//! Trailing debounce backed by cancellable timer tasks.
//!
//! Each call to [`Debouncer::schedule`] cancels the previously scheduled timer
//! and starts a new one. Every scheduled timer reports back exactly once
//! through its callback, either with [`DebounceOutcome::Elapsed`] or
//! [`DebounceOutcome::Cancelled`], so callers that count outstanding work stay
//! balanced.

use std::time::Duration;

use log::debug;
use tokio_util::sync::CancellationToken;
use ustr::Ustr;

use crate::{TaskHandle, TaskId, runtime};

/// How a scheduled timer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceOutcome {
    /// The quiet period elapsed without a newer schedule.
    Elapsed(TaskId),
    /// The timer was superseded or cancelled before it elapsed.
    Cancelled(TaskId),
}

impl DebounceOutcome {
    pub fn id(&self) -> TaskId {
        match self {
            Self::Elapsed(id) | Self::Cancelled(id) => *id,
        }
    }
}

#[derive(Debug)]
pub struct Debouncer {
    channel: Ustr,
    delay: Duration,
    generation: u64,
    pending: Option<TaskHandle>,
}

impl Debouncer {
    pub fn new(channel: impl Into<Ustr>, delay: Duration) -> Self {
        Self {
            channel: channel.into(),
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Starts a new quiet period, cancelling the one in progress.
    ///
    /// `on_done` runs on the spawned timer task once the timer elapses or is
    /// cancelled.
    pub fn schedule<F>(&mut self, on_done: F) -> TaskId
    where
        F: FnOnce(DebounceOutcome) + Send + 'static,
    {
        self.cancel();

        self.generation += 1;
        let id = TaskId::new(self.channel, self.generation);
        let token = CancellationToken::new();
        let handle = TaskHandle::new(id, token.clone());
        let delay = self.delay;

        runtime::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => DebounceOutcome::Cancelled(id),
                _ = runtime::sleep(delay) => DebounceOutcome::Elapsed(id),
            };
            on_done(outcome);
        });

        debug!("Debounce scheduled: {id} ({delay:?})");
        self.pending = Some(handle);
        id
    }

    /// Cancels the pending timer, if any. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                debug!("Debounce cancelled: {}", handle.id());
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Marks the timer `id` as resolved. Returns true if it was the pending one.
    pub fn finish(&mut self, id: TaskId) -> bool {
        if self.pending.as_ref().map(TaskHandle::id) == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Returns the id of the timer still waiting to elapse.
    pub fn pending(&self) -> Option<TaskId> {
        self.pending.as_ref().map(TaskHandle::id)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
