//! Task identity and cooperative cancellation.
//!
//! Every piece of async work a controller dispatches (a page load, an option
//! fetch, a debounce timer) is tagged with a [`TaskId`]. The id names the
//! *channel* the work belongs to (for example `"users.page"`) and carries a
//! generation counter, so that a result arriving late can be recognised as
//! stale once a newer task has been issued on the same channel.
//!
//! [`TaskHandle`] pairs an id with a `CancellationToken` from `tokio_util`.
//!
//! ```ignore
//! use roster_states::{TaskHandle, TaskId};
//! use tokio_util::sync::CancellationToken;
//!
//! let handle = TaskHandle::new(TaskId::new("users.search", 1), CancellationToken::new());
//! handle.cancel();
//! assert!(handle.is_cancelled());
//! ```

use tokio_util::sync::CancellationToken;
use ustr::Ustr;

/// Unique identifier for a dispatched task.
///
/// Higher generations on the same channel were issued later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    channel: Ustr,
    generation: u64,
}

impl TaskId {
    /// Creates a new `TaskId` on the given channel.
    pub fn new(channel: impl Into<Ustr>, generation: u64) -> Self {
        Self {
            channel: channel.into(),
            generation,
        }
    }

    /// Returns the channel this task was issued on.
    pub fn channel(&self) -> Ustr {
        self.channel
    }

    /// Returns the generation counter of this task.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.channel, self.generation)
    }
}

/// Handle to a spawned task with cooperative cancellation support.
///
/// Cancelling does not abort the task. The task must observe the token
/// (usually through `tokio::select!` on `cancelled()`).
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    /// Creates a new `TaskHandle` with the given ID and cancellation token.
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    /// Returns the `TaskId` of this task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns a clone of the cancellation token for the spawned work.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Requests cooperative cancellation of this task.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Returns `true` if cancellation has been requested for this task.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}
