//! Runtime primitives shared by the roster business layer.
//!
//! - [`TaskId`] / [`TaskHandle`]: identity and cooperative cancellation for dispatched work
//! - [`LatestOnly`]: decides whether a finished task is still the authoritative one
//! - [`Debouncer`]: trailing debounce over cancellable timers
//! - [`Observers`]: subscribe/notify fan-out
//! - [`spawn`] / [`sleep`]: native (Tokio) and `wasm32` task plumbing

mod debounce;
mod observer;
mod runtime;
mod sequencer;
mod task;

pub use debounce::{DebounceOutcome, Debouncer};
pub use observer::Observers;
pub use runtime::{sleep, spawn};
pub use sequencer::LatestOnly;
pub use task::{TaskHandle, TaskId};
