//! Platform-abstracted spawn and sleep.
//!
//! Native builds run on the ambient Tokio runtime. On `wasm32` there is no
//! Tokio reactor, so tasks go through `wasm_bindgen_futures::spawn_local` and
//! timers through `gloo-timers`.

use std::future::Future;
use std::time::Duration;

/// Spawns `future` onto the current runtime and detaches it.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future);
}

/// Spawns `future` onto the JS event loop and detaches it.
#[cfg(target_arch = "wasm32")]
pub fn spawn<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Suspends the calling task for `duration`.
pub async fn sleep(duration: Duration) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::time::sleep(duration).await;
    }

    #[cfg(target_arch = "wasm32")]
    {
        gloo_timers::future::sleep(duration).await;
    }
}
