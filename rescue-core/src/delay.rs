//! Runtime-appropriate async sleep.
//!
//! Natively this is a tokio timer. In the browser it resolves a promise from
//! `setTimeout`, since tokio's timer driver is unavailable on wasm32.

use std::time::Duration;

/// Suspend the current task for `duration`. Zero returns immediately.
pub async fn sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    platform_sleep(duration).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn platform_sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
async fn platform_sleep(duration: Duration) {
    use wasm_bindgen::JsValue;

    let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().map(|window| {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
        });
        if !matches!(scheduled, Some(Ok(_))) {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

#[cfg(all(target_arch = "wasm32", not(feature = "wasm")))]
async fn platform_sleep(_duration: Duration) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sleep_waits_for_duration() {
        let start = tokio::time::Instant::now();
        sleep(Duration::from_millis(1500)).await;
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn zero_sleep_returns_immediately() {
        sleep(Duration::ZERO).await;
    }
}
