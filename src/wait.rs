//! Bounded polling against a document that never announces readiness.

use crate::document::RemoteDocument;
use anyhow::Result;
use std::{future::Future, time::Duration};
use tokio::time::{sleep, Instant};

/// Runs `probe` until it yields `true` or `timeout` elapses.
///
/// The probe always runs at least once, and once more at the deadline, so a
/// zero timeout is a single check. Probe errors abort the wait.
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut probe: F) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if probe().await? {
            return Ok(true);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(false);
        }
        sleep(interval.min(deadline - now)).await;
    }
}

/// Waits for `selector`; absence after `timeout` is reported as `false`.
pub async fn await_optional<D: RemoteDocument + ?Sized>(
    doc: &D,
    selector: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<bool> {
    poll_until(timeout, interval, || doc.is_present(selector)).await
}

/// Outcome of [`await_required`] when the element never showed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed(pub Duration);

/// Waits for `selector`; absence after `timeout` is an [`Elapsed`].
///
/// The outer `Result` carries document failures, the inner one the timeout.
pub async fn await_required<D: RemoteDocument + ?Sized>(
    doc: &D,
    selector: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<std::result::Result<(), Elapsed>> {
    if await_optional(doc, selector, timeout, interval).await? {
        Ok(Ok(()))
    } else {
        Ok(Err(Elapsed(timeout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const TICK: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn returns_as_soon_as_probe_succeeds() {
        let calls = Cell::new(0);
        let start = Instant::now();
        let found = poll_until(Duration::from_secs(5), TICK, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Ok::<_, anyhow::Error>(n == 3) }
        })
        .await
        .unwrap();
        assert!(found);
        assert_eq!(calls.get(), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_at_the_deadline() {
        let start = Instant::now();
        let found = poll_until(Duration::from_secs(5), TICK, || async {
            Ok::<_, anyhow::Error>(false)
        })
        .await
        .unwrap();
        assert!(!found);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_checks_once() {
        let calls = Cell::new(0);
        let found = poll_until(Duration::ZERO, TICK, || {
            calls.set(calls.get() + 1);
            async { Ok::<_, anyhow::Error>(false) }
        })
        .await
        .unwrap();
        assert!(!found);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_error_stops_polling() {
        let calls = Cell::new(0);
        let res = poll_until(Duration::from_secs(5), TICK, || {
            calls.set(calls.get() + 1);
            async { Err::<bool, _>(anyhow::anyhow!("target closed")) }
        })
        .await;
        assert!(res.is_err());
        assert_eq!(calls.get(), 1);
    }
}
