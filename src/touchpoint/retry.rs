//! Bounded-retry helper with a fresh per-attempt deadline.
//!
//! The deadline cancels the in-flight future, so the worst case is exactly
//! `attempts × deadline` before the caller falls back to static text.

use std::future::Future;
use std::time::Duration;

/// Run `op` up to `attempts` times, giving each attempt its own `deadline`.
///
/// Returns the first success, or `None` once every attempt has failed or
/// timed out. Failures are logged and absorbed, never propagated.
pub(crate) async fn bounded<T, E, F, Fut>(
    attempts: u32,
    deadline: Duration,
    label: &str,
    mut op: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    for attempt in 1..=attempts {
        match tokio::time::timeout(deadline, op()).await {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(e)) => {
                tracing::warn!(attempt, attempts, "{label} attempt failed: {e}");
            }
            Err(_) => {
                tracing::warn!(attempt, attempts, ?deadline, "{label} attempt hit deadline");
            }
        }
    }
    None
}
