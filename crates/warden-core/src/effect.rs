use std::fmt::Display;
use std::future::Future;
use tracing::warn;

/// Runs a side action whose failure must not abort the caller's path.
/// Failures are logged with the action label and turned into `None`.
pub async fn best_effort<T, E, F>(action: &str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(action, %err, "side action failed");
            None
        }
    }
}
