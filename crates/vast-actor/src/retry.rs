//! Shared retry helper for the `io` error kind (spec.md §7): a failed disk
//! or network operation is retried exactly once before the caller gives up
//! on it and marks the owning segment or partition faulted.

use tracing::warn;

/// Runs `op`; if it fails, runs it exactly once more and returns that
/// second attempt's result either way.
pub async fn retry_once<F, Fut, T, E>(mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match op().await {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!(error = %err, "operation failed, retrying once");
            op().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_without_retrying_on_first_try() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_once(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        })
        .await;
        assert_eq!(result, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_on_the_second_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_once(|| async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err("transient")
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_the_second_failure() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_once(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("permanent")
        })
        .await;
        assert_eq!(result, Err("permanent"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
