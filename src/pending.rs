//! Handles for values that resolve later.
//!
//! A [`PendingResponse`] wraps a spawned Tokio task. Every continuation
//! (`map`, `and_then`, `recover`, `combine`, `either`) is spawned as its own
//! task, so it runs as soon as its inputs complete whether or not anyone is
//! awaiting the result yet.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::error::{Error, Result};

/// A value of type `T` that completes exactly once, with success or failure.
///
/// The handle is consumed by every combinator and by `.await`, so it can
/// only be resolved once. Dropping it does not cancel the underlying work.
///
/// # Example
///
/// ```no_run
/// use wireprobe::{extract, HttpClient, Request};
///
/// # async fn example() -> wireprobe::Result<()> {
/// let client = HttpClient::new()?;
/// let hello = client
///     .send_async(Request::get("http://localhost:8080/a").build()?)
///     .and_then(extract::body_if_ok);
/// let world = client
///     .send_async(Request::get("http://localhost:8080/b").build()?)
///     .and_then(extract::body_if_ok);
///
/// let greeting = hello.combine(world, |a, b| format!("{a} {b}")).await?;
/// # Ok(())
/// # }
/// ```
#[must_use = "a pending response does nothing observable unless awaited or combined"]
#[derive(Debug)]
pub struct PendingResponse<T> {
    handle: JoinHandle<Result<T>>,
}

impl<T: Send + 'static> PendingResponse<T> {
    /// Run a future as a task and return its handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    /// An already successful handle.
    pub fn ready(value: T) -> Self {
        Self::spawn(async move { Ok(value) })
    }

    /// An already failed handle.
    pub fn failed(error: Error) -> Self {
        Self::spawn(async move { Err(error) })
    }

    /// Transform the value once it arrives.
    pub fn map<U, F>(self, f: F) -> PendingResponse<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        PendingResponse::spawn(async move { self.await.map(f) })
    }

    /// Transform the value with a step that may fail, e.g. an extraction
    /// that rejects non-200 responses.
    pub fn and_then<U, F>(self, f: F) -> PendingResponse<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        PendingResponse::spawn(async move { self.await.and_then(f) })
    }

    /// Replace a failure with a fallback value.
    pub fn recover<F>(self, f: F) -> PendingResponse<T>
    where
        F: FnOnce(Error) -> T + Send + 'static,
    {
        PendingResponse::spawn(async move { Ok(self.await.unwrap_or_else(f)) })
    }

    /// Wait for both handles and merge their values as `merge(self, other)`.
    ///
    /// The argument order of `merge` is fixed by the call, not by which
    /// input finished first. Fails as soon as either input fails.
    pub fn combine<U, R, F>(self, other: PendingResponse<U>, merge: F) -> PendingResponse<R>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: FnOnce(T, U) -> R + Send + 'static,
    {
        PendingResponse::spawn(async move {
            let (left, right) = tokio::try_join!(self, other)?;
            Ok(merge(left, right))
        })
    }

    /// Resolve with whichever handle completes first, success or failure.
    ///
    /// The slower handle keeps running; its result is discarded.
    pub fn either(self, other: PendingResponse<T>) -> PendingResponse<T> {
        PendingResponse::spawn(async move {
            tokio::select! {
                first = self => first,
                second = other => second,
            }
        })
    }

    /// Returns true if the underlying task has completed.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Future for PendingResponse<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(join_error) => Err(Error::Task(join_error)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn delayed<T: Send + 'static>(value: T, ms: u64) -> PendingResponse<T> {
        PendingResponse::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(value)
        })
    }

    fn delayed_failure(ms: u64) -> PendingResponse<String> {
        PendingResponse::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Err(Error::Application {
                status: 500,
                message: "boom".to_string(),
            })
        })
    }

    #[tokio::test]
    async fn test_map_and_and_then() {
        let value = PendingResponse::ready(20).map(|v| v + 1).await.unwrap();
        assert_eq!(value, 21);

        let err = PendingResponse::ready(1)
            .and_then(|_| -> Result<i32> { Err(Error::NothingToCombine) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NothingToCombine));
    }

    #[tokio::test]
    async fn test_recover_substitutes_fallback() {
        let value = delayed_failure(0)
            .recover(|e| {
                assert!(e.is_application());
                "Hello WireMock".to_string()
            })
            .await
            .unwrap();
        assert_eq!(value, "Hello WireMock");
    }

    #[tokio::test]
    async fn test_recover_leaves_success_untouched() {
        let value = PendingResponse::ready("ok".to_string())
            .recover(|_| "fallback".to_string())
            .await
            .unwrap();
        assert_eq!(value, "ok");
    }

    #[tokio::test]
    async fn test_combine_order_ignores_arrival_order() {
        // The left input arrives last; the merge still sees it first.
        let slow_left = delayed("Hello".to_string(), 50);
        let fast_right = delayed("World".to_string(), 0);

        let merged = slow_left
            .combine(fast_right, |a, b| format!("{a}{b}"))
            .await
            .unwrap();
        assert_eq!(merged, "HelloWorld");
    }

    #[tokio::test]
    async fn test_combine_fails_when_any_input_fails() {
        let result = delayed("Hello".to_string(), 0)
            .combine(delayed_failure(10), |a, b| a + &b)
            .await;
        assert!(result.unwrap_err().is_application());
    }

    #[tokio::test]
    async fn test_combine_with_recovered_input_succeeds() {
        let merged = delayed("Hello".to_string(), 0)
            .combine(
                delayed_failure(10).recover(|_| "Fallback".to_string()),
                |a, b| format!("{a} {b}"),
            )
            .await
            .unwrap();
        assert_eq!(merged, "Hello Fallback");
    }

    #[tokio::test]
    async fn test_either_takes_first_to_complete() {
        let winner = delayed("slow".to_string(), 200)
            .either(delayed("fast".to_string(), 0))
            .await
            .unwrap();
        assert_eq!(winner, "fast");
    }

    #[tokio::test]
    async fn test_either_propagates_failed_winner() {
        let result = delayed_failure(0)
            .either(delayed("late".to_string(), 200))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_panicking_continuation_surfaces_as_task_error() {
        let result = PendingResponse::ready(1)
            .map(|_: i32| -> i32 { panic!("continuation failed") })
            .await;
        assert!(matches!(result, Err(Error::Task(_))));
    }

    #[tokio::test]
    async fn test_dropped_handle_keeps_running() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let pending = PendingResponse::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = tx.send(());
            Ok(())
        });
        drop(pending);

        tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .expect("task was cancelled")
            .expect("sender dropped");
    }
}
