//! Async runtime utilities.
//!
//! The centrepiece is [`ShutdownScope`]: a cancellation token paired with a
//! task tracker. Every outbound attempt is bound to the token and counted by
//! the tracker, so a shutdown sequence can first stop new work and then wait
//! for whatever is still on the wire.

use std::future::Future;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tokio_util::task::task_tracker::TrackedFuture;
use tokio_util::task::TaskTracker;

/// Configuration for the comlink runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of worker threads (0 = num_cpus).
    pub worker_threads: usize,
    /// Thread name prefix.
    pub thread_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            thread_name: "comlink".to_string(),
        }
    }
}

/// Build a configured Tokio runtime with I/O and time drivers enabled.
pub fn build_runtime(config: RuntimeConfig) -> std::io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();

    if config.worker_threads > 0 {
        builder.worker_threads(config.worker_threads);
    }

    builder.thread_name(&config.thread_name).enable_all().build()
}

/// Cancellation scope plus in-flight tracker, shared by every clone.
///
/// Cancelling the scope aborts attempts that are still running and stops new
/// ones from starting. Attempts that already finished are unaffected.
#[derive(Debug, Clone, Default)]
pub struct ShutdownScope {
    token: CancellationToken,
    tracker: TaskTracker,
}

impl ShutdownScope {
    /// Create a fresh scope with its own token and tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scope around an externally owned token and tracker.
    pub fn from_parts(token: CancellationToken, tracker: TaskTracker) -> Self {
        Self { token, tracker }
    }

    /// A scope that is cancelled whenever this one is, but can also be
    /// cancelled on its own. The tracker is shared.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            tracker: self.tracker.clone(),
        }
    }

    /// The underlying cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The underlying task tracker.
    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    /// Cancel the scope.
    pub fn cancel(&self) {
        tracing::info!("cancelling shutdown scope");
        self.token.cancel();
    }

    /// Whether the scope has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the scope is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Count `future` as in flight until it completes or is dropped.
    pub fn track<F: Future>(&self, future: F) -> TrackedFuture<F> {
        self.tracker.track_future(future)
    }

    /// Number of futures currently in flight.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Close the tracker and wait until every tracked future has finished.
    ///
    /// Futures tracked after this call are still waited for.
    pub async fn drain(&self) {
        self.tracker.close();
        tracing::info!(in_flight = self.tracker.len(), "draining in-flight requests");
        self.tracker.wait().await;
        tracing::info!("all in-flight requests finished");
    }
}

/// Sleep for `duration`, returning early with `false` if `scope` is cancelled.
pub async fn sleep_or_cancel(scope: &ShutdownScope, duration: Duration) -> bool {
    tokio::select! {
        () = scope.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_is_shared_by_clones() {
        let scope = ShutdownScope::new();
        let clone = scope.clone();

        tokio::spawn({
            let scope = scope.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                scope.cancel();
            }
        });

        clone.cancelled().await;
        assert!(scope.is_cancelled());
    }

    #[tokio::test]
    async fn test_child_scope_follows_parent() {
        let parent = ShutdownScope::new();
        let child = parent.child();

        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let other = parent.child();
        parent.cancel();
        assert!(other.is_cancelled());
    }

    #[tokio::test]
    async fn test_in_flight_counts_tracked_futures() {
        let scope = ShutdownScope::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let tracked = scope.track(async move {
            let _ = rx.await;
        });
        assert_eq!(scope.in_flight(), 1);

        let handle = tokio::spawn(tracked);
        tx.send(()).unwrap();
        handle.await.unwrap();
        assert_eq!(scope.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_drain_waits_for_in_flight_work() {
        let scope = ShutdownScope::new();
        let done = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));

        let tracked = scope.track({
            let done = done.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                done.store(true, std::sync::atomic::Ordering::SeqCst);
            }
        });
        tokio::spawn(tracked);

        scope.drain().await;
        assert!(done.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(scope.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_or_cancel_completes() {
        let scope = ShutdownScope::new();
        assert!(sleep_or_cancel(&scope, Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn test_sleep_or_cancel_aborts() {
        let scope = ShutdownScope::new();
        scope.cancel();
        assert!(!sleep_or_cancel(&scope, Duration::from_secs(60)).await);
    }

    #[test]
    fn test_runtime_build() {
        let config = RuntimeConfig {
            worker_threads: 2,
            thread_name: "test-runtime".to_string(),
        };

        let runtime = build_runtime(config).expect("Should build runtime");
        let slept = runtime.block_on(async {
            sleep_or_cancel(&ShutdownScope::new(), Duration::from_millis(5)).await
        });
        assert!(slept);
    }
}
