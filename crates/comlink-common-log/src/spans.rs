//! Tracing spans for gateway calls.

use tracing::{info_span, Span};

/// Span covering one logical gateway call, all attempts included.
pub fn request_span(method: &str, endpoint: &str) -> Span {
    info_span!("comlink_request", method = %method, endpoint = %endpoint)
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Time elapsed so far.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    /// Complete the timer and record duration.
    pub fn finish(self) {
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %self.start.elapsed().as_millis(),
            "operation completed"
        );
    }
}
