//! Transport and retry configuration.

use rand::Rng;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::error::HttpError;

/// HTTP transport configuration. Fixed once the client is built.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Dial timeout. reqwest applies it to the TCP connect and TLS handshake together.
    pub connect_timeout: Duration,
    /// Timeout for a single attempt, from send to the last body byte.
    pub request_timeout: Duration,
    /// How long an idle pooled connection is kept.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections kept per host.
    pub pool_max_idle_per_host: usize,
    /// TCP keep-alive interval.
    pub tcp_keepalive: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Enable gzip decompression.
    pub gzip: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 50,
            tcp_keepalive: Duration::from_secs(30),
            user_agent: format!("comlink/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
        }
    }
}

/// Build a pooled reqwest client from `config`.
pub fn build_client(config: &HttpConfig) -> Result<Client, HttpError> {
    ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .tcp_keepalive(config.tcp_keepalive)
        .user_agent(&config.user_agent)
        .gzip(config.gzip)
        .build()
        .map_err(HttpError::ClientBuild)
}

/// Retry budget and backoff schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per request, the first one included.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each further failure.
    pub base_delay: Duration,
    /// Upper bound on any single backoff delay.
    pub max_delay: Duration,
    /// Spread each delay uniformly over `[delay / 2, delay]`.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Backoff to wait after the failed attempt numbered `attempt` (zero based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        let delay = self
            .base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay);

        if !self.jitter {
            return delay;
        }

        let max_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let jittered = rand::thread_rng().gen_range(max_ms / 2..=max_ms);
        Duration::from_millis(jittered)
    }

    /// Whether another attempt is allowed after `attempt` (zero based) failed.
    pub fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) < self.max_attempts
    }
}
