//! Retrying HTTP client.

use std::time::Duration;

use bytes::Bytes;
use comlink_common_async::{sleep_or_cancel, ShutdownScope};
use reqwest::Method;
use tokio::io::AsyncRead;
use tracing::{debug, warn};

use crate::config::{HttpConfig, RetryPolicy};
use crate::error::{HttpError, TransportError};
use crate::request::{buffer_body, headers, RequestDescriptor};
use crate::response::BufferedResponse;
use crate::transport::{ReqwestTransport, Transport};

/// HTTP client that retries transport failures with exponential backoff.
///
/// Attempts run strictly one after another. Each one is bound to the
/// client's [`ShutdownScope`]: it is counted as in flight while it runs and
/// is aborted if the scope is cancelled. Any response that arrives, whatever
/// its status, ends the loop.
pub struct HttpClient<T = ReqwestTransport> {
    transport: T,
    policy: RetryPolicy,
    scope: ShutdownScope,
}

impl HttpClient<ReqwestTransport> {
    /// Create a client with default transport and retry settings.
    pub fn new(scope: ShutdownScope) -> Result<Self, HttpError> {
        Self::with_config(&HttpConfig::default(), RetryPolicy::default(), scope)
    }

    /// Create a client with custom transport and retry settings.
    pub fn with_config(
        config: &HttpConfig,
        policy: RetryPolicy,
        scope: ShutdownScope,
    ) -> Result<Self, HttpError> {
        Ok(Self::with_transport(
            ReqwestTransport::new(config)?,
            policy,
            scope,
        ))
    }
}

impl<T: Transport> HttpClient<T> {
    pub fn with_transport(transport: T, policy: RetryPolicy, scope: ShutdownScope) -> Self {
        Self {
            transport,
            policy,
            scope,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn scope(&self) -> &ShutdownScope {
        &self.scope
    }

    /// Number of attempts currently on the wire.
    pub fn in_flight(&self) -> usize {
        self.scope.in_flight()
    }

    /// Make a GET request.
    pub async fn get(&self, url: &str) -> Result<BufferedResponse, HttpError> {
        self.execute(RequestDescriptor::get(url)).await
    }

    /// Make a POST request with an already buffered body.
    pub async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: impl Into<Bytes>,
    ) -> Result<BufferedResponse, HttpError> {
        let request = RequestDescriptor::post(url)
            .header(headers::CONTENT_TYPE, content_type)
            .body(body);
        self.execute(request).await
    }

    /// Buffer a read-once body source, then execute the request with retries.
    pub async fn execute_reader<R>(
        &self,
        method: Method,
        url: &str,
        request_headers: &[(String, String)],
        body: R,
    ) -> Result<BufferedResponse, HttpError>
    where
        R: AsyncRead + Unpin,
    {
        let body = buffer_body(body).await.map_err(HttpError::BodyBuffer)?;
        let mut request = RequestDescriptor::new(method, url).body(body);
        for (name, value) in request_headers {
            request = request.header(name.as_str(), value.as_str());
        }
        self.execute(request).await
    }

    /// Execute `request`, retrying transport failures within the policy's budget.
    pub async fn execute(&self, request: RequestDescriptor) -> Result<BufferedResponse, HttpError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..max_attempts {
            if self.scope.is_cancelled() {
                return Err(HttpError::Cancelled);
            }

            debug!(
                method = %request.method,
                url = %request.url,
                attempt = attempt + 1,
                "Sending request"
            );

            let error = match self.execute_once(request.clone()).await {
                Ok(response) => {
                    debug!(status = response.status, url = %request.url, "Received response");
                    return Ok(response);
                }
                Err(TransportError::Cancelled) => return Err(HttpError::Cancelled),
                Err(e) if !e.is_retryable() => return Err(HttpError::Transport(e)),
                Err(e) => e,
            };

            if self.policy.has_attempts_left(attempt) {
                let delay = self.policy.delay_for(attempt);
                warn!(
                    attempt = attempt + 1,
                    delay_ms = whole_millis(delay),
                    error = %error,
                    "Request failed, retrying"
                );
                last_error = Some(error);
                if !sleep_or_cancel(&self.scope, delay).await {
                    return Err(HttpError::Cancelled);
                }
            } else {
                warn!(attempts = max_attempts, error = %error, "Request failed, giving up");
                last_error = Some(error);
            }
        }

        Err(HttpError::RetriesExhausted {
            attempts: max_attempts,
            last: last_error,
        })
    }

    /// One attempt, tracked as in flight and bound to the cancellation scope.
    pub async fn execute_once(
        &self,
        request: RequestDescriptor,
    ) -> Result<BufferedResponse, TransportError> {
        let attempt = self.scope.track(self.transport.send(request));

        tokio::select! {
            biased;
            () = self.scope.cancelled() => Err(TransportError::Cancelled),
            result = attempt => result,
        }
    }
}

/// Milliseconds in `delay`, saturating at `u64::MAX`.
fn whole_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}
