//! Transport and execution errors.

/// A single attempt failed before a complete response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("request cancelled")]
    Cancelled,
}

impl TransportError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransportError::Invalid(_) | TransportError::Cancelled)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            TransportError::Invalid(e.to_string())
        } else if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            TransportError::Body(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Errors surfaced by [`crate::HttpClient`].
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("failed to buffer request body: {0}")]
    BodyBuffer(#[source] std::io::Error),

    #[error(transparent)]
    Transport(TransportError),

    #[error("request cancelled")]
    Cancelled,

    #[error("retries exhausted after {attempts} attempts{}", last_cause(.last))]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Option<TransportError>,
    },
}

fn last_cause(last: &Option<TransportError>) -> String {
    match last {
        Some(e) => format!(": {e}"),
        None => String::new(),
    }
}

impl HttpError {
    /// The transport failure behind this error, if any.
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            HttpError::Transport(e) => Some(e),
            HttpError::RetriesExhausted { last, .. } => last.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(TransportError::Connect("refused".into()).is_retryable());
        assert!(TransportError::Timeout.is_retryable());
        assert!(TransportError::Request("reset".into()).is_retryable());
        assert!(TransportError::Body("eof".into()).is_retryable());
        assert!(!TransportError::Invalid("bad url".into()).is_retryable());
        assert!(!TransportError::Cancelled.is_retryable());
    }

    #[test]
    fn test_retries_exhausted_display() {
        let error = HttpError::RetriesExhausted {
            attempts: 5,
            last: Some(TransportError::Connect("connection refused".into())),
        };
        let message = error.to_string();
        assert!(message.contains("retries exhausted after 5 attempts"));
        assert!(message.contains("connection refused"));

        let bare = HttpError::RetriesExhausted {
            attempts: 3,
            last: None,
        };
        assert_eq!(bare.to_string(), "retries exhausted after 3 attempts");
    }

    #[test]
    fn test_transport_error_accessor() {
        let error = HttpError::RetriesExhausted {
            attempts: 2,
            last: Some(TransportError::Timeout),
        };
        assert_eq!(error.transport_error(), Some(&TransportError::Timeout));
        assert_eq!(HttpError::Cancelled.transport_error(), None);
    }
}
