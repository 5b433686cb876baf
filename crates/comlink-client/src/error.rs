//! Client error types.

use comlink_common_http::HttpError;
use serde::Deserialize;

use crate::signer::SigningError;

/// Structured error body returned by the gateway on any non-200 status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayError {
    pub code: String,
    pub message: String,
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComlinkError {
    #[error("base URL is required")]
    MissingBaseUrl,

    #[error("malformed base URL {url:?}: {reason}")]
    MalformedBaseUrl { url: String, reason: String },

    #[error("failed to encode request body: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("gateway returned status {status}: {error}")]
    BadStatus { status: u16, error: GatewayError },

    #[error("unexpected response body (status {status}): {source}")]
    Protocol {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ComlinkError {
    /// Construction-time failures. Retrying the call cannot fix these.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ComlinkError::MissingBaseUrl | ComlinkError::MalformedBaseUrl { .. }
        )
    }

    /// The remote code/message pair, for gateway-reported failures.
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            ComlinkError::BadStatus { error, .. } => Some(error),
            _ => None,
        }
    }

    /// HTTP status of the response that caused this error, if one arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            ComlinkError::BadStatus { status, .. } | ComlinkError::Protocol { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ComlinkError::Http(HttpError::Cancelled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bad_status() -> ComlinkError {
        ComlinkError::BadStatus {
            status: 500,
            error: GatewayError {
                code: "ERR1".into(),
                message: "boom".into(),
            },
        }
    }

    #[test]
    fn test_gateway_error_decodes() {
        let error: GatewayError =
            serde_json::from_str(r#"{"code":"ERR1","message":"boom"}"#).unwrap();
        assert_eq!(error.code, "ERR1");
        assert_eq!(error.message, "boom");
    }

    #[test]
    fn test_gateway_error_requires_both_fields() {
        assert!(serde_json::from_str::<GatewayError>(r#"{"code":"ERR1"}"#).is_err());
        assert!(serde_json::from_str::<GatewayError>("[]").is_err());
    }

    #[test]
    fn test_bad_status_accessors() {
        let error = bad_status();
        assert_eq!(error.status(), Some(500));
        assert_eq!(error.gateway_error().map(|e| e.code.as_str()), Some("ERR1"));
        assert!(!error.is_configuration());
        assert_eq!(error.to_string(), "gateway returned status 500: ERR1: boom");
    }

    #[test]
    fn test_configuration_kinds() {
        assert!(ComlinkError::MissingBaseUrl.is_configuration());
        let malformed = ComlinkError::MalformedBaseUrl {
            url: "localhost:3000".into(),
            reason: "cannot be a base".into(),
        };
        assert!(malformed.is_configuration());
        assert_eq!(malformed.status(), None);
    }

    #[test]
    fn test_cancelled() {
        assert!(ComlinkError::Http(HttpError::Cancelled).is_cancelled());
        assert!(!bad_status().is_cancelled());
    }
}
