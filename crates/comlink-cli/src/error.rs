//! CLI error handling.

use std::path::PathBuf;
use std::process::ExitCode;

use comlink_client::{ComlinkError, GatewayError};
use comlink_client::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Gateway(#[from] ComlinkError),

    #[error("failed to read request body from {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid request body: {0}")]
    Body(#[source] serde_json::Error),

    #[error("{0}")]
    Usage(String),

    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Short code printed next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Gateway(e) if e.is_configuration() => "E001",
            Self::Gateway(ComlinkError::Http(HttpError::Cancelled)) => "E002",
            Self::Gateway(ComlinkError::Http(_)) => "E003",
            Self::Gateway(ComlinkError::BadStatus { .. }) => "E004",
            Self::Gateway(_) => "E005",
            Self::Input { .. } | Self::Body(_) => "E006",
            Self::Usage(_) => "E007",
            Self::Other(_) => "E999",
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        let code = match self {
            Self::Gateway(e) if e.is_configuration() => 2,
            Self::Gateway(ComlinkError::Http(HttpError::Cancelled)) => 130,
            Self::Gateway(ComlinkError::Http(_)) => 4,
            Self::Gateway(ComlinkError::BadStatus { .. }) => 5,
            Self::Gateway(_) => 6,
            Self::Input { .. } | Self::Body(_) => 3,
            Self::Usage(_) => 2,
            Self::Other(_) => 1,
        };
        ExitCode::from(code)
    }

    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            Self::Gateway(e) => e.gateway_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_by_kind() {
        let config = CliError::from(ComlinkError::MissingBaseUrl);
        assert_eq!(config.code(), "E001");
        assert_eq!(config.exit_code(), ExitCode::from(2));

        let remote = CliError::from(ComlinkError::BadStatus {
            status: 500,
            error: GatewayError {
                code: "ERR1".into(),
                message: "boom".into(),
            },
        });
        assert_eq!(remote.code(), "E004");
        assert_eq!(remote.gateway_error().map(|e| e.code.as_str()), Some("ERR1"));

        let cancelled = CliError::from(ComlinkError::Http(HttpError::Cancelled));
        assert_eq!(cancelled.exit_code(), ExitCode::from(130));
    }

    #[test]
    fn test_other_keeps_context_chain() {
        let error = CliError::from(anyhow::anyhow!("disk full").context("failed to write out.json"));
        assert_eq!(error.to_string(), "failed to write out.json: disk full");
    }
}
