//! Client settings.

use std::time::Duration;

use comlink_common_async::ShutdownScope;
use comlink_common_http::{HttpConfig, RetryPolicy};

use crate::credentials::Credentials;

/// Environment variable holding the gateway base URL.
pub const ENV_URL: &str = "COMLINK_URL";
/// Environment variable holding the HMAC access key.
pub const ENV_ACCESS_KEY: &str = "COMLINK_ACCESS_KEY";
/// Environment variable holding the HMAC secret key.
pub const ENV_SECRET_KEY: &str = "COMLINK_SECRET_KEY";

/// Everything needed to construct a [`crate::ComlinkClient`].
///
/// The base URL is validated when the client is built, not here.
#[derive(Debug, Clone, Default)]
pub struct ComlinkSettings {
    /// Gateway root, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// Signing credentials. `None` disables signing.
    pub credentials: Option<Credentials>,
    pub http: HttpConfig,
    pub retry: RetryPolicy,
    /// Cancellation scope and in-flight tracker. A fresh one is created when absent.
    pub scope: Option<ShutdownScope>,
}

impl ComlinkSettings {
    pub fn builder() -> ComlinkSettingsBuilder {
        ComlinkSettingsBuilder::default()
    }

    /// Read `COMLINK_URL`, `COMLINK_ACCESS_KEY` and `COMLINK_SECRET_KEY`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut builder = Self::builder();
        if let Some(url) = lookup(ENV_URL) {
            builder = builder.base_url(url);
        }
        if let Some(access_key) = lookup(ENV_ACCESS_KEY) {
            builder = builder.access_key(access_key);
        }
        if let Some(secret_key) = lookup(ENV_SECRET_KEY) {
            builder = builder.secret_key(secret_key);
        }
        builder.build()
    }

    pub fn is_signing(&self) -> bool {
        self.credentials.is_some()
    }
}

/// Builder for [`ComlinkSettings`].
#[derive(Debug, Default)]
pub struct ComlinkSettingsBuilder {
    base_url: Option<String>,
    access_key: Option<String>,
    secret_key: Option<String>,
    http: Option<HttpConfig>,
    retry: Option<RetryPolicy>,
    scope: Option<ShutdownScope>,
}

impl ComlinkSettingsBuilder {
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn access_key(mut self, key: impl Into<String>) -> Self {
        self.access_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn secret_key(mut self, key: impl Into<String>) -> Self {
        self.secret_key = Some(key.into());
        self
    }

    /// Sets both halves of the HMAC credentials.
    #[must_use]
    pub fn hmac(self, access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.access_key(access_key).secret_key(secret_key)
    }

    #[must_use]
    pub fn http(mut self, http: HttpConfig) -> Self {
        self.http = Some(http);
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.http.get_or_insert_with(HttpConfig::default).request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.retry.get_or_insert_with(RetryPolicy::default).max_attempts = attempts;
        self
    }

    /// Share a cancellation scope with the rest of the application.
    #[must_use]
    pub fn scope(mut self, scope: ShutdownScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn build(self) -> ComlinkSettings {
        let access_key = self.access_key.unwrap_or_default();
        let secret_key = self.secret_key.unwrap_or_default();
        if access_key.is_empty() != secret_key.is_empty() {
            tracing::warn!("Only one of the HMAC keys is set; request signing is disabled");
        }

        ComlinkSettings {
            base_url: self.base_url.unwrap_or_default(),
            credentials: Credentials::new(access_key, secret_key),
            http: self.http.unwrap_or_default(),
            retry: self.retry.unwrap_or_default(),
            scope: self.scope,
        }
    }
}
