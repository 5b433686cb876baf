//! The seam between the retry loop and the network.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::{build_client, HttpConfig};
use crate::error::{HttpError, TransportError};
use crate::request::RequestDescriptor;
use crate::response::BufferedResponse;

/// Performs exactly one attempt of a request.
///
/// Implementations must be safe to share between concurrent callers.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestDescriptor) -> Result<BufferedResponse, TransportError>;
}

/// Transport backed by a pooled, keep-alive [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, HttpError> {
        Ok(Self {
            inner: build_client(config)?,
        })
    }

    /// Wrap an already configured client.
    pub fn from_client(inner: Client) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<BufferedResponse, TransportError> {
        let mut builder = self.inner.request(request.method, &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(BufferedResponse {
            status,
            headers,
            body,
        })
    }
}
