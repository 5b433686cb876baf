//! HTTP execution layer for the comlink client.
//!
//! Requests are plain values ([`RequestDescriptor`]) whose body is an
//! immutable [`bytes::Bytes`] buffer, so the retry loop in [`HttpClient`]
//! can replay the exact same bytes on every attempt. Only transport failures
//! are retried; any HTTP status, including 4xx and 5xx, is handed back to the
//! caller as a [`BufferedResponse`].

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;

pub use client::HttpClient;
pub use config::{build_client, HttpConfig, RetryPolicy};
pub use error::{HttpError, TransportError};
pub use request::{buffer_body, headers, RequestDescriptor};
pub use response::BufferedResponse;
pub use transport::{ReqwestTransport, Transport};
