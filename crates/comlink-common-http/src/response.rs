//! Buffered responses.

use bytes::Bytes;
use serde::de::DeserializeOwned;

/// A response whose body has been read completely within the attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl BufferedResponse {
    /// The single status the gateway uses for success.
    pub const OK: u16 = 200;

    pub fn is_ok(&self) -> bool {
        self.status == Self::OK
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
