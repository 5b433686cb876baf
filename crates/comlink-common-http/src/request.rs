//! Request values and body buffering.

use bytes::Bytes;
use reqwest::Method;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Header names and values used on the wire.
pub mod headers {
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const X_DATE: &str = "X-Date";
}

/// A fully buffered HTTP request.
///
/// Cloning is cheap: the body is a reference-counted [`Bytes`] buffer, so
/// every attempt of a retried request sends the same bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    /// Headers in insertion order. A later entry with the same name replaces
    /// the earlier one.
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Set a header, replacing any existing value with the same
    /// (case-insensitive) name in place.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    /// Set a JSON body and the matching content type.
    #[must_use]
    pub fn json_body(self, body: impl Into<Bytes>) -> Self {
        self.header(headers::CONTENT_TYPE, headers::CONTENT_TYPE_JSON)
            .body(body)
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Look up a header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Read a one-shot body source to the end so it can be replayed.
pub async fn buffer_body<R>(mut reader: R) -> std::io::Result<Bytes>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer).await?;
    Ok(Bytes::from(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_json_descriptor() {
        let request = RequestDescriptor::post("http://localhost:3000/player")
            .json_body(r#"{"payload":{}}"#);

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "http://localhost:3000/player");
        assert_eq!(
            request.header_value("content-type"),
            Some(headers::CONTENT_TYPE_JSON)
        );
        assert_eq!(request.body.as_deref(), Some(&b"{\"payload\":{}}"[..]));
    }

    #[test]
    fn test_headers_keep_insertion_order() {
        let request = RequestDescriptor::get("http://localhost")
            .header("X-Date", "1")
            .header("Authorization", "a")
            .header("Content-Type", "application/json");

        let names: Vec<_> = request.headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["X-Date", "Authorization", "Content-Type"]);
    }

    #[test]
    fn test_header_replaces_existing() {
        let request = RequestDescriptor::get("http://localhost")
            .header("content-type", "text/plain")
            .header("X-Date", "1")
            .header("Content-Type", "application/json");

        assert_eq!(request.headers.len(), 2);
        assert_eq!(request.headers[0].1, "application/json");
    }

    #[test]
    fn test_get_has_no_body() {
        let request = RequestDescriptor::get("http://localhost/enums");
        assert!(request.body.is_none());
        assert!(request.headers.is_empty());
    }

    #[tokio::test]
    async fn test_buffer_body_reads_everything() {
        let source: &[u8] = b"{\"payload\":{\"allyCode\":\"813479227\"}}";
        let body = buffer_body(source).await.unwrap();
        assert_eq!(&body[..], source);
    }
}
