//! The gateway client: encode, sign, dispatch, interpret.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::{debug, Instrument};
use url::Url;

use comlink_common_async::ShutdownScope;
use comlink_common_http::{BufferedResponse, HttpClient, ReqwestTransport, RequestDescriptor, Transport};
use comlink_common_log::spans::{request_span, Timer};

use crate::error::{ComlinkError, GatewayError};
use crate::settings::ComlinkSettings;
use crate::signer::{Clock, RequestSigner};
use crate::sparse::{encode_json, Sparse};

/// Decoded success body. The gateway defines its schema.
pub type JsonObject = Map<String, Value>;

/// Client for one gateway instance.
///
/// Cheap to share behind an `Arc`; every call borrows the client immutably
/// and the underlying connection pool handles concurrent use.
pub struct ComlinkClient<T = ReqwestTransport> {
    base_url: String,
    signer: Option<RequestSigner>,
    http: HttpClient<T>,
}

impl<T> std::fmt::Debug for ComlinkClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComlinkClient")
            .field("base_url", &self.base_url)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl ComlinkClient<ReqwestTransport> {
    /// Validate `settings` and build a client on a pooled reqwest transport.
    pub fn new(settings: ComlinkSettings) -> Result<Self, ComlinkError> {
        // Validate before touching the network stack.
        validate_base_url(&settings.base_url)?;
        let transport = ReqwestTransport::new(&settings.http)?;
        Self::with_transport(settings, transport)
    }
}

impl<T: Transport> ComlinkClient<T> {
    /// Build a client on a caller-supplied transport.
    pub fn with_transport(settings: ComlinkSettings, transport: T) -> Result<Self, ComlinkError> {
        let base_url = validate_base_url(&settings.base_url)?;
        let scope = settings.scope.unwrap_or_default();
        let signer = settings.credentials.map(RequestSigner::new);

        debug!(base_url = %base_url, signing = signer.is_some(), "Created comlink client");

        Ok(Self {
            base_url,
            signer,
            http: HttpClient::with_transport(transport, settings.retry, scope),
        })
    }

    /// Replace the signing clock. Has no effect when signing is disabled.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.signer = self
            .signer
            .map(|signer| RequestSigner::with_clock(signer.credentials().clone(), clock));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_signing(&self) -> bool {
        self.signer.is_some()
    }

    pub fn http(&self) -> &HttpClient<T> {
        &self.http
    }

    pub fn scope(&self) -> &ShutdownScope {
        self.http.scope()
    }

    /// Absolute URL for `endpoint`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint_path(endpoint))
    }

    /// Encode `payload`, sign it if credentials are configured, and build the request.
    ///
    /// The bytes that are signed are the bytes that are sent.
    pub fn build_post<P>(&self, endpoint: &str, payload: &P) -> Result<RequestDescriptor, ComlinkError>
    where
        P: Sparse,
        P::Wire: Default,
    {
        let body = Bytes::from(encode_json(payload).map_err(ComlinkError::Encoding)?);
        self.build_post_bytes(endpoint, body)
    }

    fn build_post_bytes(&self, endpoint: &str, body: Bytes) -> Result<RequestDescriptor, ComlinkError> {
        // The signed path must be the path that is sent.
        let path = endpoint_path(endpoint);
        let request = RequestDescriptor::post(format!("{}{}", self.base_url, path));
        let request = match &self.signer {
            Some(signer) => signer.sign(&path, &body)?.apply(request),
            None => request,
        };
        Ok(request.json_body(body))
    }

    /// POST `payload` to `endpoint` and return the response without interpreting it.
    pub async fn post_raw<P>(&self, endpoint: &str, payload: &P) -> Result<BufferedResponse, ComlinkError>
    where
        P: Sparse,
        P::Wire: Default,
    {
        let request = self.build_post(endpoint, payload)?;
        self.send_traced("POST", endpoint, request).await
    }

    /// POST an already serialized JSON body, signing it like any other payload.
    pub async fn post_json(&self, endpoint: &str, body: impl Into<Bytes>) -> Result<JsonObject, ComlinkError> {
        let request = self.build_post_bytes(endpoint, body.into())?;
        self.dispatch("POST", endpoint, request).await
    }

    /// POST `payload` to `endpoint` and decode the JSON object it returns.
    ///
    /// Any status other than 200 is an error: [`ComlinkError::BadStatus`] when
    /// the body carries the gateway's `{code, message}` shape, otherwise
    /// [`ComlinkError::Protocol`].
    pub async fn post<P>(&self, endpoint: &str, payload: &P) -> Result<JsonObject, ComlinkError>
    where
        P: Sparse,
        P::Wire: Default,
    {
        let request = self.build_post(endpoint, payload)?;
        self.dispatch("POST", endpoint, request).await
    }

    /// Unsigned GET, returned without interpretation.
    pub async fn get_raw(&self, endpoint: &str) -> Result<BufferedResponse, ComlinkError> {
        let request = RequestDescriptor::get(self.endpoint_url(endpoint));
        self.send_traced("GET", endpoint, request).await
    }

    /// Unsigned GET, decoded like [`Self::post`].
    pub async fn get(&self, endpoint: &str) -> Result<JsonObject, ComlinkError> {
        let request = RequestDescriptor::get(self.endpoint_url(endpoint));
        self.dispatch("GET", endpoint, request).await
    }

    async fn dispatch(
        &self,
        method: &'static str,
        endpoint: &str,
        request: RequestDescriptor,
    ) -> Result<JsonObject, ComlinkError> {
        self.send_traced(method, endpoint, request)
            .await
            .and_then(handle_response)
    }

    /// Execute `request` inside a request span, timing the whole retry loop.
    async fn send_traced(
        &self,
        method: &'static str,
        endpoint: &str,
        request: RequestDescriptor,
    ) -> Result<BufferedResponse, ComlinkError> {
        let path = endpoint_path(endpoint);
        async {
            let timer = Timer::start("comlink_request");
            let result = self.http.execute(request).await.map_err(ComlinkError::from);
            timer.finish();
            result
        }
        .instrument(request_span(method, &path))
        .await
    }

    /// Cancel the scope: running attempts abort and no new ones start.
    pub fn cancel(&self) {
        self.http.scope().cancel();
    }

    /// Wait for every in-flight attempt to finish.
    pub async fn shutdown(&self) {
        self.http.scope().drain().await;
    }

    /// Number of attempts currently on the wire.
    pub fn in_flight(&self) -> usize {
        self.http.in_flight()
    }
}

/// Interpret a buffered response: 200 decodes to an object, anything else is an error.
pub fn handle_response(response: BufferedResponse) -> Result<JsonObject, ComlinkError> {
    let status = response.status;
    let protocol = |source| ComlinkError::Protocol {
        status,
        body: response.text(),
        source,
    };

    if response.is_ok() {
        return response.json::<JsonObject>().map_err(protocol);
    }

    match response.json::<GatewayError>() {
        Ok(error) => {
            debug!(status, code = %error.code, "Gateway returned an error");
            Err(ComlinkError::BadStatus { status, error })
        }
        Err(source) => Err(protocol(source)),
    }
}

/// `endpoint` with exactly one leading `/`.
fn endpoint_path(endpoint: &str) -> Cow<'_, str> {
    if endpoint.starts_with('/') {
        Cow::Borrowed(endpoint)
    } else {
        Cow::Owned(format!("/{endpoint}"))
    }
}

/// Parse `raw` as an absolute base URL and drop any trailing `/`.
fn validate_base_url(raw: &str) -> Result<String, ComlinkError> {
    if raw.trim().is_empty() {
        return Err(ComlinkError::MissingBaseUrl);
    }

    let malformed = |reason: String| ComlinkError::MalformedBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| malformed(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(malformed("not an absolute URL".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(malformed("must not carry a query or fragment".to_string()));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
