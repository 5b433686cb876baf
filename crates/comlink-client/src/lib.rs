//! Client for the comlink JSON gateway.
//!
//! A call runs through three stages. The caller's [`RequestBody`] is
//! projected onto its sparse wire form, where zero-valued fields are left
//! out. The serialized bytes are signed with HMAC-SHA256 when credentials are
//! configured. The request then goes through the retrying engine in
//! [`comlink_common_http`], and the response is decoded into a JSON object
//! or a typed [`ComlinkError`].
//!
//! ```no_run
//! use comlink_client::{ComlinkClient, ComlinkSettings, RequestBody};
//!
//! # async fn run() -> Result<(), comlink_client::ComlinkError> {
//! let settings = ComlinkSettings::builder()
//!     .base_url("http://localhost:3000")
//!     .build();
//! let client = ComlinkClient::new(settings)?;
//! let player = client.player(&RequestBody::for_ally_code("813479227")).await?;
//! println!("{}", player["name"]);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod payload;
pub mod settings;
pub mod signer;
pub mod sparse;

pub use client::{handle_response, ComlinkClient, JsonObject};
pub use credentials::{Credentials, Secret, SecretString};
pub use endpoints::paths;
pub use error::{ComlinkError, GatewayError};
pub use payload::{
    ClientSpecs, ClientSpecsWire, LeaderboardId, LeaderboardIdWire, Payload, PayloadWire,
    RequestBody, RequestBodyWire, SearchCriteria, SearchCriteriaWire,
};
pub use settings::{ComlinkSettings, ComlinkSettingsBuilder};
pub use signer::{content_digest, Clock, FixedClock, RequestSigner, SignedHeaders, SigningError, SystemClock};
pub use sparse::{encode, encode_json, Sparse};

pub use comlink_common_async::ShutdownScope;
pub use comlink_common_http::{BufferedResponse, HttpConfig, HttpError, RetryPolicy, TransportError};
