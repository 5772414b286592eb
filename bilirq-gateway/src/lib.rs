//! # bilirq gateway
//!
//! Client side of the bilirq request layer.
//!
//! A request flows through four stages:
//!
//! 1. [`rest::RequestSigner`] injects the app identifiers, a timestamp and
//!    the MD5 `sign` field (signed app requests only). Web requests instead
//!    carry the CSRF token on non-GET methods.
//! 2. A [`Transport`](bilirq_core::traits::Transport) performs the HTTP
//!    exchange; [`rest::HttpTransport`] is the reqwest-backed default.
//! 3. [`envelope::EnvelopeDecoder`] classifies the `{code, message, data}`
//!    envelope and extracts the payload.
//! 4. [`payload`] turns the payload into a dynamic value or a typed object,
//!    or parses the raw body as a protobuf message.
//!
//! Every terminal is async; callback forms are derived from it through
//! [`invoke`]. Shared session state lives in an explicit [`session::Session`].
//!
//! # Example
//!
//! ```ignore
//! use bilirq_gateway::prelude::*;
//!
//! let client = ApiClient::persistent(ClientConfig::default(), "session.json")?;
//! client.request_index().await?;
//!
//! let qr = client.request_login_qr().await?;
//! println!("scan {}", qr.url);
//! loop {
//!     match client.verify_login_qr(&qr.auth_code).await {
//!         LoginState::Waiting => tokio::time::sleep(Duration::from_secs(3)).await,
//!         state => break state,
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

/// Response envelope classification
pub mod envelope;

/// Client construction errors
pub mod error;

/// Async and callback invocation forms
pub mod invoke;

/// Login flows
pub mod login;

/// Payload decoders
pub mod payload;

/// Request client, signing and transport
pub mod rest;

/// Session state and persistence
pub mod session;

#[cfg(test)]
mod testing;

pub use error::GatewayError;
pub use rest::ApiClient;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::envelope::{DEFAULT_DATA_KEY, Envelope, EnvelopeDecoder, decode_envelope};
    pub use crate::error::GatewayError;
    pub use crate::invoke::{Completion, spawn_with_callback, suspend};
    pub use crate::login::{LoginQrCode, LoginResponse, LoginState};
    pub use crate::payload::{
        JsonDecoder, KeyStrategy, PayloadDecoder, decode_proto, decode_typed,
    };
    pub use crate::rest::{ApiClient, ClientConfig, HttpTransport, RequestBuilder, RequestSigner};
    pub use crate::session::{CookieJar, JsonFileStore, MemoryStore, Session};
    pub use bilirq_core::prelude::*;
}
