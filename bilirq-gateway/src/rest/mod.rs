//! Request client: configuration, signing and HTTP transport.

mod client;
mod config;
mod http;
mod signer;

pub use client::{ApiClient, RequestBuilder};
pub use config::{ClientConfig, ClientConfigBuilder, CookieConfig, Endpoints, PlatformConfig};
pub use http::HttpTransport;
pub use signer::{RequestSigner, SIGN_KEY, md5_hex, unix_timestamp};
