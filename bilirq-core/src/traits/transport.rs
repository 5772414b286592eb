//! Transport adapter trait.
//!
//! A transport performs exactly one HTTP exchange and hands back the raw
//! response body. It knows nothing about the vendor envelope; status
//! classification and decoding happen downstream.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TransportError;
use crate::types::Params;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET; parameters travel in the query string.
    #[default]
    Get,
    /// POST; parameters travel as a form body.
    Post,
    /// PUT; parameters travel as a form body.
    Put,
    /// DELETE; parameters travel as a form body.
    Delete,
}

impl HttpMethod {
    /// Returns the method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Returns true if parameters are sent in the query string.
    #[must_use]
    pub const fn uses_query(&self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully prepared request handed to a [`Transport`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL.
    pub url: String,
    /// Parameters, already signed if signing applies.
    pub params: Params,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// When true the request neither sends nor stores cookies.
    pub cookie_isolated: bool,
}

impl TransportRequest {
    /// Creates a request without parameters or headers.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    /// Returns true if a header named `name` is present (case-insensitive).
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

/// Performs one HTTP exchange.
///
/// Implementations return the response body for any HTTP status; only
/// failures to obtain a body at all are errors. At most one response is
/// produced per call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the raw response body.
    async fn send(&self, request: TransportRequest) -> Result<Vec<u8>, TransportError>;
}
