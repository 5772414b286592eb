//! HTTP transport built on reqwest.

use async_trait::async_trait;
use bilirq_core::error::TransportError;
use bilirq_core::traits::{HttpMethod, Transport, TransportRequest};
use reqwest::{Client, ClientBuilder, Method, header};
use std::sync::Arc;
use tracing::debug;

use super::config::ClientConfig;
use crate::session::CookieJar;

/// [`Transport`] backed by two reqwest clients.
///
/// The default client shares the session [`CookieJar`]; the second client
/// has no cookie store and serves cookie-isolated requests. Both use the
/// configured connect and whole-request timeouts.
///
/// The body is returned for any HTTP status. `User-Agent` and `Referer`
/// are added from the configuration when the request does not carry them.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    isolated: Client,
    user_agent: String,
    referer: String,
    timeout_ms: u64,
}

impl HttpTransport {
    /// Creates the transport.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if an HTTP client cannot be created.
    pub fn new(config: &ClientConfig, cookies: Arc<CookieJar>) -> Result<Self, TransportError> {
        let client = Self::client_builder(config)
            .cookie_provider(cookies)
            .build()
            .map_err(|e| TransportError::InvalidRequest {
                reason: format!("Failed to create HTTP client: {e}"),
            })?;
        let isolated = Self::client_builder(config)
            .build()
            .map_err(|e| TransportError::InvalidRequest {
                reason: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            isolated,
            user_agent: config.user_agent.clone(),
            referer: config.referer.clone(),
            timeout_ms: config.resource_timeout_ms,
        })
    }

    fn client_builder(config: &ClientConfig) -> ClientBuilder {
        Client::builder()
            .connect_timeout(config.request_timeout())
            .read_timeout(config.request_timeout())
            .timeout(config.resource_timeout())
    }

    fn map_error(&self, error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else if error.is_builder() {
            TransportError::InvalidRequest {
                reason: error.to_string(),
            }
        } else if error.is_body() || error.is_decode() {
            TransportError::Body {
                reason: error.to_string(),
            }
        } else {
            TransportError::ConnectionFailed {
                reason: error.to_string(),
            }
        }
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<Vec<u8>, TransportError> {
        let client = if request.cookie_isolated {
            &self.isolated
        } else {
            &self.client
        };

        let mut builder = client.request(to_method(request.method), &request.url);

        let params: Vec<(&str, &str)> = request.params.iter().collect();
        if !params.is_empty() {
            builder = if request.method.uses_query() {
                builder.query(&params)
            } else {
                builder.form(&params)
            };
        }

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.has_header(header::USER_AGENT.as_str()) {
            builder = builder.header(header::USER_AGENT, self.user_agent.as_str());
        }
        if !request.has_header(header::REFERER.as_str()) {
            builder = builder.header(header::REFERER, self.referer.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_error(&e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_error(&e))?;

        debug!(
            method = %request.method,
            url = %request.url,
            status = status.as_u16(),
            bytes = body.len(),
            isolated = request.cookie_isolated,
            "Response received"
        );

        Ok(body.to_vec())
    }
}
