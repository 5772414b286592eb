//! Vendor response envelope.
//!
//! Every JSON endpoint wraps its payload as
//! `{"code": int, "message": string, "<data_key>": any}`. A `code` of zero
//! is a logical success; anything else is a domain failure that carries the
//! message verbatim. The status code [`SESSION_INVALID_CODE`] additionally
//! clears the stored credential before the failure is returned.

use bilirq_core::error::{RequestError, RequestResult, SESSION_INVALID_CODE};
use bilirq_core::traits::CredentialStore;
use bilirq_core::value::ValueExt;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Default envelope key holding the payload.
pub const DEFAULT_DATA_KEY: &str = "data";

/// A parsed, not yet classified response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Status code; zero on success.
    pub code: i64,
    /// Vendor message; empty when absent.
    pub message: String,
    fields: Map<String, Value>,
}

impl Envelope {
    /// Parses `body` as an envelope.
    ///
    /// The body must be a JSON object. A missing `message` reads as the
    /// empty string. A missing or non-numeric `code` reads as `0` unless
    /// `strict` is set, in which case it is a decode failure.
    pub fn parse(body: &[u8], strict: bool) -> RequestResult<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| RequestError::decode(format!("invalid envelope: {e}")))?;
        let Value::Object(fields) = value else {
            return Err(RequestError::decode("invalid envelope: not a JSON object"));
        };

        let raw_code = fields.get("code").unwrap_or(&Value::Null);
        let code = if strict {
            raw_code
                .as_i64()
                .ok_or_else(|| RequestError::decode("invalid envelope: missing integer code"))?
        } else {
            raw_code.int_value()
        };
        let message = fields
            .get("message")
            .map(ValueExt::string_value)
            .unwrap_or_default();

        Ok(Self {
            code,
            message,
            fields,
        })
    }

    /// Returns true if the code signals success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Returns the value under `key`, or `null` if absent.
    #[must_use]
    pub fn get(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&Value::Null)
    }

    /// Consumes the envelope and returns the value under `key`.
    #[must_use]
    pub fn into_data(mut self, key: &str) -> Value {
        self.fields.remove(key).unwrap_or(Value::Null)
    }
}

/// Classifies envelopes and extracts their payload.
#[derive(Debug, Clone)]
pub struct EnvelopeDecoder {
    data_key: String,
    strict: bool,
}

impl Default for EnvelopeDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_KEY)
    }
}

impl EnvelopeDecoder {
    /// Creates a lenient decoder extracting `data_key`.
    #[must_use]
    pub fn new(data_key: impl Into<String>) -> Self {
        Self {
            data_key: data_key.into(),
            strict: false,
        }
    }

    /// Enables or disables strict `code` parsing.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Returns the payload key.
    #[must_use]
    pub fn data_key(&self) -> &str {
        &self.data_key
    }

    /// Decodes `body` and returns the payload on success.
    ///
    /// On [`SESSION_INVALID_CODE`] the credential in `credentials` is cleared
    /// before the status failure is returned.
    pub fn decode(&self, body: &[u8], credentials: &dyn CredentialStore) -> RequestResult<Value> {
        let envelope = Self::parse_logged(body, self.strict)?;

        if !envelope.is_success() {
            if envelope.code == SESSION_INVALID_CODE {
                info!("Session invalidated by server, clearing credential");
                credentials.clear();
            }
            warn!(code = envelope.code, message = %envelope.message, "Request returned error status");
            return Err(RequestError::status(envelope.code, envelope.message));
        }

        debug!(bytes = body.len(), data_key = %self.data_key, "Envelope decoded");
        Ok(envelope.into_data(&self.data_key))
    }

    fn parse_logged(body: &[u8], strict: bool) -> RequestResult<Envelope> {
        Envelope::parse(body, strict).inspect_err(|e| {
            warn!(bytes = body.len(), error = %e, "Failed to decode envelope");
        })
    }
}

/// Decodes `body` with the default lenient rules, extracting `data_key`.
pub fn decode_envelope(
    body: &[u8],
    data_key: &str,
    credentials: &dyn CredentialStore,
) -> RequestResult<Value> {
    EnvelopeDecoder::new(data_key).decode(body, credentials)
}
