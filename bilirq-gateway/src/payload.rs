//! Payload decoding.
//!
//! Four result shapes are produced from one response:
//! - raw bytes, straight from the transport;
//! - a dynamic [`serde_json::Value`] extracted from the envelope;
//! - a typed object, decoded from the re-serialized envelope payload by a
//!   [`PayloadDecoder`];
//! - a protobuf message, decoded from the raw transport bytes.
//!
//! Typed decoding requires a successful envelope. Raw and protobuf decoding
//! never look at the envelope.

use bilirq_core::error::{RequestError, RequestResult};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

/// Decodes a serialized payload into a typed value.
pub trait PayloadDecoder: Send + Sync {
    /// Error reported by the decoder.
    type Error: fmt::Display + fmt::Debug;

    /// Decodes `bytes` into `T`.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, Self::Error>;
}

/// How object keys are rewritten before deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStrategy {
    /// Keys are used as received.
    #[default]
    UseDefaultKeys,
    /// `snake_case` keys are rewritten to `camelCase`.
    ConvertFromSnakeCase,
    /// `camelCase` keys are rewritten to `snake_case`.
    ConvertToSnakeCase,
}

impl KeyStrategy {
    /// Rewrites a single key.
    #[must_use]
    pub fn apply(self, key: &str) -> String {
        match self {
            Self::UseDefaultKeys => key.to_string(),
            Self::ConvertFromSnakeCase => snake_to_camel(key),
            Self::ConvertToSnakeCase => camel_to_snake(key),
        }
    }

    /// Rewrites every object key in `value`, recursively.
    #[must_use]
    pub fn rewrite(self, value: Value) -> Value {
        match value {
            Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (self.apply(&key), self.rewrite(value)))
                    .collect::<Map<_, _>>(),
            ),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|item| self.rewrite(item)).collect())
            }
            other => other,
        }
    }
}

/// JSON payload decoder built on `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder {
    key_strategy: KeyStrategy,
}

impl JsonDecoder {
    /// Creates a decoder that uses keys as received.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key strategy.
    #[must_use]
    pub fn with_key_strategy(mut self, key_strategy: KeyStrategy) -> Self {
        self.key_strategy = key_strategy;
        self
    }

    /// Returns the key strategy.
    #[must_use]
    pub fn key_strategy(&self) -> KeyStrategy {
        self.key_strategy
    }
}

impl PayloadDecoder for JsonDecoder {
    type Error = serde_json::Error;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, Self::Error> {
        if self.key_strategy == KeyStrategy::UseDefaultKeys {
            return serde_json::from_slice(bytes);
        }
        let value: Value = serde_json::from_slice(bytes)?;
        serde_json::from_value(self.key_strategy.rewrite(value))
    }
}

/// Decodes an extracted envelope payload into `T`.
///
/// The payload is serialized back to bytes and handed to `decoder`. A
/// failure message combines the decoder error's text with its debug form.
pub fn decode_typed<T, D>(data: &Value, decoder: &D) -> RequestResult<T>
where
    T: DeserializeOwned,
    D: PayloadDecoder + ?Sized,
{
    let bytes = serde_json::to_vec(data).map_err(|e| RequestError::decode(format!("{e}{e:?}")))?;
    decoder
        .decode(&bytes)
        .map_err(|e| RequestError::decode(format!("{e}{e:?}")))
}

/// Decodes raw transport bytes as a protobuf message.
pub fn decode_proto<M>(bytes: &[u8]) -> RequestResult<M>
where
    M: prost::Message + Default,
{
    M::decode(bytes).map_err(|e| RequestError::decode(format!("protobuf decode error: {e}")))
}

fn snake_to_camel(key: &str) -> String {
    let body = key.trim_matches('_');
    if body.is_empty() || !body.contains('_') {
        return key.to_string();
    }
    let leading = &key[..key.len() - key.trim_start_matches('_').len()];
    let trailing = &key[key.trim_end_matches('_').len()..];

    let mut out = String::with_capacity(key.len());
    out.push_str(leading);
    for (index, word) in body.split('_').filter(|w| !w.is_empty()).enumerate() {
        if index == 0 {
            out.push_str(word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out.push_str(trailing);
    out
}

fn camel_to_snake(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (index, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = index > 0 && (chars[index - 1].is_lowercase() || chars[index - 1].is_ascii_digit());
            let next_lower = chars.get(index + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = index > 0 && chars[index - 1].is_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
