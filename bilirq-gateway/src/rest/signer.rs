//! Request signing utilities.
//!
//! Signed requests carry the application key, the platform identifiers and
//! a Unix timestamp. The `sign` field is an MD5 digest over every other
//! field serialized as `key=value` pairs in ascending key order, joined by
//! `&`, with the shared secret appended. It is always computed last.

use bilirq_core::types::Params;
use bilirq_telemetry::masking::Sensitive;
use md5::{Digest, Md5};

use super::config::{ClientConfig, PlatformConfig};

/// Name of the signature parameter.
pub const SIGN_KEY: &str = "sign";

/// Request signer for app API authentication.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    app_key: String,
    secret: Sensitive<String>,
    platform: PlatformConfig,
}

impl RequestSigner {
    /// Creates a new request signer.
    #[must_use]
    pub fn new(
        app_key: impl Into<String>,
        secret: impl Into<String>,
        platform: PlatformConfig,
    ) -> Self {
        Self {
            app_key: app_key.into(),
            secret: Sensitive::new(secret.into()),
            platform,
        }
    }

    /// Creates a signer from the client configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.app_key, &config.app_secret, config.platform.clone())
    }

    /// Returns the application key.
    #[must_use]
    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    /// Signs `params` using the current wall-clock time.
    #[must_use]
    pub fn sign(&self, params: Params) -> Params {
        self.sign_at(params, unix_timestamp())
    }

    /// Signs `params` with a fixed timestamp.
    ///
    /// Any `sign` field already present is discarded before the digest is
    /// computed.
    #[must_use]
    pub fn sign_at(&self, mut params: Params, timestamp: i64) -> Params {
        params.insert("appkey", &self.app_key);
        params.insert("ts", timestamp);
        params.insert("local_id", &self.platform.local_id);
        params.insert("mobi_app", &self.platform.mobi_app);
        params.insert("device", &self.platform.device);
        params.insert("device_name", &self.platform.device_name);
        params.remove(SIGN_KEY);

        let signature = self.signature(&params);
        params.insert(SIGN_KEY, signature);
        params
    }

    /// Computes the signature over every field of `params` except `sign`.
    #[must_use]
    pub fn signature(&self, params: &Params) -> String {
        let mut raw = params
            .iter()
            .filter(|(key, _)| *key != SIGN_KEY)
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        raw.push_str(self.secret.expose());
        md5_hex(&raw)
    }

    /// Returns true if the `sign` field matches the other fields.
    #[must_use]
    pub fn verify(&self, params: &Params) -> bool {
        params
            .get(SIGN_KEY)
            .is_some_and(|sign| sign == self.signature(params))
    }
}

/// Returns the lowercase hex MD5 digest of `input`.
#[must_use]
pub fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

/// Returns the current Unix timestamp in seconds.
#[must_use]
pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
