//! Client configuration.

use bilirq_core::config::Validatable;
use bilirq_core::error::ConfigError;
use bilirq_telemetry::masking::Sensitive;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`ApiClient`](super::ApiClient).
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Application key injected as `appkey` into signed requests.
    #[serde(default = "default_app_key")]
    pub app_key: String,

    /// Shared secret appended to the signature input.
    #[serde(skip_serializing, default = "default_app_secret")]
    pub app_secret: String,

    /// Fixed platform identifiers injected into signed requests.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Idle timeout in milliseconds, applied to connecting and to each read.
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Whole-resource timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub resource_timeout_ms: u64,

    /// `User-Agent` sent when the caller does not set one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// `Referer` sent when the caller does not set one.
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Envelope key holding the payload.
    #[serde(default = "default_data_key")]
    pub data_key: String,

    /// Treat a missing or non-numeric envelope `code` as a decode failure
    /// instead of success.
    #[serde(default)]
    pub strict_envelope: bool,

    /// Endpoint URLs.
    #[serde(default)]
    pub endpoints: Endpoints,

    /// Cookie names and lookup URL.
    #[serde(default)]
    pub cookies: CookieConfig,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("app_key", &self.app_key)
            .field("app_secret", &Sensitive::new(&self.app_secret))
            .field("platform", &self.platform)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("resource_timeout_ms", &self.resource_timeout_ms)
            .field("user_agent", &self.user_agent)
            .field("referer", &self.referer)
            .field("data_key", &self.data_key)
            .field("strict_envelope", &self.strict_envelope)
            .field("endpoints", &self.endpoints)
            .field("cookies", &self.cookies)
            .finish()
    }
}

/// Fixed device and platform identifiers sent with signed requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// `local_id` parameter.
    pub local_id: String,
    /// `mobi_app` parameter.
    pub mobi_app: String,
    /// `device` parameter.
    pub device: String,
    /// `device_name` parameter.
    pub device_name: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            local_id: "0".to_string(),
            mobi_app: "iphone".to_string(),
            device: "pad".to_string(),
            device_name: "iPad".to_string(),
        }
    }
}

/// Vendor endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Site root, fetched to collect anonymous cookies.
    pub index: String,
    /// QR login: request an auth code.
    pub login_qr: String,
    /// QR login: poll an auth code.
    pub verify_qr: String,
    /// Token refresh.
    pub refresh: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            index: "https://www.bilibili.com".to_string(),
            login_qr: "https://passport.bilibili.com/x/passport-tv-login/qrcode/auth_code"
                .to_string(),
            verify_qr: "https://passport.bilibili.com/x/passport-tv-login/qrcode/poll".to_string(),
            refresh: "https://passport.bilibili.com/api/v2/oauth2/refresh_token".to_string(),
        }
    }
}

/// Cookie lookups used by the request pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieConfig {
    /// URL whose cookies hold the CSRF token and device id.
    pub site_url: String,
    /// Name of the CSRF token cookie.
    pub csrf_name: String,
    /// Name of the device id cookie.
    pub device_id_name: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            site_url: "https://bilibili.com".to_string(),
            csrf_name: "bili_jct".to_string(),
            device_id_name: "buvid3".to_string(),
        }
    }
}

fn default_app_key() -> String {
    "5ae412b53418aac5".to_string()
}

fn default_app_secret() -> String {
    "5b9cf6c9786efd204dcf0c1ce2d08436".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string()
}

fn default_referer() -> String {
    "https://www.bilibili.com".to_string()
}

fn default_data_key() -> String {
    "data".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app_key: default_app_key(),
            app_secret: default_app_secret(),
            platform: PlatformConfig::default(),
            request_timeout_ms: default_timeout_ms(),
            resource_timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            referer: default_referer(),
            data_key: default_data_key(),
            strict_envelope: false,
            endpoints: Endpoints::default(),
            cookies: CookieConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a new builder for `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Returns the per-request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Returns the whole-resource timeout as a Duration.
    #[must_use]
    pub fn resource_timeout(&self) -> Duration {
        Duration::from_millis(self.resource_timeout_ms)
    }
}

impl Validatable for ClientConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.app_key.is_empty() {
            return Err(ConfigError::missing_field("app_key"));
        }
        if self.app_secret.is_empty() {
            return Err(ConfigError::missing_field("app_secret"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "request_timeout_ms",
                "must be positive",
            ));
        }
        if self.resource_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "resource_timeout_ms",
                "must be positive",
            ));
        }
        if self.data_key.is_empty() {
            return Err(ConfigError::missing_field("data_key"));
        }
        for (field, url) in [
            ("endpoints.index", &self.endpoints.index),
            ("endpoints.login_qr", &self.endpoints.login_qr),
            ("endpoints.verify_qr", &self.endpoints.verify_qr),
            ("endpoints.refresh", &self.endpoints.refresh),
            ("cookies.site_url", &self.cookies.site_url),
        ] {
            url::Url::parse(url).map_err(|e| ConfigError::invalid_value(field, e.to_string()))?;
        }
        Ok(())
    }
}

/// Builder for `ClientConfig`.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    app_key: Option<String>,
    app_secret: Option<Sensitive<String>>,
    platform: Option<PlatformConfig>,
    request_timeout_ms: Option<u64>,
    resource_timeout_ms: Option<u64>,
    user_agent: Option<String>,
    referer: Option<String>,
    data_key: Option<String>,
    strict_envelope: Option<bool>,
    endpoints: Option<Endpoints>,
    cookies: Option<CookieConfig>,
}

impl ClientConfigBuilder {
    /// Sets the application key.
    #[must_use]
    pub fn app_key(mut self, key: impl Into<String>) -> Self {
        self.app_key = Some(key.into());
        self
    }

    /// Sets the signing secret.
    #[must_use]
    pub fn app_secret(mut self, secret: impl Into<String>) -> Self {
        self.app_secret = Some(Sensitive::new(secret.into()));
        self
    }

    /// Sets the platform identifiers.
    #[must_use]
    pub fn platform(mut self, platform: PlatformConfig) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Sets the whole-resource timeout.
    #[must_use]
    pub fn resource_timeout(mut self, timeout: Duration) -> Self {
        self.resource_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Sets the default user agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the default referer.
    #[must_use]
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Sets the default envelope data key.
    #[must_use]
    pub fn data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = Some(key.into());
        self
    }

    /// Sets strict envelope parsing.
    #[must_use]
    pub fn strict_envelope(mut self, strict: bool) -> Self {
        self.strict_envelope = Some(strict);
        self
    }

    /// Sets the endpoint URLs.
    #[must_use]
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Sets the cookie lookups.
    #[must_use]
    pub fn cookies(mut self, cookies: CookieConfig) -> Self {
        self.cookies = Some(cookies);
        self
    }

    /// Builds the `ClientConfig`.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            app_key: self.app_key.unwrap_or_else(default_app_key),
            app_secret: self
                .app_secret
                .map_or_else(default_app_secret, Sensitive::into_inner),
            platform: self.platform.unwrap_or_default(),
            request_timeout_ms: self.request_timeout_ms.unwrap_or_else(default_timeout_ms),
            resource_timeout_ms: self.resource_timeout_ms.unwrap_or_else(default_timeout_ms),
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
            referer: self.referer.unwrap_or_else(default_referer),
            data_key: self.data_key.unwrap_or_else(default_data_key),
            strict_envelope: self.strict_envelope.unwrap_or(false),
            endpoints: self.endpoints.unwrap_or_default(),
            cookies: self.cookies.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bilirq_core::config::{ConfigFormat, ConfigLoader};

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::builder()
            .app_key("key")
            .app_secret("secret")
            .request_timeout(Duration::from_secs(5))
            .data_key("result")
            .strict_envelope(true)
            .build();

        assert_eq!(config.app_key, "key");
        assert_eq!(config.app_secret, "secret");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.resource_timeout(), Duration::from_secs(10));
        assert_eq!(config.data_key, "result");
        assert!(config.strict_envelope);
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();

        assert_eq!(config.request_timeout_ms, 10_000);
        assert_eq!(config.resource_timeout_ms, 10_000);
        assert_eq!(config.data_key, "data");
        assert_eq!(config.platform.mobi_app, "iphone");
        assert_eq!(config.cookies.csrf_name, "bili_jct");
        assert!(!config.strict_envelope);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secret_not_serialized() {
        let config = ClientConfig::builder().app_secret("top-secret").build();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("top-secret"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ClientConfig::builder()
            .app_key("visible-key")
            .app_secret("top-secret")
            .build();
        let debug = format!("{config:?}");
        assert!(debug.contains("visible-key"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("top-secret"));

        let builder = ClientConfig::builder().app_secret("top-secret");
        assert!(!format!("{builder:?}").contains("top-secret"));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = ClientConfig::builder()
            .request_timeout(Duration::ZERO)
            .build();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_bad_endpoint() {
        let config = ClientConfig::builder()
            .endpoints(Endpoints {
                refresh: "not a url".to_string(),
                ..Endpoints::default()
            })
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml() {
        let toml = r#"
            app_key = "abc"
            request_timeout_ms = 2500
            strict_envelope = true

            [platform]
            local_id = "0"
            mobi_app = "android"
            device = "phone"
            device_name = "Pixel"
        "#;
        let config: ClientConfig = ConfigLoader::new().load_str(toml, ConfigFormat::Toml).unwrap();

        assert_eq!(config.app_key, "abc");
        assert_eq!(config.request_timeout_ms, 2500);
        assert_eq!(config.platform.mobi_app, "android");
        assert_eq!(config.data_key, "data");
        assert!(!config.app_secret.is_empty());
    }
}
