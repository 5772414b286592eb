//! Cookie records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single cookie held by the session cookie jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieEntry {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain the cookie applies to, without a leading dot.
    pub domain: String,
    /// Path prefix the cookie applies to.
    #[serde(default = "default_path")]
    pub path: String,
    /// Absolute expiry; `None` for session cookies.
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    /// Whether the cookie is hidden from scripts.
    #[serde(default)]
    pub http_only: bool,
    /// Whether the cookie is only sent over HTTPS.
    #[serde(default)]
    pub secure: bool,
}

fn default_path() -> String {
    "/".to_string()
}

impl CookieEntry {
    /// Creates a session cookie for `domain` with path `/`.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: normalize_domain(&domain.into()),
            path: default_path(),
            expires: None,
            http_only: false,
            secure: false,
        }
    }

    /// Sets the expiry.
    #[must_use]
    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Sets the HttpOnly flag.
    #[must_use]
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Sets the path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.is_empty() { default_path() } else { path };
        self
    }

    /// Returns true if the cookie has an expiry at or before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    /// Returns true if the cookie should be sent to `host` for `path`.
    ///
    /// The cookie domain matches the host itself and any of its subdomains.
    #[must_use]
    pub fn matches(&self, host: &str, path: &str) -> bool {
        let host = host.to_ascii_lowercase();
        let domain_ok = host == self.domain
            || host
                .strip_suffix(self.domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'));
        domain_ok && path.starts_with(self.path.as_str())
    }

    /// Returns true if `other` names the same cookie slot (name, domain, path).
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }
}

/// Lowercases a cookie domain and strips the leading dot.
#[must_use]
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_start_matches('.').to_ascii_lowercase()
}
