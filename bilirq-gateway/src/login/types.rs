//! Login payloads.

use bilirq_core::types::{CookieEntry, Credential};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Auth code and QR target returned when a QR login starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginQrCode {
    /// Code to poll with.
    pub auth_code: String,
    /// URL to render as a QR code.
    pub url: String,
}

/// Successful login or token refresh payload.
///
/// Bundles persisted by older clients use camelCase keys; both spellings
/// are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Issued credential.
    #[serde(alias = "tokenInfo")]
    pub token_info: Credential,
    /// Web cookies issued alongside the credential.
    #[serde(default, alias = "cookieInfo")]
    pub cookie_info: CookieInfo,
}

/// Cookies issued by a login, shared by every listed domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieInfo {
    /// Domains each cookie is set for.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Cookie records.
    #[serde(default)]
    pub cookies: Vec<LoginCookie>,
}

/// One cookie record in a login payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Non-zero when the cookie is HttpOnly.
    #[serde(default, alias = "httpOnly")]
    pub http_only: i64,
    /// Expiry as Unix seconds.
    #[serde(default)]
    pub expires: i64,
}

impl CookieInfo {
    /// Expands every cookie once per domain.
    #[must_use]
    pub fn to_cookies(&self) -> Vec<CookieEntry> {
        self.domains
            .iter()
            .flat_map(|domain| self.cookies.iter().map(move |c| c.to_cookie(domain)))
            .collect()
    }
}

impl LoginCookie {
    /// Builds the jar entry for `domain`.
    #[must_use]
    pub fn to_cookie(&self, domain: &str) -> CookieEntry {
        let cookie = CookieEntry::new(&self.name, &self.value, domain).with_http_only(self.http_only != 0);
        match DateTime::from_timestamp(self.expires, 0) {
            Some(expires) if self.expires > 0 => cookie.with_expires(expires),
            _ => cookie,
        }
    }
}

/// Login bundle kept on an external store: a login response serialized as
/// a JSON string inside `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLogin {
    /// Record id.
    pub id: i64,
    /// Escaped [`LoginResponse`] JSON.
    pub content: String,
}

/// Outcome of one QR login poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    /// The user confirmed; the credential has been stored.
    Success(Credential),
    /// Not scanned or not confirmed yet.
    Waiting,
    /// The auth code expired; a new QR code is needed.
    Expired,
    /// Any other failure.
    Failed,
}

impl LoginState {
    /// Vendor code for a code that has not been scanned.
    pub const NOT_SCANNED: i64 = 86039;
    /// Vendor code for a scanned but unconfirmed code.
    pub const NOT_CONFIRMED: i64 = 86090;
    /// Vendor code for an expired code.
    pub const EXPIRED: i64 = 86038;

    /// Maps a poll status code to a pending state.
    #[must_use]
    pub fn from_status(code: i64) -> Self {
        match code {
            Self::NOT_SCANNED | Self::NOT_CONFIRMED => Self::Waiting,
            Self::EXPIRED => Self::Expired,
            _ => Self::Failed,
        }
    }

    /// Returns true while polling should continue.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Waiting)
    }
}
