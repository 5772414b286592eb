//! Session credential.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access credential for the current account.
///
/// There is a single current credential per session; it is replaced on
/// login or refresh and removed on logout or when the vendor reports the
/// session as invalid.
///
/// Both the vendor's snake_case keys and the camelCase keys used by older
/// persisted copies are accepted on deserialization.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Account identifier.
    #[serde(rename = "mid")]
    pub subject_id: i64,

    /// Token attached to authenticated requests as `access_key`.
    #[serde(alias = "accessToken")]
    pub access_token: String,

    /// Token used to obtain a new access token.
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,

    /// Lifetime of the access token in seconds.
    #[serde(alias = "expiresIn")]
    pub expires_in: i64,

    /// Absolute expiry, computed locally when the credential is issued.
    #[serde(default, alias = "expireDate", skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<DateTime<Utc>>,
}

impl Credential {
    /// Creates a credential without an expiry date.
    #[must_use]
    pub fn new(
        subject_id: i64,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in: i64,
    ) -> Self {
        Self {
            subject_id,
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_in,
            expire_date: None,
        }
    }

    /// Sets the expiry date to `issued_at + expires_in`.
    #[must_use]
    pub fn issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.expire_date = Some(issued_at + Duration::seconds(self.expires_in));
        self
    }

    /// Sets the expiry date relative to now.
    #[must_use]
    pub fn issued_now(self) -> Self {
        self.issued_at(Utc::now())
    }

    /// Returns true if the expiry date is known and has passed.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire_date.is_some_and(|date| date <= now)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("subject_id", &self.subject_id)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("expire_date", &self.expire_date)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_issued_at_sets_expiry() {
        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let credential = Credential::new(1, "a", "r", 3600).issued_at(issued);
        assert_eq!(
            credential.expire_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap())
        );
        assert!(!credential.is_expired_at(issued));
        assert!(credential.is_expired_at(issued + Duration::hours(2)));
    }

    #[test]
    fn test_deserialize_vendor_keys() {
        let json = r#"{"mid":42,"access_token":"at","refresh_token":"rt","expires_in":15552000}"#;
        let credential: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(credential.subject_id, 42);
        assert_eq!(credential.access_token, "at");
        assert!(credential.expire_date.is_none());
    }

    #[test]
    fn test_deserialize_camel_case_keys() {
        let json = r#"{"mid":7,"accessToken":"at","refreshToken":"rt","expiresIn":10}"#;
        let credential: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(credential.refresh_token, "rt");
        assert_eq!(credential.expires_in, 10);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let credential = Credential::new(1, "secret-access", "secret-refresh", 1);
        let debug = format!("{credential:?}");
        assert!(!debug.contains("secret-access"));
        assert!(debug.contains("[REDACTED]"));
    }
}
