//! Session cookie jar.
//!
//! [`CookieJar`] is shared by every request of a session. It is installed as
//! the reqwest cookie provider so `Set-Cookie` headers are captured and
//! matching cookies are sent automatically, and it can be backed up to and
//! restored from a [`KeyValueStore`] under [`BACKUP_KEY`].

use bilirq_core::traits::{CookieSink, KeyValueStore};
use bilirq_core::types::{CookieEntry, normalize_domain};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use reqwest::header::HeaderValue;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::rest::CookieConfig;

/// Key the cookie backup is stored under.
pub const BACKUP_KEY: &str = "SavedCookie";

/// Thread-safe cookie jar with key-value backup.
pub struct CookieJar {
    cookies: RwLock<Vec<CookieEntry>>,
    store: Arc<dyn KeyValueStore>,
    config: CookieConfig,
}

impl CookieJar {
    /// Creates an empty jar backed up to `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, config: CookieConfig) -> Self {
        Self {
            cookies: RwLock::new(Vec::new()),
            store,
            config,
        }
    }

    /// Inserts a cookie, replacing any cookie in the same slot.
    ///
    /// An already expired cookie deletes the slot instead.
    pub fn insert(&self, cookie: CookieEntry) {
        let mut cookies = self.cookies.write();
        cookies.retain(|existing| !existing.same_slot(&cookie));
        if !cookie.is_expired_at(Utc::now()) {
            cookies.push(cookie);
        }
    }

    /// Returns the live cookies that would be sent to `url`.
    #[must_use]
    pub fn cookies_for(&self, url: &Url) -> Vec<CookieEntry> {
        let Some(host) = url.host_str() else {
            return Vec::new();
        };
        let now = Utc::now();
        let https = url.scheme() == "https";
        self.cookies
            .read()
            .iter()
            .filter(|c| !c.is_expired_at(now))
            .filter(|c| https || !c.secure)
            .filter(|c| c.matches(host, url.path()))
            .cloned()
            .collect()
    }

    /// Returns the value of cookie `name` as seen by `url`.
    #[must_use]
    pub fn value_for(&self, url: &str, name: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        self.cookies_for(&url)
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| c.value)
    }

    /// Deletes the backup without touching the jar.
    pub fn remove_backup(&self) {
        if let Err(e) = self.store.remove(BACKUP_KEY) {
            warn!(error = %e, "Failed to remove cookie backup");
        }
    }

    /// Returns the number of stored cookies, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.read().len()
    }

    /// Returns true if the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.read().is_empty()
    }
}

impl std::fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieJar")
            .field("cookies", &self.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CookieSink for CookieJar {
    fn set_all(&self, cookies: Vec<CookieEntry>) {
        let count = cookies.len();
        for cookie in cookies {
            self.insert(cookie);
        }
        debug!(count, "Cookies merged into jar");
        self.backup();
    }

    fn all(&self) -> Vec<CookieEntry> {
        self.cookies.read().clone()
    }

    fn backup(&self) {
        let now = Utc::now();
        let live: Vec<CookieEntry> = self
            .cookies
            .read()
            .iter()
            .filter(|c| !c.is_expired_at(now))
            .cloned()
            .collect();
        let raw = match serde_json::to_string(&live) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cookies");
                return;
            }
        };
        if let Err(e) = self.store.set(BACKUP_KEY, raw) {
            warn!(error = %e, "Failed to back up cookies");
        }
    }

    fn restore(&self) {
        let raw = match self.store.get(BACKUP_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Failed to read cookie backup");
                return;
            }
        };
        let cookies: Vec<CookieEntry> = match serde_json::from_str(&raw) {
            Ok(cookies) => cookies,
            Err(e) => {
                warn!(error = %e, "Cookie backup is unreadable");
                return;
            }
        };
        let count = cookies.len();
        for cookie in cookies {
            self.insert(cookie);
        }
        debug!(count, "Cookies restored");
    }

    fn clear(&self) {
        self.cookies.write().clear();
        self.remove_backup();
    }

    fn csrf_token(&self) -> Option<String> {
        self.value_for(&self.config.site_url, &self.config.csrf_name)
    }

    fn device_id(&self) -> String {
        self.value_for(&self.config.site_url, &self.config.device_id_name)
            .unwrap_or_default()
    }
}

impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let Some(host) = url.host_str() else {
            return;
        };
        for header in cookie_headers {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            if let Some(cookie) = parse_set_cookie(raw, host, Utc::now()) {
                self.insert(cookie);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .cookies_for(url)
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        if header.is_empty() {
            return None;
        }
        HeaderValue::from_str(&header).ok()
    }
}

/// Parses one `Set-Cookie` header received from `host`.
///
/// `Max-Age` takes precedence over `Expires`. A non-positive `Max-Age`
/// yields a cookie that is already expired, which deletes the slot.
fn parse_set_cookie(raw: &str, host: &str, now: DateTime<Utc>) -> Option<CookieEntry> {
    let mut parts = raw.split(';');
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut cookie = CookieEntry::new(name, value.trim().trim_matches('"'), host);
    let mut max_age = None;

    for attribute in parts {
        let (key, val) = attribute
            .split_once('=')
            .map_or((attribute.trim(), ""), |(k, v)| (k.trim(), v.trim()));
        match key.to_ascii_lowercase().as_str() {
            "domain" if !val.is_empty() => cookie.domain = normalize_domain(val),
            "path" => cookie = cookie.with_path(val),
            "expires" => {
                if let Some(expires) = parse_http_date(val) {
                    cookie.expires = Some(expires);
                }
            }
            "max-age" => max_age = val.parse::<i64>().ok(),
            "httponly" => cookie.http_only = true,
            "secure" => cookie.secure = true,
            _ => {}
        }
    }

    if let Some(seconds) = max_age {
        cookie.expires = Some(if seconds <= 0 {
            DateTime::<Utc>::UNIX_EPOCH
        } else {
            now + Duration::seconds(seconds)
        });
    }

    Some(cookie)
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc2822(&value.replace('-', " ")))
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
