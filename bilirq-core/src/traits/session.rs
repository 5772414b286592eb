//! Session collaborator traits.
//!
//! The credential slot and the cookie jar are shared, mutable session state.
//! Neither offers transactional guarantees: concurrent writers race and the
//! last write wins.

use crate::error::StorageError;
use crate::types::{CookieEntry, Credential};

/// Flat string key-value persistence.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Holder of the single current credential.
pub trait CredentialStore: Send + Sync {
    /// Returns the current credential, if any.
    fn get(&self) -> Option<Credential>;

    /// Replaces the current credential.
    fn save(&self, credential: Credential);

    /// Removes the current credential.
    fn clear(&self);

    /// Returns true if a credential is stored.
    fn is_logged_in(&self) -> bool {
        self.get().is_some()
    }
}

/// Cookie storage shared by every request of a session.
pub trait CookieSink: Send + Sync {
    /// Merges `cookies` into the jar and backs the jar up.
    fn set_all(&self, cookies: Vec<CookieEntry>);

    /// Returns a snapshot of every stored cookie.
    fn all(&self) -> Vec<CookieEntry>;

    /// Persists the jar to its backup.
    fn backup(&self);

    /// Loads the backup into the jar.
    fn restore(&self);

    /// Empties the jar and deletes its backup.
    fn clear(&self);

    /// Returns the CSRF token cookie value, if present.
    fn csrf_token(&self) -> Option<String>;

    /// Returns the device identifier cookie value, or an empty string.
    fn device_id(&self) -> String;
}
