//! Explicit session context.

use bilirq_core::error::StorageError;
use bilirq_core::traits::{CookieSink, CredentialStore, KeyValueStore};
use bilirq_core::types::Credential;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::cookies::CookieJar;
use super::credentials::KeyValueCredentialStore;
use super::storage::{JsonFileStore, MemoryStore};
use crate::rest::CookieConfig;

/// Shared session state: the current credential and the cookie jar.
///
/// A session is cheap to clone; clones share the same underlying state. One
/// session is normally held by one long-lived [`ApiClient`](crate::ApiClient).
#[derive(Clone)]
pub struct Session {
    credentials: Arc<dyn CredentialStore>,
    cookies: Arc<CookieJar>,
}

impl Session {
    /// Creates a session from explicit collaborators.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>, cookies: Arc<CookieJar>) -> Self {
        Self {
            credentials,
            cookies,
        }
    }

    /// Creates a session whose credential and cookie backup share `store`.
    #[must_use]
    pub fn with_store(store: Arc<dyn KeyValueStore>, config: CookieConfig) -> Self {
        let credentials = Arc::new(KeyValueCredentialStore::new(store.clone()));
        let cookies = Arc::new(CookieJar::new(store, config));
        Self::new(credentials, cookies)
    }

    /// Creates a session that keeps everything in memory.
    #[must_use]
    pub fn in_memory(config: CookieConfig) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), config)
    }

    /// Opens a session persisted to the JSON file at `path` and restores
    /// the backed up cookies.
    pub fn persistent(path: impl Into<PathBuf>, config: CookieConfig) -> Result<Self, StorageError> {
        let store = JsonFileStore::open(path)?;
        info!(path = %store.path().display(), "Opened persistent session");
        let session = Self::with_store(Arc::new(store), config);
        session.cookies.restore();
        Ok(session)
    }

    /// Returns the credential store.
    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Returns the cookie jar.
    #[must_use]
    pub fn cookies(&self) -> &Arc<CookieJar> {
        &self.cookies
    }

    /// Returns the current credential.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.credentials.get()
    }

    /// Returns true if a credential is stored.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.credentials.is_logged_in()
    }

    /// Forgets the credential and every cookie, backup included.
    pub fn logout(&self) {
        self.credentials.clear();
        self.cookies.clear();
        info!("Logged out");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("logged_in", &self.is_logged_in())
            .field("cookies", &self.cookies)
            .finish()
    }
}
