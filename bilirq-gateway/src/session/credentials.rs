//! Credential slot backed by key-value persistence.

use bilirq_core::traits::{CredentialStore, KeyValueStore};
use bilirq_core::types::Credential;
use std::sync::Arc;
use tracing::{debug, warn};

/// Key the current credential is stored under.
pub const TOKEN_KEY: &str = "token";

/// Stores the single current [`Credential`] as JSON in a [`KeyValueStore`].
///
/// Persistence failures are logged and otherwise ignored: a credential that
/// cannot be read back behaves as if none were stored.
#[derive(Clone)]
pub struct KeyValueCredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl KeyValueCredentialStore {
    /// Creates a credential store over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for KeyValueCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueCredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore for KeyValueCredentialStore {
    fn get(&self) -> Option<Credential> {
        let raw = match self.store.get(TOKEN_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!(error = %e, "Stored credential is unreadable");
                None
            }
        }
    }

    fn save(&self, credential: Credential) {
        let raw = match serde_json::to_string(&credential) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to serialize credential");
                return;
            }
        };
        if let Err(e) = self.store.set(TOKEN_KEY, raw) {
            warn!(error = %e, "Failed to persist credential");
            return;
        }
        debug!(subject_id = credential.subject_id, "Credential saved");
    }

    fn clear(&self) {
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            warn!(error = %e, "Failed to remove credential");
            return;
        }
        debug!("Credential cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn store() -> (Arc<MemoryStore>, KeyValueCredentialStore) {
        let backing = Arc::new(MemoryStore::new());
        let credentials = KeyValueCredentialStore::new(backing.clone());
        (backing, credentials)
    }

    #[test]
    fn test_save_get_clear() {
        let (_, credentials) = store();
        assert!(!credentials.is_logged_in());

        let issued = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let credential = Credential::new(42, "access", "refresh", 60).issued_at(issued);
        credentials.save(credential.clone());

        assert!(credentials.is_logged_in());
        assert_eq!(credentials.get(), Some(credential));

        credentials.clear();
        assert!(credentials.get().is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let (_, credentials) = store();
        credentials.save(Credential::new(1, "first", "r", 1));
        credentials.save(Credential::new(2, "second", "r", 1));

        assert_eq!(credentials.get().map(|c| c.access_token).as_deref(), Some("second"));
    }

    #[test]
    fn test_stored_under_token_key() {
        let (backing, credentials) = store();
        credentials.save(Credential::new(7, "a", "r", 1));

        let raw = backing.get(TOKEN_KEY).unwrap().unwrap();
        assert!(raw.contains("\"mid\":7"));
    }

    #[test]
    fn test_unreadable_credential_is_absent() {
        let (backing, credentials) = store();
        backing.set(TOKEN_KEY, "garbage".to_string()).unwrap();

        assert!(credentials.get().is_none());
        assert!(!credentials.is_logged_in());
    }
}
