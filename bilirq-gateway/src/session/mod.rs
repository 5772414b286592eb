//! Session state: credential slot, cookie jar and their persistence.

pub mod context;
pub mod cookies;
pub mod credentials;
pub mod storage;

pub use context::Session;
pub use cookies::{CookieJar, BACKUP_KEY};
pub use credentials::{KeyValueCredentialStore, TOKEN_KEY};
pub use storage::{JsonFileStore, MemoryStore};
