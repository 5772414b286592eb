//! Collaborator trait definitions.
//!
//! The request pipeline talks to the outside world only through these
//! traits:
//! - [`Transport`] - performs one HTTP exchange
//! - [`CredentialStore`] - holds the current credential
//! - [`CookieSink`] - holds the session cookies
//! - [`KeyValueStore`] - flat persistence backing the two above

mod session;
mod transport;

pub use session::{CookieSink, CredentialStore, KeyValueStore};
pub use transport::{HttpMethod, Transport, TransportRequest};
