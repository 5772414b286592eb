//! Data model shared by the request layer.

mod cookie;
mod credential;
mod params;

pub use cookie::{CookieEntry, normalize_domain};
pub use credential::Credential;
pub use params::Params;
