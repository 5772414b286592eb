//! QR login, stored login bundles and token refresh.

mod flow;
pub mod types;

pub use types::{CookieInfo, LoginCookie, LoginQrCode, LoginResponse, LoginState, StoredLogin};
