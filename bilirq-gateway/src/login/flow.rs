//! Login, refresh and logout flows.
//!
//! Each method performs a single exchange. Polling a QR code until it is
//! confirmed is left to the caller.

use bilirq_core::error::{RequestError, RequestResult, SESSION_INVALID_CODE};
use bilirq_core::traits::CookieSink;
use bilirq_core::types::Credential;
use tracing::{info, warn};

use super::types::{LoginQrCode, LoginResponse, LoginState, StoredLogin};
use crate::rest::ApiClient;

impl ApiClient {
    /// Starts a QR login and returns the auth code to poll with.
    pub async fn request_login_qr(&self) -> RequestResult<LoginQrCode> {
        let endpoint = &self.config().endpoints.login_qr;
        self.post(endpoint.as_str()).signed().auth(false).decode().await
    }

    /// Polls a QR login once.
    ///
    /// On success the credential is stored, the issued cookies are handed to
    /// the cookie jar, and the credential is returned in
    /// [`LoginState::Success`].
    pub async fn verify_login_qr(&self, auth_code: &str) -> LoginState {
        let endpoint = &self.config().endpoints.verify_qr;
        let result: RequestResult<LoginResponse> = self
            .post(endpoint.as_str())
            .signed()
            .auth(false)
            .param("auth_code", auth_code)
            .decode()
            .await;

        match result {
            Ok(response) => LoginState::Success(self.complete_login(response)),
            Err(RequestError::Status { code, .. }) => LoginState::from_status(code),
            Err(e) => {
                warn!(error = %e, "QR login poll failed");
                LoginState::Failed
            }
        }
    }

    /// Fetches a login bundle kept at `url` and installs it.
    ///
    /// The body is `{"id": int, "content": string}` where `content` is a
    /// serialized login response. The vendor envelope is not involved.
    pub async fn fetch_stored_login(&self, url: &str) -> RequestResult<Credential> {
        let body = self.get(url).no_cookie().bytes().await?;
        let stored: StoredLogin = serde_json::from_slice(&body)
            .map_err(|e| RequestError::decode(format!("{e}{e:?}")))?;
        let response: LoginResponse = serde_json::from_str(&stored.content)
            .map_err(|e| RequestError::decode(format!("{e}{e:?}")))?;
        Ok(self.complete_login(response))
    }

    /// Exchanges the stored refresh token for a new credential.
    ///
    /// Without a stored credential this fails with a session-invalid status
    /// and sends nothing.
    pub async fn refresh_credential(&self) -> RequestResult<Credential> {
        let Some(current) = self.session().credential() else {
            return Err(RequestError::status(SESSION_INVALID_CODE, "not logged in"));
        };
        let endpoint = &self.config().endpoints.refresh;
        let response: LoginResponse = self
            .post(endpoint.as_str())
            .signed()
            .param("refresh_token", &current.refresh_token)
            .decode()
            .await?;
        Ok(self.complete_login(response))
    }

    /// Fetches the site root to collect anonymous cookies, then backs the
    /// jar up.
    ///
    /// The backup happens whether or not the request succeeded.
    pub async fn request_index(&self) -> RequestResult<()> {
        let endpoint = &self.config().endpoints.index;
        let result = self.get(endpoint.as_str()).bytes().await;
        self.session().cookies().backup();
        result.map(|_| ())
    }

    /// Forgets the credential and every cookie.
    pub fn logout(&self) {
        self.session().logout();
    }

    fn complete_login(&self, response: LoginResponse) -> Credential {
        let credential = response.token_info.issued_now();
        let cookies = response.cookie_info.to_cookies();
        if !cookies.is_empty() {
            self.session().cookies().set_all(cookies);
        }
        self.session().credentials().save(credential.clone());
        info!(subject_id = credential.subject_id, "Logged in");
        credential
    }
}
