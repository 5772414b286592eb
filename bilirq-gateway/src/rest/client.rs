//! API client with request signing, envelope handling and typed decoding.

use bilirq_core::config::Validatable;
use bilirq_core::error::{RequestError, RequestResult};
use bilirq_core::traits::{CookieSink, HttpMethod, Transport, TransportRequest};
use bilirq_core::types::Params;
use bilirq_telemetry::masking::SensitiveDataMasker;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::config::ClientConfig;
use super::http::HttpTransport;
use super::signer::RequestSigner;
use crate::envelope::EnvelopeDecoder;
use crate::error::GatewayError;
use crate::invoke::spawn_with_callback;
use crate::payload::{JsonDecoder, PayloadDecoder, decode_proto, decode_typed};
use crate::session::Session;

/// Client for the vendor API.
///
/// Holds the configuration, the request signer, the transport and the
/// session. Cloning is cheap and clones share all of them.
///
/// # Example
///
/// ```ignore
/// use bilirq_gateway::rest::{ApiClient, ClientConfig};
///
/// let client = ApiClient::new(ClientConfig::default())?;
///
/// // Signed app request, typed result
/// let season: Season = client
///     .get("https://api.bilibili.com/pgc/view/v2/app/season")
///     .signed()
///     .param("season_id", 42)
///     .decode()
///     .await?;
///
/// // Web request, dynamic result under a custom key
/// let list = client
///     .get("https://api.bilibili.com/x/web-interface/popular")
///     .data_key("result")
///     .json()
///     .await?;
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    signer: RequestSigner,
    transport: Arc<dyn Transport>,
    session: Session,
    masker: SensitiveDataMasker,
}

impl ApiClient {
    /// Creates a client with an in-memory session.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the configuration is invalid or the HTTP
    /// client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, GatewayError> {
        let session = Session::in_memory(config.cookies.clone());
        Self::with_session(config, session)
    }

    /// Creates a client whose session is persisted to the JSON file at `path`.
    ///
    /// Backed up cookies are restored before the client is returned.
    pub fn persistent(config: ClientConfig, path: impl Into<PathBuf>) -> Result<Self, GatewayError> {
        let session = Session::persistent(path, config.cookies.clone())?;
        Self::with_session(config, session)
    }

    /// Creates a client over an existing session using the HTTP transport.
    pub fn with_session(config: ClientConfig, session: Session) -> Result<Self, GatewayError> {
        config.validate()?;
        let transport = HttpTransport::new(&config, session.cookies().clone())?;
        Ok(Self::with_transport(config, session, Arc::new(transport)))
    }

    /// Creates a client over an arbitrary transport.
    #[must_use]
    pub fn with_transport(
        config: ClientConfig,
        session: Session,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let signer = RequestSigner::from_config(&config);
        Self {
            inner: Arc::new(ClientInner {
                config,
                signer,
                transport,
                session,
                masker: SensitiveDataMasker::new(),
            }),
        }
    }

    /// Creates a GET request builder.
    #[must_use]
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(HttpMethod::Get, url)
    }

    /// Creates a POST request builder.
    #[must_use]
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(HttpMethod::Post, url)
    }

    /// Creates a request builder for any method.
    #[must_use]
    pub fn request(&self, method: HttpMethod, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), method, url.into())
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Returns the session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Returns the signer.
    #[must_use]
    pub fn signer(&self) -> &RequestSigner {
        &self.inner.signer
    }

    async fn execute(&self, request: TransportRequest) -> RequestResult<Vec<u8>> {
        debug!(
            method = %request.method,
            url = %request.url,
            params = %self.inner.masker.mask_string(&request.params.to_sorted_query()),
            isolated = request.cookie_isolated,
            "Sending request"
        );

        let url = request.url.clone();
        self.inner.transport.send(request).await.map_err(|e| {
            warn!(url = %url, error = %e, "Request failed");
            RequestError::from(e)
        })
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("app_key", &self.inner.config.app_key)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavour {
    /// Unsigned; non-GET requests carry the CSRF token.
    Web,
    /// Signed with the app key and secret.
    Signed,
}

/// Request builder.
///
/// Requests are unsigned web requests unless [`signed`](Self::signed) is
/// called. Terminal methods come in pairs: an async form (`bytes`, `json`,
/// `decode`, `decode_with`, `proto`) and a callback form with a `_then`
/// suffix that runs the async form in a new task.
#[must_use]
pub struct RequestBuilder {
    client: ApiClient,
    method: HttpMethod,
    url: String,
    params: Params,
    headers: Vec<(String, String)>,
    flavour: Flavour,
    auth: bool,
    data_key: Option<String>,
    cookie_isolated: bool,
}

impl RequestBuilder {
    fn new(client: ApiClient, method: HttpMethod, url: String) -> Self {
        Self {
            client,
            method,
            url,
            params: Params::new(),
            headers: Vec::new(),
            flavour: Flavour::Web,
            auth: true,
            data_key: None,
            cookie_isolated: false,
        }
    }

    /// Adds a parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Adds every parameter of `params`.
    pub fn params(mut self, params: &Params) -> Self {
        self.params.extend(params.iter());
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Signs the request as an app request.
    pub fn signed(mut self) -> Self {
        self.flavour = Flavour::Signed;
        self
    }

    /// Sets whether a signed request carries the current access token.
    ///
    /// Defaults to true. Has no effect on unsigned requests.
    pub fn auth(mut self, auth: bool) -> Self {
        self.auth = auth;
        self
    }

    /// Overrides the envelope key holding the payload.
    pub fn data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = Some(key.into());
        self
    }

    /// Sends the request without cookies and ignores cookies it receives.
    pub fn no_cookie(mut self) -> Self {
        self.cookie_isolated = true;
        self
    }

    /// Builds the transport request, injecting CSRF or signing fields.
    fn prepare(&self) -> TransportRequest {
        let inner = &self.client.inner;
        let mut params = self.params.clone();

        match self.flavour {
            Flavour::Web => {
                if self.method != HttpMethod::Get {
                    let csrf = inner.session.cookies().csrf_token();
                    params.insert_opt("biliCSRF", csrf.as_deref());
                    params.insert_opt("csrf", csrf);
                }
            }
            Flavour::Signed => {
                if self.auth {
                    let token = inner.session.credential().map(|c| c.access_token);
                    params.insert_opt("access_key", token);
                }
                params = inner.signer.sign(params);
            }
        }

        TransportRequest {
            method: self.method,
            url: self.url.clone(),
            params,
            headers: self.headers.clone(),
            cookie_isolated: self.cookie_isolated,
        }
    }

    fn envelope_decoder(&self) -> EnvelopeDecoder {
        let config = &self.client.inner.config;
        let key = self.data_key.as_deref().unwrap_or(&config.data_key);
        EnvelopeDecoder::new(key).strict(config.strict_envelope)
    }

    /// Sends the request and returns the raw response body.
    ///
    /// The envelope is not inspected.
    pub async fn bytes(self) -> RequestResult<Vec<u8>> {
        let request = self.prepare();
        self.client.execute(request).await
    }

    /// Sends the request and returns the envelope payload.
    pub async fn json(self) -> RequestResult<Value> {
        let decoder = self.envelope_decoder();
        let request = self.prepare();
        let client = self.client;
        let body = client.execute(request).await?;
        decoder.decode(&body, client.session().credentials().as_ref())
    }

    /// Sends the request and decodes the envelope payload into `T`.
    pub async fn decode<T: DeserializeOwned>(self) -> RequestResult<T> {
        self.decode_with(JsonDecoder::new()).await
    }

    /// Sends the request and decodes the envelope payload with `decoder`.
    pub async fn decode_with<T, D>(self, decoder: D) -> RequestResult<T>
    where
        T: DeserializeOwned,
        D: PayloadDecoder,
    {
        let data = self.json().await?;
        decode_typed(&data, &decoder).inspect_err(|e| {
            warn!(error = %e, "Failed to decode payload");
        })
    }

    /// Sends the request and parses the raw body as a protobuf message.
    pub async fn proto<M>(self) -> RequestResult<M>
    where
        M: prost::Message + Default,
    {
        let body = self.bytes().await?;
        decode_proto(&body).inspect_err(|e| {
            warn!(error = %e, "Failed to decode protobuf body");
        })
    }

    /// Callback form of [`bytes`](Self::bytes).
    pub fn bytes_then<C>(self, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(RequestResult<Vec<u8>>) + Send + 'static,
    {
        spawn_with_callback(self.bytes(), Some(callback))
    }

    /// Callback form of [`json`](Self::json).
    pub fn json_then<C>(self, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(RequestResult<Value>) + Send + 'static,
    {
        spawn_with_callback(self.json(), Some(callback))
    }

    /// Callback form of [`decode`](Self::decode).
    pub fn decode_then<T, C>(self, callback: C) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        C: FnOnce(RequestResult<T>) + Send + 'static,
    {
        spawn_with_callback(self.decode(), Some(callback))
    }

    /// Callback form of [`decode_with`](Self::decode_with).
    pub fn decode_with_then<T, D, C>(self, decoder: D, callback: C) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        D: PayloadDecoder + 'static,
        C: FnOnce(RequestResult<T>) + Send + 'static,
    {
        spawn_with_callback(self.decode_with(decoder), Some(callback))
    }

    /// Callback form of [`proto`](Self::proto).
    pub fn proto_then<M, C>(self, callback: C) -> JoinHandle<()>
    where
        M: prost::Message + Default + Send + 'static,
        C: FnOnce(RequestResult<M>) + Send + 'static,
    {
        spawn_with_callback(self.proto(), Some(callback))
    }

    /// Sends the request in a new task and discards the outcome.
    pub fn detach(self) -> JoinHandle<()> {
        spawn_with_callback(self.bytes(), None::<fn(RequestResult<Vec<u8>>)>)
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("flavour", &self.flavour)
            .field("auth", &self.auth)
            .field("data_key", &self.data_key)
            .field("cookie_isolated", &self.cookie_isolated)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::KeyStrategy;
    use crate::testing::MockTransport;
    use bilirq_core::error::TransportError;
    use bilirq_core::types::{CookieEntry, Credential};
    use serde::Deserialize;
    use serde_json::json;
    use tokio::sync::oneshot;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Season {
        season_id: i64,
        title: String,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Camel {
        season_id: i64,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    struct Reply {
        #[prost(int64, tag = "1")]
        id: i64,
    }

    fn client() -> (ApiClient, Arc<MockTransport>) {
        let config = ClientConfig::default();
        let session = Session::in_memory(config.cookies.clone());
        let transport = Arc::new(MockTransport::new());
        let client = ApiClient::with_transport(config, session, transport.clone());
        (client, transport)
    }

    #[tokio::test]
    async fn test_json_returns_payload() {
        let (client, transport) = client();
        transport.respond_json(&json!({"code": 0, "message": "0", "data": {"a": 1}}));

        let value = client.get("https://api.example.com/x").json().await.unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_custom_data_key() {
        let (client, transport) = client();
        transport.respond_json(&json!({"code": 0, "result": {"list": [1, 2]}}));

        let value = client
            .get("https://api.example.com/pgc")
            .data_key("result")
            .json()
            .await
            .unwrap();
        assert_eq!(value["list"], json!([1, 2]));
    }

    #[tokio::test]
    async fn test_typed_decode() {
        let (client, transport) = client();
        transport.respond_json(&json!({"code": 0, "data": {"season_id": 3, "title": "t"}}));

        let season: Season = client.get("https://api.example.com/s").decode().await.unwrap();
        assert_eq!(
            season,
            Season {
                season_id: 3,
                title: "t".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_decode_with_key_strategy() {
        let (client, transport) = client();
        transport.respond_json(&json!({"code": 0, "data": {"season_id": 9}}));

        let decoder = JsonDecoder::new().with_key_strategy(KeyStrategy::ConvertFromSnakeCase);
        let value: Camel = client
            .get("https://api.example.com/s")
            .decode_with(decoder)
            .await
            .unwrap();
        assert_eq!(value.season_id, 9);
    }

    #[tokio::test]
    async fn test_network_failure() {
        let (client, transport) = client();
        transport.fail(TransportError::Timeout { timeout_ms: 10_000 });

        let result = client.get("https://api.example.com/x").json().await;
        assert_eq!(result, Err(RequestError::Network));
    }

    #[tokio::test]
    async fn test_session_invalid_clears_credential() {
        let (client, transport) = client();
        client
            .session()
            .credentials()
            .save(Credential::new(1, "token", "refresh", 60));
        transport.respond_json(&json!({"code": -101, "message": "账号未登录"}));

        let result = client.get("https://api.example.com/x").signed().json().await;

        assert_eq!(result, Err(RequestError::status(-101, "账号未登录")));
        assert!(!client.session().is_logged_in());
    }

    #[tokio::test]
    async fn test_status_failure_skips_typed_decode() {
        let (client, transport) = client();
        transport.respond_json(&json!({"code": 62002, "message": "稿件不可见"}));

        let result: RequestResult<Season> = client.get("https://api.example.com/x").decode().await;
        assert_eq!(result, Err(RequestError::status(62002, "稿件不可见")));
    }

    #[tokio::test]
    async fn test_bytes_skip_envelope() {
        let (client, transport) = client();
        transport.respond(b"{\"code\":-101}".to_vec());
        client
            .session()
            .credentials()
            .save(Credential::new(1, "token", "refresh", 60));

        let body = client.get("https://api.example.com/raw").bytes().await.unwrap();
        assert_eq!(body, b"{\"code\":-101}");
        assert!(client.session().is_logged_in());
    }

    #[tokio::test]
    async fn test_proto_bypasses_envelope() {
        let (client, transport) = client();
        let bytes = prost::Message::encode_to_vec(&Reply { id: 77 });
        transport
            .respond(bytes.clone())
            .respond(bytes.clone())
            .respond(bytes);

        let reply: Reply = client.get("https://grpc.example.com/r").proto().await.unwrap();
        assert_eq!(reply.id, 77);

        let json = client.get("https://grpc.example.com/r").json().await;
        assert!(matches!(json, Err(RequestError::Decode { .. })));

        let typed: RequestResult<Season> = client.get("https://grpc.example.com/r").decode().await;
        assert!(matches!(typed, Err(RequestError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_signed_request_carries_access_key_and_sign() {
        let (client, transport) = client();
        client
            .session()
            .credentials()
            .save(Credential::new(1, "token-123", "refresh", 60));
        transport.respond_json(&json!({"code": 0}));

        client
            .get("https://app.example.com/feed")
            .signed()
            .param("idx", 0)
            .json()
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.params.get("access_key"), Some("token-123"));
        assert_eq!(request.params.get("appkey"), Some("5ae412b53418aac5"));
        assert_eq!(request.params.get("idx"), Some("0"));
        assert!(client.signer().verify(&request.params));
    }

    #[tokio::test]
    async fn test_signed_request_without_auth() {
        let (client, transport) = client();
        client
            .session()
            .credentials()
            .save(Credential::new(1, "token-123", "refresh", 60));
        transport.respond_json(&json!({"code": 0}));

        client
            .post("https://passport.example.com/qr")
            .signed()
            .auth(false)
            .json()
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert!(!request.params.contains("access_key"));
        assert!(request.params.contains("sign"));
    }

    #[tokio::test]
    async fn test_web_post_injects_csrf() {
        let (client, transport) = client();
        client
            .session()
            .cookies()
            .set_all(vec![CookieEntry::new("bili_jct", "csrf-token", ".bilibili.com")]);
        transport.respond_json(&json!({"code": 0}));
        transport.respond_json(&json!({"code": 0}));

        client
            .post("https://api.bilibili.com/x/v2/history/report")
            .param("aid", 1)
            .json()
            .await
            .unwrap();
        let post = transport.last_request().unwrap();
        assert_eq!(post.params.get("csrf"), Some("csrf-token"));
        assert_eq!(post.params.get("biliCSRF"), Some("csrf-token"));
        assert!(!post.params.contains("sign"));

        client.get("https://api.bilibili.com/x/web").json().await.unwrap();
        let get = transport.last_request().unwrap();
        assert!(!get.params.contains("csrf"));
    }

    #[tokio::test]
    async fn test_web_post_without_csrf_cookie() {
        let (client, transport) = client();
        transport.respond_json(&json!({"code": 0}));

        client.post("https://api.bilibili.com/x").json().await.unwrap();
        let request = transport.last_request().unwrap();
        assert!(!request.params.contains("csrf"));
        assert!(!request.params.contains("biliCSRF"));
    }

    #[tokio::test]
    async fn test_headers_and_isolation_forwarded() {
        let (client, transport) = client();
        transport.respond(Vec::new());

        client
            .get("https://api.example.com/x")
            .header("Referer", "https://www.bilibili.com/video")
            .no_cookie()
            .bytes()
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert!(request.cookie_isolated);
        assert!(request.has_header("referer"));
    }

    #[tokio::test]
    async fn test_callback_form_matches_async_form() {
        let (client, transport) = client();
        let bodies = [
            json!({"code": 0, "data": {"season_id": 1, "title": "a"}}),
            json!({"code": 5, "message": "bad"}),
            json!({"code": 0, "data": {"title": "missing id"}}),
        ];

        for body in bodies {
            transport.respond_json(&body);
            transport.respond_json(&body);

            let direct: RequestResult<Season> =
                client.get("https://api.example.com/s").decode().await;

            let (tx, rx) = oneshot::channel();
            client
                .get("https://api.example.com/s")
                .decode_then(move |result: RequestResult<Season>| {
                    let _ = tx.send(result);
                })
                .await
                .unwrap();
            let via_callback = rx.await.unwrap();

            assert_eq!(direct, via_callback);
        }
    }

    #[tokio::test]
    async fn test_callback_forms_for_every_shape() {
        let (client, transport) = client();
        transport.respond(b"raw".to_vec());
        transport.respond_json(&json!({"code": 0, "data": 1}));
        transport.respond(prost::Message::encode_to_vec(&Reply { id: 3 }));
        transport.fail(TransportError::Cancelled);

        let (tx, rx) = oneshot::channel();
        client
            .get("https://x.example.com")
            .bytes_then(move |r| {
                let _ = tx.send(r);
            })
            .await
            .unwrap();
        assert_eq!(rx.await.unwrap(), Ok(b"raw".to_vec()));

        let (tx, rx) = oneshot::channel();
        client
            .get("https://x.example.com")
            .json_then(move |r| {
                let _ = tx.send(r);
            })
            .await
            .unwrap();
        assert_eq!(rx.await.unwrap(), Ok(json!(1)));

        let (tx, rx) = oneshot::channel();
        client
            .get("https://x.example.com")
            .proto_then(move |r: RequestResult<Reply>| {
                let _ = tx.send(r);
            })
            .await
            .unwrap();
        assert_eq!(rx.await.unwrap().map(|r| r.id), Ok(3));

        let (tx, rx) = oneshot::channel();
        client
            .get("https://x.example.com")
            .decode_with_then(JsonDecoder::new(), move |r: RequestResult<Value>| {
                let _ = tx.send(r);
            })
            .await
            .unwrap();
        assert_eq!(rx.await.unwrap(), Err(RequestError::Network));
    }

    #[tokio::test]
    async fn test_detach_sends_request() {
        let (client, transport) = client();
        transport.respond(Vec::new());

        client.get("https://www.example.com").detach().await.unwrap();
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ClientConfig::builder().app_key("").build();
        assert!(matches!(ApiClient::new(config), Err(GatewayError::Config(_))));
    }
}
