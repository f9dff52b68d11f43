//! Listen key management for the private user data stream
//!
//! The private stream is authorised by a listen key obtained from
//! `/api/v3/userDataStream`. Keys expire unless extended, see
//! [`KeepAlive`](crate::KeepAlive).

use crate::credentials::{Credentials, RequestSigner, API_KEY_HEADER};
use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// REST base URL
pub const REST_URL: &str = "https://api.mexc.com";

/// User data stream path
pub const USER_DATA_STREAM_PATH: &str = "/api/v3/userDataStream";

const HTTP_TIMEOUT: Duration = Duration::from_secs(45);

/// Listen key operations used by the keep-alive task and private client
#[async_trait]
pub trait ListenKeyStore: Send + Sync {
    /// Listen keys currently active for the account
    async fn listen_keys(&self) -> AuthResult<Vec<String>>;

    /// Create a new listen key
    async fn create_listen_key(&self) -> AuthResult<String>;

    /// Extend the validity of a listen key
    async fn keep_alive(&self, listen_key: &str) -> AuthResult<String>;

    /// Reuse the first active key, or create one if none exists
    async fn active_listen_key(&self) -> AuthResult<String> {
        match self.listen_keys().await?.into_iter().next() {
            Some(key) => Ok(key),
            None => {
                info!("No active listen key, creating one");
                self.create_listen_key().await
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListenKeys {
    #[serde(rename = "listenKey", default)]
    listen_key: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListenKey {
    #[serde(rename = "listenKey")]
    listen_key: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
}

/// REST client for `/api/v3/userDataStream`
///
/// # Example
///
/// ```no_run
/// use mexc_auth::{Credentials, ListenKeyClient, ListenKeyStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ListenKeyClient::new(Credentials::from_env()?)?;
/// let key = client.active_listen_key().await?;
/// println!("wss://wbs.mexc.com/ws?listenKey={}", key);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ListenKeyClient {
    credentials: Credentials,
    client: Client,
    base_url: String,
    recv_window: Option<u64>,
}

impl ListenKeyClient {
    /// Create a client against the production REST API
    pub fn new(credentials: Credentials) -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("mexc-auth/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            credentials,
            client,
            base_url: REST_URL.to_string(),
            recv_window: None,
        })
    }

    /// Create a client from `MEXC_API_KEY` / `MEXC_SECRET_KEY`
    pub fn from_env() -> AuthResult<Self> {
        Self::new(Credentials::from_env()?)
    }

    /// Override the REST base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send `recvWindow` with every request
    pub fn with_recv_window(mut self, millis: u64) -> Self {
        self.recv_window = Some(millis);
        self
    }

    /// Get the credentials used by this client
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Close a listen key
    #[instrument(skip(self, listen_key))]
    pub async fn close_listen_key(&self, listen_key: &str) -> AuthResult<String> {
        let closed: ListenKey = self.request(Method::DELETE, &[("listenKey", listen_key)]).await?;
        info!("Listen key closed");
        Ok(closed.listen_key)
    }

    /// Signed request URL for `params`
    pub(crate) fn signed_url(&self, params: &[(&str, &str)]) -> AuthResult<String> {
        let mut signer = RequestSigner::new(&self.credentials);
        if let Some(window) = self.recv_window {
            signer = signer.with_recv_window(window);
        }
        let query = signer.signed_query(params)?;
        Ok(format!("{}{}?{}", self.base_url, USER_DATA_STREAM_PATH, query))
    }

    async fn request<T: DeserializeOwned>(&self, method: Method, params: &[(&str, &str)]) -> AuthResult<T> {
        let url = self.signed_url(params)?;
        debug!(%method, path = USER_DATA_STREAM_PATH, "Sending signed request");

        let response = self
            .client
            .request(method, url)
            .header(API_KEY_HEADER, self.credentials.access_key())
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_response(status.as_u16(), &body)
    }
}

#[async_trait]
impl ListenKeyStore for ListenKeyClient {
    #[instrument(skip(self))]
    async fn listen_keys(&self) -> AuthResult<Vec<String>> {
        let keys: ListenKeys = self.request(Method::GET, &[]).await?;
        debug!(count = keys.listen_key.len(), "Fetched listen keys");
        Ok(keys.listen_key)
    }

    #[instrument(skip(self))]
    async fn create_listen_key(&self) -> AuthResult<String> {
        let created: ListenKey = self.request(Method::POST, &[]).await?;
        info!("Listen key created");
        Ok(created.listen_key)
    }

    #[instrument(skip(self, listen_key))]
    async fn keep_alive(&self, listen_key: &str) -> AuthResult<String> {
        let extended: ListenKey = self.request(Method::PUT, &[("listenKey", listen_key)]).await?;
        debug!("Listen key extended");
        Ok(extended.listen_key)
    }
}

fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> AuthResult<T> {
    if status >= 400 {
        let error: ErrorResponse = serde_json::from_str(body).map_err(|_| AuthError::Api {
            code: i64::from(status),
            msg: body.to_string(),
        })?;
        return Err(AuthError::Api {
            code: error.code,
            msg: error.msg,
        });
    }
    serde_json::from_str(body).map_err(|e| AuthError::Parse(format!("{}: {}", e, body)))
}
