//! Request signing and listen key management for the MEXC private stream
//!
//! The private order stream is opened with a listen key obtained from the
//! REST API. This crate signs those REST calls and keeps the keys alive.
//!
//! # Example
//!
//! ```no_run
//! use mexc_auth::{Credentials, KeepAlive, ListenKeyClient, ListenKeyStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load credentials from environment
//!     let client = Arc::new(ListenKeyClient::new(Credentials::from_env()?)?);
//!
//!     // Reuse or create a listen key
//!     let listen_key = client.active_listen_key().await?;
//!
//!     // Extend it every 30 minutes while the stream is open
//!     let _keep_alive = KeepAlive::spawn(client.clone());
//!
//!     println!("listen key: {}", listen_key);
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;
mod keepalive;
mod listen_key;

pub use credentials::{Credentials, RequestSigner, API_KEY_HEADER};
pub use error::{AuthError, AuthResult};
pub use keepalive::{KeepAlive, DEFAULT_KEEP_ALIVE_INTERVAL};
pub use listen_key::{ListenKeyClient, ListenKeyStore, REST_URL, USER_DATA_STREAM_PATH};
