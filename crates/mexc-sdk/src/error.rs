//! SDK error type

use crate::builder::ConfigError;
use mexc_auth::AuthError;
use mexc_types::MexcError;

/// Errors raised while building or driving a client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid builder configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Listen key or signing failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Stream failure
    #[error(transparent)]
    Stream(#[from] MexcError),
}
