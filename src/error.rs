//! Error types for the token bridge.
//!
//! Only `ConfigurationError` and `CredentialsError` are fatal. Storage and
//! cookie errors are absorbed by `JwtHandler` and degrade to "no token".

use thiserror::Error;

/// Raised at startup when the extension manifest does not grant what the
/// requested features need. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("missing `{0}` permission in extension manifest")]
    MissingPermission(String),

    #[error("sync requires at least one entry in `host_permissions`")]
    MissingHostPermissions,

    #[error("background polling requires a `background` entry in the extension manifest")]
    MissingBackground,

    #[error("no host permission in the extension manifest covers `{host}`")]
    NoMatchingHostPermission { host: String },

    #[error("invalid extension manifest: {0}")]
    InvalidManifest(String),
}

/// Failure from a storage area. Recoverable: the token can be re-synced.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage is disabled")]
    Disabled,

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage document is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Failure while reading a cookie from one host.
#[derive(Error, Debug)]
pub enum CookieError {
    #[error("invalid cookie host url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("cookie store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cookie store document is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cookie store error: {0}")]
    Backend(String),
}

/// Missing or malformed publishable key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("missing publishable key")]
    MissingPublishableKey,

    #[error("publishable key is malformed: {0}")]
    MalformedPublishableKey(String),
}

/// Errors surfaced while bringing up a context.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Cookie(#[from] CookieError),

    #[error("failed to load configuration: {0}")]
    Config(String),

    #[error("failed to read extension manifest `{path}`: {source}")]
    ManifestIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
