//! Error types for the checkout client.
//!
//! # Design
//! HTTP failures that carry a response never reach this type: they are
//! normalized into a `NormalizedResponse` with `status: "error"`. What is left
//! here are the failures that have no response to normalize, plus local
//! problems (configuration, serialization, persistence).

use crate::http::TransportError;
use crate::store::StoreError;

/// Errors returned by `CartClient` and provider resolution.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The provider name has no entry in the built-in lookup table.
    #[error("unknown checkout provider: {0}")]
    UnknownProvider(String),

    /// An inline provider configuration could not be parsed.
    #[error("invalid provider config: {0}")]
    InvalidConfig(#[source] serde_json::Error),

    /// An inline provider configuration file could not be read.
    #[error("failed to read provider config: {0}")]
    ConfigIo(#[source] std::io::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The transport failed without producing a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Checkout creation succeeded but the body carried no `cart.id`.
    #[error("create response (HTTP {status_code}) has no cart id")]
    MissingCartId { status_code: u16 },

    /// The checkout id could not be persisted.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
