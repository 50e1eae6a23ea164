//! Client core for a remote shopping-cart checkout API.
//!
//! # Overview
//! `CartClient` remembers one checkout id in a persisted key-value store,
//! fills it into a provider's URL templates, and exposes the checkout
//! lifecycle: create, fetch, update, add items, change item quantities and
//! charge with a Stripe token. Every operation is a single HTTP round trip
//! whose outcome is normalized into `{status, statusCode, data}`.
//!
//! # Design
//! - Providers are a tagged `Provider::Named | Provider::Inline`; named ones
//!   come from a lookup table (`laravel-cart` is built in).
//! - The client builds plain-data `HttpRequest`s and hands them to an
//!   injected `HttpTransport`, obtained per call from a factory closure.
//! - HTTP error statuses are data, not errors. `CartError` is reserved for
//!   failures with no response to normalize.
//! - The store is injected too: `MemoryStore` for tests and embedding,
//!   `JsonFileStore` for persistence across runs.
//! - Enable the `reqwest` feature for a ready-made `ReqwestTransport`.

pub mod client;
pub mod error;
pub mod http;
pub mod provider;
pub mod response;
pub mod store;
#[cfg(feature = "reqwest")]
pub mod transport;
pub mod types;

pub use client::{CartClient, QtyDirection};
pub use error::CartError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
pub use provider::{Provider, ProviderConfig, ProviderUrls};
pub use response::{normalize, normalize_result, NormalizedResponse, ResponseStatus};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use types::{QtyUpdate, StripeCharge};
