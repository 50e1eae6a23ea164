//! Request payloads with a fixed shape.
//!
//! Checkout updates and new items are caller-defined JSON and pass through
//! untouched; only the quantity update and the Stripe charge have a body the
//! client builds itself.

use serde::Serialize;

/// Body of `PUT checkout/:checkoutId/items/:itemId`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct QtyUpdate {
    pub qty: u32,
}

/// Body of `POST checkout/:checkoutId/stripe`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StripeCharge {
    pub token: String,
}
