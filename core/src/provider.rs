//! Provider configuration: URL templates plus the persisted-key name.
//!
//! # Design
//! A provider is either a built-in, looked up by name in a static table, or
//! an inline `ProviderConfig` supplied by the caller. Templates are relative
//! paths containing the `:checkoutId` and `:itemId` placeholders; the client
//! substitutes the checkout id once at construction and the item id per call.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CartError;

/// Placeholder replaced by the persisted checkout id.
pub const CHECKOUT_ID_TOKEN: &str = ":checkoutId";

/// Placeholder replaced by the item id in the quantity-update route.
pub const ITEM_ID_TOKEN: &str = ":itemId";

/// Name of the built-in Laravel cart provider.
pub const LARAVEL_CART: &str = "laravel-cart";

/// URL templates, one per checkout operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUrls {
    pub create_url: String,
    pub get_url: String,
    pub update_url: String,
    pub add_item_url: String,
    pub update_item_qty_url: String,
    pub stripe_payment_url: String,
}

impl ProviderUrls {
    /// Substitute `checkout_id` for every `:checkoutId` in every template.
    /// `:itemId` is left in place.
    pub fn with_checkout_id(&self, checkout_id: &str) -> ProviderUrls {
        let fill = |template: &str| template.replace(CHECKOUT_ID_TOKEN, checkout_id);
        ProviderUrls {
            create_url: fill(&self.create_url),
            get_url: fill(&self.get_url),
            update_url: fill(&self.update_url),
            add_item_url: fill(&self.add_item_url),
            update_item_qty_url: fill(&self.update_item_qty_url),
            stripe_payment_url: fill(&self.stripe_payment_url),
        }
    }
}

/// Substitute `item_id` for every `:itemId` in `template`.
pub fn with_item_id(template: &str, item_id: &str) -> String {
    template.replace(ITEM_ID_TOKEN, item_id)
}

/// A resolved provider: its routes and the store key holding the checkout id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub urls: ProviderUrls,
    pub local_item_name: String,
}

impl ProviderConfig {
    /// Parse an inline provider from JSON (`{"urls": {...}, "localItemName": ...}`).
    pub fn from_json_str(raw: &str) -> Result<Self, CartError> {
        serde_json::from_str(raw).map_err(CartError::InvalidConfig)
    }

    /// Read and parse an inline provider from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CartError> {
        let raw = std::fs::read_to_string(path).map_err(CartError::ConfigIo)?;
        Self::from_json_str(&raw)
    }

    fn laravel_cart() -> Self {
        ProviderConfig {
            urls: ProviderUrls {
                create_url: "checkout".to_string(),
                get_url: "checkout/:checkoutId".to_string(),
                update_url: "checkout/:checkoutId".to_string(),
                add_item_url: "checkout/:checkoutId/items".to_string(),
                update_item_qty_url: "checkout/:checkoutId/items/:itemId".to_string(),
                stripe_payment_url: "checkout/:checkoutId/stripe".to_string(),
            },
            local_item_name: "cj_ckId".to_string(),
        }
    }
}

/// Look up a built-in provider by name.
pub fn builtin(name: &str) -> Option<ProviderConfig> {
    match name {
        LARAVEL_CART => Some(ProviderConfig::laravel_cart()),
        _ => None,
    }
}

/// Provider selector accepted by `CartClient::new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// A built-in provider, resolved through `builtin`.
    Named(String),
    /// A caller-supplied configuration, used as is.
    Inline(ProviderConfig),
}

impl Provider {
    pub fn resolve(&self) -> Result<ProviderConfig, CartError> {
        match self {
            Provider::Named(name) => {
                builtin(name).ok_or_else(|| CartError::UnknownProvider(name.clone()))
            }
            Provider::Inline(config) => Ok(config.clone()),
        }
    }
}

impl Default for Provider {
    fn default() -> Self {
        Provider::Named(LARAVEL_CART.to_string())
    }
}

impl From<&str> for Provider {
    fn from(name: &str) -> Self {
        Provider::Named(name.to_string())
    }
}

impl From<String> for Provider {
    fn from(name: String) -> Self {
        Provider::Named(name)
    }
}

impl From<ProviderConfig> for Provider {
    fn from(config: ProviderConfig) -> Self {
        Provider::Inline(config)
    }
}
