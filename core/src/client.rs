//! Checkout lifecycle client.
//!
//! # Design
//! `CartClient` resolves its provider, reads the persisted checkout id once
//! and substitutes it into every URL template at construction. Each operation
//! is split into a pure `build_*` method producing an `HttpRequest` and an
//! async method that sends it through a transport obtained from the factory
//! and normalizes the outcome.
//!
//! The resolved URLs are never refreshed: a checkout created by this client
//! is only addressed by clients constructed afterwards.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::CartError;
use crate::http::{HttpMethod, HttpRequest, HttpTransport};
use crate::provider::{with_item_id, Provider, ProviderUrls};
use crate::response::{normalize_result, NormalizedResponse};
use crate::store::KeyValueStore;
use crate::types::{QtyUpdate, StripeCharge};

/// Segment substituted for `:checkoutId` when no checkout id is stored.
const MISSING_CHECKOUT_ID: &str = "null";

/// Direction of a quantity update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QtyDirection {
    #[default]
    Increment,
    Decrement,
}

impl QtyDirection {
    /// New quantity after one step. Decrements never go below 1.
    pub fn apply(self, initial_qty: u32) -> u32 {
        match self {
            QtyDirection::Increment => initial_qty.saturating_add(1),
            QtyDirection::Decrement => initial_qty.saturating_sub(1).max(1),
        }
    }
}

/// `"increment"` is an increment; any other value is a decrement.
impl From<&str> for QtyDirection {
    fn from(direction: &str) -> Self {
        if direction == "increment" {
            QtyDirection::Increment
        } else {
            QtyDirection::Decrement
        }
    }
}

impl FromStr for QtyDirection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(QtyDirection::from(s))
    }
}

/// Client for one checkout provider.
///
/// `F` is called once per request to obtain a transport, the same way a
/// preconfigured HTTP client instance would be requested per call.
pub struct CartClient<F, S> {
    factory: F,
    store: S,
    local_item_name: String,
    checkout_id: Option<String>,
    urls: ProviderUrls,
}

impl<F, S> fmt::Debug for CartClient<F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartClient")
            .field("local_item_name", &self.local_item_name)
            .field("checkout_id", &self.checkout_id)
            .field("urls", &self.urls)
            .finish_non_exhaustive()
    }
}

impl<F, T, S> CartClient<F, S>
where
    F: Fn() -> T + Send + Sync,
    T: HttpTransport,
    S: KeyValueStore,
{
    pub fn new(factory: F, provider: impl Into<Provider>, store: S) -> Result<Self, CartError> {
        let config = provider.into().resolve()?;
        let checkout_id = store.get_item(&config.local_item_name);
        let urls = config
            .urls
            .with_checkout_id(checkout_id.as_deref().unwrap_or(MISSING_CHECKOUT_ID));
        debug!(
            local_item_name = %config.local_item_name,
            checkout_id = ?checkout_id,
            "checkout client ready"
        );
        Ok(Self {
            factory,
            store,
            local_item_name: config.local_item_name,
            checkout_id,
            urls,
        })
    }

    /// Checkout id read from the store at construction.
    pub fn checkout_id(&self) -> Option<&str> {
        self.checkout_id.as_deref()
    }

    pub fn local_item_name(&self) -> &str {
        &self.local_item_name
    }

    /// URL templates with the checkout id substituted.
    pub fn urls(&self) -> &ProviderUrls {
        &self.urls
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_create_checkout(&self) -> HttpRequest {
        bare_request(HttpMethod::Post, &self.urls.create_url)
    }

    pub fn build_get_checkout(&self) -> HttpRequest {
        bare_request(HttpMethod::Get, &self.urls.get_url)
    }

    pub fn build_update_checkout<B>(&self, form_data: &B) -> Result<HttpRequest, CartError>
    where
        B: Serialize + ?Sized,
    {
        json_request(HttpMethod::Put, &self.urls.update_url, form_data)
    }

    pub fn build_add_item<B>(&self, form_data: &B) -> Result<HttpRequest, CartError>
    where
        B: Serialize + ?Sized,
    {
        json_request(HttpMethod::Post, &self.urls.add_item_url, form_data)
    }

    pub fn build_update_item_qty(
        &self,
        item_id: impl fmt::Display,
        initial_qty: u32,
        direction: QtyDirection,
    ) -> Result<HttpRequest, CartError> {
        let path = with_item_id(&self.urls.update_item_qty_url, &item_id.to_string());
        let body = QtyUpdate {
            qty: direction.apply(initial_qty),
        };
        json_request(HttpMethod::Put, &path, &body)
    }

    pub fn build_stripe_payment(&self, token: &str) -> Result<HttpRequest, CartError> {
        let body = StripeCharge {
            token: token.to_string(),
        };
        json_request(HttpMethod::Post, &self.urls.stripe_payment_url, &body)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Fetch the current checkout, creating one if the fetch fails.
    pub async fn init_checkout(&self) -> Result<NormalizedResponse, CartError> {
        let fetched = self.get_checkout_instance().await?;
        if fetched.is_success() {
            return Ok(fetched);
        }
        debug!(status_code = fetched.status_code, "no usable checkout, creating one");
        self.create_checkout_instance().await
    }

    /// Create a checkout and persist its `cart.id` under the provider's key.
    pub async fn create_checkout_instance(&self) -> Result<NormalizedResponse, CartError> {
        let response = self.execute(self.build_create_checkout()).await?;
        if !response.is_success() {
            return Ok(response);
        }
        let cart_id = cart_id(&response.data).ok_or(CartError::MissingCartId {
            status_code: response.status_code,
        })?;
        self.store.set_item(&self.local_item_name, &cart_id)?;
        info!(checkout_id = %cart_id, key = %self.local_item_name, "checkout created");
        Ok(response)
    }

    pub async fn get_checkout_instance(&self) -> Result<NormalizedResponse, CartError> {
        self.execute(self.build_get_checkout()).await
    }

    pub async fn update_checkout_instance<B>(
        &self,
        form_data: &B,
    ) -> Result<NormalizedResponse, CartError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(self.build_update_checkout(form_data)?).await
    }

    pub async fn add_checkout_item<B>(&self, form_data: &B) -> Result<NormalizedResponse, CartError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(self.build_add_item(form_data)?).await
    }

    /// Move the quantity of `item_id` one step from `initial_qty`.
    pub async fn update_checkout_item_qty(
        &self,
        item_id: impl fmt::Display,
        initial_qty: u32,
        direction: QtyDirection,
    ) -> Result<NormalizedResponse, CartError> {
        self.execute(self.build_update_item_qty(item_id, initial_qty, direction)?)
            .await
    }

    /// Charge the checkout with a Stripe token.
    pub async fn trigger_stripe_payment(
        &self,
        token: &str,
    ) -> Result<NormalizedResponse, CartError> {
        self.execute(self.build_stripe_payment(token)?).await
    }

    async fn execute(&self, request: HttpRequest) -> Result<NormalizedResponse, CartError> {
        let method = request.method.as_str();
        let path = request.path.clone();
        debug!(method, path = %path, "sending checkout request");

        let transport = (self.factory)();
        let response = normalize_result(transport.send(request).await)?;
        if !response.is_success() {
            warn!(method, path = %path, status_code = response.status_code, "checkout request failed");
        }
        Ok(response)
    }
}

fn bare_request(method: HttpMethod, path: &str) -> HttpRequest {
    HttpRequest {
        method,
        path: path.to_string(),
        headers: Vec::new(),
        body: None,
    }
}

fn json_request<B>(method: HttpMethod, path: &str, body: &B) -> Result<HttpRequest, CartError>
where
    B: Serialize + ?Sized,
{
    let body = serde_json::to_string(body).map_err(CartError::Serialization)?;
    Ok(HttpRequest {
        method,
        path: path.to_string(),
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

/// `data.cart.id` as a string; numeric ids are accepted.
fn cart_id(data: &Value) -> Option<String> {
    match data.get("cart")?.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
