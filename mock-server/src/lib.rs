use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

/// Token the fake Stripe gateway always declines.
pub const DECLINED_TOKEN: &str = "tok_chargeDeclined";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub id: u64,
    pub product_id: String,
    pub qty: u32,
    /// Unit price in cents.
    pub price: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub id: String,
    pub items: Vec<CartItem>,
    pub attributes: Map<String, Value>,
    pub total: u64,
    pub paid: bool,
    #[serde(skip)]
    next_item_id: u64,
}

impl Cart {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            items: Vec::new(),
            attributes: Map::new(),
            total: 0,
            paid: false,
            next_item_id: 1,
        }
    }
}

/// Sum of `price * qty`, or `None` if it does not fit in a `u64`.
fn checked_total<'a>(mut items: impl Iterator<Item = &'a CartItem>) -> Option<u64> {
    items.try_fold(0u64, |total, item| {
        total.checked_add(item.price.checked_mul(u64::from(item.qty))?)
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartEnvelope {
    pub cart: Cart,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    pub amount: u64,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChargeEnvelope {
    pub cart: Cart,
    pub charge: Charge,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Deserialize)]
pub struct AddItem {
    pub product_id: String,
    #[serde(default = "default_qty")]
    pub qty: u32,
    #[serde(default)]
    pub price: u64,
}

fn default_qty() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct QtyUpdate {
    pub qty: u32,
}

#[derive(Deserialize)]
pub struct StripeCharge {
    pub token: String,
}

/// Handler failure rendered as `{"message": ...}`.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: &'static str,
}

impl ApiFailure {
    const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

const CHECKOUT_NOT_FOUND: ApiFailure = ApiFailure::new(StatusCode::NOT_FOUND, "Checkout not found.");
const ITEM_NOT_FOUND: ApiFailure = ApiFailure::new(StatusCode::NOT_FOUND, "Item not found.");
const ALREADY_PAID: ApiFailure = ApiFailure::new(StatusCode::CONFLICT, "Checkout already paid.");
const TOTAL_OVERFLOW: ApiFailure =
    ApiFailure::new(StatusCode::UNPROCESSABLE_ENTITY, "The checkout total is too large.");

pub type Db = Arc<RwLock<HashMap<String, Cart>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/checkout", post(create_checkout))
        .route("/checkout/{id}", get(get_checkout).put(update_checkout))
        .route("/checkout/{id}/items", post(add_item))
        .route("/checkout/{id}/items/{item_id}", put(update_item_qty))
        .route("/checkout/{id}/stripe", post(stripe_payment))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn create_checkout(State(db): State<Db>) -> (StatusCode, Json<CartEnvelope>) {
    let cart = Cart::new();
    info!(checkout_id = %cart.id, "checkout created");
    db.write().await.insert(cart.id.clone(), cart.clone());
    (StatusCode::CREATED, Json(CartEnvelope { cart }))
}

async fn get_checkout(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<CartEnvelope>, ApiFailure> {
    let carts = db.read().await;
    let cart = carts.get(&id).cloned().ok_or(CHECKOUT_NOT_FOUND)?;
    Ok(Json(CartEnvelope { cart }))
}

async fn update_checkout(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<Map<String, Value>>,
) -> Result<Json<CartEnvelope>, ApiFailure> {
    let mut carts = db.write().await;
    let cart = carts.get_mut(&id).ok_or(CHECKOUT_NOT_FOUND)?;
    cart.attributes.extend(input);
    Ok(Json(CartEnvelope { cart: cart.clone() }))
}

async fn add_item(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<AddItem>,
) -> Result<(StatusCode, Json<CartEnvelope>), ApiFailure> {
    if input.qty < 1 {
        return Err(ApiFailure::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "The qty must be at least 1.",
        ));
    }
    let mut carts = db.write().await;
    let cart = carts.get_mut(&id).ok_or(CHECKOUT_NOT_FOUND)?;
    if cart.paid {
        return Err(ALREADY_PAID);
    }
    let item = CartItem {
        id: cart.next_item_id,
        product_id: input.product_id,
        qty: input.qty,
        price: input.price,
    };
    let total = checked_total(cart.items.iter().chain(std::iter::once(&item)))
        .ok_or(TOTAL_OVERFLOW)?;
    cart.next_item_id += 1;
    cart.items.push(item);
    cart.total = total;
    Ok((StatusCode::CREATED, Json(CartEnvelope { cart: cart.clone() })))
}

async fn update_item_qty(
    State(db): State<Db>,
    Path((id, item_id)): Path<(String, u64)>,
    Json(input): Json<QtyUpdate>,
) -> Result<Json<CartEnvelope>, ApiFailure> {
    if input.qty < 1 {
        return Err(ApiFailure::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "The qty must be at least 1.",
        ));
    }
    let mut carts = db.write().await;
    let cart = carts.get_mut(&id).ok_or(CHECKOUT_NOT_FOUND)?;
    if cart.paid {
        return Err(ALREADY_PAID);
    }
    let index = cart
        .items
        .iter()
        .position(|item| item.id == item_id)
        .ok_or(ITEM_NOT_FOUND)?;
    let updated = CartItem {
        qty: input.qty,
        ..cart.items[index].clone()
    };
    let total = checked_total(
        cart.items
            .iter()
            .enumerate()
            .map(|(i, item)| if i == index { &updated } else { item }),
    )
    .ok_or(TOTAL_OVERFLOW)?;
    cart.items[index] = updated;
    cart.total = total;
    Ok(Json(CartEnvelope { cart: cart.clone() }))
}

async fn stripe_payment(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<StripeCharge>,
) -> Result<Json<ChargeEnvelope>, ApiFailure> {
    if input.token.trim().is_empty() {
        return Err(ApiFailure::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "The token field is required.",
        ));
    }
    let mut carts = db.write().await;
    let cart = carts.get_mut(&id).ok_or(CHECKOUT_NOT_FOUND)?;
    if cart.paid {
        return Err(ALREADY_PAID);
    }
    if input.token == DECLINED_TOKEN {
        return Err(ApiFailure::new(
            StatusCode::PAYMENT_REQUIRED,
            "Your card was declined.",
        ));
    }
    cart.paid = true;
    let charge = Charge {
        id: format!("ch_{}", Uuid::new_v4().simple()),
        amount: cart.total,
        status: "succeeded".to_string(),
    };
    info!(checkout_id = %cart.id, amount = charge.amount, "checkout charged");
    Ok(Json(ChargeEnvelope {
        cart: cart.clone(),
        charge,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cart_is_empty_and_unpaid() {
        let cart = Cart::new();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total, 0);
        assert!(!cart.paid);
        assert!(Uuid::parse_str(&cart.id).is_ok());
    }

    #[test]
    fn cart_serializes_without_item_counter() {
        let json = serde_json::to_value(Cart::new()).unwrap();
        assert!(json.get("next_item_id").is_none());
        assert_eq!(json["items"], serde_json::json!([]));
        assert_eq!(json["paid"], false);
    }

    fn item(id: u64, qty: u32, price: u64) -> CartItem {
        CartItem {
            id,
            product_id: format!("sku-{id}"),
            qty,
            price,
        }
    }

    #[test]
    fn total_sums_price_times_qty() {
        let items = [item(1, 2, 250), item(2, 1, 100)];
        assert_eq!(checked_total(items.iter()), Some(600));
    }

    #[test]
    fn total_overflow_is_none() {
        assert_eq!(checked_total([item(1, 2, u64::MAX)].iter()), None);
        assert_eq!(checked_total([item(1, 1, u64::MAX), item(2, 1, 1)].iter()), None);
    }

    #[test]
    fn add_item_defaults_qty_and_price() {
        let input: AddItem = serde_json::from_str(r#"{"product_id":"sku-1"}"#).unwrap();
        assert_eq!(input.qty, 1);
        assert_eq!(input.price, 0);
    }

    #[test]
    fn add_item_rejects_missing_product() {
        let result: Result<AddItem, _> = serde_json::from_str(r#"{"qty":2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn qty_update_rejects_negative() {
        let result: Result<QtyUpdate, _> = serde_json::from_str(r#"{"qty":-1}"#);
        assert!(result.is_err());
    }
}
