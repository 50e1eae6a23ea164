//! Verify request building and response normalization against the JSON test
//! vectors stored in `test-vectors/`.
//!
//! Each vector file describes the stored checkout id, operation inputs, the
//! expected request, a simulated response, and the expected normalized
//! result. Bodies are compared as parsed JSON to avoid false negatives from
//! field ordering.

use checkout_core::{
    CartClient, HttpMethod, HttpRequest, HttpResponse, HttpTransport, KeyValueStore, MemoryStore,
    NormalizedResponse, QtyDirection, TransportError,
};
use serde_json::Value;

const KEY: &str = "cj_ckId";

/// Answers every request with the same canned response.
#[derive(Clone)]
struct Replay {
    response: HttpResponse,
}

impl HttpTransport for Replay {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(self.response.clone())
    }
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        other => panic!("unknown method: {other}"),
    }
}

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn store_for(case: &Value) -> MemoryStore {
    let store = MemoryStore::new();
    if let Some(id) = case["stored_checkout_id"].as_str() {
        store.set_item(KEY, id).unwrap();
    }
    store
}

fn client_for(
    case: &Value,
    store: MemoryStore,
) -> CartClient<impl Fn() -> Replay + Send + Sync, MemoryStore> {
    let sim = &case["simulated_response"];
    let replay = Replay {
        response: HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        },
    };
    CartClient::new(move || replay.clone(), "laravel-cart", store).unwrap()
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, expected["path"].as_str().unwrap(), "{name}: path");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match &expected["body"] {
        Value::Null => assert!(req.body.is_none(), "{name}: body should be None"),
        body => {
            let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
    }
}

fn assert_result(name: &str, actual: &NormalizedResponse, case: &Value) {
    let expected: NormalizedResponse =
        serde_json::from_value(case["expected_result"].clone()).unwrap();
    assert_eq!(actual, &expected, "{name}: normalized result");
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_test_vectors() {
    for case in cases(include_str!("../../test-vectors/create.json")) {
        let name = case["name"].as_str().unwrap();
        let store = store_for(&case);
        let c = client_for(&case, store.clone());

        assert_request(name, &c.build_create_checkout(), &case["expected_request"]);

        let result = c.create_checkout_instance().await.unwrap();
        assert_result(name, &result, &case);
        assert_eq!(
            store.get_item(KEY).as_deref(),
            case["expected_stored_id"].as_str(),
            "{name}: stored id"
        );
    }
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_test_vectors() {
    for case in cases(include_str!("../../test-vectors/get.json")) {
        let name = case["name"].as_str().unwrap();
        let c = client_for(&case, store_for(&case));

        assert_request(name, &c.build_get_checkout(), &case["expected_request"]);

        let result = c.get_checkout_instance().await.unwrap();
        assert_result(name, &result, &case);
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_test_vectors() {
    for case in cases(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let c = client_for(&case, store_for(&case));
        let input = &case["input"];

        let req = c.build_update_checkout(input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.update_checkout_instance(input).await.unwrap();
        assert_result(name, &result, &case);
    }
}

// ---------------------------------------------------------------------------
// Add item
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_item_test_vectors() {
    for case in cases(include_str!("../../test-vectors/add_item.json")) {
        let name = case["name"].as_str().unwrap();
        let c = client_for(&case, store_for(&case));
        let input = &case["input"];

        let req = c.build_add_item(input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.add_checkout_item(input).await.unwrap();
        assert_result(name, &result, &case);
    }
}

// ---------------------------------------------------------------------------
// Update item quantity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_item_qty_test_vectors() {
    for case in cases(include_str!("../../test-vectors/update_item_qty.json")) {
        let name = case["name"].as_str().unwrap();
        let c = client_for(&case, store_for(&case));
        let input = &case["input"];
        let item_id = input["item_id"].as_str().unwrap();
        let initial_qty = input["initial_qty"].as_u64().unwrap() as u32;
        let direction = QtyDirection::from(input["direction"].as_str().unwrap());

        let req = c.build_update_item_qty(item_id, initial_qty, direction).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c
            .update_checkout_item_qty(item_id, initial_qty, direction)
            .await
            .unwrap();
        assert_result(name, &result, &case);
    }
}

// ---------------------------------------------------------------------------
// Stripe payment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stripe_payment_test_vectors() {
    for case in cases(include_str!("../../test-vectors/stripe_payment.json")) {
        let name = case["name"].as_str().unwrap();
        let c = client_for(&case, store_for(&case));
        let token = case["input"]["token"].as_str().unwrap();

        let req = c.build_stripe_payment(token).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.trigger_stripe_payment(token).await.unwrap();
        assert_result(name, &result, &case);
    }
}
