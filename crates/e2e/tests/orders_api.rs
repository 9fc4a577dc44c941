//! Order submission endpoint cases
//!
//! Hard-asserted: the first failing expectation aborts the case. Each case
//! acquires its own client-credentials session; the token is never
//! refreshed, so a mid-run expiry is itself a test failure.
//!
//! These cases hit the live partner API and are therefore `#[ignore]`d by
//! default. Run with credentials configured:
//!
//! ```text
//! ESIMSTORE_CLIENT_ID=... ESIMSTORE_CLIENT_SECRET=... \
//!   cargo test -p esimstore-e2e --test orders_api -- --ignored
//! ```

use serde_json::json;

use esimstore_common::types::{OrderRequest, OrderResponse, ValidationErrors};
use esimstore_common::SuiteConfig;
use esimstore_e2e::api::{ApiClient, ApiSession};

const VALID_PACKAGE: &str = "merhaba-7days-1gb";
const INVALID_PACKAGE: &str = "areeba-30days-3gbs";
const ORDER_DESCRIPTION: &str = "regression order";

async fn live_session() -> Option<(SuiteConfig, ApiClient, ApiSession)> {
    let config = SuiteConfig::from_env();
    if !config.api.is_configured() {
        return None;
    }
    let client = ApiClient::new(&config.api).expect("build API client");
    let session = client
        .authenticate(&config.api)
        .await
        .expect("client-credentials token exchange");
    Some((config, client, session))
}

macro_rules! require_live {
    () => {
        match live_session().await {
            Some(parts) => parts,
            None => {
                eprintln!("Skipping: ESIMSTORE_CLIENT_ID / ESIMSTORE_CLIENT_SECRET not set");
                return;
            }
        }
    };
}

#[tokio::test]
#[ignore = "requires live partner API credentials"]
async fn valid_order_echoes_fields_and_provisions_requested_quantity() {
    let (_config, _client, session) = require_live!();

    let payload =
        serde_json::to_value(OrderRequest::sim(6, VALID_PACKAGE, ORDER_DESCRIPTION)).unwrap();
    let reply = session.submit_order(&payload).await.expect("submit order");

    assert_eq!(reply.status, 200, "body: {}", reply.body);
    let order: OrderResponse = reply.json().expect("typed order body");
    assert_eq!(order.data.quantity, 6);
    assert_eq!(order.data.package_id, VALID_PACKAGE);
    assert_eq!(order.data.description.as_deref(), Some(ORDER_DESCRIPTION));
    assert_eq!(
        order.data.sims.len(),
        6,
        "sims collection size must equal requested quantity"
    );
}

#[tokio::test]
#[ignore = "requires live partner API credentials"]
async fn order_without_bearer_token_is_unauthorized() {
    let (_config, client, _session) = require_live!();

    let payload =
        serde_json::to_value(OrderRequest::sim(1, VALID_PACKAGE, ORDER_DESCRIPTION)).unwrap();
    let reply = client
        .submit_order_with_bearer("", &payload)
        .await
        .expect("submit order");

    assert_eq!(reply.status, 401, "body: {}", reply.body);
}

#[tokio::test]
#[ignore = "requires live partner API credentials"]
async fn order_with_unexpected_field_is_unprocessable() {
    let (_config, _client, session) = require_live!();

    let payload = json!({
        "quantity": 1,
        "package_id": VALID_PACKAGE,
        "type": "sim",
        "description": ORDER_DESCRIPTION,
        "surprise": "not-part-of-the-contract"
    });
    let reply = session.submit_order(&payload).await.expect("submit order");

    assert_eq!(reply.status, 422, "body: {}", reply.body);
}

#[tokio::test]
#[ignore = "requires live partner API credentials"]
async fn blank_mandatory_fields_yield_field_specific_messages() {
    let (_config, _client, session) = require_live!();

    let payload = json!({
        "quantity": "",
        "package_id": "",
        "type": ""
    });
    let reply = session.submit_order(&payload).await.expect("submit order");

    assert_eq!(reply.status, 422, "body: {}", reply.body);
    let errors = reply.validation_errors();
    assert_eq!(
        errors.message("package_id"),
        Some("The package id field is required.")
    );
    assert_eq!(
        errors.message("quantity"),
        Some("The quantity field is required.")
    );
    assert_eq!(errors.message("type"), Some("The selected type is invalid."));
}

#[tokio::test]
#[ignore = "requires live partner API credentials"]
async fn oversized_quantity_with_invalid_package_reports_both_violations() {
    let (_config, _client, session) = require_live!();

    let payload =
        serde_json::to_value(OrderRequest::sim(100, INVALID_PACKAGE, ORDER_DESCRIPTION)).unwrap();
    let reply = session.submit_order(&payload).await.expect("submit order");

    assert_eq!(reply.status, 422, "body: {}", reply.body);

    let mut expected = ValidationErrors::default();
    expected.0.insert(
        "package_id".to_string(),
        "The selected package is invalid.".to_string(),
    );
    expected.0.insert(
        "quantity".to_string(),
        "The quantity may not be greater than 50.".to_string(),
    );
    assert_eq!(reply.validation_errors(), expected);
}
