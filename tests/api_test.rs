//! HTTP-level tests against the real route table, backed by the in-memory
//! store and a canned payment provider. No Docker required.

use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use bigdecimal::BigDecimal;
use pisces::domain::errors::DomainError;
use pisces::domain::ports::PaymentProvider;
use pisces::domain::user::NewUser;
use pisces::infrastructure::memory::InMemoryStore;
use pisces::state::AppState;
use serde_json::{json, Value};
use uuid::Uuid;

const ADMIN_PASSWORD: &str = "correct horse battery staple";

struct CannedPayments;

impl PaymentProvider for CannedPayments {
    fn create_external_order(
        &self,
        order_id: Uuid,
        _amount: &BigDecimal,
    ) -> Result<String, DomainError> {
        Ok(format!("PAYPAL-{}", order_id.simple()))
    }

    fn generate_client_token(&self) -> Result<String, DomainError> {
        Ok("client-token-abc".to_string())
    }

    fn provider_name(&self) -> &'static str {
        "Canned"
    }
}

fn new_state() -> AppState {
    AppState::in_memory(
        InMemoryStore::new(),
        Arc::new(CannedPayments),
        "api-test-secret",
        chrono::Duration::hours(1),
    )
}

/// Same wiring as `build_server`, minus the socket.
macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(pisces::extractor_config)
                .configure(pisces::routes)
                .default_service(web::to(pisces::handlers::not_found)),
        )
        .await
    };
}

fn seed_admin(state: &AppState) {
    let created = state
        .auth
        .ensure_admin(
            NewUser {
                username: "admin".to_string(),
                email: "admin@pisces.test".to_string(),
                admin: true,
            },
            ADMIN_PASSWORD,
        )
        .expect("seed admin");
    assert!(created);
}

fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", token))
}

fn inline_inquiry() -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": "ada@example.com",
        "phone": "555-0100",
        "description": "A custom print run"
    })
}

#[actix_web::test]
async fn checkout_flow_prices_cart_and_authorizes() {
    let state = new_state();
    seed_admin(&state);
    let app = init_app!(state);

    // Admin lists a product at 10.00.
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "admin", "password": ADMIN_PASSWORD }))
        .to_request();
    let login: Value = test::call_and_read_body_json(&app, req).await;
    let token = login["token"].as_str().expect("token").to_string();

    let req = test::TestRequest::post()
        .uri("/products")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "Poster", "description": "A2", "cost": "10", "inventory": 5 }))
        .to_request();
    let product: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(product["cost"], "10.00");
    let product_id = product["id"].as_str().expect("product id").to_string();

    // Customer opens an order with an inline inquiry.
    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(json!({ "inquiry": inline_inquiry(), "payment_method": "PAYPAL" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = test::read_body_json(resp).await;
    assert_eq!(order["status"], "USER_PENDING");
    assert_eq!(order["total"], "0.00");
    assert_eq!(order["ext_id"], Value::Null);
    let order_id = order["id"].as_str().expect("order id").to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/inquiries/{}", order["inquiry_id"].as_str().expect("inquiry id")))
        .to_request();
    let inquiry: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(inquiry["order_id"], order_id.as_str());

    let req = test::TestRequest::put()
        .uri(&format!("/orders/{}/cart", order_id))
        .set_json(json!({ "items": [{ "product_id": product_id, "quantity": 3 }] }))
        .to_request();
    let cart: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));

    let req = test::TestRequest::get()
        .uri(&format!("/orders/{}/total", order_id))
        .to_request();
    let total: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(total["total"], "30.00");

    let req = test::TestRequest::post()
        .uri(&format!("/orders/{}/authorize", order_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let authorized: Value = test::read_body_json(resp).await;
    assert_eq!(authorized["status"], "ADMIN_PENDING");
    assert_eq!(authorized["total"], "30.00");
    assert!(authorized["ext_id"]
        .as_str()
        .is_some_and(|id| id.starts_with("PAYPAL-")));

    // A second authorize and further cart edits are refused.
    let req = test::TestRequest::post()
        .uri(&format!("/orders/{}/authorize", order_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&format!("/orders/{}/cart/items", order_id))
        .set_json(json!({ "product_id": product_id, "action": "REMOVE" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Admin accepts it and finds it by status.
    let req = test::TestRequest::post()
        .uri(&format!("/orders/{}/accept", order_id))
        .insert_header(bearer(&token))
        .to_request();
    let accepted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(accepted["status"], "ACCEPTED");

    let req = test::TestRequest::get()
        .uri("/orders?status=ACCEPTED")
        .insert_header(bearer(&token))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    let ids: Vec<&str> = listed
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|o| o["id"].as_str())
        .collect();
    assert_eq!(ids, vec![order_id.as_str()]);
}

#[actix_web::test]
async fn order_without_inquiry_is_rejected() {
    let state = new_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(json!({ "payment_method": "PAYPAL" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn admin_routes_reject_missing_and_non_admin_tokens() {
    let state = new_state();
    seed_admin(&state);
    let app = init_app!(state);

    for (method, uri) in [
        ("GET", "/orders"),
        ("GET", "/inquiries"),
        ("POST", "/auth/users"),
    ] {
        let req = match method {
            "GET" => test::TestRequest::get(),
            _ => test::TestRequest::post().set_json(json!({
                "username": "x", "email": "x@example.com", "password": "pw"
            })),
        }
        .uri(uri)
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "admin@pisces.test", "password": ADMIN_PASSWORD }))
        .to_request();
    let login: Value = test::call_and_read_body_json(&app, req).await;
    let admin_token = login["token"].as_str().expect("token").to_string();

    let req = test::TestRequest::post()
        .uri("/auth/users")
        .insert_header(bearer(&admin_token))
        .set_json(json!({ "username": "clerk", "email": "clerk@pisces.test", "password": "hunter22" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let clerk: Value = test::read_body_json(resp).await;
    assert_eq!(clerk["admin"], false);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "clerk", "password": "hunter22" }))
        .to_request();
    let login: Value = test::call_and_read_body_json(&app, req).await;
    let clerk_token = login["token"].as_str().expect("token").to_string();

    let req = test::TestRequest::post()
        .uri("/auth/check")
        .insert_header(bearer(&clerk_token))
        .to_request();
    let checked: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(checked["username"], "clerk");

    let req = test::TestRequest::get()
        .uri("/orders")
        .insert_header(bearer(&clerk_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn wrong_password_and_forged_token_are_unauthorized() {
    let state = new_state();
    seed_admin(&state);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "admin", "password": "nope" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "password": ADMIN_PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/auth/check")
        .insert_header(bearer("eyJhbGciOiJIUzI1NiJ9.e30.c2lnbmF0dXJl"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn archived_products_are_hidden_unless_requested() {
    let state = new_state();
    seed_admin(&state);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "admin", "password": ADMIN_PASSWORD }))
        .to_request();
    let login: Value = test::call_and_read_body_json(&app, req).await;
    let token = login["token"].as_str().expect("token").to_string();

    let req = test::TestRequest::post()
        .uri("/products")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "Mug", "cost": "4.5" }))
        .to_request();
    let product: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(product["cost"], "4.50");
    let id = product["id"].as_str().expect("id").to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/products/{}", id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/products/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/products").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));

    let req = test::TestRequest::get()
        .uri("/products?include_archived=true")
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed[0]["id"], id.as_str());
    assert!(listed[0]["deleted_at"].is_string());

    let req = test::TestRequest::post()
        .uri("/products")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "Mug", "cost": "four" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn client_token_comes_from_the_payment_provider() {
    let state = new_state();
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/payments/paypal/client-token")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["client_token"], "client-token-abc");
}

#[actix_web::test]
async fn unknown_routes_and_bad_input_use_the_error_body() {
    let state = new_state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Not found" }));

    let req = test::TestRequest::get()
        .uri(&format!("/orders/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/orders/not-a-uuid").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/orders")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}
