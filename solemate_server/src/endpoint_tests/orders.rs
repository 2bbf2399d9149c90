use actix_web::http::StatusCode;
use serde_json::json;

use super::{
    helpers::{checkout_ready, create_address, get, post, shopper_token, TestContext},
    mocks::unused_router,
};

#[actix_web::test]
async fn orders_require_a_bearer_token() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    let (status, body) = get(&ctx, None, "/api/orders").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
}

#[actix_web::test]
async fn garbage_tokens_are_rejected() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    let (status, _) = get(&ctx, Some("not-a-jwt"), "/api/orders").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn initialize_order_snapshots_the_cart() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    let token = shopper_token();
    let order_number = checkout_ready(&ctx, &token).await;

    let (status, body) = get(&ctx, Some(&token), &format!("/api/orders/{order_number}")).await;
    assert_eq!(status, StatusCode::OK);
    let order = &body["data"]["order"];
    assert_eq!(order["status"], "initialized");
    assert_eq!(order["cart_data"]["total_amount"], 5000);
    assert_eq!(order["user_data"]["email"], "ada@example.com");
    assert_eq!(order["shipping_data"]["city"], "Ikeja");
    assert_eq!(order["activity"].as_array().map(Vec::len), Some(1));
    assert!(order["payment_data"].is_null());
}

#[actix_web::test]
async fn initialize_order_with_unknown_address_is_not_found() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    let token = shopper_token();
    let (status, body) =
        post(&ctx, Some(&token), "/api/orders/initialize", json!({ "address_id": 42, "delivery_mode": 1 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[actix_web::test]
async fn order_listing_is_scoped_to_the_caller() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    let token = shopper_token();
    let order_number = checkout_ready(&ctx, &token).await;

    let (status, body) = get(&ctx, Some(&token), "/api/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 1);
    assert_eq!(body["data"]["orders"][0]["order_number"], order_number.as_str());

    let other = super::helpers::issue_token(&crate::auth::JwtClaims {
        sub: "user-2".to_string(),
        first_name: "Ben".to_string(),
        last_name: "Eze".to_string(),
        email: "ben@example.com".to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(1)).timestamp(),
    });
    let (status, body) = get(&ctx, Some(&other), "/api/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 0);
    let (status, _) = get(&ctx, Some(&other), &format!("/api/orders/{order_number}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn address_book_round_trip() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    let token = shopper_token();
    let id = create_address(&ctx, &token).await;

    let (status, body) = get(&ctx, Some(&token), "/api/addresses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 1);

    let (status, body) = get(&ctx, Some(&token), &format!("/api/addresses/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["address"]["city"], "Ikeja");
}
