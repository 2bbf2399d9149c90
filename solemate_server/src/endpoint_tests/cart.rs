use actix_web::http::StatusCode;
use serde_json::json;

use super::{
    helpers::{delete, get, patch, post, shopper_token, TestContext},
    mocks::unused_router,
};

#[actix_web::test]
async fn cart_requires_a_bearer_token() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    let (status, _) = get(&ctx, None, "/api/cart").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn an_untouched_cart_reads_as_empty() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    let token = shopper_token();
    let (status, body) = get(&ctx, Some(&token), "/api/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cart is empty");
    assert_eq!(body["data"]["length"], 0);
}

#[actix_web::test]
async fn cart_mutations_keep_the_total_consistent() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    ctx.seed_catalog().await;
    let token = shopper_token();

    let (status, body) = post(
        &ctx,
        Some(&token),
        "/api/cart/items",
        json!({ "product_id": "air-strider", "variant_id": "us-9", "quantity": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Air Strider (Size: US 9) added to cart successfully");
    assert_eq!(body["data"]["cart"]["total"], 5000);
    assert_eq!(body["data"]["length"], 1);

    let selector = json!({ "product_id": "air-strider", "variant_id": "us-9" });
    let (_, body) = patch(&ctx, Some(&token), "/api/cart/items/increase", selector.clone()).await;
    assert_eq!(body["data"]["cart"]["total"], 7500);

    let (_, body) = patch(&ctx, Some(&token), "/api/cart/items/decrease", selector.clone()).await;
    assert_eq!(body["data"]["cart"]["total"], 5000);

    let (_, body) = delete(&ctx, Some(&token), "/api/cart/items", Some(selector)).await;
    assert_eq!(body["data"]["cart"]["total"], 0);
    assert_eq!(body["data"]["length"], 0);
}

#[actix_web::test]
async fn out_of_stock_requests_are_rejected() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    ctx.seed_catalog().await;
    let token = shopper_token();

    // us-10 has a stock of 3.
    let (status, body) = post(
        &ctx,
        Some(&token),
        "/api/cart/items",
        json!({ "product_id": "air-strider", "variant_id": "us-10", "quantity": 4 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap_or_default().contains("3 left in stock"));
}

#[actix_web::test]
async fn unknown_variants_are_not_found() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    ctx.seed_catalog().await;
    let token = shopper_token();
    let (status, _) = post(
        &ctx,
        Some(&token),
        "/api/cart/items",
        json!({ "product_id": "air-strider", "variant_id": "eu-44", "quantity": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn clearing_the_cart_always_succeeds() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    let token = shopper_token();
    let (status, body) = delete(&ctx, Some(&token), "/api/cart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cart cleared");
}
