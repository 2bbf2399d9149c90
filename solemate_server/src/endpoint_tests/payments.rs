use actix_web::http::StatusCode;
use chrono::Utc;
use payment_gateways::{ChargeOutcome, ChargeStatus, GatewayError, GatewayRouter, InitializedCharge, PaymentMethod};
use serde_json::json;
use sm_common::Naira;

use super::{
    helpers::{checkout_ready, get, post, shopper_token, TestContext},
    mocks::{router_with, unused_router, MockGateway},
};

fn success_outcome(provider: PaymentMethod, reference: &str, amount: i64) -> ChargeOutcome {
    ChargeOutcome {
        provider,
        reference: reference.to_string(),
        status: ChargeStatus::Success,
        amount: Some(Naira::from(amount)),
        paid_at: Some(Utc::now()),
        raw: json!({ "status": "success", "reference": reference }),
    }
}

fn failed_outcome(provider: PaymentMethod, reference: &str) -> ChargeOutcome {
    ChargeOutcome {
        provider,
        reference: reference.to_string(),
        status: ChargeStatus::Failed,
        amount: Some(Naira::from(0)),
        paid_at: None,
        raw: json!({ "status": "failed", "reference": reference }),
    }
}

/// A Paystack mock that issues `reference` on initialization and confirms any verification.
fn happy_paystack_router(reference: &'static str) -> GatewayRouter {
    let mut paystack = MockGateway::new();
    paystack.expect_initialize_charge().returning(move |_req| {
        Ok(InitializedCharge {
            provider: PaymentMethod::Paystack,
            reference: reference.to_string(),
            access: json!({ "access_code": "AC_123", "authorization_url": "https://checkout.paystack.test/AC_123" }),
        })
    });
    paystack
        .expect_verify_charge()
        .returning(|r| Ok(success_outcome(PaymentMethod::Paystack, r, 5000)));
    router_with(paystack, MockGateway::new())
}

#[actix_web::test]
async fn unknown_method_selectors_are_rejected() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    let token = shopper_token();
    let (status, body) = post(
        &ctx,
        Some(&token),
        "/api/payments/initialize",
        json!({ "order_id": "ORD-1-000", "method": 3, "amount": 5000, "email": "ada@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    let (status, _) = get(&ctx, Some(&token), "/api/payments/verify?reference=R1&method=7").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn payment_amount_is_cross_checked_against_the_cart() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(unused_router()).await;
    let token = shopper_token();
    let order_number = checkout_ready(&ctx, &token).await;

    let (status, body) = post(
        &ctx,
        Some(&token),
        "/api/payments/initialize",
        json!({ "order_id": order_number, "method": 1, "amount": 4999, "email": "ada@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap_or_default();
    assert!(message.contains("₦5000"), "expected the required amount in: {message}");
}

#[actix_web::test]
async fn successful_checkout_confirms_the_order_and_clears_the_cart() {
    let _ = env_logger::try_init();
    let ctx = TestContext::new(happy_paystack_router("PSK000001")).await;
    let token = shopper_token();
    let order_number = checkout_ready(&ctx, &token).await;

    let (status, body) = post(
        &ctx,
        Some(&token),
        "/api/payments/initialize",
        json!({ "order_id": order_number, "method": 1, "amount": 5000, "email": "ada@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "payment initialization failed: {body}");
    assert_eq!(body["data"]["reference"], "PSK000001");
    assert_eq!(body["data"]["method"], 1);
    assert!(body["data"]["accessData"]["access_code"].is_string());
    assert!(body["data"]["paymentId"].is_i64() || body["data"]["paymentId"].is_u64());

    let (status, body) =
        get(&ctx, Some(&token), "/api/payments/verify?reference=PSK000001&method=1").await;
    assert_eq!(status, StatusCode::OK, "verification failed: {body}");
    assert_eq!(body["data"]["payment"]["status"], "success");
    assert_eq!(body["data"]["order"]["status"], "payment-confirmed");
    assert_eq!(body["data"]["order"]["payment_data"]["amount_paid"], 5000);

    // Cart-to-order handoff: the live cart is gone.
    let (status, body) = get(&ctx, Some(&token), "/api/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["length"], 0);

    // Verifying again is harmless.
    let (status, body) =
        get(&ctx, Some(&token), "/api/payments/verify?reference=PSK000001&method=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order"]["activity"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn unknown_references_are_not_found() {
    let _ = env_logger::try_init();
    // The provider happily confirms a charge this system never initiated.
    let mut paystack = MockGateway::new();
    paystack
        .expect_verify_charge()
        .returning(|r| Ok(success_outcome(PaymentMethod::Paystack, r, 5000)));
    let ctx = TestContext::new(router_with(paystack, MockGateway::new())).await;
    let token = shopper_token();
    let _ = checkout_ready(&ctx, &token).await;

    let (status, body) = get(&ctx, Some(&token), "/api/payments/verify?reference=GHOST&method=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[actix_web::test]
async fn failed_verification_reports_400_and_keeps_the_cart() {
    let _ = env_logger::try_init();
    let mut korapay = MockGateway::new();
    korapay.expect_initialize_charge().returning(|req| {
        Ok(InitializedCharge {
            provider: PaymentMethod::Korapay,
            reference: req.reference.clone(),
            access: json!({ "checkout_url": "https://checkout.korapay.test/session" }),
        })
    });
    korapay.expect_verify_charge().returning(|r| Ok(failed_outcome(PaymentMethod::Korapay, r)));
    let ctx = TestContext::new(router_with(MockGateway::new(), korapay)).await;
    let token = shopper_token();
    let order_number = checkout_ready(&ctx, &token).await;

    let (status, body) = post(
        &ctx,
        Some(&token),
        "/api/payments/initialize",
        json!({ "order_id": order_number, "method": 2, "amount": 5000, "email": "ada@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reference = body["data"]["reference"].as_str().expect("reference missing").to_string();

    let (status, body) =
        get(&ctx, Some(&token), &format!("/api/payments/verify?reference={reference}&method=2")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Payment verification failed");

    // The failure was recorded locally, and the cart survives for a retry.
    let (_, body) = get(&ctx, Some(&token), &format!("/api/orders/{order_number}")).await;
    assert_eq!(body["data"]["order"]["status"], "payment-failed");
    let (_, body) = get(&ctx, Some(&token), "/api/cart").await;
    assert_eq!(body["data"]["length"], 1);
}

#[actix_web::test]
async fn gateway_rejection_surfaces_and_leaves_the_order_clean() {
    let _ = env_logger::try_init();
    let mut paystack = MockGateway::new();
    paystack.expect_initialize_charge().returning(|_req| {
        Err(GatewayError::Rejected { status: 401, message: "Invalid secret key".to_string() })
    });
    let ctx = TestContext::new(router_with(paystack, MockGateway::new())).await;
    let token = shopper_token();
    let order_number = checkout_ready(&ctx, &token).await;

    let (status, body) = post(
        &ctx,
        Some(&token),
        "/api/payments/initialize",
        json!({ "order_id": order_number, "method": 1, "amount": 5000, "email": "ada@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    // No partial payment artifact: the order is still initialized with a single activity entry.
    let (_, body) = get(&ctx, Some(&token), &format!("/api/orders/{order_number}")).await;
    assert_eq!(body["data"]["order"]["status"], "initialized");
    assert_eq!(body["data"]["order"]["activity"].as_array().map(Vec::len), Some(1));
}
