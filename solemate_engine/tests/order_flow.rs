//! Integration tests for the checkout workflow: initialize → pay → verify → finalize, against
//! a real SQLite store and scripted payment providers.
mod support;

use payment_gateways::{ChargeStatus, PaymentMethod};
use sm_common::Naira;
use solemate_engine::{
    db_types::{NewAddress, NewPaymentRecord, OrderId, OrderStatusType, PaymentStatus, UserInfo},
    traits::{CheckoutDatabase, CheckoutDbError},
    OrderFlowError,
};
use support::TestHarness;

const SHOE: &str = "air-strider";

/// Seeds the catalog, fills the cart to a total of ₦5000 (2 × ₦2500), saves an address and
/// initializes an order for it.
async fn checkout_ready(h: &TestHarness) -> (UserInfo, solemate_engine::db_types::Order) {
    let user = h.shopper();
    h.seed_catalog().await;
    h.carts.add_item(&user.user_id, SHOE, "us-9", 2).await.expect("Error filling cart");
    let address = h
        .addresses
        .create_address(
            &user.user_id,
            NewAddress {
                address: "12 Allen Avenue".to_string(),
                city: "Ikeja".to_string(),
                state: "Lagos".to_string(),
                postal_code: "100271".to_string(),
            },
        )
        .await
        .expect("Error saving address");
    let order = h.orders.initialize_order(&user, address.id, 1).await.expect("Error initializing order");
    (user, order)
}

#[tokio::test]
async fn initialize_order_freezes_cart_and_address_snapshots() {
    let h = TestHarness::new().await;
    let (user, order) = checkout_ready(&h).await;

    assert_eq!(order.status, OrderStatusType::Initialized);
    assert_eq!(order.user_id, user.user_id);
    assert_eq!(order.user_data.email, user.email);
    assert_eq!(order.shipping_data.city, "Ikeja");
    assert_eq!(order.cart_data.total_amount, Naira::from(5000));
    assert_eq!(order.cart_data.items.len(), 1);
    assert_eq!(order.activity.len(), 1);
    assert_eq!(order.activity[0].status, OrderStatusType::Initialized);
    // No payment artifacts yet, and the live cart is untouched.
    assert!(order.payment_data.is_none());
    let cart = h.carts.get_cart(&user.user_id).await.unwrap().expect("Cart should still exist");
    assert_eq!(cart.total, Naira::from(5000));
}

#[tokio::test]
async fn initialize_order_requires_an_owned_address() {
    let h = TestHarness::new().await;
    let user = h.shopper();
    let err = h.orders.initialize_order(&user, 999, 1).await.expect_err("Expected error");
    assert!(matches!(err, OrderFlowError::AddressNotFound(999)));
}

#[tokio::test]
async fn later_cart_mutations_do_not_change_the_order_snapshot() {
    let h = TestHarness::new().await;
    let (user, order) = checkout_ready(&h).await;

    // Mutate the cart after the order was initialized.
    h.carts.add_item(&user.user_id, SHOE, "us-10", 1).await.expect("Error adding to cart");
    let cart = h.carts.get_cart(&user.user_id).await.unwrap().unwrap();
    assert_eq!(cart.total, Naira::from(6500));

    let order = h.orders.order_by_number(&user, &order.order_number).await.expect("Error fetching order");
    assert_eq!(order.cart_data.total_amount, Naira::from(5000));
    assert_eq!(order.cart_data.items.len(), 1);
}

#[tokio::test]
async fn payment_amount_must_match_the_live_cart_total() {
    let h = TestHarness::new().await;
    let (user, order) = checkout_ready(&h).await;

    let err = h
        .orders
        .initialize_payment(&user, &order.order_number, Naira::from(4999), PaymentMethod::Paystack, &user.email)
        .await
        .expect_err("Expected amount mismatch");
    match err {
        OrderFlowError::AmountMismatch { expected } => assert_eq!(expected, Naira::from(5000)),
        other => panic!("Expected AmountMismatch, got {other}"),
    }

    // The check follows the LIVE cart: once the cart changes, the old total is rejected too.
    h.carts.add_item(&user.user_id, SHOE, "us-10", 1).await.unwrap();
    let err = h
        .orders
        .initialize_payment(&user, &order.order_number, Naira::from(5000), PaymentMethod::Paystack, &user.email)
        .await
        .expect_err("Expected amount mismatch");
    assert!(matches!(err, OrderFlowError::AmountMismatch { expected } if expected == Naira::from(6500)));
}

#[tokio::test]
async fn foreign_orders_cannot_be_paid_for() {
    let h = TestHarness::new().await;
    let (_user, order) = checkout_ready(&h).await;
    let intruder = UserInfo {
        user_id: "user-2".to_string(),
        first_name: "Ben".to_string(),
        last_name: "Eze".to_string(),
        email: "ben@example.com".to_string(),
    };
    let err = h
        .orders
        .initialize_payment(&intruder, &order.order_number, Naira::from(5000), PaymentMethod::Paystack, "ben@example.com")
        .await
        .expect_err("Expected ownership error");
    assert!(matches!(err, OrderFlowError::OrderOwnership(_)));
}

#[tokio::test]
async fn gateway_rejection_leaves_no_payment_artifact() {
    let h = TestHarness::new().await;
    let (user, order) = checkout_ready(&h).await;

    h.script.fail_initialization(true);
    let err = h
        .orders
        .initialize_payment(&user, &order.order_number, Naira::from(5000), PaymentMethod::Korapay, &user.email)
        .await
        .expect_err("Expected gateway error");
    assert!(matches!(err, OrderFlowError::Gateway(_)));

    // The order is untouched: still initialized, single activity entry, no payment data.
    let order = h.orders.order_by_number(&user, &order.order_number).await.unwrap();
    assert_eq!(order.status, OrderStatusType::Initialized);
    assert_eq!(order.activity.len(), 1);
    assert!(order.payment_data.is_none());

    // A later attempt with a working provider succeeds.
    h.script.fail_initialization(false);
    let payment = h
        .orders
        .initialize_payment(&user, &order.order_number, Naira::from(5000), PaymentMethod::Korapay, &user.email)
        .await
        .expect("Error initializing payment");
    assert!(payment.reference.starts_with("KORA-"));
}

#[tokio::test]
async fn end_to_end_success_confirms_order_and_consumes_cart() {
    let h = TestHarness::new().await;
    let (user, order) = checkout_ready(&h).await;

    let init = h
        .orders
        .initialize_payment(&user, &order.order_number, Naira::from(5000), PaymentMethod::Paystack, &user.email)
        .await
        .expect("Error initializing payment");
    let payment = h
        .db
        .fetch_payment(PaymentMethod::Paystack, &init.reference)
        .await
        .unwrap()
        .expect("Payment record should exist");
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.amount, Naira::from(5000));

    h.script.report(&init.reference, ChargeStatus::Success, 5000);
    let verified =
        h.orders.verify_payment(PaymentMethod::Paystack, &init.reference).await.expect("Error verifying payment");

    assert_eq!(verified.payment.status, PaymentStatus::Success);
    assert_eq!(verified.order.status, OrderStatusType::PaymentConfirmed);
    let payment_data = verified.order.payment_data.as_ref().expect("Order should carry payment data");
    assert_eq!(payment_data.reference, init.reference);
    assert_eq!(payment_data.amount_paid, Naira::from(5000));
    assert_eq!(verified.order.activity.len(), 2);
    assert_eq!(verified.order.activity[1].status, OrderStatusType::PaymentConfirmed);

    // Cart-to-order handoff: the cart is gone.
    assert!(h.carts.get_cart(&user.user_id).await.unwrap().is_none());

    h.settle().await;
    assert_eq!(h.notifications_sent(), 1);
}

#[tokio::test]
async fn repeated_success_verification_is_a_no_op() {
    let h = TestHarness::new().await;
    let (user, order) = checkout_ready(&h).await;
    let init = h
        .orders
        .initialize_payment(&user, &order.order_number, Naira::from(5000), PaymentMethod::Paystack, &user.email)
        .await
        .unwrap();
    h.script.report(&init.reference, ChargeStatus::Success, 5000);

    let first = h.orders.verify_payment(PaymentMethod::Paystack, &init.reference).await.expect("First verify failed");
    let second =
        h.orders.verify_payment(PaymentMethod::Paystack, &init.reference).await.expect("Second verify failed");

    // Same terminal state, no duplicate activity entries.
    assert_eq!(first.order.status, OrderStatusType::PaymentConfirmed);
    assert_eq!(second.order.status, OrderStatusType::PaymentConfirmed);
    assert_eq!(second.order.activity.len(), 2);

    // Exactly one notification, and the already-absent cart did not cause an error.
    h.settle().await;
    assert_eq!(h.notifications_sent(), 1);
    assert!(h.carts.get_cart(&user.user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn failed_verification_keeps_the_cart_and_allows_retry() {
    let h = TestHarness::new().await;
    let (user, order) = checkout_ready(&h).await;
    let init = h
        .orders
        .initialize_payment(&user, &order.order_number, Naira::from(5000), PaymentMethod::Korapay, &user.email)
        .await
        .unwrap();
    h.script.report(&init.reference, ChargeStatus::Failed, 0);

    let err = h
        .orders
        .verify_payment(PaymentMethod::Korapay, &init.reference)
        .await
        .expect_err("Expected verification failure");
    assert!(matches!(err, OrderFlowError::VerificationFailed { .. }));

    // The failure path still performed its local writes.
    let order_now = h.orders.order_by_number(&user, &order.order_number).await.unwrap();
    assert_eq!(order_now.status, OrderStatusType::PaymentFailed);
    assert_eq!(order_now.activity.len(), 2);
    assert_eq!(order_now.activity[0].status, OrderStatusType::Initialized);
    assert_eq!(order_now.activity[1].status, OrderStatusType::PaymentFailed);
    let payment = h.db.fetch_payment(PaymentMethod::Korapay, &init.reference).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);

    // The cart survives, so the shopper can retry...
    let cart = h.carts.get_cart(&user.user_id).await.unwrap().expect("Cart should survive a failed payment");
    assert_eq!(cart.total, Naira::from(5000));

    // ...and a fresh attempt against the same order can still reach payment-confirmed.
    let retry = h
        .orders
        .initialize_payment(&user, &order.order_number, Naira::from(5000), PaymentMethod::Korapay, &user.email)
        .await
        .expect("Retry should be possible");
    assert_ne!(retry.reference, init.reference);
    h.script.report(&retry.reference, ChargeStatus::Success, 5000);
    let verified = h.orders.verify_payment(PaymentMethod::Korapay, &retry.reference).await.expect("Retry verify");
    assert_eq!(verified.order.status, OrderStatusType::PaymentConfirmed);
    assert!(h.carts.get_cart(&user.user_id).await.unwrap().is_none());
    h.settle().await;
    assert_eq!(h.notifications_sent(), 1);
}

#[tokio::test]
async fn unknown_reference_is_rejected() {
    let h = TestHarness::new().await;
    let _ = checkout_ready(&h).await;
    // The provider confirms a charge the system never initiated.
    h.script.report("GHOST-REF", ChargeStatus::Success, 5000);
    let err = h
        .orders
        .verify_payment(PaymentMethod::Paystack, "GHOST-REF")
        .await
        .expect_err("Expected not-found error");
    assert!(matches!(err, OrderFlowError::PaymentNotFound { .. }));
    h.settle().await;
    assert_eq!(h.notifications_sent(), 0);
}

#[tokio::test]
async fn repeated_failure_does_not_duplicate_activity() {
    let h = TestHarness::new().await;
    let (user, order) = checkout_ready(&h).await;
    let init = h
        .orders
        .initialize_payment(&user, &order.order_number, Naira::from(5000), PaymentMethod::Korapay, &user.email)
        .await
        .unwrap();
    h.script.report(&init.reference, ChargeStatus::Failed, 0);

    for _ in 0..2 {
        let err = h.orders.verify_payment(PaymentMethod::Korapay, &init.reference).await.expect_err("Expected failure");
        assert!(matches!(err, OrderFlowError::VerificationFailed { .. }));
    }
    let order_now = h.orders.order_by_number(&user, &order.order_number).await.unwrap();
    assert_eq!(order_now.activity.len(), 2);
}

#[tokio::test]
async fn a_failed_payment_record_is_terminal() {
    let h = TestHarness::new().await;
    let (user, order) = checkout_ready(&h).await;
    let init = h
        .orders
        .initialize_payment(&user, &order.order_number, Naira::from(5000), PaymentMethod::Korapay, &user.email)
        .await
        .unwrap();
    h.script.report(&init.reference, ChargeStatus::Failed, 0);
    let _ = h.orders.verify_payment(PaymentMethod::Korapay, &init.reference).await.expect_err("Expected failure");

    // The provider now claims success for the same reference. The record is terminal; the
    // shopper must start a fresh attempt.
    h.script.report(&init.reference, ChargeStatus::Success, 5000);
    let err = h.orders.verify_payment(PaymentMethod::Korapay, &init.reference).await.expect_err("Expected error");
    assert!(matches!(err, OrderFlowError::Database(CheckoutDbError::PaymentNotPending(_, _, PaymentStatus::Failed))));
    h.settle().await;
    assert_eq!(h.notifications_sent(), 0);
}

#[tokio::test]
async fn payments_are_keyed_by_provider_and_reference() {
    let h = TestHarness::new().await;
    let (user, order) = checkout_ready(&h).await;

    // Two providers can coincidentally issue the same reference string; the records must stay
    // distinct under the compound key.
    for provider in [PaymentMethod::Paystack, PaymentMethod::Korapay] {
        h.db
            .insert_payment(NewPaymentRecord {
                order_number: order.order_number.clone(),
                user_name: user.full_name(),
                user_email: user.email.clone(),
                provider,
                reference: "SHARED-REF".to_string(),
                amount: Naira::from(5000),
            })
            .await
            .expect("Error inserting payment");
    }
    let paystack = h.db.fetch_payment(PaymentMethod::Paystack, "SHARED-REF").await.unwrap().unwrap();
    let korapay = h.db.fetch_payment(PaymentMethod::Korapay, "SHARED-REF").await.unwrap().unwrap();
    assert_ne!(paystack.id, korapay.id);
    assert_eq!(paystack.provider, PaymentMethod::Paystack);
    assert_eq!(korapay.provider, PaymentMethod::Korapay);

    // Re-inserting the same compound key is rejected.
    let err = h
        .db
        .insert_payment(NewPaymentRecord {
            order_number: order.order_number.clone(),
            user_name: user.full_name(),
            user_email: user.email,
            provider: PaymentMethod::Paystack,
            reference: "SHARED-REF".to_string(),
            amount: Naira::from(5000),
        })
        .await
        .expect_err("Expected duplicate payment error");
    assert!(matches!(err, CheckoutDbError::PaymentAlreadyExists(_)));
}

#[tokio::test]
async fn order_history_is_scoped_to_the_owner() {
    let h = TestHarness::new().await;
    let (user, order) = checkout_ready(&h).await;

    let mine = h.orders.orders_for_user(&user).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].order_number, order.order_number);

    let other = UserInfo {
        user_id: "user-2".to_string(),
        first_name: "Ben".to_string(),
        last_name: "Eze".to_string(),
        email: "ben@example.com".to_string(),
    };
    assert!(h.orders.orders_for_user(&other).await.unwrap().is_empty());
    let err = h.orders.order_by_number(&other, &order.order_number).await.expect_err("Expected not found");
    assert!(matches!(err, OrderFlowError::OrderNotFound(OrderId(_))));
}
