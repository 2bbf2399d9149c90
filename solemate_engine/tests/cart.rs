//! Integration tests for cart mutations. The central property: after every mutation the
//! aggregate total equals the sum of `quantity * unit_price` over the lines.
mod support;

use sm_common::Naira;
use solemate_engine::{db_types::Cart, CartApiError};
use support::TestHarness;

const SHOE: &str = "air-strider";

fn assert_total_invariant(cart: &Cart) {
    assert_eq!(cart.total, cart.computed_total(), "cart total drifted from the sum of its line totals");
}

#[tokio::test]
async fn total_tracks_every_mutation() {
    let h = TestHarness::new().await;
    let user = h.shopper();
    h.seed_catalog().await;

    // add
    let cart = h.carts.add_item(&user.user_id, SHOE, "us-9", 2).await.unwrap();
    assert_total_invariant(&cart);
    assert_eq!(cart.total, Naira::from(5000));

    // add a second line
    let cart = h.carts.add_item(&user.user_id, SHOE, "us-10", 1).await.unwrap();
    assert_total_invariant(&cart);
    assert_eq!(cart.total, Naira::from(6500));
    assert_eq!(cart.len(), 2);

    // increase
    let cart = h.carts.increase_quantity(&user.user_id, SHOE, "us-10").await.unwrap();
    assert_total_invariant(&cart);
    assert_eq!(cart.total, Naira::from(8000));

    // decrease
    let cart = h.carts.decrease_quantity(&user.user_id, SHOE, "us-9").await.unwrap();
    assert_total_invariant(&cart);
    assert_eq!(cart.total, Naira::from(5500));

    // remove
    let cart = h.carts.remove_item(&user.user_id, SHOE, "us-10").await.unwrap();
    assert_total_invariant(&cart);
    assert_eq!(cart.total, Naira::from(2500));
    assert_eq!(cart.len(), 1);
}

#[tokio::test]
async fn adding_the_same_variant_merges_lines() {
    let h = TestHarness::new().await;
    let user = h.shopper();
    h.seed_catalog().await;

    h.carts.add_item(&user.user_id, SHOE, "us-9", 1).await.unwrap();
    let cart = h.carts.add_item(&user.user_id, SHOE, "us-9", 2).await.unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.items[0].line_total, Naira::from(7500));
    assert_total_invariant(&cart);
}

#[tokio::test]
async fn decreasing_a_single_item_removes_the_line() {
    let h = TestHarness::new().await;
    let user = h.shopper();
    h.seed_catalog().await;

    h.carts.add_item(&user.user_id, SHOE, "us-9", 1).await.unwrap();
    let cart = h.carts.decrease_quantity(&user.user_id, SHOE, "us-9").await.unwrap();
    assert!(cart.is_empty());
    assert_eq!(cart.total, Naira::from(0));
}

#[tokio::test]
async fn stock_limits_are_enforced_across_the_cart() {
    let h = TestHarness::new().await;
    let user = h.shopper();
    h.seed_catalog().await;

    // us-10 has a stock of 3.
    let err = h.carts.add_item(&user.user_id, SHOE, "us-10", 4).await.expect_err("Expected stock error");
    assert!(matches!(err, CartApiError::InsufficientStock { available: 3 }));

    // The limit counts what is already in the cart.
    h.carts.add_item(&user.user_id, SHOE, "us-10", 2).await.unwrap();
    let err = h.carts.add_item(&user.user_id, SHOE, "us-10", 2).await.expect_err("Expected stock error");
    assert!(matches!(err, CartApiError::InsufficientStock { available: 3 }));
}

#[tokio::test]
async fn unknown_variants_are_rejected() {
    let h = TestHarness::new().await;
    let user = h.shopper();
    h.seed_catalog().await;

    let err = h.carts.add_item(&user.user_id, SHOE, "us-13", 1).await.expect_err("Expected variant error");
    assert!(matches!(err, CartApiError::VariantNotFound { .. }));
    let err = h.carts.add_item(&user.user_id, "no-such-shoe", "us-9", 1).await.expect_err("Expected variant error");
    assert!(matches!(err, CartApiError::VariantNotFound { .. }));
}

#[tokio::test]
async fn clearing_an_absent_cart_is_fine() {
    let h = TestHarness::new().await;
    let user = h.shopper();
    assert!(h.carts.get_cart(&user.user_id).await.unwrap().is_none());
    h.carts.clear_cart(&user.user_id).await.expect("Clearing an absent cart should not error");
}
