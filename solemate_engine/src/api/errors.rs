use payment_gateways::{GatewayError, PaymentMethod};
use sm_common::Naira;
use thiserror::Error;

use crate::{db_types::OrderId, traits::CheckoutDbError};

#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("{0}")]
    Database(#[from] CheckoutDbError),
    #[error("No delivery address with id {0} exists for this user")]
    AddressNotFound(i64),
    #[error("The user has no cart")]
    CartNotFound,
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {0} belongs to another user")]
    OrderOwnership(OrderId),
    #[error("Payment amount does not match the required amount ({expected})")]
    AmountMismatch { expected: Naira },
    #[error("No payment record matches ({provider}, {reference})")]
    PaymentNotFound { provider: PaymentMethod, reference: String },
    #[error("{0}")]
    Gateway(#[from] GatewayError),
    #[error("Payment verification failed for reference {reference}")]
    VerificationFailed { reference: String },
}

#[derive(Debug, Error)]
pub enum CartApiError {
    #[error("{0}")]
    Database(#[from] CheckoutDbError),
    #[error("No product variant {variant_id} exists for product {product_id}")]
    VariantNotFound { product_id: String, variant_id: String },
    #[error("Only {available} left in stock for this size")]
    InsufficientStock { available: i64 },
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
}
