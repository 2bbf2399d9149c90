use payment_gateways::{ChargeOutcome, PaymentMethod};
use thiserror::Error;

use crate::db_types::{NewOrder, NewPaymentRecord, Order, OrderId, PaymentRecord, PaymentStatus};

/// Result of applying a provider-confirmed charge to the local stores.
#[derive(Debug, Clone)]
pub enum ConfirmedPayment {
    /// The `pending → success` transition happened in this call. All side effects (order
    /// update, activity entry, cart deletion) have been committed; the caller still owes the
    /// post-commit notification.
    Applied { order: Order, payment: PaymentRecord },
    /// The payment was already `success` when this call arrived (a client retry racing a
    /// provider callback, or a repeated verification). Nothing was written; the caller must
    /// NOT re-run side effects.
    AlreadyConfirmed { order: Order, payment: PaymentRecord },
}

/// The store contract for the order reconciliation workflow.
///
/// Backends must make each composite operation atomic: either every write in it lands, or
/// none do. Status transitions on payment records are compare-and-set, so two concurrent
/// verifications for the same `(provider, reference)` cannot both apply side effects.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase: Clone + Send + Sync {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Stores a new order together with its `initialized` activity entry, atomically.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, CheckoutDbError>;

    /// Fetches an order (with its activity log) by public order number.
    async fn fetch_order_by_number(&self, order_number: &OrderId) -> Result<Option<Order>, CheckoutDbError>;

    /// All orders belonging to the user, oldest first.
    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, CheckoutDbError>;

    /// Stores a new payment record in `pending` state.
    ///
    /// Fails with [`CheckoutDbError::PaymentAlreadyExists`] if a record for the same
    /// `(provider, reference)` already exists.
    async fn insert_payment(&self, payment: NewPaymentRecord) -> Result<PaymentRecord, CheckoutDbError>;

    /// Looks up a payment record by the `(provider, reference)` compound key.
    async fn fetch_payment(
        &self,
        provider: PaymentMethod,
        reference: &str,
    ) -> Result<Option<PaymentRecord>, CheckoutDbError>;

    /// Applies a successful charge outcome. In a single atomic transaction:
    /// * compare-and-set the payment record `pending → success`;
    /// * copy the payment outcome onto the order and set its status to `payment-confirmed`;
    /// * append the confirmation entry to the order's activity log;
    /// * delete the order owner's cart (the only place carts are ever destroyed).
    ///
    /// If the compare-and-set finds the record already `success`, nothing is written and
    /// [`ConfirmedPayment::AlreadyConfirmed`] is returned. A record in `failed` state is
    /// terminal and yields [`CheckoutDbError::PaymentNotPending`].
    async fn confirm_payment(
        &self,
        provider: PaymentMethod,
        reference: &str,
        outcome: &ChargeOutcome,
    ) -> Result<ConfirmedPayment, CheckoutDbError>;

    /// Applies a failed charge outcome. In a single atomic transaction: compare-and-set the
    /// payment record `pending → failed`, set the order status to `payment-failed` and append
    /// the failure entry to the activity log. The cart is left untouched so the shopper can
    /// retry.
    ///
    /// Repeating the call for an already-`failed` record returns the current state without
    /// appending duplicate activity. A record in `success` state is terminal and yields
    /// [`CheckoutDbError::PaymentNotPending`].
    async fn fail_payment(
        &self,
        provider: PaymentMethod,
        reference: &str,
    ) -> Result<(Order, PaymentRecord), CheckoutDbError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), CheckoutDbError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutDbError {
    #[error("There is an internal database engine error: {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since it already exists with order number {0}")]
    OrderAlreadyExists(OrderId),
    #[error("Cannot insert payment, since one already exists with reference {0}")]
    PaymentAlreadyExists(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("No payment record matches ({0}, {1})")]
    PaymentNotFound(PaymentMethod, String),
    #[error("Payment ({0}, {1}) is already {2}, which is terminal")]
    PaymentNotPending(PaymentMethod, String, PaymentStatus),
    #[error("The user has no cart")]
    CartNotFound,
    #[error("The requested item is not in the cart")]
    ItemNotInCart,
    #[error("Stored column data could not be decoded: {0}")]
    CorruptData(String),
}

impl From<sqlx::Error> for CheckoutDbError {
    fn from(e: sqlx::Error) -> Self {
        CheckoutDbError::DatabaseError(e.to_string())
    }
}
