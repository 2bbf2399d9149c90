use crate::db_types::Order;

/// Emitted exactly once per order, after the payment-confirmed transition has been committed.
/// Subscribers run post-commit and cannot affect the state transition; the confirmation
/// mailer is the main consumer.
#[derive(Debug, Clone)]
pub struct OrderConfirmedEvent {
    pub order: Order,
}

impl OrderConfirmedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
