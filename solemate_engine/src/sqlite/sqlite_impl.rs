//! `SqliteDatabase` is the concrete store backend for the checkout engine.
//!
//! It implements all the traits in the [`crate::traits`] module on top of a SQLite pool. The
//! composite operations open a single transaction each, so every multi-table effect (order +
//! activity, payment + order + cart) lands atomically or not at all.
use std::fmt::Debug;

use log::*;
use payment_gateways::{ChargeOutcome, PaymentMethod};
use sqlx::SqlitePool;

use super::db::{addresses, carts, catalog, new_pool, orders, payments};
use crate::{
    db_types::{
        Address,
        Cart,
        CartItem,
        NewAddress,
        NewOrder,
        NewPaymentRecord,
        NewProduct,
        Order,
        OrderId,
        OrderStatusType,
        PaymentInfo,
        PaymentRecord,
        PaymentStatus,
        ProductVariant,
    },
    traits::{AddressBook, CartManagement, CheckoutDatabase, CheckoutDbError, ConfirmedPayment, ProductCatalog},
};

const INITIALIZED_MESSAGE: &str = "order created, awaiting payment";
const CONFIRMED_MESSAGE: &str = "Payment has been successfully verified.";
const FAILED_MESSAGE: &str = "Payment verification failed. Please retry.";

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, CheckoutDbError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, CheckoutDbError> {
        let mut tx = self.pool.begin().await?;
        if let Some(id) = orders::order_exists(&order.order_number, &mut tx).await? {
            warn!("🗃️ Order {} already exists with id {id}", order.order_number);
            return Err(CheckoutDbError::OrderAlreadyExists(order.order_number));
        }
        let order = orders::insert_order(order, &mut tx).await?;
        orders::append_activity(order.id, OrderStatusType::Initialized, INITIALIZED_MESSAGE, &mut tx).await?;
        let order = orders::fetch_order_by_number(&order.order_number, &mut tx)
            .await?
            .ok_or_else(|| CheckoutDbError::OrderNotFound(order.order_number.clone()))?;
        tx.commit().await?;
        debug!("🗃️ Order {} has been saved in the DB", order.order_number);
        Ok(order)
    }

    async fn fetch_order_by_number(&self, order_number: &OrderId) -> Result<Option<Order>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_number(order_number, &mut conn).await
    }

    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_user(user_id, &mut conn).await
    }

    async fn insert_payment(&self, payment: NewPaymentRecord) -> Result<PaymentRecord, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        payments::insert_payment(payment, &mut conn).await
    }

    async fn fetch_payment(
        &self,
        provider: PaymentMethod,
        reference: &str,
    ) -> Result<Option<PaymentRecord>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payment(provider, reference, &mut conn).await
    }

    async fn confirm_payment(
        &self,
        provider: PaymentMethod,
        reference: &str,
        outcome: &ChargeOutcome,
    ) -> Result<ConfirmedPayment, CheckoutDbError> {
        let mut tx = self.pool.begin().await?;
        match payments::mark_status_if_pending(provider, reference, PaymentStatus::Success, &mut tx).await? {
            Some(payment) => {
                let order = orders::fetch_order_by_number(&payment.order_number, &mut tx)
                    .await?
                    .ok_or_else(|| CheckoutDbError::OrderNotFound(payment.order_number.clone()))?;
                let payment_data = PaymentInfo {
                    reference: payment.reference.clone(),
                    provider,
                    status: PaymentStatus::Success,
                    amount_paid: outcome.amount.unwrap_or(payment.amount),
                    paid_at: outcome.paid_at,
                };
                orders::set_payment_confirmed(order.id, &payment_data, &mut tx).await?;
                orders::append_activity(order.id, OrderStatusType::PaymentConfirmed, CONFIRMED_MESSAGE, &mut tx)
                    .await?;
                // Cart-to-order handoff. The cart belongs to the order owner, not necessarily
                // to whoever triggered the verification.
                carts::delete_cart(&order.user_id, &mut tx).await?;
                let order = orders::fetch_order_by_number(&payment.order_number, &mut tx)
                    .await?
                    .ok_or_else(|| CheckoutDbError::OrderNotFound(payment.order_number.clone()))?;
                tx.commit().await?;
                debug!("🗃️ Payment {reference} confirmed; order {} is paid", order.order_number);
                Ok(ConfirmedPayment::Applied { order, payment })
            },
            None => {
                let payment = payments::fetch_payment(provider, reference, &mut tx)
                    .await?
                    .ok_or_else(|| CheckoutDbError::PaymentNotFound(provider, reference.to_string()))?;
                match payment.status {
                    PaymentStatus::Success => {
                        let order = orders::fetch_order_by_number(&payment.order_number, &mut tx)
                            .await?
                            .ok_or_else(|| CheckoutDbError::OrderNotFound(payment.order_number.clone()))?;
                        debug!("🗃️ Payment {reference} was already confirmed; nothing to do");
                        Ok(ConfirmedPayment::AlreadyConfirmed { order, payment })
                    },
                    status => Err(CheckoutDbError::PaymentNotPending(provider, reference.to_string(), status)),
                }
            },
        }
    }

    async fn fail_payment(
        &self,
        provider: PaymentMethod,
        reference: &str,
    ) -> Result<(Order, PaymentRecord), CheckoutDbError> {
        let mut tx = self.pool.begin().await?;
        match payments::mark_status_if_pending(provider, reference, PaymentStatus::Failed, &mut tx).await? {
            Some(payment) => {
                let order = orders::fetch_order_by_number(&payment.order_number, &mut tx)
                    .await?
                    .ok_or_else(|| CheckoutDbError::OrderNotFound(payment.order_number.clone()))?;
                orders::update_order_status(order.id, OrderStatusType::PaymentFailed, &mut tx).await?;
                orders::append_activity(order.id, OrderStatusType::PaymentFailed, FAILED_MESSAGE, &mut tx).await?;
                let order = orders::fetch_order_by_number(&payment.order_number, &mut tx)
                    .await?
                    .ok_or_else(|| CheckoutDbError::OrderNotFound(payment.order_number.clone()))?;
                tx.commit().await?;
                debug!("🗃️ Payment {reference} marked as failed; order {} awaits retry", order.order_number);
                Ok((order, payment))
            },
            None => {
                let payment = payments::fetch_payment(provider, reference, &mut tx)
                    .await?
                    .ok_or_else(|| CheckoutDbError::PaymentNotFound(provider, reference.to_string()))?;
                match payment.status {
                    PaymentStatus::Failed => {
                        // Repeat failure report. State is already what it should be; do not
                        // append duplicate activity.
                        let order = orders::fetch_order_by_number(&payment.order_number, &mut tx)
                            .await?
                            .ok_or_else(|| CheckoutDbError::OrderNotFound(payment.order_number.clone()))?;
                        Ok((order, payment))
                    },
                    status => Err(CheckoutDbError::PaymentNotPending(provider, reference.to_string(), status)),
                }
            },
        }
    }
}

impl CartManagement for SqliteDatabase {
    async fn fetch_cart(&self, user_id: &str) -> Result<Option<Cart>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        carts::fetch_cart(user_id, &mut conn).await
    }

    async fn upsert_cart_item(&self, user_id: &str, item: CartItem) -> Result<Cart, CheckoutDbError> {
        let mut tx = self.pool.begin().await?;
        carts::upsert_item(user_id, item, &mut tx).await?;
        let cart = carts::fetch_cart(user_id, &mut tx).await?.ok_or(CheckoutDbError::CartNotFound)?;
        tx.commit().await?;
        Ok(cart)
    }

    async fn adjust_item_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        variant_id: &str,
        delta: i64,
    ) -> Result<Cart, CheckoutDbError> {
        let mut tx = self.pool.begin().await?;
        carts::adjust_quantity(user_id, product_id, variant_id, delta, &mut tx).await?;
        let cart = carts::fetch_cart(user_id, &mut tx).await?.ok_or(CheckoutDbError::CartNotFound)?;
        tx.commit().await?;
        Ok(cart)
    }

    async fn remove_cart_item(
        &self,
        user_id: &str,
        product_id: &str,
        variant_id: &str,
    ) -> Result<Cart, CheckoutDbError> {
        let mut tx = self.pool.begin().await?;
        carts::remove_item(user_id, product_id, variant_id, &mut tx).await?;
        let cart = carts::fetch_cart(user_id, &mut tx).await?.ok_or(CheckoutDbError::CartNotFound)?;
        tx.commit().await?;
        Ok(cart)
    }

    async fn delete_cart(&self, user_id: &str) -> Result<(), CheckoutDbError> {
        let mut tx = self.pool.begin().await?;
        carts::delete_cart(user_id, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

impl AddressBook for SqliteDatabase {
    async fn insert_address(&self, user_id: &str, address: NewAddress) -> Result<Address, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        addresses::insert_address(user_id, address, &mut conn).await
    }

    async fn fetch_address(&self, id: i64, user_id: &str) -> Result<Option<Address>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        addresses::fetch_address(id, user_id, &mut conn).await
    }

    async fn fetch_addresses_for_user(&self, user_id: &str) -> Result<Vec<Address>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        addresses::fetch_addresses_for_user(user_id, &mut conn).await
    }
}

impl ProductCatalog for SqliteDatabase {
    async fn fetch_variant(
        &self,
        product_id: &str,
        variant_id: &str,
    ) -> Result<Option<ProductVariant>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_variant(product_id, variant_id, &mut conn).await
    }

    async fn upsert_product(&self, product: NewProduct) -> Result<(), CheckoutDbError> {
        let mut tx = self.pool.begin().await?;
        catalog::upsert_product(product, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }
}
