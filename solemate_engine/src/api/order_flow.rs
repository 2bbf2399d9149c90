use std::fmt::Debug;

use log::*;
use payment_gateways::{
    ChargeOutcome,
    ChargeRequest,
    CustomerInfo,
    GatewayRouter,
    InitializedCharge,
    PaymentMethod,
};
use serde::Serialize;
use serde_json::Value;
use sm_common::{Naira, NGN_CURRENCY_CODE};

use crate::{
    api::errors::OrderFlowError,
    db_types::{CartSnapshot, NewOrder, NewPaymentRecord, Order, OrderId, PaymentRecord, ShippingInfo, UserInfo},
    events::{EventProducers, OrderConfirmedEvent},
    helpers::new_korapay_reference,
    traits::{AddressBook, CartManagement, CheckoutDatabase, ConfirmedPayment},
};

/// Returned by [`OrderFlowApi::initialize_payment`]: everything the storefront client needs
/// to complete the charge with the provider.
#[derive(Debug, Clone, Serialize)]
pub struct InitializedPayment {
    pub payment_id: i64,
    pub method: PaymentMethod,
    pub reference: String,
    pub access_data: Value,
}

/// Returned by [`OrderFlowApi::verify_payment`] on a confirmed charge.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedPayment {
    pub payment: PaymentRecord,
    pub order: Order,
    pub outcome: ChargeOutcome,
}

/// `OrderFlowApi` is the primary API for the checkout workflow: initialize → pay → verify →
/// finalize. It orchestrates the order store, the payment record store, the cart, the two
/// payment gateways, and the order-confirmed notification hook.
pub struct OrderFlowApi<B> {
    db: B,
    gateways: GatewayRouter,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, gateways: GatewayRouter, producers: EventProducers) -> Self {
        Self { db, gateways, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: CheckoutDatabase + CartManagement + AddressBook
{
    /// Creates a new order in `initialized` state.
    ///
    /// The delivery address must exist and belong to the caller. The caller's current cart is
    /// frozen into the order as an owned snapshot; an absent cart yields an empty snapshot
    /// (reinitialize flows are allowed). No side effects on the cart or payment stores.
    pub async fn initialize_order(
        &self,
        user: &UserInfo,
        address_id: i64,
        delivery_mode: i64,
    ) -> Result<Order, OrderFlowError> {
        let address = self
            .db
            .fetch_address(address_id, &user.user_id)
            .await?
            .ok_or(OrderFlowError::AddressNotFound(address_id))?;
        let cart_data = match self.db.fetch_cart(&user.user_id).await? {
            Some(cart) => CartSnapshot::from(cart),
            None => CartSnapshot::empty(),
        };
        let order = NewOrder::new(user.clone(), ShippingInfo::from(address), cart_data, delivery_mode);
        let order = self.db.insert_order(order).await?;
        info!("🔄️📦️ Order {} initialized for user {}", order.order_number, user.user_id);
        Ok(order)
    }

    /// Starts a remote charge for the order and records the attempt as a `pending` payment.
    ///
    /// The claimed `amount` is validated against the caller's **live** cart total. This is an
    /// anti-tampering check: the charge the provider is asked for must be the amount the
    /// store would collect right now. If the live total has drifted from the order's frozen
    /// snapshot, the divergence is logged but the live total remains authoritative.
    ///
    /// If the gateway call fails, no payment record is created; the order remains
    /// `initialized` with no partial artifact.
    pub async fn initialize_payment(
        &self,
        user: &UserInfo,
        order_number: &OrderId,
        amount: Naira,
        method: PaymentMethod,
        email: &str,
    ) -> Result<InitializedPayment, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_number(order_number)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_number.clone()))?;
        if order.user_id != user.user_id {
            warn!("🔄️💳️ User {} tried to pay for foreign order {order_number}", user.user_id);
            return Err(OrderFlowError::OrderOwnership(order_number.clone()));
        }
        let cart = self.db.fetch_cart(&user.user_id).await?.ok_or(OrderFlowError::CartNotFound)?;
        if cart.total != amount {
            return Err(OrderFlowError::AmountMismatch { expected: cart.total });
        }
        if cart.total != order.cart_data.total_amount {
            warn!(
                "🔄️💳️ Live cart total {} differs from the frozen total {} on order {order_number}. The live total \
                 is what will be charged.",
                cart.total, order.cart_data.total_amount
            );
        }
        let request = ChargeRequest {
            amount,
            currency: NGN_CURRENCY_CODE.to_string(),
            customer: CustomerInfo { name: user.full_name(), email: email.to_string() },
            reference: new_korapay_reference(),
            narration: format!("Payment for order {order_number}"),
        };
        let gateway = self.gateways.gateway_for(method);
        let InitializedCharge { reference, access, .. } = gateway.initialize_charge(&request).await?;
        let payment = self
            .db
            .insert_payment(NewPaymentRecord {
                order_number: order.order_number.clone(),
                user_name: user.full_name(),
                user_email: user.email.clone(),
                provider: method,
                reference: reference.clone(),
                amount,
            })
            .await?;
        info!("🔄️💳️ Payment {reference} ({method}) initialized for order {order_number}");
        Ok(InitializedPayment { payment_id: payment.id, method, reference, access_data: access })
    }

    /// Queries the provider for the ground truth of a charge and reconciles the local stores
    /// with it. This is the core state transition; see the trait docs on
    /// [`CheckoutDatabase::confirm_payment`] and [`CheckoutDatabase::fail_payment`] for the
    /// atomicity and idempotence guarantees.
    pub async fn verify_payment(
        &self,
        method: PaymentMethod,
        reference: &str,
    ) -> Result<VerifiedPayment, OrderFlowError> {
        let gateway = self.gateways.gateway_for(method);
        let outcome = gateway.verify_charge(reference).await?;
        let payment = self
            .db
            .fetch_payment(method, reference)
            .await?
            .ok_or_else(|| OrderFlowError::PaymentNotFound { provider: method, reference: reference.to_string() })?;
        // Defensive: the order should always exist, but it may have been removed by an
        // administrative action.
        self.db
            .fetch_order_by_number(&payment.order_number)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(payment.order_number.clone()))?;

        if outcome.status.is_success() {
            match self.db.confirm_payment(method, reference, &outcome).await? {
                ConfirmedPayment::Applied { order, payment } => {
                    info!("🔄️✅️ Payment {reference} confirmed; order {} is paid", order.order_number);
                    self.call_order_confirmed_hook(&order).await;
                    Ok(VerifiedPayment { payment, order, outcome })
                },
                ConfirmedPayment::AlreadyConfirmed { order, payment } => {
                    // A repeat confirmation (client retry racing a provider callback). The
                    // side effects have already run once; report success without re-running
                    // them.
                    debug!("🔄️✅️ Payment {reference} was already confirmed; treating as applied");
                    Ok(VerifiedPayment { payment, order, outcome })
                },
            }
        } else {
            let (order, _payment) = self.db.fail_payment(method, reference).await?;
            warn!("🔄️❌️ Payment {reference} failed verification; order {} awaits retry", order.order_number);
            Err(OrderFlowError::VerificationFailed { reference: reference.to_string() })
        }
    }

    /// All orders belonging to the user, oldest first.
    pub async fn orders_for_user(&self, user: &UserInfo) -> Result<Vec<Order>, OrderFlowError> {
        Ok(self.db.fetch_orders_for_user(&user.user_id).await?)
    }

    /// A single order, with ownership enforced. A foreign order is reported as not found so
    /// the endpoint does not leak which order numbers exist.
    pub async fn order_by_number(&self, user: &UserInfo, order_number: &OrderId) -> Result<Order, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_number(order_number)
            .await?
            .filter(|o| o.user_id == user.user_id)
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_number.clone()))?;
        Ok(order)
    }

    async fn call_order_confirmed_hook(&self, order: &Order) {
        for emitter in &self.producers.order_confirmed_producer {
            debug!("🔄️📦️ Notifying order-confirmed hook subscribers");
            let event = OrderConfirmedEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
