use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use payment_gateways::PaymentMethod;
use serde::{Deserialize, Serialize};
use sm_common::Naira;
use sqlx::Type;
use thiserror::Error;

use crate::helpers::new_order_number;

//--------------------------------------        OrderId        -------------------------------------------------------
/// The public, immutable order identity (`ORD-{millis}-{rand}`). Human-diagnosable and
/// globally unique; internal row ids never leave the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatusType {
    /// The order has been created and is waiting for a payment attempt.
    Initialized,
    /// A payment provider confirmed the charge. Terminal for the checkout workflow.
    PaymentConfirmed,
    /// The latest payment attempt failed. The order accepts a new attempt.
    PaymentFailed,
    ProcessingOrder,
    ReadyForPickup,
    OnDelivery,
    Delivered,
    Cancelled,
    Returned,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatusType::Initialized => "initialized",
            OrderStatusType::PaymentConfirmed => "payment-confirmed",
            OrderStatusType::PaymentFailed => "payment-failed",
            OrderStatusType::ProcessingOrder => "processing-order",
            OrderStatusType::ReadyForPickup => "ready-for-pickup",
            OrderStatusType::OnDelivery => "on-delivery",
            OrderStatusType::Delivered => "delivered",
            OrderStatusType::Cancelled => "cancelled",
            OrderStatusType::Returned => "returned",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct OrderStatusConversionError(String);

impl FromStr for OrderStatusType {
    type Err = OrderStatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initialized" => Ok(Self::Initialized),
            "payment-confirmed" => Ok(Self::PaymentConfirmed),
            "payment-failed" => Ok(Self::PaymentFailed),
            "processing-order" => Ok(Self::ProcessingOrder),
            "ready-for-pickup" => Ok(Self::ReadyForPickup),
            "on-delivery" => Ok(Self::OnDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "returned" => Ok(Self::Returned),
            other => Err(OrderStatusConversionError(other.to_string())),
        }
    }
}

//--------------------------------------    PaymentStatus      -------------------------------------------------------
/// Lifecycle of one payment attempt. `Success` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

//--------------------------------------      UserInfo         -------------------------------------------------------
/// The caller identity supplied by the auth layer, and the denormalized owner snapshot stored
/// on every order. Orders must stay readable even if the user record changes later, so this is
/// an owned copy, never a live reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UserInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

//--------------------------------------   DeliveryStatus      -------------------------------------------------------
/// Fulfilment sub-state. Independent of the payment state machine and of no further interest
/// to the checkout workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Shipped,
    OutForDelivery,
    Delivered,
}

//--------------------------------------    ShippingInfo       -------------------------------------------------------
/// Denormalized snapshot of the delivery address selected at order initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub delivery_status: DeliveryStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

impl From<Address> for ShippingInfo {
    fn from(a: Address) -> Self {
        Self {
            address: a.address,
            city: a.city,
            state: a.state,
            postal_code: a.postal_code,
            delivery_status: DeliveryStatus::Pending,
            tracking_number: None,
        }
    }
}

//--------------------------------------      CartItem         -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartItem {
    pub product_id: String,
    pub variant_id: String,
    pub product_name: String,
    /// Size label of the selected variant, e.g. "US 9 / UK 8".
    pub size: String,
    pub quantity: i64,
    pub unit_price: Naira,
    pub line_total: Naira,
}

impl CartItem {
    pub fn new(variant: &ProductVariant, quantity: i64) -> Self {
        Self {
            product_id: variant.product_id.clone(),
            variant_id: variant.id.clone(),
            product_name: variant.product_name.clone(),
            size: variant.size.clone(),
            quantity,
            unit_price: variant.price,
            line_total: variant.price * quantity,
        }
    }
}

//--------------------------------------        Cart           -------------------------------------------------------
/// The shopper's live, mutable pre-checkout selection. One active cart per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: String,
    pub items: Vec<CartItem>,
    /// Always equals the sum of the line totals. Recomputed in the same transaction as every
    /// mutation, never allowed to drift.
    pub total: Naira,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn computed_total(&self) -> Naira {
        self.items.iter().map(|i| i.unit_price * i.quantity).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

//--------------------------------------    CartSnapshot       -------------------------------------------------------
/// The frozen copy of the cart stored on an order at initialization. Later cart mutations must
/// never be visible through this value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub total_amount: Naira,
}

impl CartSnapshot {
    /// An order may legitimately be initialized with no cart (reinitialize flows).
    pub fn empty() -> Self {
        Self { items: Vec::new(), total_amount: Naira::from(0) }
    }
}

impl From<Cart> for CartSnapshot {
    fn from(cart: Cart) -> Self {
        Self { items: cart.items, total_amount: cart.total }
    }
}

//--------------------------------------    PaymentInfo        -------------------------------------------------------
/// Payment outcome recorded on the order once a charge completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub reference: String,
    pub provider: PaymentMethod,
    pub status: PaymentStatus,
    pub amount_paid: Naira,
    pub paid_at: Option<DateTime<Utc>>,
}

//--------------------------------------   ActivityEntry       -------------------------------------------------------
/// One entry in an order's append-only activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub status: OrderStatusType,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderId,
    pub user_id: String,
    pub user_data: UserInfo,
    pub shipping_data: ShippingInfo,
    pub cart_data: CartSnapshot,
    pub payment_data: Option<PaymentInfo>,
    pub delivery_mode: i64,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Append-only, in insertion order. Populated by the store on fetch.
    pub activity: Vec<ActivityEntry>,
}

//--------------------------------------      NewOrder         -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: OrderId,
    pub user_id: String,
    pub user_data: UserInfo,
    pub shipping_data: ShippingInfo,
    pub cart_data: CartSnapshot,
    pub delivery_mode: i64,
}

impl NewOrder {
    pub fn new(user: UserInfo, shipping_data: ShippingInfo, cart_data: CartSnapshot, delivery_mode: i64) -> Self {
        Self {
            order_number: new_order_number(),
            user_id: user.user_id.clone(),
            user_data: user,
            shipping_data,
            cart_data,
            delivery_mode,
        }
    }
}

//--------------------------------------   PaymentRecord       -------------------------------------------------------
/// One attempt to collect money via one provider, correlated to exactly one order. Looked up
/// by the `(provider, reference)` compound key during verification; two providers could
/// coincidentally issue the same reference string.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRecord {
    pub id: i64,
    pub order_number: OrderId,
    pub user_name: String,
    pub user_email: String,
    pub provider: PaymentMethod,
    pub reference: String,
    pub amount: Naira,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPaymentRecord {
    pub order_number: OrderId,
    pub user_name: String,
    pub user_email: String,
    pub provider: PaymentMethod,
    pub reference: String,
    pub amount: Naira,
}

//--------------------------------------      Address          -------------------------------------------------------
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: i64,
    pub user_id: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

//--------------------------------------   ProductVariant      -------------------------------------------------------
/// A sized variant of a catalog product, as resolved for add-to-cart.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductVariant {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub size: String,
    pub price: Naira,
    pub stock: i64,
}

//--------------------------------------     NewProduct        -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub id: String,
    pub name: String,
    pub variants: Vec<NewVariant>,
}

#[derive(Debug, Clone)]
pub struct NewVariant {
    pub id: String,
    pub size: String,
    pub price: Naira,
    pub stock: i64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_status_round_trip() {
        let all = [
            OrderStatusType::Initialized,
            OrderStatusType::PaymentConfirmed,
            OrderStatusType::PaymentFailed,
            OrderStatusType::ProcessingOrder,
            OrderStatusType::ReadyForPickup,
            OrderStatusType::OnDelivery,
            OrderStatusType::Delivered,
            OrderStatusType::Cancelled,
            OrderStatusType::Returned,
        ];
        for status in all {
            assert_eq!(status.to_string().parse::<OrderStatusType>().unwrap(), status);
        }
        assert!("payment_confirmed".parse::<OrderStatusType>().is_err());
    }

    #[test]
    fn cart_total_matches_items() {
        let variant = ProductVariant {
            id: "v1".into(),
            product_id: "p1".into(),
            product_name: "Air Strider".into(),
            size: "US 9".into(),
            price: Naira::from(1500),
            stock: 10,
        };
        let cart = Cart {
            user_id: "u1".into(),
            items: vec![CartItem::new(&variant, 2), CartItem::new(&variant, 1)],
            total: Naira::from(4500),
            updated_at: Utc::now(),
        };
        assert_eq!(cart.computed_total(), cart.total);
    }

    #[test]
    fn snapshot_of_missing_cart_is_empty() {
        let snapshot = CartSnapshot::empty();
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.total_amount, Naira::from(0));
    }
}
