use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct InitializeOrderRequest {
    pub address_id: i64,
    #[serde(default = "default_delivery_mode")]
    pub delivery_mode: i64,
}

fn default_delivery_mode() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitializePaymentRequest {
    pub order_id: String,
    /// Provider selector: 1 = Paystack, 2 = Korapay.
    pub method: u8,
    /// The claimed amount in whole naira. Must match the live cart total.
    pub amount: i64,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentParams {
    pub reference: String,
    /// Provider selector, as "1"/"2" or the provider name.
    pub method: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub variant_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartItemSelector {
    pub product_id: String,
    pub variant_id: String,
}
