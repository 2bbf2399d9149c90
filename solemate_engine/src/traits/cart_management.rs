use crate::{
    db_types::{Cart, CartItem},
    traits::CheckoutDbError,
};

/// Store contract for the shopper's live cart. Every mutation recomputes the aggregate total
/// in the same transaction, so `cart.total` can never drift from the sum of the line totals.
#[allow(async_fn_in_trait)]
pub trait CartManagement: Clone + Send + Sync {
    /// The user's cart, or `None` if they have never added anything (an absent cart reads as
    /// empty at the API layer).
    async fn fetch_cart(&self, user_id: &str) -> Result<Option<Cart>, CheckoutDbError>;

    /// Adds the item to the cart, creating the cart if needed. If a line for the same
    /// `(product, variant)` already exists, the quantities are merged and the line total
    /// recomputed at the existing unit price.
    async fn upsert_cart_item(&self, user_id: &str, item: CartItem) -> Result<Cart, CheckoutDbError>;

    /// Adjusts the quantity of an existing line by `delta` (±1 from the HTTP surface). A line
    /// whose quantity would drop to zero or below is removed entirely.
    async fn adjust_item_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        variant_id: &str,
        delta: i64,
    ) -> Result<Cart, CheckoutDbError>;

    /// Removes a line from the cart regardless of quantity.
    async fn remove_cart_item(
        &self,
        user_id: &str,
        product_id: &str,
        variant_id: &str,
    ) -> Result<Cart, CheckoutDbError>;

    /// Deletes the cart and all its items. Deleting an absent cart is a no-op.
    async fn delete_cart(&self, user_id: &str) -> Result<(), CheckoutDbError>;
}
