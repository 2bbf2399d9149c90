use log::*;

use crate::{
    api::errors::CartApiError,
    db_types::{Cart, CartItem},
    traits::{CartManagement, ProductCatalog},
};

/// API for the shopper's live cart. Prices always come from the catalog, never from the
/// client; stock limits are enforced at add time.
#[derive(Debug, Clone)]
pub struct CartApi<B> {
    db: B,
}

impl<B> CartApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CartApi<B>
where B: CartManagement + ProductCatalog
{
    /// The user's cart. A user who has never added anything gets an empty cart rather than an
    /// error.
    pub async fn get_cart(&self, user_id: &str) -> Result<Option<Cart>, CartApiError> {
        Ok(self.db.fetch_cart(user_id).await?)
    }

    /// Adds `quantity` of the given product variant to the cart, merging with an existing
    /// line for the same variant. The requested total quantity (existing + new) must not
    /// exceed the variant's stock.
    pub async fn add_item(
        &self,
        user_id: &str,
        product_id: &str,
        variant_id: &str,
        quantity: i64,
    ) -> Result<Cart, CartApiError> {
        if quantity < 1 {
            return Err(CartApiError::InvalidQuantity);
        }
        let variant = self.db.fetch_variant(product_id, variant_id).await?.ok_or_else(|| {
            CartApiError::VariantNotFound { product_id: product_id.to_string(), variant_id: variant_id.to_string() }
        })?;
        let already_in_cart = self
            .db
            .fetch_cart(user_id)
            .await?
            .map(|cart| {
                cart.items
                    .iter()
                    .filter(|i| i.product_id == product_id && i.variant_id == variant_id)
                    .map(|i| i.quantity)
                    .sum::<i64>()
            })
            .unwrap_or(0);
        if already_in_cart + quantity > variant.stock {
            return Err(CartApiError::InsufficientStock { available: variant.stock });
        }
        let cart = self.db.upsert_cart_item(user_id, CartItem::new(&variant, quantity)).await?;
        debug!("🛒️ {} x{} added to cart for user {user_id}", variant.product_name, quantity);
        Ok(cart)
    }

    pub async fn increase_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        variant_id: &str,
    ) -> Result<Cart, CartApiError> {
        Ok(self.db.adjust_item_quantity(user_id, product_id, variant_id, 1).await?)
    }

    /// Decreasing past a quantity of one removes the line, mirroring the storefront UI.
    pub async fn decrease_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        variant_id: &str,
    ) -> Result<Cart, CartApiError> {
        Ok(self.db.adjust_item_quantity(user_id, product_id, variant_id, -1).await?)
    }

    pub async fn remove_item(
        &self,
        user_id: &str,
        product_id: &str,
        variant_id: &str,
    ) -> Result<Cart, CartApiError> {
        Ok(self.db.remove_cart_item(user_id, product_id, variant_id).await?)
    }

    pub async fn clear_cart(&self, user_id: &str) -> Result<(), CartApiError> {
        self.db.delete_cart(user_id).await?;
        debug!("🛒️ Cart cleared for user {user_id}");
        Ok(())
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
