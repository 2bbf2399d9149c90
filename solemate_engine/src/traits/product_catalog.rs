use crate::{
    db_types::{NewProduct, ProductVariant},
    traits::CheckoutDbError,
};

/// Read-side contract against the product catalog, consumed by add-to-cart to resolve unit
/// prices and enforce stock limits. Catalog CRUD itself is outside this system; `upsert_product`
/// exists for seeding and back-office tooling.
#[allow(async_fn_in_trait)]
pub trait ProductCatalog: Clone + Send + Sync {
    async fn fetch_variant(
        &self,
        product_id: &str,
        variant_id: &str,
    ) -> Result<Option<ProductVariant>, CheckoutDbError>;

    async fn upsert_product(&self, product: NewProduct) -> Result<(), CheckoutDbError>;
}
