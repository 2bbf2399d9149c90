use sqlx::SqliteConnection;

use crate::{
    db_types::{NewProduct, ProductVariant},
    traits::CheckoutDbError,
};

pub async fn fetch_variant(
    product_id: &str,
    variant_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<ProductVariant>, CheckoutDbError> {
    let variant: Option<ProductVariant> = sqlx::query_as(
        r#"
            SELECT v.id, v.product_id, p.name AS product_name, v.size, v.price, v.stock
            FROM product_variants v
            JOIN products p ON p.id = v.product_id
            WHERE v.product_id = $1 AND v.id = $2
        "#,
    )
    .bind(product_id)
    .bind(variant_id)
    .fetch_optional(conn)
    .await?;
    Ok(variant)
}

pub async fn upsert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<(), CheckoutDbError> {
    sqlx::query("INSERT INTO products (id, name) VALUES ($1, $2) ON CONFLICT (id) DO UPDATE SET name = excluded.name")
        .bind(&product.id)
        .bind(&product.name)
        .execute(&mut *conn)
        .await?;
    for variant in product.variants {
        sqlx::query(
            r#"
                INSERT INTO product_variants (id, product_id, size, price, stock)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (product_id, id) DO UPDATE SET size = excluded.size, price = excluded.price, stock = excluded.stock
            "#,
        )
        .bind(variant.id)
        .bind(&product.id)
        .bind(variant.size)
        .bind(variant.price)
        .bind(variant.stock)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
