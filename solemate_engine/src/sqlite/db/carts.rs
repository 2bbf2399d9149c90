use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Cart, CartItem},
    traits::CheckoutDbError,
};

/// Fetches the user's cart with its items in insertion order, or `None` if the user has no
/// cart row at all.
pub async fn fetch_cart(user_id: &str, conn: &mut SqliteConnection) -> Result<Option<Cart>, CheckoutDbError> {
    let row: Option<(i64, DateTime<Utc>)> =
        sqlx::query_as("SELECT total, updated_at FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;
    let Some((total, updated_at)) = row else {
        return Ok(None);
    };
    let items: Vec<CartItem> = sqlx::query_as(
        "SELECT product_id, variant_id, product_name, size, quantity, unit_price, line_total FROM cart_items WHERE \
         user_id = $1 ORDER BY id ASC",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(Some(Cart { user_id: user_id.to_string(), items, total: total.into(), updated_at }))
}

/// Creates an empty cart row for the user if they do not have one yet.
async fn ensure_cart(user_id: &str, conn: &mut SqliteConnection) -> Result<(), CheckoutDbError> {
    sqlx::query("INSERT INTO carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Recomputes the aggregate total from the line totals. Called inside the same transaction as
/// every item mutation, so the total can never drift.
async fn recompute_total(user_id: &str, conn: &mut SqliteConnection) -> Result<(), CheckoutDbError> {
    sqlx::query(
        r#"
            UPDATE carts
            SET total = (SELECT COALESCE(SUM(line_total), 0) FROM cart_items WHERE user_id = $1),
                updated_at = CURRENT_TIMESTAMP
            WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Adds the item to the cart, merging quantities when a line for the same (product, variant)
/// already exists. The existing line keeps its original unit price.
pub async fn upsert_item(user_id: &str, item: CartItem, conn: &mut SqliteConnection) -> Result<(), CheckoutDbError> {
    ensure_cart(user_id, &mut *conn).await?;
    sqlx::query(
        r#"
            INSERT INTO cart_items (user_id, product_id, variant_id, product_name, size, quantity, unit_price, line_total)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, product_id, variant_id) DO UPDATE
            SET quantity = cart_items.quantity + excluded.quantity,
                line_total = (cart_items.quantity + excluded.quantity) * cart_items.unit_price
        "#,
    )
    .bind(user_id)
    .bind(item.product_id)
    .bind(item.variant_id)
    .bind(item.product_name)
    .bind(item.size)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.line_total)
    .execute(&mut *conn)
    .await?;
    recompute_total(user_id, conn).await
}

/// Adjusts an existing line's quantity by `delta`. A line whose quantity would drop to zero
/// or below is removed.
pub async fn adjust_quantity(
    user_id: &str,
    product_id: &str,
    variant_id: &str,
    delta: i64,
    conn: &mut SqliteConnection,
) -> Result<(), CheckoutDbError> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM carts WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    if exists.is_none() {
        return Err(CheckoutDbError::CartNotFound);
    }
    let quantity: Option<i64> = sqlx::query_scalar(
        "SELECT quantity FROM cart_items WHERE user_id = $1 AND product_id = $2 AND variant_id = $3",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(variant_id)
    .fetch_optional(&mut *conn)
    .await?;
    let quantity = quantity.ok_or(CheckoutDbError::ItemNotInCart)?;
    let new_quantity = quantity + delta;
    if new_quantity <= 0 {
        trace!("📝️ Quantity for {product_id}/{variant_id} dropped to zero; removing the line");
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2 AND variant_id = $3")
            .bind(user_id)
            .bind(product_id)
            .bind(variant_id)
            .execute(&mut *conn)
            .await?;
    } else {
        sqlx::query(
            r#"
                UPDATE cart_items
                SET quantity = $1, line_total = $1 * unit_price
                WHERE user_id = $2 AND product_id = $3 AND variant_id = $4
            "#,
        )
        .bind(new_quantity)
        .bind(user_id)
        .bind(product_id)
        .bind(variant_id)
        .execute(&mut *conn)
        .await?;
    }
    recompute_total(user_id, conn).await
}

/// Removes a line entirely, regardless of quantity.
pub async fn remove_item(
    user_id: &str,
    product_id: &str,
    variant_id: &str,
    conn: &mut SqliteConnection,
) -> Result<(), CheckoutDbError> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2 AND variant_id = $3")
        .bind(user_id)
        .bind(product_id)
        .bind(variant_id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(CheckoutDbError::ItemNotInCart);
    }
    recompute_total(user_id, conn).await
}

/// Deletes the cart and its items. Deleting an absent cart is a no-op — repeat verifications
/// and cart-clear calls must not error on a cart that is already gone.
pub async fn delete_cart(user_id: &str, conn: &mut SqliteConnection) -> Result<(), CheckoutDbError> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1").bind(user_id).execute(&mut *conn).await?;
    sqlx::query("DELETE FROM carts WHERE user_id = $1").bind(user_id).execute(conn).await?;
    Ok(())
}
