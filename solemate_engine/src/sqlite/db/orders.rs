use log::debug;
use sqlx::{sqlite::SqliteRow, types::Json, FromRow, Row, SqliteConnection};

use crate::{
    db_types::{
        ActivityEntry,
        CartSnapshot,
        NewOrder,
        Order,
        OrderId,
        OrderStatusType,
        PaymentInfo,
        ShippingInfo,
        UserInfo,
    },
    traits::CheckoutDbError,
};

impl FromRow<'_, SqliteRow> for Order {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let Json(user_data) = row.try_get::<Json<UserInfo>, _>("user_data")?;
        let Json(shipping_data) = row.try_get::<Json<ShippingInfo>, _>("shipping_data")?;
        let Json(cart_data) = row.try_get::<Json<CartSnapshot>, _>("cart_data")?;
        let payment_data = row.try_get::<Option<Json<PaymentInfo>>, _>("payment_data")?.map(|j| j.0);
        Ok(Order {
            id: row.try_get("id")?,
            order_number: row.try_get("order_number")?,
            user_id: row.try_get("user_id")?,
            user_data,
            shipping_data,
            cart_data,
            payment_data,
            delivery_mode: row.try_get("delivery_mode")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            // The activity log lives in its own table and is attached by the fetch functions.
            activity: Vec::new(),
        })
    }
}

/// Checks whether an order with the given order number already exists, returning its row id.
pub async fn order_exists(order_number: &OrderId, conn: &mut SqliteConnection) -> Result<Option<i64>, CheckoutDbError> {
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE order_number = $1")
        .bind(order_number.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(id)
}

/// Inserts a new order row. Not atomic on its own; embed in a transaction together with the
/// initial activity entry.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, CheckoutDbError> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_number,
                user_id,
                user_data,
                shipping_data,
                cart_data,
                delivery_mode
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order.order_number)
    .bind(order.user_id)
    .bind(Json(order.user_data))
    .bind(Json(order.shipping_data))
    .bind(Json(order.cart_data))
    .bind(order.delivery_mode)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order [{}] inserted with id {}", order.order_number, order.id);
    Ok(order)
}

/// Appends one entry to the order's activity log. The log is append-only; there is no
/// corresponding update or delete anywhere in the engine.
pub async fn append_activity(
    order_id: i64,
    status: OrderStatusType,
    message: &str,
    conn: &mut SqliteConnection,
) -> Result<(), CheckoutDbError> {
    sqlx::query("INSERT INTO order_activity (order_id, status, message) VALUES ($1, $2, $3)")
        .bind(order_id)
        .bind(status)
        .bind(message)
        .execute(conn)
        .await?;
    Ok(())
}

async fn fetch_activity(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<ActivityEntry>, CheckoutDbError> {
    #[derive(FromRow)]
    struct ActivityRow {
        status: OrderStatusType,
        message: String,
        created_at: chrono::DateTime<chrono::Utc>,
    }
    let rows: Vec<ActivityRow> =
        sqlx::query_as("SELECT status, message, created_at FROM order_activity WHERE order_id = $1 ORDER BY id ASC")
            .bind(order_id)
            .fetch_all(conn)
            .await?;
    Ok(rows
        .into_iter()
        .map(|r| ActivityEntry { status: r.status, message: r.message, timestamp: r.created_at })
        .collect())
}

/// Fetches the order for the given order number, with its activity log attached.
pub async fn fetch_order_by_number(
    order_number: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, CheckoutDbError> {
    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE order_number = $1")
        .bind(order_number.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    match order {
        Some(mut order) => {
            order.activity = fetch_activity(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

/// All orders for the user, oldest first, each with its activity log attached.
pub async fn fetch_orders_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, CheckoutDbError> {
    let mut orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at ASC, id ASC")
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await?;
    for order in &mut orders {
        order.activity = fetch_activity(order.id, conn).await?;
    }
    Ok(orders)
}

pub async fn update_order_status(
    id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, CheckoutDbError> {
    let result: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(conn)
            .await?;
    result.ok_or_else(|| CheckoutDbError::DatabaseError(format!("order row {id} vanished during update")))
}

/// Records the payment outcome on the order and moves it to `payment-confirmed`.
pub async fn set_payment_confirmed(
    id: i64,
    payment_data: &PaymentInfo,
    conn: &mut SqliteConnection,
) -> Result<Order, CheckoutDbError> {
    let result: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders
            SET status = $1, payment_data = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(OrderStatusType::PaymentConfirmed)
    .bind(Json(payment_data))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    result.ok_or_else(|| CheckoutDbError::DatabaseError(format!("order row {id} vanished during update")))
}
