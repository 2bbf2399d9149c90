use log::debug;
use payment_gateways::PaymentMethod;
use sqlx::{sqlite::SqliteRow, FromRow, Row, SqliteConnection};

use crate::{
    db_types::{NewPaymentRecord, PaymentRecord, PaymentStatus},
    traits::CheckoutDbError,
};

impl FromRow<'_, SqliteRow> for PaymentRecord {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let provider: String = row.try_get("provider")?;
        let provider = provider.parse::<PaymentMethod>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "provider".to_string(),
            source: Box::new(e),
        })?;
        Ok(PaymentRecord {
            id: row.try_get("id")?,
            order_number: row.try_get("order_number")?,
            user_name: row.try_get("user_name")?,
            user_email: row.try_get("user_email")?,
            provider,
            reference: row.try_get("reference")?,
            amount: row.try_get("amount")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Looks a payment record up by its `(provider, reference)` compound key. The reference alone
/// is never a key; two providers could coincidentally issue the same string.
pub async fn fetch_payment(
    provider: PaymentMethod,
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentRecord>, CheckoutDbError> {
    let payment: Option<PaymentRecord> =
        sqlx::query_as("SELECT * FROM payments WHERE provider = $1 AND reference = $2")
            .bind(provider.to_string())
            .bind(reference)
            .fetch_optional(conn)
            .await?;
    Ok(payment)
}

/// Inserts a new payment record in `pending` state.
pub async fn insert_payment(
    payment: NewPaymentRecord,
    conn: &mut SqliteConnection,
) -> Result<PaymentRecord, CheckoutDbError> {
    if fetch_payment(payment.provider, &payment.reference, &mut *conn).await?.is_some() {
        return Err(CheckoutDbError::PaymentAlreadyExists(payment.reference));
    }
    let record: PaymentRecord = sqlx::query_as(
        r#"
            INSERT INTO payments (order_number, user_name, user_email, provider, reference, amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(payment.order_number)
    .bind(payment.user_name)
    .bind(payment.user_email)
    .bind(payment.provider.to_string())
    .bind(payment.reference)
    .bind(payment.amount)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Payment record {} created for order {}", record.reference, record.order_number);
    Ok(record)
}

/// Compare-and-set: moves the payment to `status` only if it is still `pending`. Returns
/// `None` when the record does not exist or has already left `pending` — the caller decides
/// which of those it is. This is what serializes concurrent verifications for the same
/// reference: exactly one caller observes the transition.
pub async fn mark_status_if_pending(
    provider: PaymentMethod,
    reference: &str,
    status: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentRecord>, CheckoutDbError> {
    let updated: Option<PaymentRecord> = sqlx::query_as(
        "UPDATE payments SET status = $1 WHERE provider = $2 AND reference = $3 AND status = 'pending' RETURNING *",
    )
    .bind(status)
    .bind(provider.to_string())
    .bind(reference)
    .fetch_optional(conn)
    .await?;
    Ok(updated)
}
