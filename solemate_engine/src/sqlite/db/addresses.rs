use sqlx::SqliteConnection;

use crate::{
    db_types::{Address, NewAddress},
    traits::CheckoutDbError,
};

pub async fn insert_address(
    user_id: &str,
    address: NewAddress,
    conn: &mut SqliteConnection,
) -> Result<Address, CheckoutDbError> {
    let address: Address = sqlx::query_as(
        r#"
            INSERT INTO addresses (user_id, address, city, state, postal_code)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(address.address)
    .bind(address.city)
    .bind(address.state)
    .bind(address.postal_code)
    .fetch_one(conn)
    .await?;
    Ok(address)
}

/// Ownership is part of the lookup: an address that exists but belongs to another user is
/// indistinguishable from one that does not exist.
pub async fn fetch_address(
    id: i64,
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Address>, CheckoutDbError> {
    let address: Option<Address> = sqlx::query_as("SELECT * FROM addresses WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(address)
}

pub async fn fetch_addresses_for_user(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Address>, CheckoutDbError> {
    let addresses: Vec<Address> =
        sqlx::query_as("SELECT * FROM addresses WHERE user_id = $1 ORDER BY created_at ASC, id ASC")
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(addresses)
}
