use crate::{
    db_types::{Address, NewAddress},
    traits::CheckoutDbError,
};

/// Store contract for the user's delivery address book.
#[allow(async_fn_in_trait)]
pub trait AddressBook: Clone + Send + Sync {
    async fn insert_address(&self, user_id: &str, address: NewAddress) -> Result<Address, CheckoutDbError>;

    /// Fetches an address only if it exists AND belongs to the given user. Ownership is part
    /// of the lookup, not a separate check.
    async fn fetch_address(&self, id: i64, user_id: &str) -> Result<Option<Address>, CheckoutDbError>;

    async fn fetch_addresses_for_user(&self, user_id: &str) -> Result<Vec<Address>, CheckoutDbError>;
}
