use crate::{
    api::errors::OrderFlowError,
    db_types::{Address, NewAddress},
    traits::AddressBook,
};

/// API for the user's delivery address book.
#[derive(Debug, Clone)]
pub struct AddressBookApi<B> {
    db: B,
}

impl<B> AddressBookApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AddressBookApi<B>
where B: AddressBook
{
    pub async fn create_address(&self, user_id: &str, address: NewAddress) -> Result<Address, OrderFlowError> {
        Ok(self.db.insert_address(user_id, address).await?)
    }

    pub async fn list_addresses(&self, user_id: &str) -> Result<Vec<Address>, OrderFlowError> {
        Ok(self.db.fetch_addresses_for_user(user_id).await?)
    }

    pub async fn find_address(&self, id: i64, user_id: &str) -> Result<Address, OrderFlowError> {
        self.db.fetch_address(id, user_id).await?.ok_or(OrderFlowError::AddressNotFound(id))
    }
}
