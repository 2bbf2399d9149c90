//! Store contracts for the checkout engine.
//!
//! Backends implement these traits to act as the durable stores behind the public APIs. The
//! composite operations on [`CheckoutDatabase`] are the ones with atomicity requirements; the
//! smaller traits cover the simple collaborator stores (cart, address book, catalog).
mod address_book;
mod cart_management;
mod checkout_database;
mod product_catalog;

pub use address_book::AddressBook;
pub use cart_management::CartManagement;
pub use checkout_database::{CheckoutDatabase, CheckoutDbError, ConfirmedPayment};
pub use product_catalog::ProductCatalog;
