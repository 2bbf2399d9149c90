//! # Checkout engine public API
//!
//! The API is modular: clients pick the functionality they need, and each API is generic over
//! the store traits it requires, so any backend that implements those traits can serve it.
//!
//! * [`order_flow::OrderFlowApi`] drives the checkout workflow: initialize an order, start a
//!   payment with one of the providers, verify the provider's reported outcome and reconcile
//!   the local stores with it.
//! * [`cart::CartApi`] manages the shopper's live cart.
//! * [`address_book::AddressBookApi`] manages delivery addresses.
//!
//! The pattern for using the APIs is the same everywhere: construct an API instance by
//! supplying a backend that implements the required traits, e.g.
//!
//! ```rust,ignore
//! use solemate_engine::{CartApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(&url, 25).await?;
//! // SqliteDatabase implements CartManagement and ProductCatalog
//! let api = CartApi::new(db);
//! let cart = api.get_cart("user-1").await?;
//! ```
pub mod address_book;
pub mod cart;
pub mod errors;
pub mod order_flow;
