//! Solemate checkout engine
//!
//! Core logic for the Solemate store backend: carts, delivery addresses, orders, payment
//! records, and the reconciliation workflow that keeps all of them consistent with what the
//! external payment providers report.
//!
//! The library is divided into three main sections:
//! 1. Store contracts ([`mod@traits`]) and the SQLite backend that implements them
//!    ([`mod@sqlite`]). Callers should never touch the database directly; everything goes
//!    through the public APIs. The data types shared with the database live in [`db_types`]
//!    and are public.
//! 2. The public API ([`mod@api`]): [`OrderFlowApi`] drives the initialize → pay → verify →
//!    finalize workflow, [`CartApi`] manages the shopper's live cart, and [`AddressBookApi`]
//!    manages delivery addresses.
//! 3. An event hook system ([`mod@events`]) for post-commit side effects. When a payment is
//!    confirmed an `OrderConfirmedEvent` is emitted; subscribers (such as the confirmation
//!    mailer) react without being able to affect the state transition itself.
mod api;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{
    cart::CartApi,
    errors::{CartApiError, OrderFlowError},
    address_book::AddressBookApi,
    order_flow::{InitializedPayment, OrderFlowApi, VerifiedPayment},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
