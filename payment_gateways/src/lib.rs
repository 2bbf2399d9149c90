//! HTTP clients for the two supported payment providers.
//!
//! The rest of the system only ever sees the [`PaymentGateway`] trait and the normalized data
//! objects in [`data_objects`]. Everything provider-specific (payload shapes, amount units,
//! auth headers, endpoint paths) is absorbed here.
pub mod config;
pub mod data_objects;
mod error;
mod gateway;
mod korapay;
mod paystack;
mod router;

pub use config::{GatewayConfig, KorapayConfig, PaystackConfig};
pub use data_objects::{
    ChargeOutcome,
    ChargeRequest,
    ChargeStatus,
    CustomerInfo,
    InitializedCharge,
    PaymentMethod,
};
pub use error::GatewayError;
pub use gateway::PaymentGateway;
pub use korapay::KorapayApi;
pub use paystack::PaystackApi;
pub use router::GatewayRouter;
