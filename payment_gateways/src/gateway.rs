use async_trait::async_trait;

use crate::{
    data_objects::{ChargeOutcome, ChargeRequest, InitializedCharge, PaymentMethod},
    GatewayError,
};

/// The normalization boundary between the checkout workflow and an external payment provider.
///
/// Exactly two operations. Implementations absorb every provider asymmetry: payload shape,
/// amount units, auth headers and endpoint layout. The workflow never branches on the concrete
/// provider beyond selecting which gateway to talk to.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Which provider this gateway talks to.
    fn method(&self) -> PaymentMethod;

    /// Start a remote charge. Returns the opaque payload the storefront client needs to
    /// complete payment, together with the provider-issued reference.
    ///
    /// Fails with [`GatewayError`] on transport errors, timeouts, or provider-side rejection.
    /// The provider's own error message is propagated when it supplies one.
    async fn initialize_charge(&self, request: &ChargeRequest) -> Result<InitializedCharge, GatewayError>;

    /// Query the provider for the ground truth of a charge.
    async fn verify_charge(&self, reference: &str) -> Result<ChargeOutcome, GatewayError>;
}
