use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use payment_gateways::{
    ChargeOutcome,
    ChargeRequest,
    GatewayError,
    GatewayRouter,
    InitializedCharge,
    PaymentGateway,
    PaymentMethod,
};

mock! {
    pub Gateway {}

    #[async_trait]
    impl PaymentGateway for Gateway {
        fn method(&self) -> PaymentMethod;
        async fn initialize_charge(&self, request: &ChargeRequest) -> Result<InitializedCharge, GatewayError>;
        async fn verify_charge(&self, reference: &str) -> Result<ChargeOutcome, GatewayError>;
    }
}

pub fn router_with(paystack: MockGateway, korapay: MockGateway) -> GatewayRouter {
    GatewayRouter::new(Arc::new(paystack), Arc::new(korapay))
}

/// A router whose gateways panic if touched; for endpoints that never reach a provider.
pub fn unused_router() -> GatewayRouter {
    router_with(MockGateway::new(), MockGateway::new())
}
