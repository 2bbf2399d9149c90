use std::sync::Arc;

use crate::{
    config::GatewayConfig,
    data_objects::PaymentMethod,
    gateway::PaymentGateway,
    GatewayError,
    KorapayApi,
    PaystackApi,
};

/// Resolves a [`PaymentMethod`] selector to the gateway that serves it.
///
/// Holds one instance per provider. Constructed once at startup from [`GatewayConfig`];
/// tests inject mock gateways via [`GatewayRouter::new`].
#[derive(Clone)]
pub struct GatewayRouter {
    paystack: Arc<dyn PaymentGateway>,
    korapay: Arc<dyn PaymentGateway>,
}

impl GatewayRouter {
    pub fn new(paystack: Arc<dyn PaymentGateway>, korapay: Arc<dyn PaymentGateway>) -> Self {
        Self { paystack, korapay }
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let paystack = PaystackApi::new(config.paystack.clone(), config.timeout)?;
        let korapay = KorapayApi::new(config.korapay.clone(), config.timeout)?;
        Ok(Self::new(Arc::new(paystack), Arc::new(korapay)))
    }

    pub fn gateway_for(&self, method: PaymentMethod) -> &dyn PaymentGateway {
        match method {
            PaymentMethod::Paystack => self.paystack.as_ref(),
            PaymentMethod::Korapay => self.korapay.as_ref(),
        }
    }
}
