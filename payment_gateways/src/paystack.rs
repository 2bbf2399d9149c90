use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
};
use serde_json::Value;
use sm_common::Naira;

use crate::{
    config::PaystackConfig,
    data_objects::{ChargeOutcome, ChargeRequest, ChargeStatus, InitializedCharge, PaymentMethod},
    gateway::PaymentGateway,
    GatewayError,
};

/// Client for the Paystack transaction API.
///
/// Paystack charges in kobo (minor units), so amounts are scaled by 100 on the way out and
/// divided back down when normalizing verification results. The charge reference is issued by
/// Paystack in the initialization response; the caller-supplied reference is not sent.
#[derive(Clone)]
pub struct PaystackApi {
    config: PaystackConfig,
    client: Arc<Client>,
}

impl PaystackApi {
    pub fn new(config: PaystackConfig, timeout: Duration) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| GatewayError::Initialization(e.to_string()))?;
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Sends a request and unwraps Paystack's `{status, message, data}` envelope.
    async fn api_call(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, GatewayError> {
        let url = format!("{}{path}", self.config.base_url);
        trace!("💳️ Paystack request: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await?;
        let status = response.status();
        let envelope =
            response.json::<Value>().await.map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        let accepted = envelope["status"].as_bool().unwrap_or(false);
        if !status.is_success() || !accepted {
            let message = envelope["message"].as_str().unwrap_or("no message from provider").to_string();
            debug!("💳️ Paystack rejected the request ({status}): {message}");
            return Err(GatewayError::Rejected { status: status.as_u16(), message });
        }
        Ok(envelope["data"].clone())
    }
}

#[async_trait::async_trait]
impl PaymentGateway for PaystackApi {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Paystack
    }

    async fn initialize_charge(&self, request: &ChargeRequest) -> Result<InitializedCharge, GatewayError> {
        let body = serde_json::json!({
            "email": request.customer.email,
            "amount": request.amount.to_kobo(),
        });
        let data = self.api_call(Method::POST, "/transaction/initialize", Some(body)).await?;
        let reference = data["reference"]
            .as_str()
            .ok_or_else(|| GatewayError::MalformedResponse("initialization response has no reference".into()))?
            .to_string();
        debug!("💳️ Paystack charge initialized with reference {reference}");
        Ok(InitializedCharge { provider: PaymentMethod::Paystack, reference, access: data })
    }

    async fn verify_charge(&self, reference: &str) -> Result<ChargeOutcome, GatewayError> {
        let path = format!("/transaction/verify/{reference}");
        let data = self.api_call(Method::GET, &path, None).await?;
        let outcome = normalize_verification(reference, &data);
        debug!("💳️ Paystack reports charge {reference} as {}", outcome.status);
        Ok(outcome)
    }
}

/// Maps a Paystack verification payload onto the normalized [`ChargeOutcome`].
fn normalize_verification(reference: &str, data: &Value) -> ChargeOutcome {
    let status = data["status"].as_str().map(ChargeStatus::from_provider_status).unwrap_or(ChargeStatus::Failed);
    let amount = data["amount"].as_i64().map(Naira::from_kobo);
    let paid_at = data["paid_at"]
        .as_str()
        .or_else(|| data["paidAt"].as_str())
        .and_then(|s| s.parse::<DateTime<Utc>>().ok());
    ChargeOutcome {
        provider: PaymentMethod::Paystack,
        reference: reference.to_string(),
        status,
        amount,
        paid_at,
        raw: data.clone(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalizes_successful_verification() {
        let json = include_str!("./test_assets/paystack_verify_success.json");
        let data: Value = serde_json::from_str(json).unwrap();
        let outcome = normalize_verification("T685312322670591", &data["data"]);
        assert_eq!(outcome.status, ChargeStatus::Success);
        // Paystack reports 500000 kobo; the store works in whole naira.
        assert_eq!(outcome.amount, Some(Naira::from(5000)));
        assert!(outcome.paid_at.is_some());
        assert_eq!(outcome.reference, "T685312322670591");
    }

    #[test]
    fn abandoned_charge_normalizes_to_failed() {
        let json = include_str!("./test_assets/paystack_verify_abandoned.json");
        let data: Value = serde_json::from_str(json).unwrap();
        let outcome = normalize_verification("re4lyvq3s3", &data["data"]);
        assert_eq!(outcome.status, ChargeStatus::Failed);
        assert!(outcome.paid_at.is_none());
    }
}
