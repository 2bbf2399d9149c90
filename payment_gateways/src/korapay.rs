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
    config::KorapayConfig,
    data_objects::{ChargeOutcome, ChargeRequest, ChargeStatus, InitializedCharge, PaymentMethod},
    gateway::PaymentGateway,
    GatewayError,
};

/// Client for the Korapay checkout-standard API.
///
/// Unlike Paystack, Korapay charges in whole naira and expects the merchant to supply the
/// charge reference. The caller-generated reference from [`ChargeRequest`] is sent verbatim
/// and echoed back as the authoritative reference.
#[derive(Clone)]
pub struct KorapayApi {
    config: KorapayConfig,
    client: Arc<Client>,
}

impl KorapayApi {
    pub fn new(config: KorapayConfig, timeout: Duration) -> Result<Self, GatewayError> {
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

    /// Sends a request and unwraps Korapay's `{status, message, data}` envelope.
    async fn api_call(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, GatewayError> {
        let url = format!("{}{path}", self.config.base_url);
        trace!("🟡️ Korapay request: {method} {url}");
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
            debug!("🟡️ Korapay rejected the request ({status}): {message}");
            return Err(GatewayError::Rejected { status: status.as_u16(), message });
        }
        Ok(envelope["data"].clone())
    }
}

#[async_trait::async_trait]
impl PaymentGateway for KorapayApi {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Korapay
    }

    async fn initialize_charge(&self, request: &ChargeRequest) -> Result<InitializedCharge, GatewayError> {
        let body = serde_json::json!({
            "amount": request.amount.value(),
            "currency": request.currency,
            "reference": request.reference,
            "narration": request.narration,
            "customer": {
                "name": request.customer.name,
                "email": request.customer.email,
            },
            "channels": ["card", "bank_transfer", "pay_with_bank", "mobile_money"],
            "default_channel": "card",
            "redirect_url": self.config.redirect_url,
        });
        let data = self.api_call(Method::POST, "/merchant/api/v1/charges/initialize", Some(body)).await?;
        let reference =
            data["reference"].as_str().map(str::to_string).unwrap_or_else(|| request.reference.clone());
        debug!("🟡️ Korapay charge initialized with reference {reference}");
        Ok(InitializedCharge { provider: PaymentMethod::Korapay, reference, access: data })
    }

    async fn verify_charge(&self, reference: &str) -> Result<ChargeOutcome, GatewayError> {
        let path = format!("/merchant/api/v1/charges/{reference}");
        let data = self.api_call(Method::GET, &path, None).await?;
        let outcome = normalize_verification(reference, &data);
        debug!("🟡️ Korapay reports charge {reference} as {}", outcome.status);
        Ok(outcome)
    }
}

/// Maps a Korapay charge payload onto the normalized [`ChargeOutcome`]. Korapay amounts are
/// already in whole naira, but arrive as either a number or a numeric string.
fn normalize_verification(reference: &str, data: &Value) -> ChargeOutcome {
    let status = data["status"].as_str().map(ChargeStatus::from_provider_status).unwrap_or(ChargeStatus::Failed);
    let amount = data["amount"]
        .as_i64()
        .or_else(|| data["amount"].as_str().and_then(|s| s.parse::<f64>().ok().map(|f| f as i64)))
        .map(Naira::from);
    let paid_at = data["transaction_date"]
        .as_str()
        .or_else(|| data["paid_at"].as_str())
        .and_then(|s| s.parse::<DateTime<Utc>>().ok());
    ChargeOutcome {
        provider: PaymentMethod::Korapay,
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
    fn normalizes_successful_charge() {
        let json = include_str!("./test_assets/korapay_charge_success.json");
        let data: Value = serde_json::from_str(json).unwrap();
        let outcome = normalize_verification("KORA-1724316864333-042", &data["data"]);
        assert_eq!(outcome.status, ChargeStatus::Success);
        assert_eq!(outcome.amount, Some(Naira::from(5000)));
        assert_eq!(outcome.reference, "KORA-1724316864333-042");
    }

    #[test]
    fn failed_charge_keeps_raw_payload() {
        let json = include_str!("./test_assets/korapay_charge_failed.json");
        let data: Value = serde_json::from_str(json).unwrap();
        let outcome = normalize_verification("KORA-1724316899100-713", &data["data"]);
        assert_eq!(outcome.status, ChargeStatus::Failed);
        assert_eq!(outcome.raw["payment_method"].as_str(), Some("card"));
    }

    #[test]
    fn string_amounts_are_accepted() {
        let data = serde_json::json!({ "status": "success", "amount": "2500.00" });
        let outcome = normalize_verification("ref", &data);
        assert_eq!(outcome.amount, Some(Naira::from(2500)));
    }
}
