use std::time::Duration;

use log::*;
use sm_common::Secret;

const DEFAULT_PAYSTACK_BASE_URL: &str = "https://api.paystack.co";
const DEFAULT_KORAPAY_BASE_URL: &str = "https://api.korapay.com";
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default)]
pub struct PaystackConfig {
    /// Base URL of the Paystack API. Overridable so tests can point at a local stub.
    pub base_url: String,
    pub secret_key: Secret<String>,
}

impl PaystackConfig {
    pub fn from_env_or_default() -> Self {
        let base_url = std::env::var("SOLEMATE_PAYSTACK_BASE_URL").unwrap_or_else(|_| {
            DEFAULT_PAYSTACK_BASE_URL.to_string()
        });
        let secret_key = Secret::new(std::env::var("SOLEMATE_PAYSTACK_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🔌️ SOLEMATE_PAYSTACK_SECRET_KEY is not set. Paystack charges will be rejected.");
            String::default()
        }));
        Self { base_url, secret_key }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KorapayConfig {
    /// Base URL of the Korapay API. Overridable so tests can point at a local stub.
    pub base_url: String,
    pub secret_key: Secret<String>,
    /// Where the shopper's browser is sent after completing a Korapay checkout.
    pub redirect_url: String,
}

impl KorapayConfig {
    pub fn from_env_or_default() -> Self {
        let base_url = std::env::var("SOLEMATE_KORAPAY_BASE_URL").unwrap_or_else(|_| {
            DEFAULT_KORAPAY_BASE_URL.to_string()
        });
        let secret_key = Secret::new(std::env::var("SOLEMATE_KORAPAY_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🔌️ SOLEMATE_KORAPAY_SECRET_KEY is not set. Korapay charges will be rejected.");
            String::default()
        }));
        let redirect_url = std::env::var("SOLEMATE_KORAPAY_REDIRECT_URL").unwrap_or_else(|_| {
            warn!("🔌️ SOLEMATE_KORAPAY_REDIRECT_URL is not set. Shoppers will not be redirected after checkout.");
            String::default()
        });
        Self { base_url, secret_key, redirect_url }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub paystack: PaystackConfig,
    pub korapay: KorapayConfig,
    /// Applied to every outbound provider call. A call that exceeds it surfaces
    /// [`crate::GatewayError::Timeout`] instead of hanging the request.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            paystack: PaystackConfig::default(),
            korapay: KorapayConfig::default(),
            timeout: Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    pub fn from_env_or_default() -> Self {
        let timeout = std::env::var("SOLEMATE_GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🔌️ Invalid value for SOLEMATE_GATEWAY_TIMEOUT_SECS: {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS));
        Self {
            paystack: PaystackConfig::from_env_or_default(),
            korapay: KorapayConfig::from_env_or_default(),
            timeout,
        }
    }
}
