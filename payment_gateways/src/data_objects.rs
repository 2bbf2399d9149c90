use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sm_common::Naira;
use thiserror::Error;

//--------------------------------------    PaymentMethod    ---------------------------------------------------------
/// The two supported payment providers.
///
/// The wire encoding (`1` = Paystack, `2` = Korapay) matches what the storefront client sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Paystack,
    Korapay,
}

#[derive(Debug, Clone, Error)]
#[error("Invalid payment method: {0}")]
pub struct InvalidPaymentMethod(String);

impl PaymentMethod {
    /// The numeric selector used on the HTTP surface.
    pub fn code(&self) -> u8 {
        match self {
            PaymentMethod::Paystack => 1,
            PaymentMethod::Korapay => 2,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, InvalidPaymentMethod> {
        match code {
            1 => Ok(PaymentMethod::Paystack),
            2 => Ok(PaymentMethod::Korapay),
            other => Err(InvalidPaymentMethod(other.to_string())),
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Paystack => write!(f, "paystack"),
            PaymentMethod::Korapay => write!(f, "korapay"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = InvalidPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "paystack" => Ok(PaymentMethod::Paystack),
            "korapay" => Ok(PaymentMethod::Korapay),
            // The storefront sends the numeric selector in query strings.
            "1" => Ok(PaymentMethod::Paystack),
            "2" => Ok(PaymentMethod::Korapay),
            other => Err(InvalidPaymentMethod(other.to_string())),
        }
    }
}

//--------------------------------------    CustomerInfo     ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
}

//--------------------------------------    ChargeRequest    ---------------------------------------------------------
/// Everything a provider needs to start a charge.
///
/// `reference` is generated by the caller. Korapay uses it as the charge reference verbatim;
/// Paystack ignores it and issues its own. The authoritative reference is always the one
/// returned in [`InitializedCharge`].
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount: Naira,
    pub currency: String,
    pub customer: CustomerInfo,
    pub reference: String,
    /// Free-text line shown on the provider's checkout page.
    pub narration: String,
}

//--------------------------------------  InitializedCharge  ---------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct InitializedCharge {
    pub provider: PaymentMethod,
    /// The provider-issued charge reference. Unique per provider, used for verification.
    pub reference: String,
    /// Opaque provider payload the storefront client needs to complete payment
    /// (`access_code`/`authorization_url` for Paystack, `checkout_url` for Korapay).
    pub access: Value,
}

//--------------------------------------    ChargeStatus     ---------------------------------------------------------
/// Normalized outcome status. Providers report a range of strings ("abandoned", "processing",
/// "expired", ...); anything that is not an explicit success is treated as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeStatus {
    Success,
    Failed,
}

impl ChargeStatus {
    pub fn from_provider_status(status: &str) -> Self {
        if status.eq_ignore_ascii_case("success") {
            ChargeStatus::Success
        } else {
            ChargeStatus::Failed
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ChargeStatus::Success)
    }
}

impl Display for ChargeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChargeStatus::Success => write!(f, "success"),
            ChargeStatus::Failed => write!(f, "failed"),
        }
    }
}

//--------------------------------------    ChargeOutcome    ---------------------------------------------------------
/// The provider's ground truth for a charge, as reported by its verification endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeOutcome {
    pub provider: PaymentMethod,
    pub reference: String,
    pub status: ChargeStatus,
    /// The amount the provider says was collected, converted to whole naira.
    pub amount: Option<Naira>,
    pub paid_at: Option<DateTime<Utc>>,
    /// The provider's raw verification payload, for diagnostics and client display.
    pub raw: Value,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn method_codes_round_trip() {
        assert_eq!(PaymentMethod::from_code(1).unwrap(), PaymentMethod::Paystack);
        assert_eq!(PaymentMethod::from_code(2).unwrap(), PaymentMethod::Korapay);
        assert!(PaymentMethod::from_code(3).is_err());
        assert_eq!(PaymentMethod::Paystack.code(), 1);
        assert_eq!(PaymentMethod::Korapay.code(), 2);
    }

    #[test]
    fn method_parses_names_and_selectors() {
        assert_eq!("paystack".parse::<PaymentMethod>().unwrap(), PaymentMethod::Paystack);
        assert_eq!("KORAPAY".parse::<PaymentMethod>().unwrap(), PaymentMethod::Korapay);
        assert_eq!("1".parse::<PaymentMethod>().unwrap(), PaymentMethod::Paystack);
        assert!("3".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn anything_but_success_is_failed() {
        assert_eq!(ChargeStatus::from_provider_status("success"), ChargeStatus::Success);
        assert_eq!(ChargeStatus::from_provider_status("Success"), ChargeStatus::Success);
        assert_eq!(ChargeStatus::from_provider_status("abandoned"), ChargeStatus::Failed);
        assert_eq!(ChargeStatus::from_provider_status("processing"), ChargeStatus::Failed);
        assert_eq!(ChargeStatus::from_provider_status(""), ChargeStatus::Failed);
    }
}
