use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Could not initialize gateway client: {0}")]
    Initialization(String),
    #[error("Provider request failed: {0}")]
    Request(String),
    #[error("Provider did not respond within the configured timeout")]
    Timeout,
    #[error("Provider rejected the request. Status {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("Could not make sense of the provider response: {0}")]
    MalformedResponse(String),
    #[error("No gateway is configured for payment method {0}")]
    UnknownMethod(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Request(e.to_string())
        }
    }
}
