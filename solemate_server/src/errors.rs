use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::*;
use solemate_engine::{traits::CheckoutDbError, CartApiError, OrderFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("Auth token invalid or not provided")]
    CouldNotDeserializeAuthToken,
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("The payment provider could not process the request. {0}")]
    PaymentGatewayError(String),
    #[error("Payment verification failed")]
    PaymentVerificationFailed,
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::CouldNotDeserializeAuthToken => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            // Gateway trouble reads as a 400-class failure to the caller, but is logged
            // distinctly below since it signals third-party unavailability, not caller error.
            Self::PaymentGatewayError(_) => StatusCode::BAD_REQUEST,
            Self::PaymentVerificationFailed => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            // Full detail stays server-side; the caller gets a generic message.
            error!("💥️ {self}");
            "An internal error occurred".to_string()
        } else {
            if let Self::PaymentGatewayError(detail) = self {
                warn!("🔌️ Payment provider trouble: {detail}");
            }
            self.to_string()
        };
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "status": "error", "message": message }).to_string())
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::AddressNotFound(_) |
            OrderFlowError::CartNotFound |
            OrderFlowError::OrderNotFound(_) |
            OrderFlowError::PaymentNotFound { .. } => Self::NoRecordFound(e.to_string()),
            OrderFlowError::OrderOwnership(_) => Self::InsufficientPermissions(e.to_string()),
            OrderFlowError::AmountMismatch { .. } => Self::ValidationError(e.to_string()),
            OrderFlowError::Gateway(g) => Self::PaymentGatewayError(g.to_string()),
            OrderFlowError::VerificationFailed { .. } => Self::PaymentVerificationFailed,
            OrderFlowError::Database(db) => db.into(),
        }
    }
}

impl From<CartApiError> for ServerError {
    fn from(e: CartApiError) -> Self {
        match e {
            CartApiError::VariantNotFound { .. } => Self::NoRecordFound(e.to_string()),
            CartApiError::InsufficientStock { .. } | CartApiError::InvalidQuantity => {
                Self::ValidationError(e.to_string())
            },
            CartApiError::Database(db) => db.into(),
        }
    }
}

impl From<CheckoutDbError> for ServerError {
    fn from(e: CheckoutDbError) -> Self {
        match e {
            CheckoutDbError::CartNotFound |
            CheckoutDbError::ItemNotInCart |
            CheckoutDbError::OrderNotFound(_) |
            CheckoutDbError::PaymentNotFound(_, _) => Self::NoRecordFound(e.to_string()),
            // A terminal payment record cannot change state again; that is a caller problem.
            CheckoutDbError::PaymentNotPending(_, _, _) => Self::ValidationError(e.to_string()),
            CheckoutDbError::OrderAlreadyExists(_) | CheckoutDbError::PaymentAlreadyExists(_) => {
                Self::ValidationError(e.to_string())
            },
            CheckoutDbError::DatabaseError(_) | CheckoutDbError::CorruptData(_) => Self::BackendError(e.to_string()),
        }
    }
}
