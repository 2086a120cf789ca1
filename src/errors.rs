use serde::Serialize;

use crate::models::OrderStatus;

/// Error taxonomy for the storefront core.
///
/// Validation errors and illegal transitions are recovered locally and
/// surfaced as user-facing messages. Backend failures leave in-memory state
/// unchanged and are surfaced for retry by the user; no automatic retry.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Event error: {0}")]
    EventError(String),
}

impl ServiceError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
