//! Error handling for the BIZMAX server
//!
//! Provides consistent error responses in English and Swahili

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::LedgerError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authorization errors
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_sw: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Ledger rule violations
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::Validation {
            message: errors.to_string(),
            message_sw: format!("Taarifa si sahihi: {}", field),
            field,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_sw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

fn ledger_detail(error: &LedgerError) -> ErrorDetail {
    let (code, message_sw) = match error {
        LedgerError::InsufficientStock { available, .. } => (
            "INSUFFICIENT_STOCK",
            format!("Hifadhi haitoshi. Iliyopo: {}", available),
        ),
        LedgerError::NotCreditSale => (
            "NOT_CREDIT_SALE",
            "Malipo yanaweza kufanywa kwa mauzo ya mkopo tu".to_string(),
        ),
        LedgerError::Overpayment { outstanding, .. } => (
            "OVERPAYMENT",
            format!("Kiasi kinazidi deni lililobaki la {}", outstanding),
        ),
        LedgerError::InvalidCreditSaleInput(_) => (
            "INVALID_CREDIT_SALE",
            "Mauzo ya mkopo yanahitaji jina la mteja na jumla ya kiasi".to_string(),
        ),
        LedgerError::InvalidAmount(_) => ("INVALID_AMOUNT", "Kiasi si sahihi".to_string()),
        LedgerError::InvalidPrice(_) => ("INVALID_PRICE", "Bei si sahihi".to_string()),
        LedgerError::InvalidDate(_) => ("INVALID_DATE", "Tarehe si sahihi".to_string()),
        LedgerError::UnknownValue { .. } => ("UNKNOWN_VALUE", "Thamani haijulikani".to_string()),
    };
    ErrorDetail {
        code: code.to_string(),
        message_en: error.to_string(),
        message_sw,
        field: error.field().map(str::to_string),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "INSUFFICIENT_PERMISSIONS".to_string(),
                    message_en: "You do not have permission to perform this action".to_string(),
                    message_sw: "Huna ruhusa ya kufanya kitendo hiki".to_string(),
                    field: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_sw,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_sw: message_sw.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_sw: format!("{} haikupatikana", resource),
                    field: None,
                },
            ),
            AppError::Ledger(error) => (StatusCode::UNPROCESSABLE_ENTITY, ledger_detail(error)),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_sw: "Hitilafu ya hifadhidata imetokea".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_sw: "Hitilafu ya ndani ya seva".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_sw: "Hitilafu ya ndani ya seva".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
