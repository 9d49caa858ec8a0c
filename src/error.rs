use actix_web::{HttpResponse, ResponseError};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Debits ({debit}) must equal credits ({credit})")]
    ImbalancedEntry { debit: Decimal, credit: Decimal },

    #[error("Invalid line: {0}")]
    InvalidLine(String),

    #[error("This request has already been resolved")]
    AlreadyResolved,

    #[error("Cannot lock the last admin")]
    LastAdminLockout,

    #[error("You cannot lock yourself")]
    SelfLockout,

    #[error("This user cannot be modified")]
    ProtectedAccount,

    #[error("Excel export is not available; rebuild with the `xlsx` feature enabled")]
    ExportUnavailable,

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        use actix_web::http::StatusCode;

        let (status_code, error_code, message) = match self {
            AppError::ImbalancedEntry { .. } => {
                log::warn!("Validation error: {self}");
                (StatusCode::BAD_REQUEST, "IMBALANCED_ENTRY", self.to_string())
            }
            AppError::InvalidLine(_) => {
                log::warn!("Validation error: {self}");
                (StatusCode::BAD_REQUEST, "INVALID_LINE", self.to_string())
            }
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (StatusCode::UNAUTHORIZED, "AUTH_ERROR", msg.clone())
            }
            AppError::PermissionDenied => {
                log::warn!("Permission denied");
                (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string())
            }
            AppError::SelfLockout => (StatusCode::FORBIDDEN, "SELF_LOCKOUT", self.to_string()),
            AppError::LastAdminLockout => (
                StatusCode::FORBIDDEN,
                "LAST_ADMIN_LOCKOUT",
                self.to_string(),
            ),
            AppError::ProtectedAccount => (
                StatusCode::FORBIDDEN,
                "PROTECTED_ACCOUNT",
                self.to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            // informational no-op; nothing was applied twice
            AppError::AlreadyResolved => {
                (StatusCode::CONFLICT, "ALREADY_RESOLVED", self.to_string())
            }
            AppError::ExportUnavailable => (
                StatusCode::NOT_IMPLEMENTED,
                "EXPORT_UNAVAILABLE",
                self.to_string(),
            ),
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
