use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Invalid or incomplete input from the caller.
    ValidationError(String),
    /// Missing backing configuration (e.g. the tenant company record).
    ConfigurationError(String),
    /// Missing or invalid webhook signature.
    Unauthorized(String),
    /// Failed webhook handshake or an operation the caller may not perform.
    Forbidden(String),
    /// Lead store failure.
    StorageError(sqlx::Error),
    /// Error interacting with the messaging API.
    ExternalApiError(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::StorageError(e) => write!(f, "Storage error: {}", e),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::ConfigurationError(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::StorageError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            AppError::WithContext { source, .. } => source.status_code(),
        }
    }

    /// Message that is safe to show to the caller.
    ///
    /// Client errors keep their detail, server errors are reduced to a generic text.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg) => msg.clone(),
            AppError::ConfigurationError(_) => "Lead intake is not configured".to_string(),
            AppError::Unauthorized(_) => "Unauthorized".to_string(),
            AppError::Forbidden(_) => "Forbidden".to_string(),
            AppError::StorageError(_) | AppError::InternalError(_) => {
                "Internal server error".to_string()
            }
            AppError::ExternalApiError(_) => "External service error".to_string(),
            AppError::WithContext { source, .. } => source.public_message(),
        }
    }

    /// Logs the error at a level matching its severity.
    fn log(&self) {
        match self {
            AppError::ValidationError(msg) => tracing::warn!("Rejected request: {}", msg),
            AppError::ConfigurationError(msg) => tracing::error!("Configuration error: {}", msg),
            AppError::Unauthorized(msg) => tracing::warn!("Unauthorized access: {}", msg),
            AppError::Forbidden(msg) => tracing::warn!("Forbidden: {}", msg),
            AppError::StorageError(e) => tracing::error!("Storage error: {:?}", e),
            AppError::ExternalApiError(msg) => tracing::error!("External API error: {}", msg),
            AppError::InternalError(msg) => tracing::error!("Internal error: {}", msg),
            // Log full context chain for debugging
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source)
            }
        }
    }

    /// Converts the error into a plain-text response.
    ///
    /// Webhook callers (the WhatsApp platform) only look at the status code, so the
    /// body is the bare status reason.
    pub fn into_plain_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let reason = status.canonical_reason().unwrap_or("Error");
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            reason,
        )
            .into_response()
    }
}

impl IntoResponse for AppError {
    /// Converts the error into a `{success: false, error}` JSON response.
    fn into_response(self) -> Response {
        self.log();

        let body = Json(json!({
            "success": false,
            "error": self.public_message(),
        }));

        (self.status_code(), body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StorageError(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalApiError(err.to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }
}

/// Extension for sqlx::Error to add context
impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::StorageError(e)),
            context: context.into(),
        })
    }
}
