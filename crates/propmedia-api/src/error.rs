//! HTTP error handling
//!
//! Wraps `AppError` for axum so every handler can return `Result<_, HttpAppError>`
//! and get a consistent JSON error body. Response shape is driven by the
//! `ErrorMetadata` the error carries; sensitive details are stripped outside
//! development.

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use propmedia_core::{AppError, ErrorMetadata, LogLevel};
use propmedia_processing::ValidationError;
use propmedia_storage::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub error_type: String,
    pub code: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Newtype so `AppError` can implement axum's `IntoResponse`.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(AppError::Storage(err.to_string()))
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app = match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::UnsupportedContentType { .. } => {
                AppError::UnsupportedMediaType(err.to_string())
            }
            ValidationError::InvalidFilename(_) | ValidationError::EmptyFile => {
                AppError::InvalidInput(err.to_string())
            }
        };
        HttpAppError(app)
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false)
}

fn log_error(err: &AppError) {
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(code = err.error_code(), "{}", err.detailed_message()),
        LogLevel::Warn => tracing::warn!(code = err.error_code(), "{}", err.detailed_message()),
        LogLevel::Error => tracing::error!(code = err.error_code(), "{}", err.detailed_message()),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let err = self.0;
        log_error(&err);

        let status = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Internal details never leave a production deployment.
        let details = if err.is_sensitive() && is_production_env() {
            None
        } else {
            Some(err.detailed_message())
        };

        let body = ErrorResponse {
            error: err.client_message(),
            details,
            error_type: err.error_type().to_string(),
            code: err.error_code().to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action().map(String::from),
        };

        (status, Json(body)).into_response()
    }
}

/// JSON extractor that runs `validator` rules after deserialization.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| HttpAppError(AppError::InvalidInput(e.body_text())))?;

        value
            .validate()
            .map_err(|e| HttpAppError(AppError::InvalidInput(e.to_string())))?;

        Ok(ValidatedJson(value))
    }
}
