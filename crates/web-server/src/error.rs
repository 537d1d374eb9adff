use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dataset::DatasetError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
    #[error("Risk error: {0}")]
    Risk(#[from] risk::RiskError),
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] core_types::CoreError),
    #[error("Unavailable: {0}")]
    Unavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Dataset(err @ DatasetError::NotFound { .. }) => {
                tracing::error!(error = %err, "Data file is missing.");
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            AppError::Dataset(err) => {
                tracing::error!(error = ?err, "Dataset error.");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AppError::Analytics(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Risk(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::InvalidInput(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Unavailable(message) => {
                tracing::warn!(reason = %message, "Feature unavailable.");
                (StatusCode::NOT_FOUND, message)
            }
            AppError::Internal(message) => {
                tracing::error!(error = %message, "Internal error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
