use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::contact::store::StoreError;
use crate::prediction::model::ModelError;

/// Application-level error type for the JSON API.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// HTML routes render the message from `describe()` into the page instead
/// of returning the JSON envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Prediction error: {0}")]
    Prediction(#[from] ModelError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl AppError {
    /// Status, machine code, and user-facing message. Internal failures are
    /// logged here and their details kept out of the message. `Unavailable`
    /// is logged where it is raised.
    pub fn describe(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                msg.clone(),
            ),
            AppError::Prediction(e) => {
                tracing::error!("Prediction error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PREDICTION_ERROR",
                    "An unexpected error occurred during prediction. Check server logs.".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::warn!("Storage error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORAGE_ERROR",
                    "Sorry, your message could not be saved right now. Please try again later."
                        .to_string(),
                )
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TEMPLATE_ERROR",
                    "The page could not be rendered".to_string(),
                )
            }
        }
    }
}

/// Malformed or incomplete JSON bodies get the same envelope as other
/// input errors instead of axum's plain-text rejection.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.describe();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
