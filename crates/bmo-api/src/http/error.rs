//! Application error type mapping to HTTP status codes and the error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use bmo_types::error::ConversationError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// A conversation turn failed.
    Conversation(ConversationError),
    /// Malformed or invalid request.
    Validation(String),
    /// Endpoint no longer served.
    Gone(String),
}

impl From<ConversationError> for AppError {
    fn from(e: ConversationError) -> Self {
        AppError::Conversation(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Conversation(e @ ConversationError::AuthenticationRejected { .. }) => {
                (StatusCode::UNAUTHORIZED, "AUTHENTICATION_REJECTED", e.to_string())
            }
            AppError::Conversation(e @ ConversationError::AllCandidatesExhausted { .. }) => {
                (StatusCode::BAD_GATEWAY, "MODELS_EXHAUSTED", e.to_string())
            }
            AppError::Conversation(e @ ConversationError::MalformedModelOutput { .. }) => {
                (StatusCode::BAD_GATEWAY, "MALFORMED_MODEL_OUTPUT", e.to_string())
            }
            AppError::Conversation(e @ ConversationError::SynthesisFailure(_)) => {
                (StatusCode::BAD_GATEWAY, "SPEECH_FAILED", e.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Gone(msg) => (StatusCode::GONE, "GONE", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        } else {
            tracing::debug!(code, %message, "Request rejected");
        }

        let body = json!({
            "errors": [{
                "code": code,
                "message": message,
            }],
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
