//! Conversation HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/conversation/wake    - Start a session and get the greeting
//! - POST /api/v1/conversation/respond - Answer one transcript turn, voiced

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;

use bmo_types::conversation::{ConversationReply, SessionStart};

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for a conversation turn.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub session_id: String,
    /// Transcribed user speech or a typed command.
    pub transcript: String,
}

/// POST /api/v1/conversation/wake - Start a session.
pub async fn wake(State(state): State<AppState>) -> Json<SessionStart> {
    Json(state.conversation.start_session())
}

/// POST /api/v1/conversation/respond - Generate guidance and speech for a transcript.
pub async fn respond(
    State(state): State<AppState>,
    payload: Result<Json<RespondRequest>, JsonRejection>,
) -> Result<Json<ConversationReply>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    if request.session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id must not be empty".to_string()));
    }
    if request.transcript.trim().is_empty() {
        return Err(AppError::Validation("transcript must not be empty".to_string()));
    }

    let reply = state
        .conversation
        .generate_response(&request.session_id, &request.transcript)
        .await?;

    Ok(Json(reply))
}
