//! REST API handlers.

pub mod conversation;
pub mod health;
pub mod transcription;
