//! Conversation domain types.
//!
//! A session is an ordered list of [`Turn`]s. Every model reply is normalized
//! into a [`CanonicalResponse`], which is what the voice client renders and
//! speaks.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::llm::{Message, MessageRole};

/// Who produced a turn in a session transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl From<TurnRole> for MessageRole {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => MessageRole::User,
            TurnRole::Assistant => MessageRole::Assistant,
        }
    }
}

/// One message in a session transcript. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        Message {
            role: turn.role.into(),
            content: turn.content.clone(),
        }
    }
}

/// Facial expression the client shows while speaking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Thinking,
    #[default]
    Neutral,
    Witty,
}

impl Emotion {
    /// Parse a case-insensitive emotion label. Unknown labels yield `None`.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "happy" => Some(Emotion::Happy),
            "thinking" => Some(Emotion::Thinking),
            "neutral" => Some(Emotion::Neutral),
            "witty" => Some(Emotion::Witty),
            _ => None,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emotion::Happy => write!(f, "happy"),
            Emotion::Thinking => write!(f, "thinking"),
            Emotion::Neutral => write!(f, "neutral"),
            Emotion::Witty => write!(f, "witty"),
        }
    }
}

/// Whether a response carries navigation or is purely conversational.
///
/// Always derived from the other response fields, never taken from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    Navigating,
    Speaking,
}

impl Mode {
    /// `Navigating` iff there are steps and the destination is not "general".
    pub fn derive(destination: &str, directions: &[String]) -> Self {
        if !directions.is_empty() && !destination.eq_ignore_ascii_case("general") {
            Mode::Navigating
        } else {
            Mode::Speaking
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Navigating => write!(f, "NAVIGATING"),
            Mode::Speaking => write!(f, "SPEAKING"),
        }
    }
}

/// Map panel contents shown next to the robot face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationDisplay {
    pub target_building: String,
    /// Campus zone, title-cased (`Yellow`, `Red`, `Blue`).
    pub zone_color: String,
    pub direction_guide: String,
}

/// Normalized model reply. Every field is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalResponse {
    pub narration: String,
    pub destination: String,
    pub directions: Vec<String>,
    pub mode: Mode,
    pub thought: String,
    pub emotion: Emotion,
    pub navigation_display: NavigationDisplay,
}

/// Synthesized narration audio, base64-encoded for JSON transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechPayload {
    pub mime_type: String,
    pub base64: String,
}

/// Result of waking the robot: a fresh session and its greeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStart {
    pub session_id: String,
    pub message: String,
}

/// Full reply for one transcript turn, as returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationReply {
    pub session_id: String,
    pub transcript: String,
    #[serde(flatten)]
    pub response: CanonicalResponse,
    pub speech: SpeechPayload,
}
