use thiserror::Error;

use crate::llm::{CandidateFailure, ModelChainError, join_failures};

/// Errors from the speech-synthesis engine.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("no audio chunks produced")]
    NoAudio,

    #[error("narration exceeds maximum size: {len} bytes (limit: {limit} bytes)")]
    InputTooLarge { len: usize, limit: usize },

    #[error("speech engine unavailable: {0}")]
    Unavailable(String),

    #[error("speech engine failed: {0}")]
    Engine(String),

    #[error("speech engine timed out after {0}s")]
    Timeout(u64),
}

/// Errors from producing one conversation turn.
///
/// Closed set: every failure of the pipeline maps to exactly one variant.
/// Field-level defects in the model reply are not errors; the normalizer
/// repairs them with defaults.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// Bad credentials. Fatal, no fallback was attempted.
    #[error(
        "model provider rejected the API key while calling '{model}'. \
         Verify OPENROUTER_API_KEY and that the model is accessible."
    )]
    AuthenticationRejected { model: String },

    /// Every model candidate failed.
    #[error("All model candidates failed. {}", join_failures(.failures))]
    AllCandidatesExhausted { failures: Vec<CandidateFailure> },

    /// The model replied with something that is not a JSON object.
    #[error("model returned invalid structured data: {reason}")]
    MalformedModelOutput { reason: String },

    /// Narration was produced but could not be voiced.
    #[error("speech generation failed: {0}")]
    SynthesisFailure(#[from] SpeechError),
}

impl From<ModelChainError> for ConversationError {
    fn from(err: ModelChainError) -> Self {
        match err {
            ModelChainError::AuthenticationRejected { model } => {
                ConversationError::AuthenticationRejected { model }
            }
            ModelChainError::AllCandidatesExhausted { failures } => {
                ConversationError::AllCandidatesExhausted { failures }
            }
        }
    }
}
