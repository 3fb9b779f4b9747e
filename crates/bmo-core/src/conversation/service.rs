//! Conversation service: the two public operations of the pipeline.
//!
//! `ConversationService` wires the session store, prompt assembler, model
//! chain, normalizer and speech engine together. Transcript ordering per
//! session is: user turn appended before the model is called, assistant turn
//! appended only after a reply normalized successfully.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, warn};
use uuid::Uuid;

use bmo_types::conversation::{ConversationReply, SessionStart, SpeechPayload, TurnRole};
use bmo_types::error::{ConversationError, SpeechError};

use crate::conversation::normalizer::{RawModelReply, ResponseNormalizer};
use crate::conversation::prompt::PromptAssembler;
use crate::llm::fallback::ModelChain;
use crate::session::SessionStore;
use crate::speech::SpeechSynthesizer;

/// Runs conversation turns for the voice client.
///
/// Generic over `SpeechSynthesizer` so bmo-core never depends on bmo-infra.
/// The model provider is already type-erased inside [`ModelChain`].
pub struct ConversationService<S: SpeechSynthesizer> {
    sessions: SessionStore,
    prompt: PromptAssembler,
    chain: ModelChain,
    normalizer: ResponseNormalizer,
    speech: S,
    greeting: String,
}

impl<S: SpeechSynthesizer> ConversationService<S> {
    pub fn new(
        sessions: SessionStore,
        prompt: PromptAssembler,
        chain: ModelChain,
        speech: S,
        greeting: impl Into<String>,
    ) -> Self {
        let greeting = greeting.into();
        Self {
            sessions,
            prompt,
            chain,
            normalizer: ResponseNormalizer::new(greeting.clone()),
            speech,
            greeting,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn chain(&self) -> &ModelChain {
        &self.chain
    }

    /// Open a new session seeded with the greeting as its first assistant turn.
    pub fn start_session(&self) -> SessionStart {
        let session_id = Uuid::now_v7().to_string();
        self.sessions.create(&session_id);
        self.sessions
            .append(&session_id, TurnRole::Assistant, self.greeting.as_str());

        info!(session_id = %session_id, "Session started");

        SessionStart {
            session_id,
            message: self.greeting.clone(),
        }
    }

    /// Produce BMO's reply to one transcript turn, voiced.
    ///
    /// Unknown session ids are accepted; the session is created implicitly.
    /// On a model or parse failure the user turn stays in history and no
    /// assistant turn is added. A speech failure happens after the assistant
    /// turn is recorded and does not roll it back.
    pub async fn generate_response(
        &self,
        session_id: &str,
        transcript: &str,
    ) -> Result<ConversationReply, ConversationError> {
        self.sessions.append(session_id, TurnRole::User, transcript);
        let history = self.sessions.history(session_id);
        let messages = self.prompt.assemble(&history);

        let reply = self.chain.complete(&messages).await?;

        let raw = RawModelReply::parse(&reply.content).inspect_err(|e| {
            warn!(session_id, model = %reply.model, error = %e, "Model reply rejected");
        })?;
        let response = self.normalizer.normalize(&raw);

        self.sessions
            .append(session_id, TurnRole::Assistant, response.narration.as_str());

        info!(
            session_id,
            model = %reply.model,
            mode = %response.mode,
            emotion = %response.emotion,
            turns = history.len() + 1,
            "Turn completed"
        );

        let audio = self.speech.synthesize(&response.narration).await?;
        if audio.is_empty() {
            return Err(SpeechError::NoAudio.into());
        }

        Ok(ConversationReply {
            session_id: session_id.to_string(),
            transcript: transcript.to_string(),
            response,
            speech: SpeechPayload {
                mime_type: self.speech.mime_type().to_string(),
                base64: STANDARD.encode(&audio),
            },
        })
    }
}
