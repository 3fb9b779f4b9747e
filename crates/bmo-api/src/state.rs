//! Application state wiring all services together.
//!
//! AppState is the composition root: settings, session store, provider,
//! model chain, speech engine and conversation service are built here once
//! and shared by the CLI and REST handlers.

use std::sync::Arc;

use secrecy::SecretString;

use bmo_core::conversation::{ConversationService, PromptAssembler};
use bmo_core::llm::box_provider::BoxLlmProvider;
use bmo_core::llm::fallback::ModelChain;
use bmo_core::session::SessionStore;
use bmo_infra::config::load_map_context;
use bmo_infra::llm::create_provider;
use bmo_infra::speech::EdgeTtsSynthesizer;
use bmo_types::config::Settings;

/// Conversation service pinned to the concrete speech engine.
pub type ConcreteConversationService = ConversationService<EdgeTtsSynthesizer>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub conversation: Arc<ConcreteConversationService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Build every service from `settings`.
    pub async fn init(settings: Settings, api_key: SecretString) -> anyhow::Result<Self> {
        let map_context = load_map_context(settings.map_context_path.as_deref()).await;
        let provider = create_provider(&settings, api_key)?;
        let speech = EdgeTtsSynthesizer::new(&settings.speech);

        Ok(Self::from_parts(settings, map_context, provider, speech))
    }

    /// Wire the services around an already-built provider and speech engine.
    pub fn from_parts(
        settings: Settings,
        map_context: String,
        provider: BoxLlmProvider,
        speech: EdgeTtsSynthesizer,
    ) -> Self {
        let chain = ModelChain::from_settings(provider, &settings.model);
        tracing::info!(
            provider = chain.provider_name(),
            candidates = ?chain.candidates(),
            max_attempts = chain.retry_policy().max_attempts,
            "Model chain ready"
        );

        let conversation = ConversationService::new(
            SessionStore::new(),
            PromptAssembler::with_map_context(map_context),
            chain,
            speech,
            settings.default_greeting.clone(),
        );

        Self {
            conversation: Arc::new(conversation),
            settings: Arc::new(settings),
        }
    }
}
