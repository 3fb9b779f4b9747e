//! OpenTelemetry GenAI semantic-convention attribute names.
//!
//! Model-call spans declare these fields inline (tracing needs literal field
//! names at the macro site) and record late values, such as token usage,
//! through the constants with `Span::record`.
//!
//! Span naming convention: `"{operation} {model}"` (e.g., `"chat mistralai/mistral-nemo:free"`)

/// The operation being performed (e.g., "chat").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The GenAI provider (e.g., "openrouter").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

/// The model id requested.
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";

/// The model that actually answered, as reported by the provider.
pub const GEN_AI_RESPONSE_MODEL: &str = "gen_ai.response.model";

/// The provider's response id.
pub const GEN_AI_RESPONSE_ID: &str = "gen_ai.response.id";

pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";

pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

/// Error class of a failed call (`rate_limited`, `network`, `provider`, ...).
pub const ERROR_TYPE: &str = "error.type";

// --- Operation name values ---

/// Chat completion.
pub const OP_CHAT: &str = "chat";

/// Text-to-speech synthesis.
pub const OP_SYNTHESIZE_SPEECH: &str = "synthesize_speech";

// --- Provider name values ---

pub const PROVIDER_OPENROUTER: &str = "openrouter";

pub const PROVIDER_EDGE_TTS: &str = "edge_tts";
