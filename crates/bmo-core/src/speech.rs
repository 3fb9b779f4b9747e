//! SpeechSynthesizer trait definition.

use bmo_types::error::SpeechError;

/// Text-to-speech engine consumed as an opaque "text → audio bytes" capability.
///
/// Implementations live in bmo-infra (e.g., `EdgeTtsSynthesizer`). An engine
/// that finishes without producing audio must return [`SpeechError::NoAudio`]
/// rather than an empty buffer.
pub trait SpeechSynthesizer: Send + Sync {
    /// MIME type of the audio produced, e.g. `audio/mpeg`.
    fn mime_type(&self) -> &str;

    /// Synthesize `text` into encoded audio.
    fn synthesize(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, SpeechError>> + Send;
}
