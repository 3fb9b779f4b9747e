//! Speech synthesis through the `edge-tts` command-line tool.
//!
//! The narration is piped to the tool on stdin (`--file -`) and MP3 audio is
//! read back from stdout. Any executable with the same interface works, which
//! is how the tests substitute a shell script.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::Instrument;

use bmo_core::speech::SpeechSynthesizer;
use bmo_observe::genai_attrs::{OP_SYNTHESIZE_SPEECH, PROVIDER_EDGE_TTS};
use bmo_types::config::SpeechSettings;
use bmo_types::error::SpeechError;

/// Maximum narration size (64 KiB). Longer input is rejected before spawning.
const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

const MIME_TYPE: &str = "audio/mpeg";

/// Speech synthesizer backed by an `edge-tts` compatible executable.
#[derive(Debug, Clone)]
pub struct EdgeTtsSynthesizer {
    binary: PathBuf,
    voice: String,
    rate: String,
    volume: String,
    timeout: Duration,
}

impl EdgeTtsSynthesizer {
    pub fn new(settings: &SpeechSettings) -> Self {
        Self {
            binary: settings.binary.clone(),
            voice: settings.voice.clone(),
            rate: settings.rate.clone(),
            volume: settings.volume.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Command-line arguments. Rate and volume use the `--flag=value` form
    /// because values such as `-10%` would otherwise parse as flags.
    fn args(&self) -> Vec<String> {
        vec![
            "--voice".to_string(),
            self.voice.clone(),
            format!("--rate={}", self.rate),
            format!("--volume={}", self.volume),
            "--file".to_string(),
            "-".to_string(),
        ]
    }

    async fn run(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(SpeechError::InputTooLarge {
                len: text.len(),
                limit: MAX_TTS_INPUT_BYTES,
            });
        }

        let mut child = Command::new(&self.binary)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SpeechError::Unavailable(format!(
                    "failed to spawn {}: {e}",
                    self.binary.display()
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SpeechError::Engine("failed to open stdin".to_string()))?;

        // Stdin is fed concurrently with reading stdout so a full pipe cannot
        // deadlock. Both halves live in one future: on timeout it is dropped
        // whole, which closes stdin and kills the child.
        let write = async move {
            stdin.write_all(text.as_bytes()).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::time::timeout(self.timeout, async move {
            tokio::join!(write, child.wait_with_output())
        })
        .await
        .map_err(|_| SpeechError::Timeout(self.timeout.as_secs()))?;

        let output = output
            .map_err(|e| SpeechError::Engine(format!("failed to wait for speech engine: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Engine(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        if let Err(e) = written {
            return Err(SpeechError::Engine(format!("failed to write narration: {e}")));
        }

        if output.stdout.is_empty() {
            return Err(SpeechError::NoAudio);
        }

        Ok(output.stdout)
    }
}

impl SpeechSynthesizer for EdgeTtsSynthesizer {
    fn mime_type(&self) -> &str {
        MIME_TYPE
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let span = tracing::info_span!(
            "synthesize_speech",
            gen_ai.operation.name = OP_SYNTHESIZE_SPEECH,
            gen_ai.provider.name = PROVIDER_EDGE_TTS,
            voice = %self.voice,
            chars = text.chars().count(),
        );

        let result = self.run(text).instrument(span).await;
        match &result {
            Ok(audio) => tracing::debug!(bytes = audio.len(), "Speech synthesized"),
            Err(e) => tracing::warn!(error = %e, voice = %self.voice, "Speech synthesis failed"),
        }
        result
    }
}
