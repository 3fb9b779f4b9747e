//! Infrastructure for the BMO backend.
//!
//! Concrete implementations of the ports defined in `bmo-core`: the
//! OpenRouter chat-completion provider, the edge-tts speech synthesizer,
//! and the loaders for `config.toml` and the campus map file.

pub mod config;
pub mod llm;
pub mod speech;
