//! Conversation pipeline for the BMO backend.
//!
//! Defines the provider "ports" (`LlmProvider`, `SpeechSynthesizer`) that the
//! infrastructure layer implements, and everything that runs between a
//! transcript arriving and a reply leaving: the session store, prompt
//! assembly, the model fallback chain and reply normalization. It depends
//! only on `bmo-types` -- never on `bmo-infra` or any HTTP crate.

pub mod conversation;
pub mod llm;
pub mod session;
pub mod speech;
