//! Shared domain types for the BMO conversation backend.
//!
//! Conversation turns and the canonical navigation/speech response, LLM
//! request/response shapes, configuration, and the closed error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
