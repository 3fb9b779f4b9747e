//! The conversation pipeline: prompt assembly, reply normalization and the
//! service that runs one turn end to end.

pub mod normalizer;
pub mod prompt;
pub mod service;

pub use normalizer::{RawModelReply, ResponseNormalizer};
pub use prompt::PromptAssembler;
pub use service::ConversationService;
