//! Speech synthesizer implementations.

pub mod edge_tts;

pub use edge_tts::EdgeTtsSynthesizer;
