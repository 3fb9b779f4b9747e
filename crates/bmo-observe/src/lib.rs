//! Observability for the BMO backend: subscriber setup and the GenAI
//! attribute names recorded on model-call spans.

pub mod genai_attrs;
pub mod tracing_setup;
