//! LLM provider abstraction and the model fallback chain.

pub mod box_provider;
pub mod fallback;
pub mod provider;

#[cfg(test)]
pub(crate) mod testing;
