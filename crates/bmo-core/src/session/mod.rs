//! In-memory conversation sessions.

pub mod store;

pub use store::SessionStore;
