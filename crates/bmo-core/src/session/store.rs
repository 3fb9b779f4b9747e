//! Session transcripts keyed by session id.
//!
//! `SessionStore` is a concurrent map backed by `DashMap`. Every operation
//! takes one shard lock for the duration of an in-memory update, so writes
//! are never observed half-applied and distinct sessions rarely contend.
//! History is cloned on read: callers get a snapshot and never hold a
//! `DashMap` guard across `.await`.

use std::sync::Arc;

use dashmap::DashMap;

use bmo_types::conversation::{Turn, TurnRole};

/// Concurrent session-id → transcript map.
///
/// Cloning produces a shared handle to the same sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Vec<Turn>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize an empty transcript for `id`. No-op if it already exists.
    pub fn create(&self, id: &str) {
        self.sessions.entry(id.to_string()).or_default();
    }

    /// Append a turn, creating the session if needed.
    pub fn append(&self, id: &str, role: TurnRole, content: impl Into<String>) {
        let turn = Turn {
            role,
            content: content.into(),
        };
        self.sessions.entry(id.to_string()).or_default().push(turn);
    }

    /// Snapshot of the transcript for `id`; empty when the session is unknown.
    pub fn history(&self, id: &str) -> Vec<Turn> {
        self.sessions
            .get(id)
            .map(|turns| turns.value().clone())
            .unwrap_or_default()
    }

    /// Remove a session. Returns whether it existed.
    pub fn clear(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
