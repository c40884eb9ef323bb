//! In-memory chat sessions, keyed by the id the widget generates

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::llm::Message;
use crate::models::{ChatMessage, MessageSource};

/// Sessions kept when no limit is configured
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// Transcript of one browser session
#[derive(Debug, Default, Clone)]
pub struct Session {
    messages: Vec<ChatMessage>,
    last_used: u64,
}

impl Session {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// History sent back to the model: only user turns answered by the model,
    /// each followed by that answer. Encyclopedia replies and unanswered
    /// turns stay on screen but are not replayed.
    pub fn replay_history(&self) -> Vec<Message> {
        let mut history = Vec::new();
        for pair in self.messages.windows(2) {
            if pair[0].source == MessageSource::User && pair[1].source == MessageSource::Model {
                history.extend(pair.iter().filter_map(ChatMessage::to_llm_message));
            }
        }
        history
    }
}

#[derive(Debug, Default)]
struct Sessions {
    by_id: HashMap<Uuid, Session>,
    /// Bumped on every append; orders sessions by recency
    clock: u64,
}

/// All live sessions, at most `capacity` of them. Starting a new session
/// when full evicts the one appended to least recently. Nothing survives a
/// restart.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<Sessions>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding at most `capacity` sessions (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(Sessions::default()),
            capacity: capacity.max(1),
        }
    }

    /// Transcript for `id`; empty for unknown sessions
    pub async fn transcript(&self, id: Uuid) -> Vec<ChatMessage> {
        self.sessions
            .read()
            .await
            .by_id
            .get(&id)
            .map(|s| s.messages().to_vec())
            .unwrap_or_default()
    }

    pub async fn replay_history(&self, id: Uuid) -> Vec<Message> {
        self.sessions
            .read()
            .await
            .by_id
            .get(&id)
            .map(Session::replay_history)
            .unwrap_or_default()
    }

    /// Append to `id`, creating the session on first use
    pub async fn append(&self, id: Uuid, message: ChatMessage) {
        let mut sessions = self.sessions.write().await;
        sessions.clock += 1;
        let now = sessions.clock;

        if !sessions.by_id.contains_key(&id) && sessions.by_id.len() >= self.capacity {
            let oldest = sessions
                .by_id
                .iter()
                .min_by_key(|(_, session)| session.last_used)
                .map(|(oldest, _)| *oldest);
            if let Some(oldest) = oldest {
                sessions.by_id.remove(&oldest);
                debug!(%oldest, capacity = self.capacity, "evicted least recently used session");
            }
        }

        let session = sessions.by_id.entry(id).or_default();
        session.last_used = now;
        session.push(message);
    }

    /// Forget `id`. Returns whether it existed.
    pub async fn clear(&self, id: Uuid) -> bool {
        self.sessions.write().await.by_id.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.by_id.len()
    }
}
