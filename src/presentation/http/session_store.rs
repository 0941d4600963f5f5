use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::ChatSession;

const DEFAULT_MAX_SESSIONS: usize = 1000;

/// Chat transcripts keyed by session id. Lives for the lifetime of the server
/// process; nothing is persisted. Once `max_sessions` is reached, creating a
/// session evicts the one used least recently.
pub struct SessionStore {
    sessions: RwLock<Sessions>,
    max_sessions: usize,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<Uuid, Entry>,
    clock: u64,
}

struct Entry {
    session: ChatSession,
    last_used: u64,
}

impl Sessions {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(id, _)| *id);

        if let Some(id) = oldest {
            self.entries.remove(&id);
            tracing::info!("Evicted chat session {}", id);
        }
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }

    pub fn with_capacity(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(Sessions::default()),
            max_sessions: max_sessions.max(1),
        }
    }

    pub async fn create(&self) -> ChatSession {
        let session = ChatSession::new();
        let mut sessions = self.sessions.write().await;

        while sessions.entries.len() >= self.max_sessions {
            sessions.evict_least_recent();
        }

        let last_used = sessions.tick();
        sessions.entries.insert(
            session.id(),
            Entry {
                session: session.clone(),
                last_used,
            },
        );
        tracing::debug!(
            "Created chat session {} ({} active)",
            session.id(),
            sessions.entries.len()
        );
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<ChatSession> {
        self.sessions
            .read()
            .await
            .entries
            .get(&id)
            .map(|entry| entry.session.clone())
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.sessions.read().await.entries.contains_key(&id)
    }

    /// Appends a question/answer pair and returns the updated session, or
    /// `None` when the session does not exist.
    pub async fn record_exchange(
        &self,
        id: Uuid,
        question: String,
        answer: String,
    ) -> Option<ChatSession> {
        let mut sessions = self.sessions.write().await;
        let now = sessions.tick();
        let entry = sessions.entries.get_mut(&id)?;
        entry.session.record_exchange(question, answer);
        entry.last_used = now;
        Some(entry.session.clone())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
