use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: Role, content: String) -> Self {
        Self {
            role,
            content,
            created_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Per-session chat transcript. It is only ever displayed; prompts never see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    id: Uuid,
    turns: Vec<ConversationTurn>,
    created_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Appends a completed question/answer pair. Failed turns are never
    /// recorded, so the transcript only holds answered questions.
    pub fn record_exchange(&mut self, question: String, answer: String) {
        self.turns.push(ConversationTurn::new(Role::User, question));
        self.turns.push(ConversationTurn::new(Role::Assistant, answer));
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = ChatSession::new();
        assert!(session.is_empty());
        assert_ne!(session.id(), ChatSession::new().id());
    }

    #[test]
    fn test_record_exchange_keeps_order() {
        let mut session = ChatSession::new();
        session.record_exchange("What is ATP?".to_string(), "An energy carrier.".to_string());
        session.record_exchange("Where is it made?".to_string(), "Mitochondria.".to_string());

        let roles: Vec<Role> = session.turns().iter().map(|t| t.role()).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(session.turns()[3].content(), "Mitochondria.");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }
}
