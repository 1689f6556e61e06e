//! Session identity.
//!
//! A [`Session`] is created the first time the chat widget is opened and lives
//! for as long as that widget does.  Its id is sent with every gateway request
//! so the remote side can tell conversations apart.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::conversation::ConversationStore;
use crate::types::Message;

/// Greeting shown as the first bot message of every session.
pub const DEFAULT_GREETING: &str = "Hello! How can I help you today?";

/// Opaque, randomly generated session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new 128-bit random session id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One chat activation: an id plus the conversation it owns.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    conversation: ConversationStore,
}

impl Session {
    /// Start a new session whose conversation holds only the greeting.
    pub fn activate(greeting: impl Into<String>) -> Self {
        let id = SessionId::generate();
        let conversation = ConversationStore::with_greeting(Message::greeting(greeting));
        tracing::debug!(session_id = %id, "activated chat session");
        Self { id, conversation }
    }

    /// The session id.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The conversation owned by this session.
    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    /// Mutable access to the conversation owned by this session.
    pub fn conversation_mut(&mut self) -> &mut ConversationStore {
        &mut self.conversation
    }
}
