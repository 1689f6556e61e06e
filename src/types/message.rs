use std::fmt;

use serde::{Deserialize, Serialize};

/// Id reserved for the greeting the bot shows when a session starts.
pub const GREETING_ID: &str = "initial-greeting";

/// Who authored a message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the person using the widget.
    User,

    /// Produced by the chat gateway (or the fallback on failure).
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

/// Opaque message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Generate a fresh, random message id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The id of the session greeting.
    pub fn greeting() -> Self {
        Self(GREETING_ID.to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl PartialEq<str> for MessageId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A single entry in a conversation.
///
/// Messages are immutable once built; the fields are only reachable through
/// accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    text: String,
    sender: Sender,
}

impl Message {
    /// Create a message with an explicit id.
    pub fn new(id: MessageId, text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id,
            text: text.into(),
            sender,
        }
    }

    /// Create a user message with a fresh id.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageId::generate(), text, Sender::User)
    }

    /// Create a bot message with a fresh id.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(MessageId::generate(), text, Sender::Bot)
    }

    /// Create the session greeting.
    pub fn greeting(text: impl Into<String>) -> Self {
        Self::new(MessageId::greeting(), text, Sender::Bot)
    }

    /// The message id.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// The message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Who sent the message.
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// True for the session greeting.
    pub fn is_greeting(&self) -> bool {
        self.id == *GREETING_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn message_serialization() {
        let message = Message::new(MessageId::from("m-1"), "Hi there", Sender::User);
        assert_eq!(
            to_value(&message).unwrap(),
            json!({
                "id": "m-1",
                "text": "Hi there",
                "sender": "user"
            })
        );
    }

    #[test]
    fn generated_ids_differ() {
        let a = Message::user("one");
        let b = Message::user("one");
        assert_ne!(a.id(), b.id());
        assert!(!a.is_greeting());
    }

    #[test]
    fn greeting_uses_reserved_id() {
        let greeting = Message::greeting("Hello!");
        assert_eq!(greeting.id().as_str(), GREETING_ID);
        assert_eq!(greeting.sender(), Sender::Bot);
        assert!(greeting.is_greeting());
    }
}
