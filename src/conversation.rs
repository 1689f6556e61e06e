//! The append-only message log of one chat session.

use crate::error::{Error, Result};
use crate::types::Message;

/// Ordered, append-only log of the messages exchanged in a session.
///
/// Insertion order is chronological order is display order.  There is no way
/// to remove a message once it has been appended.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose first entry is `greeting`.
    pub fn with_greeting(greeting: Message) -> Self {
        Self {
            messages: vec![greeting],
        }
    }

    /// Append a message at the end of the log.
    ///
    /// Text may only be empty for the session greeting.
    pub fn append(&mut self, message: Message) -> Result<()> {
        if message.text().trim().is_empty() && !message.is_greeting() {
            return Err(Error::validation(
                "message text must not be empty",
                Some("text".to_string()),
            ));
        }
        self.messages.push(message);
        Ok(())
    }

    /// The full log, oldest first.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Iterate the log, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages in the log.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GREETING_ID, Sender};

    #[test]
    fn append_preserves_order() {
        let mut store = ConversationStore::new();
        store.append(Message::user("A")).unwrap();
        store.append(Message::bot("B")).unwrap();
        store.append(Message::user("C")).unwrap();
        let texts: Vec<&str> = store.iter().map(Message::text).collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
        assert_eq!(store.last().map(Message::sender), Some(Sender::User));
    }

    #[test]
    fn rejects_empty_text() {
        let mut store = ConversationStore::new();
        assert!(store.append(Message::user("")).unwrap_err().is_validation());
        assert!(store.append(Message::bot("  \n")).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn empty_greeting_is_allowed() {
        let mut store = ConversationStore::new();
        store.append(Message::greeting("")).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].id().as_str(), GREETING_ID);
    }
}
