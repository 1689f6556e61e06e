use serde::{Deserialize, Serialize};

/// One question and the answer it received.
///
/// Serialized as a two-element array, `["question", "answer"]`, which is the
/// shape the chat gateway expects in `chat_history`.  An empty answer marks a
/// question that is still waiting for a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPair(pub String, pub String);

impl HistoryPair {
    /// Create a pair.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self(question.into(), answer.into())
    }

    /// Open a pair that has no answer yet.
    pub fn open(question: impl Into<String>) -> Self {
        Self::new(question, String::new())
    }

    /// The question text.
    pub fn question(&self) -> &str {
        &self.0
    }

    /// The answer text; empty while unanswered.
    pub fn answer(&self) -> &str {
        &self.1
    }

    /// True while the answer slot is empty.
    pub fn is_open(&self) -> bool {
        self.1.is_empty()
    }
}

impl<Q: Into<String>, A: Into<String>> From<(Q, A)> for HistoryPair {
    fn from((question, answer): (Q, A)) -> Self {
        Self::new(question, answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn serializes_as_array() {
        let pair = HistoryPair::new("What do you build?", "Robots.");
        assert_eq!(to_value(&pair).unwrap(), json!(["What do you build?", "Robots."]));
    }

    #[test]
    fn open_pair_has_empty_answer() {
        let pair = HistoryPair::open("Anyone there?");
        assert!(pair.is_open());
        assert_eq!(pair.question(), "Anyone there?");
        assert_eq!(pair.answer(), "");
    }
}
