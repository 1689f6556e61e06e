use serde::{Deserialize, Serialize};

use crate::types::HistoryPair;

/// Body of a request to the chat gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The session the question belongs to.
    pub session_id: String,

    /// The question being asked now.
    pub question: String,

    /// Earlier exchanges, oldest first.
    pub chat_history: Vec<HistoryPair>,
}

impl ChatRequest {
    /// Create a new request.
    pub fn new(
        session_id: impl Into<String>,
        question: impl Into<String>,
        chat_history: Vec<HistoryPair>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            question: question.into(),
            chat_history,
        }
    }
}

/// Body of a successful reply from the chat gateway.
///
/// The answer may carry light markup (bold, lists, headings); it is kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// The answer text.
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn request_wire_shape() {
        let request = ChatRequest::new(
            "abc",
            "And then?",
            vec![HistoryPair::new("A", "B"), HistoryPair::open("And then?")],
        );
        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "session_id": "abc",
                "question": "And then?",
                "chat_history": [["A", "B"], ["And then?", ""]]
            })
        );
    }

    #[test]
    fn reply_ignores_unknown_fields() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"answer": "**Hi**", "sources": []}"#).unwrap();
        assert_eq!(reply.answer, "**Hi**");
    }

    #[test]
    fn reply_requires_answer() {
        assert!(serde_json::from_str::<ChatReply>(r#"{"reply": "x"}"#).is_err());
    }
}
