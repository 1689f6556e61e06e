// Public modules
pub mod chat_request;
pub mod contact_submission;
pub mod history_pair;
pub mod message;
pub mod project;

// Re-exports
pub use chat_request::{ChatReply, ChatRequest};
pub use contact_submission::ContactSubmission;
pub use history_pair::HistoryPair;
pub use message::{GREETING_ID, Message, MessageId, Sender};
pub use project::{Project, ProjectLinks};
