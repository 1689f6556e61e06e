// Public modules
pub mod catalog;
pub mod chat;
pub mod client;
pub mod contact;
pub mod conversation;
pub mod error;
pub mod history;
pub mod observability;
pub mod render;
pub mod session;
pub mod types;

// Re-exports
pub use catalog::ProjectCatalog;
pub use client::{ChatBackend, Gateway};
pub use contact::ContactRelay;
pub use conversation::ConversationStore;
pub use error::{Error, Result};
pub use history::pair_history;
pub use observability::register_biometrics;
pub use session::{Session, SessionId};
pub use types::*;
