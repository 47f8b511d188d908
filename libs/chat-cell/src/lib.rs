pub mod conversation;
pub mod handlers;
pub mod models;
pub mod replies;
pub mod router;
pub mod services;
pub mod times;

pub use conversation::{Conversation, ConversationStore, Stage};
pub use models::*;
pub use router::ChatState;
pub use services::chat::ChatService;
pub use services::triage::{OpenAiTriage, Triage, TriageReply};
