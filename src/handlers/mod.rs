// Handlers module

pub mod chat;
pub mod conversations;
pub mod health;
pub mod rejection;

pub use chat::chat_handler;
pub use conversations::{
    delete_conversation_handler, get_conversation_handler, list_conversations_handler,
};
pub use health::health_handler;
pub use rejection::{handle_rejection, ApiError};
