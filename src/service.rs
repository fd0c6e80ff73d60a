//! Chat orchestration
//!
//! One chat turn is: pick a responder, generate (falling back to canned text
//! on failure), then load-or-create the conversation and persist it. The
//! model call always finishes before the store is touched, so no database
//! transaction is held open during inference.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm::ModelSelector;
use crate::models::{
    generate_conversation_id, now, ChatRequest, ChatResponse, Conversation, HealthResponse,
    Message, Role,
};
use crate::store::{ConversationStore, StoreError};

/// Errors surfaced to the HTTP layer
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Persistence failed; the reply is discarded and the request fails
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The request body was unusable
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Ties the model selector and the conversation store together
#[derive(Clone)]
pub struct ChatService {
    selector: ModelSelector,
    store: Arc<dyn ConversationStore>,
}

impl ChatService {
    pub fn new(selector: ModelSelector, store: Arc<dyn ConversationStore>) -> Self {
        Self { selector, store }
    }

    /// Handle one chat turn
    ///
    /// If persistence fails the whole request fails; a reply that was not
    /// saved is never returned.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ServiceError> {
        if request.message.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("message must not be empty".to_string()));
        }

        let responder = self.selector.select();
        let reply = match responder.generate(&request.message, None).await {
            Ok(text) => text,
            Err(e) => {
                warn!(responder = responder.name(), "Generation failed, using fallback: {}", e);
                responder.fallback(&request.message)
            }
        };

        let turn_started = now();
        let conversation_id = request
            .conversation_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| generate_conversation_id(turn_started));

        let user_message = Message::new(Role::User, request.message.as_str(), turn_started);
        let assistant_message = Message::assistant(reply.as_str());
        let updated_at = assistant_message.timestamp;

        let conversation = match self.store.get(&conversation_id).await? {
            Some(mut existing) => {
                existing.push_turn(user_message, assistant_message, updated_at);
                existing
            }
            None => {
                info!(conversation_id = %conversation_id, "Starting new conversation");
                let mut created = Conversation::start(conversation_id.as_str(), &request.message, turn_started);
                created.push_turn(user_message, assistant_message, updated_at);
                created
            }
        };

        self.store.save(&conversation).await?;

        Ok(ChatResponse {
            response: reply,
            conversation_id,
            disclaimer: String::new(),
        })
    }

    /// Every conversation, most recently updated first
    pub async fn list_conversations(&self) -> Result<Vec<Conversation>, ServiceError> {
        Ok(self.store.list_all().await?)
    }

    /// A single conversation, or `None` if the id is unknown
    pub async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, ServiceError> {
        Ok(self.store.get(id).await?)
    }

    /// Delete a conversation; unknown ids are not an error
    pub async fn delete_conversation(&self, id: &str) -> Result<(), ServiceError> {
        let removed = self.store.delete(id).await?;
        info!(conversation_id = %id, removed, "Deleted conversation");
        Ok(())
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy".to_string(),
            openai_enabled: self.selector.hosted_enabled(),
        }
    }
}
