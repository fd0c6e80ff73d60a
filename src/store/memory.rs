//! In-process conversation store
//!
//! Same contract as the PostgreSQL store, kept behind a single async lock.
//! Selected with a `memory://` database URL; nothing survives a restart.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::Conversation;
use crate::store::{error::Result, ConversationStore};

#[derive(Default)]
struct Inner {
    conversations: HashMap<String, Conversation>,
    next_message_id: i64,
}

#[derive(Default)]
pub struct MemoryConversationStore {
    inner: RwLock<Inner>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted(mut conversation: Conversation) -> Conversation {
    conversation
        .messages
        .sort_by_key(|m| (m.timestamp, m.id.unwrap_or(i64::MAX)));
    conversation
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn save(&self, conversation: &Conversation) -> Result<()> {
        let mut inner = self.inner.write().await;

        let mut pending = Vec::new();
        for message in conversation.pending_messages() {
            inner.next_message_id += 1;
            let mut stored = message.clone();
            stored.id = Some(inner.next_message_id);
            pending.push(stored);
        }

        let entry = inner
            .conversations
            .entry(conversation.id.clone())
            .or_insert_with(|| Conversation {
                messages: Vec::new(),
                ..conversation.clone()
            });
        entry.title = conversation.title.clone();
        entry.created_at = conversation.created_at;
        entry.updated_at = conversation.updated_at;
        entry.messages.extend(pending);

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>> {
        let inner = self.inner.read().await;
        Ok(inner.conversations.get(id).cloned().map(sorted))
    }

    async fn list_all(&self) -> Result<Vec<Conversation>> {
        let inner = self.inner.read().await;
        let mut conversations: Vec<Conversation> =
            inner.conversations.values().cloned().map(sorted).collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(conversations)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.conversations.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{now, Message, Role};
    use chrono::Duration;

    fn conversation(id: &str, at: chrono::DateTime<chrono::Utc>) -> Conversation {
        let mut conversation = Conversation::start(id, "Hello there", at);
        conversation.push_turn(
            Message::new(Role::User, "Hello there", at),
            Message::new(Role::Assistant, "Hi! How can I help today?", at),
            at,
        );
        conversation
    }

    #[tokio::test]
    async fn test_round_trip_preserves_messages() {
        let store = MemoryConversationStore::new();
        let original = conversation("conv_a", now());
        store.save(&original).await.unwrap();

        let loaded = store.get("conv_a").await.unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 2);
        assert_eq!(loaded.messages[0].role, Role::User);
        assert_eq!(loaded.messages[1].role, Role::Assistant);
        assert_eq!(loaded.messages[1].content, "Hi! How can I help today?");
        assert!(loaded.messages.iter().all(|m| m.is_persisted()));
    }

    #[tokio::test]
    async fn test_resave_does_not_duplicate() {
        let store = MemoryConversationStore::new();
        let at = now();
        store.save(&conversation("conv_a", at)).await.unwrap();

        let mut loaded = store.get("conv_a").await.unwrap().unwrap();
        let later = at + Duration::seconds(2);
        loaded.push_turn(
            Message::new(Role::User, "Follow up", later),
            Message::new(Role::Assistant, "Here is more detail.", later),
            later,
        );
        store.save(&loaded).await.unwrap();

        let reloaded = store.get("conv_a").await.unwrap().unwrap();
        assert_eq!(reloaded.messages.len(), 4);
        assert_eq!(reloaded.updated_at, later);
        assert_eq!(reloaded.created_at, at);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = MemoryConversationStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_updated_desc() {
        let store = MemoryConversationStore::new();
        let t1 = now();
        let t2 = t1 + Duration::seconds(1);
        let t3 = t1 + Duration::seconds(2);
        store.save(&conversation("second", t2)).await.unwrap();
        store.save(&conversation("third", t3)).await.unwrap();
        store.save(&conversation("first", t1)).await.unwrap();

        let ids: Vec<String> = store.list_all().await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryConversationStore::new();
        store.save(&conversation("conv_a", now())).await.unwrap();

        assert!(store.delete("conv_a").await.unwrap());
        assert!(!store.delete("conv_a").await.unwrap());
        assert!(!store.delete("never-existed").await.unwrap());
        assert!(store.get("conv_a").await.unwrap().is_none());
    }
}
