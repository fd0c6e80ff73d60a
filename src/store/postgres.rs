//! PostgreSQL-backed conversation store

use async_trait::async_trait;
use chrono::NaiveDateTime;
use deadpool_postgres::Pool;
use std::collections::HashMap;
use tokio_postgres::Row;
use tracing::debug;

use crate::models::{Conversation, Message, Role};
use crate::store::{
    connection::StoreConfig,
    error::{Result, StoreError},
    schema::ensure_schema,
    ConversationStore,
};

const UPSERT_CONVERSATION: &str = "
    INSERT INTO conversations (id, title, created_at, updated_at)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (id) DO UPDATE
    SET title = EXCLUDED.title,
        created_at = EXCLUDED.created_at,
        updated_at = EXCLUDED.updated_at";

const INSERT_MESSAGE: &str = "
    INSERT INTO messages (conversation_id, role, content, timestamp)
    VALUES ($1, $2, $3, $4)";

const SELECT_CONVERSATION: &str =
    "SELECT id, title, created_at, updated_at FROM conversations WHERE id = $1";

const SELECT_ALL_CONVERSATIONS: &str =
    "SELECT id, title, created_at, updated_at FROM conversations ORDER BY updated_at DESC, id";

const SELECT_MESSAGES: &str = "
    SELECT id, conversation_id, role, content, timestamp
    FROM messages
    WHERE conversation_id = $1
    ORDER BY timestamp ASC, id ASC";

const SELECT_MESSAGES_FOR_MANY: &str = "
    SELECT id, conversation_id, role, content, timestamp
    FROM messages
    WHERE conversation_id = ANY($1)
    ORDER BY conversation_id, timestamp ASC, id ASC";

/// Conversation store on top of a deadpool connection pool
///
/// Timestamps are stored in `TIMESTAMP` columns holding UTC wall-clock time.
#[derive(Clone)]
pub struct PgConversationStore {
    pool: Pool,
}

impl PgConversationStore {
    /// Connect, verify the connection, and make sure the tables exist
    pub async fn connect(config: StoreConfig) -> Result<Self> {
        let pool = config.build_pool()?;

        // Test the connection
        let _conn = pool.get().await?;

        ensure_schema(&pool).await?;
        Ok(Self { pool })
    }
}

fn conversation_from_row(row: &Row) -> Result<Conversation> {
    let created_at: NaiveDateTime = row.try_get("created_at")?;
    let updated_at: NaiveDateTime = row.try_get("updated_at")?;
    Ok(Conversation {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        messages: Vec::new(),
        created_at: created_at.and_utc(),
        updated_at: updated_at.and_utc(),
    })
}

fn message_from_row(row: &Row) -> Result<Message> {
    let raw_role: String = row.try_get("role")?;
    let role = Role::parse(&raw_role)
        .ok_or_else(|| StoreError::CorruptRow(format!("unknown role '{}'", raw_role)))?;
    let timestamp: NaiveDateTime = row.try_get("timestamp")?;

    Ok(Message {
        id: Some(row.try_get("id")?),
        role,
        content: row.try_get("content")?,
        timestamp: timestamp.and_utc(),
    })
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn save(&self, conversation: &Conversation) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let txn = conn.transaction().await?;

        txn.execute(
            UPSERT_CONVERSATION,
            &[
                &conversation.id,
                &conversation.title,
                &conversation.created_at.naive_utc(),
                &conversation.updated_at.naive_utc(),
            ],
        )
        .await?;

        let insert = txn.prepare_cached(INSERT_MESSAGE).await?;
        let mut inserted = 0;
        for message in conversation.pending_messages() {
            txn.execute(
                &insert,
                &[
                    &conversation.id,
                    &message.role.as_str(),
                    &message.content,
                    &message.timestamp.naive_utc(),
                ],
            )
            .await?;
            inserted += 1;
        }

        // Dropping the transaction before this point rolls everything back
        txn.commit().await?;
        debug!(conversation_id = %conversation.id, inserted, "Saved conversation");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>> {
        let conn = self.pool.get().await?;

        let Some(row) = conn.query_opt(SELECT_CONVERSATION, &[&id]).await? else {
            return Ok(None);
        };
        let mut conversation = conversation_from_row(&row)?;

        let rows = conn.query(SELECT_MESSAGES, &[&id]).await?;
        conversation.messages = rows.iter().map(message_from_row).collect::<Result<_>>()?;

        Ok(Some(conversation))
    }

    async fn list_all(&self) -> Result<Vec<Conversation>> {
        let conn = self.pool.get().await?;

        let rows = conn.query(SELECT_ALL_CONVERSATIONS, &[]).await?;
        let mut conversations = rows
            .iter()
            .map(conversation_from_row)
            .collect::<Result<Vec<_>>>()?;
        if conversations.is_empty() {
            return Ok(conversations);
        }

        // One query for every conversation's messages instead of one per id
        let ids: Vec<String> = conversations.iter().map(|c| c.id.clone()).collect();
        let message_rows = conn.query(SELECT_MESSAGES_FOR_MANY, &[&ids]).await?;

        let mut by_conversation: HashMap<String, Vec<Message>> = HashMap::new();
        for row in &message_rows {
            let conversation_id: String = row.try_get("conversation_id")?;
            by_conversation
                .entry(conversation_id)
                .or_default()
                .push(message_from_row(row)?);
        }

        for conversation in &mut conversations {
            conversation.messages = by_conversation.remove(&conversation.id).unwrap_or_default();
        }

        Ok(conversations)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        let txn = conn.transaction().await?;

        txn.execute("DELETE FROM messages WHERE conversation_id = $1", &[&id])
            .await?;
        let removed = txn
            .execute("DELETE FROM conversations WHERE id = $1", &[&id])
            .await?;

        txn.commit().await?;
        Ok(removed > 0)
    }
}
