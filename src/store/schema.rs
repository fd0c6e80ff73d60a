//! Table bootstrap for the PostgreSQL store

use deadpool_postgres::Pool;
use tracing::info;

use crate::store::error::Result;

/// DDL for the conversation tables; every statement is idempotent
pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS conversations (
    id VARCHAR PRIMARY KEY,
    title VARCHAR NOT NULL,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    id BIGSERIAL PRIMARY KEY,
    conversation_id VARCHAR NOT NULL,
    role VARCHAR NOT NULL,
    content TEXT NOT NULL,
    timestamp TIMESTAMP NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation_id ON messages(conversation_id);
";

/// Create the conversation tables if they do not exist yet
pub async fn ensure_schema(pool: &Pool) -> Result<()> {
    let conn = pool.get().await?;
    conn.batch_execute(SCHEMA_SQL).await?;
    info!("Database tables ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_idempotent_ddl() {
        let creates = SCHEMA_SQL.matches("CREATE").count();
        let guarded = SCHEMA_SQL.matches("IF NOT EXISTS").count();
        assert_eq!(creates, 3);
        assert_eq!(creates, guarded);
        assert!(SCHEMA_SQL.contains("ON messages(conversation_id)"));
    }
}
