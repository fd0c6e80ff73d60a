// Data structures (Conversation, Message, request/response bodies)

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Titles longer than this are truncated and suffixed with "..."
pub const TITLE_MAX_CHARS: usize = 50;

// Message Role Enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

// Message Struct
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Row id once persisted; `None` marks a message the store still has to insert
    #[serde(skip)]
    pub id: Option<i64>,
    pub role: Role,
    pub content: String,
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            role,
            content: content.into(),
            timestamp,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, now())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, now())
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

// Conversation Struct
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    #[serde(with = "timestamp_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp_format")]
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Start a conversation whose title comes from the first user message
    pub fn start(id: impl Into<String>, first_message: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: derive_title(first_message),
            messages: Vec::new(),
            created_at: at,
            updated_at: at,
        }
    }

    /// Append one user/assistant exchange and bump `updated_at`
    pub fn push_turn(&mut self, user: Message, assistant: Message, at: DateTime<Utc>) {
        self.messages.push(user);
        self.messages.push(assistant);
        self.updated_at = at;
    }

    /// Messages the store has not written yet
    pub fn pending_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| !m.is_persisted())
    }
}

// Request Types
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

// Response Types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
    pub disclaimer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub openai_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Current time at the precision the store keeps (microseconds)
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// First 50 characters of the message, with "..." only when something was cut
pub fn derive_title(message: &str) -> String {
    if message.chars().count() > TITLE_MAX_CHARS {
        let mut title: String = message.chars().take(TITLE_MAX_CHARS).collect();
        title.push_str("...");
        title
    } else {
        message.to_string()
    }
}

/// Conversation id derived from a timestamp at second resolution
pub fn generate_conversation_id(at: DateTime<Utc>) -> String {
    at.format("conv_%Y%m%d_%H%M%S").to_string()
}

/// Parse a boundary timestamp string into UTC
///
/// A trailing "Z" means UTC; strings with an explicit offset are converted;
/// strings without any offset are taken to already be UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let normalized = match raw.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => raw.to_string(),
    };

    match DateTime::parse_from_rfc3339(&normalized) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f"))
            .map(|naive| naive.and_utc())
            .map_err(|_| rfc_err),
    }
}

/// Serde adapter: RFC 3339 out, lenient `parse_timestamp` in
pub mod timestamp_format {
    use super::parse_timestamp;
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(de::Error::custom)
    }
}
