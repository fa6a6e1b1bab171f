use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub is_from_user: bool,
    pub timestamp: DateTime<Utc>,
}

/// One element of a POST /api/messages batch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    #[serde(default, deserialize_with = "blank_id_as_none")]
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub is_from_user: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewMessage {
    pub fn into_message(self, now: DateTime<Utc>) -> Message {
        Message {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            user_id: self.user_id,
            content: self.content,
            is_from_user: self.is_from_user,
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertedCount {
    pub inserted_count: u64,
}

// Clients send "", null, or the nil uuid for messages they never persisted.
fn blank_id_as_none<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Uuid::parse_str(s)
            .map(|id| Some(id).filter(|id| !id.is_nil()))
            .map_err(serde::de::Error::custom),
    }
}
