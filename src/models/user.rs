use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: now,
        }
    }
}

/// Body of both POST /api/users and PUT /api/users/:id; only the name is
/// client-controlled.
#[derive(Debug, Deserialize, Validate)]
pub struct UserNameRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}
