use axum::{extract::State, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::models::message::{InsertedCount, Message, NewMessage};
use crate::AppState;

/// Inserts the whole batch or nothing. A client-supplied id that already
/// exists fails the batch with 409.
pub async fn save_messages(
    State(state): State<AppState>,
    AppJson(body): AppJson<Vec<NewMessage>>,
) -> AppResult<Json<InsertedCount>> {
    if body.is_empty() {
        return Err(AppError::Validation("No messages provided".into()));
    }

    let now = Utc::now();
    let messages: Vec<Message> = body.into_iter().map(|m| m.into_message(now)).collect();
    let inserted_count = state.store.insert_messages(&messages).await?;

    tracing::debug!(inserted_count, "Messages saved");
    Ok(Json(InsertedCount { inserted_count }))
}

pub async fn list_messages(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<Message>>> {
    let messages = state.store.find_messages(user_id).await?;
    Ok(Json(messages))
}
