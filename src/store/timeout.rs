use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::content::{
    Affirmation, Collection, ContentRecord, Meditation, SeedBatch, WellnessTip,
};
use crate::models::goal::{Goal, UpdateGoalRequest};
use crate::models::message::Message;
use crate::models::mood::{DayWindow, MoodEntry};
use crate::models::settings::UserSettings;
use crate::models::user::User;

/// Bounds every call on the wrapped store by a fixed deadline. An expired
/// call fails with `StoreError::Timeout` and is not retried.
pub struct TimeoutStore<S> {
    inner: S,
    limit: Duration,
}

impl<S: Store> TimeoutStore<S> {
    pub fn new(inner: S, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

async fn bounded<T, F>(limit: Duration, op: &'static str, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(op, timeout_ms = limit.as_millis() as u64, "Store operation timed out");
            Err(StoreError::Timeout(limit))
        }
    }
}

#[async_trait]
impl<S: Store> Store for TimeoutStore<S> {
    async fn ping(&self) -> StoreResult<()> {
        bounded(self.limit, "ping", self.inner.ping()).await
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        bounded(self.limit, "insert_user", self.inner.insert_user(user)).await
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        bounded(self.limit, "find_user", self.inner.find_user(id)).await
    }

    async fn rename_user(&self, id: Uuid, name: &str) -> StoreResult<Option<User>> {
        bounded(self.limit, "rename_user", self.inner.rename_user(id, name)).await
    }

    async fn upsert_mood_for_day(
        &self,
        candidate: &MoodEntry,
        window: &DayWindow,
    ) -> StoreResult<MoodEntry> {
        bounded(
            self.limit,
            "upsert_mood_for_day",
            self.inner.upsert_mood_for_day(candidate, window),
        )
        .await
    }

    async fn find_moods_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<MoodEntry>> {
        bounded(
            self.limit,
            "find_moods_since",
            self.inner.find_moods_since(user_id, since),
        )
        .await
    }

    async fn insert_goal(&self, goal: &Goal) -> StoreResult<()> {
        bounded(self.limit, "insert_goal", self.inner.insert_goal(goal)).await
    }

    async fn find_goals(&self, user_id: Uuid) -> StoreResult<Vec<Goal>> {
        bounded(self.limit, "find_goals", self.inner.find_goals(user_id)).await
    }

    async fn update_goal(&self, id: Uuid, patch: &UpdateGoalRequest) -> StoreResult<Option<Goal>> {
        bounded(self.limit, "update_goal", self.inner.update_goal(id, patch)).await
    }

    async fn delete_goal(&self, id: Uuid) -> StoreResult<u64> {
        bounded(self.limit, "delete_goal", self.inner.delete_goal(id)).await
    }

    async fn insert_messages(&self, messages: &[Message]) -> StoreResult<u64> {
        bounded(self.limit, "insert_messages", self.inner.insert_messages(messages)).await
    }

    async fn find_messages(&self, user_id: Uuid) -> StoreResult<Vec<Message>> {
        bounded(self.limit, "find_messages", self.inner.find_messages(user_id)).await
    }

    async fn upsert_settings(&self, settings: &UserSettings) -> StoreResult<UserSettings> {
        bounded(self.limit, "upsert_settings", self.inner.upsert_settings(settings)).await
    }

    async fn find_settings(&self, user_id: Uuid) -> StoreResult<Option<UserSettings>> {
        bounded(self.limit, "find_settings", self.inner.find_settings(user_id)).await
    }

    async fn count(&self, collection: Collection) -> StoreResult<i64> {
        bounded(self.limit, "count", self.inner.count(collection)).await
    }

    async fn seed_if_empty(&self, batch: &SeedBatch) -> StoreResult<u64> {
        bounded(self.limit, "seed_if_empty", self.inner.seed_if_empty(batch)).await
    }

    async fn find_meditations(&self, meditation_type: Option<&str>) -> StoreResult<Vec<Meditation>> {
        bounded(
            self.limit,
            "find_meditations",
            self.inner.find_meditations(meditation_type),
        )
        .await
    }

    async fn find_tips(&self, category: Option<&str>) -> StoreResult<Vec<WellnessTip>> {
        bounded(self.limit, "find_tips", self.inner.find_tips(category)).await
    }

    async fn find_affirmations(&self) -> StoreResult<Vec<Affirmation>> {
        bounded(self.limit, "find_affirmations", self.inner.find_affirmations()).await
    }

    async fn record_at(
        &self,
        collection: Collection,
        offset: i64,
    ) -> StoreResult<Option<ContentRecord>> {
        bounded(
            self.limit,
            "record_at",
            self.inner.record_at(collection, offset),
        )
        .await
    }
}
