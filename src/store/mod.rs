//! Entity store: one collection per entity type, keyed by a generated UUID.
//!
//! Handlers and services only ever see `dyn Store`. Natural-key writes
//! (`upsert_mood_for_day`, `upsert_settings`) and seeding are single
//! conditional operations on every backend, so concurrent callers can not
//! produce duplicate records for the same key.

mod memory;
mod postgres;
mod timeout;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use timeout::TimeoutStore;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::content::{
    Affirmation, Collection, ContentRecord, Meditation, SeedBatch, WellnessTip,
};
use crate::models::goal::{Goal, UpdateGoalRequest};
use crate::models::message::Message;
use crate::models::mood::{DayWindow, MoodEntry};
use crate::models::settings::UserSettings;
use crate::models::user::User;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("update on {collection} matched a record but modified none")]
    NoRowsAffected { collection: &'static str },

    #[error("duplicate key in {0}")]
    Conflict(&'static str),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    // -- Users --

    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Returns the updated user, or `None` if no user has this id.
    async fn rename_user(&self, id: Uuid, name: &str) -> StoreResult<Option<User>>;

    // -- Mood entries --

    /// Insert `candidate`, unless the same user already has an entry inside
    /// `window`; in that case overwrite its `mood` and `date` and keep its id.
    /// Returns the stored entry either way.
    async fn upsert_mood_for_day(
        &self,
        candidate: &MoodEntry,
        window: &DayWindow,
    ) -> StoreResult<MoodEntry>;
    /// Entries with `date >= since`, newest first.
    async fn find_moods_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<MoodEntry>>;

    // -- Goals --

    async fn insert_goal(&self, goal: &Goal) -> StoreResult<()>;
    async fn find_goals(&self, user_id: Uuid) -> StoreResult<Vec<Goal>>;
    async fn update_goal(&self, id: Uuid, patch: &UpdateGoalRequest) -> StoreResult<Option<Goal>>;
    /// Returns the number of goals removed (0 or 1).
    async fn delete_goal(&self, id: Uuid) -> StoreResult<u64>;

    // -- Messages --

    /// All-or-nothing; a duplicate id fails the whole batch with `Conflict`.
    async fn insert_messages(&self, messages: &[Message]) -> StoreResult<u64>;
    /// Oldest first.
    async fn find_messages(&self, user_id: Uuid) -> StoreResult<Vec<Message>>;

    // -- Settings --

    /// Insert with `settings.id` if the user has no record, otherwise
    /// overwrite the four preference fields of the existing one.
    async fn upsert_settings(&self, settings: &UserSettings) -> StoreResult<UserSettings>;
    async fn find_settings(&self, user_id: Uuid) -> StoreResult<Option<UserSettings>>;

    // -- Reference content --

    async fn count(&self, collection: Collection) -> StoreResult<i64>;
    /// Inserts the batch only if its collection is empty; returns the number
    /// of records inserted.
    async fn seed_if_empty(&self, batch: &SeedBatch) -> StoreResult<u64>;
    async fn find_meditations(&self, meditation_type: Option<&str>) -> StoreResult<Vec<Meditation>>;
    async fn find_tips(&self, category: Option<&str>) -> StoreResult<Vec<WellnessTip>>;
    async fn find_affirmations(&self) -> StoreResult<Vec<Affirmation>>;
    /// The record of `collection` at `offset` in ascending id order. A
    /// negative or past-the-end offset yields `None`.
    async fn record_at(
        &self,
        collection: Collection,
        offset: i64,
    ) -> StoreResult<Option<ContentRecord>>;
}
