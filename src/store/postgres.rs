use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
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

/// Advisory lock key serializing reference-content seeding across instances.
const SEED_LOCK_KEY: i64 = 0x5EED_C0DE;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn map_duplicate(collection: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| {
        let duplicate =
            matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation());
        if duplicate {
            StoreError::Conflict(collection)
        } else {
            StoreError::Database(err)
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query("INSERT INTO users (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&user.name)
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(map_duplicate("users"))?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn rename_user(&self, id: Uuid, name: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET name = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn upsert_mood_for_day(
        &self,
        candidate: &MoodEntry,
        window: &DayWindow,
    ) -> StoreResult<MoodEntry> {
        // The (user_id, day) unique constraint turns a concurrent second
        // insert into an update of the first.
        sqlx::query_as::<_, MoodEntry>(
            r#"
            INSERT INTO mood_entries (id, user_id, mood, date, day)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, day) DO UPDATE SET
                mood = EXCLUDED.mood,
                date = EXCLUDED.date
            RETURNING id, user_id, mood, date
            "#,
        )
        .bind(candidate.id)
        .bind(candidate.user_id)
        .bind(&candidate.mood)
        .bind(candidate.date)
        .bind(window.day)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NoRowsAffected {
            collection: "mood_entries",
        })
    }

    async fn find_moods_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<MoodEntry>> {
        let entries = sqlx::query_as::<_, MoodEntry>(
            r#"
            SELECT id, user_id, mood, date FROM mood_entries
            WHERE user_id = $1 AND date >= $2
            ORDER BY date DESC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn insert_goal(&self, goal: &Goal) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO goals (id, user_id, title, goal_type, target_date, is_completed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(goal.id)
        .bind(goal.user_id)
        .bind(&goal.title)
        .bind(&goal.goal_type)
        .bind(goal.target_date)
        .bind(goal.is_completed)
        .bind(goal.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_duplicate("goals"))?;
        Ok(())
    }

    async fn find_goals(&self, user_id: Uuid) -> StoreResult<Vec<Goal>> {
        let goals = sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(goals)
    }

    async fn update_goal(&self, id: Uuid, patch: &UpdateGoalRequest) -> StoreResult<Option<Goal>> {
        let goal = sqlx::query_as::<_, Goal>(
            r#"
            UPDATE goals SET
                title = COALESCE($2, title),
                goal_type = COALESCE($3, goal_type),
                target_date = COALESCE($4, target_date),
                is_completed = COALESCE($5, is_completed)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.goal_type)
        .bind(patch.target_date)
        .bind(patch.is_completed)
        .fetch_optional(&self.pool)
        .await?;
        Ok(goal)
    }

    async fn delete_goal(&self, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_messages(&self, messages: &[Message]) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        for message in messages {
            sqlx::query(
                r#"
                INSERT INTO messages (id, user_id, content, is_from_user, timestamp)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(message.id)
            .bind(message.user_id)
            .bind(&message.content)
            .bind(message.is_from_user)
            .bind(message.timestamp)
            .execute(&mut *tx)
            .await
            .map_err(map_duplicate("messages"))?;
        }

        tx.commit().await?;
        Ok(messages.len() as u64)
    }

    async fn find_messages(&self, user_id: Uuid) -> StoreResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE user_id = $1 ORDER BY timestamp ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn upsert_settings(&self, settings: &UserSettings) -> StoreResult<UserSettings> {
        sqlx::query_as::<_, UserSettings>(
            r#"
            INSERT INTO user_settings (
                id, user_id, notifications_enabled, dark_mode_enabled, reminder_time, language_code
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                notifications_enabled = EXCLUDED.notifications_enabled,
                dark_mode_enabled = EXCLUDED.dark_mode_enabled,
                reminder_time = EXCLUDED.reminder_time,
                language_code = EXCLUDED.language_code
            RETURNING *
            "#,
        )
        .bind(settings.id.unwrap_or_else(Uuid::new_v4))
        .bind(settings.user_id)
        .bind(settings.notifications_enabled)
        .bind(settings.dark_mode_enabled)
        .bind(settings.reminder_time)
        .bind(&settings.language_code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NoRowsAffected {
            collection: "user_settings",
        })
    }

    async fn find_settings(&self, user_id: Uuid) -> StoreResult<Option<UserSettings>> {
        let settings =
            sqlx::query_as::<_, UserSettings>("SELECT * FROM user_settings WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(settings)
    }

    async fn count(&self, collection: Collection) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", collection.table());
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn seed_if_empty(&self, batch: &SeedBatch) -> StoreResult<u64> {
        if batch.is_empty() {
            return Ok(0);
        }
        let collection = batch.collection();
        let mut tx = self.pool.begin().await?;

        // Held until commit/rollback, so only one instance seeds at a time.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SEED_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let sql = format!("SELECT COUNT(*) FROM {}", collection.table());
        let existing = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tx.commit().await?;
            return Ok(0);
        }

        match batch {
            SeedBatch::Meditations(items) => {
                for m in items {
                    sqlx::query(
                        r#"
                        INSERT INTO meditations (id, title, description, duration_minutes, meditation_type, image_ref)
                        VALUES ($1, $2, $3, $4, $5, $6)
                        "#,
                    )
                    .bind(m.id)
                    .bind(&m.title)
                    .bind(&m.description)
                    .bind(m.duration_minutes)
                    .bind(&m.meditation_type)
                    .bind(&m.image_ref)
                    .execute(&mut *tx)
                    .await?;
                }
            }
            SeedBatch::WellnessTips(items) => {
                for t in items {
                    sqlx::query(
                        "INSERT INTO wellness_tips (id, content, category, created_at) VALUES ($1, $2, $3, $4)",
                    )
                    .bind(t.id)
                    .bind(&t.content)
                    .bind(&t.category)
                    .bind(t.created_at)
                    .execute(&mut *tx)
                    .await?;
                }
            }
            SeedBatch::Affirmations(items) => {
                for a in items {
                    sqlx::query(
                        "INSERT INTO affirmations (id, content, created_at) VALUES ($1, $2, $3)",
                    )
                    .bind(a.id)
                    .bind(&a.content)
                    .bind(a.created_at)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(batch.len() as u64)
    }

    async fn find_meditations(&self, meditation_type: Option<&str>) -> StoreResult<Vec<Meditation>> {
        let meditations = sqlx::query_as::<_, Meditation>(
            "SELECT * FROM meditations WHERE ($1::text IS NULL OR meditation_type = $1)",
        )
        .bind(meditation_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(meditations)
    }

    async fn find_tips(&self, category: Option<&str>) -> StoreResult<Vec<WellnessTip>> {
        let tips = sqlx::query_as::<_, WellnessTip>(
            "SELECT * FROM wellness_tips WHERE ($1::text IS NULL OR category = $1)",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(tips)
    }

    async fn find_affirmations(&self) -> StoreResult<Vec<Affirmation>> {
        let affirmations = sqlx::query_as::<_, Affirmation>("SELECT * FROM affirmations")
            .fetch_all(&self.pool)
            .await?;
        Ok(affirmations)
    }

    async fn record_at(
        &self,
        collection: Collection,
        offset: i64,
    ) -> StoreResult<Option<ContentRecord>> {
        if offset < 0 {
            return Ok(None);
        }
        let sql = format!(
            "SELECT * FROM {} ORDER BY id ASC OFFSET $1 LIMIT 1",
            collection.table()
        );

        let record = match collection {
            Collection::Meditations => sqlx::query_as::<_, Meditation>(&sql)
                .bind(offset)
                .fetch_optional(&self.pool)
                .await?
                .map(ContentRecord::Meditation),
            Collection::WellnessTips => sqlx::query_as::<_, WellnessTip>(&sql)
                .bind(offset)
                .fetch_optional(&self.pool)
                .await?
                .map(ContentRecord::WellnessTip),
            Collection::Affirmations => sqlx::query_as::<_, Affirmation>(&sql)
                .bind(offset)
                .fetch_optional(&self.pool)
                .await?
                .map(ContentRecord::Affirmation),
        };
        Ok(record)
    }
}

// These need a reachable Postgres (`DATABASE_URL`); run with `cargo test -- --ignored`.
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, TimeZone};

    fn candidate(user_id: Uuid, mood: &str, date: DateTime<Utc>) -> (MoodEntry, DayWindow) {
        let entry = MoodEntry {
            id: Uuid::new_v4(),
            user_id,
            mood: mood.into(),
            date,
        };
        let window = DayWindow::containing(date, FixedOffset::east_opt(0).unwrap()).unwrap();
        (entry, window)
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_mood_upsert_keeps_one_row_per_day(pool: PgPool) {
        let store = PgStore::new(pool);
        let user_id = Uuid::new_v4();
        let morning = Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap();

        let (first, window) = candidate(user_id, "happy", morning);
        let created = store.upsert_mood_for_day(&first, &window).await.unwrap();
        let (second, window) = candidate(user_id, "sad", morning + Duration::hours(6));
        let updated = store.upsert_mood_for_day(&second, &window).await.unwrap();

        assert_eq!(created.id, first.id);
        assert_eq!(updated.id, first.id);
        assert_eq!(updated.mood, "sad");

        let stored = store
            .find_moods_since(user_id, morning - Duration::days(1))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_concurrent_mood_upserts_converge(pool: PgPool) {
        let store = PgStore::new(pool);
        let user_id = Uuid::new_v4();
        let noon = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();

        let (a, wa) = candidate(user_id, "calm", noon);
        let (b, wb) = candidate(user_id, "tired", noon + Duration::minutes(1));
        let (ra, rb) = tokio::join!(
            store.upsert_mood_for_day(&a, &wa),
            store.upsert_mood_for_day(&b, &wb)
        );

        assert_eq!(ra.unwrap().id, rb.unwrap().id);
        let stored = store
            .find_moods_since(user_id, noon - Duration::days(1))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_settings_upsert_keeps_id(pool: PgPool) {
        let store = PgStore::new(pool);
        let user_id = Uuid::new_v4();
        let mut settings = UserSettings::default_for(user_id);
        settings.id = Some(Uuid::new_v4());

        let first = store.upsert_settings(&settings).await.unwrap();
        settings.id = Some(Uuid::new_v4());
        settings.language_code = "tr".into();
        let second = store.upsert_settings(&settings).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.language_code, "tr");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_seed_is_gated_and_offsets_follow_id_order(pool: PgPool) {
        let store = PgStore::new(pool);
        let now = Utc::now();
        let items: Vec<Affirmation> = (0..3)
            .map(|i| Affirmation {
                id: Uuid::new_v4(),
                content: format!("affirmation {i}"),
                created_at: now,
            })
            .collect();
        let batch = SeedBatch::Affirmations(items.clone());

        assert_eq!(store.seed_if_empty(&batch).await.unwrap(), 3);
        assert_eq!(store.seed_if_empty(&batch).await.unwrap(), 0);
        assert_eq!(store.count(Collection::Affirmations).await.unwrap(), 3);

        let mut ids: Vec<Uuid> = items.iter().map(|a| a.id).collect();
        ids.sort();
        for (offset, id) in ids.iter().enumerate() {
            let record = store
                .record_at(Collection::Affirmations, offset as i64)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(record.id(), *id);
        }
        assert!(store
            .record_at(Collection::Affirmations, 3)
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_duplicate_message_batch_rolls_back(pool: PgPool) {
        let store = PgStore::new(pool);
        let user_id = Uuid::new_v4();
        let message = Message {
            id: Uuid::new_v4(),
            user_id,
            content: "hi".into(),
            is_from_user: true,
            timestamp: Utc::now(),
        };
        store.insert_messages(&[message.clone()]).await.unwrap();

        let fresh = Message {
            id: Uuid::new_v4(),
            ..message.clone()
        };
        let err = store.insert_messages(&[fresh, message]).await.unwrap_err();

        assert!(matches!(err, StoreError::Conflict("messages")));
        assert_eq!(store.find_messages(user_id).await.unwrap().len(), 1);
    }
}
