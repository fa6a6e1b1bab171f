use chrono::{DateTime, Duration, FixedOffset, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::mood::{DayWindow, LogMoodRequest, MoodEntry};
use crate::store::Store;

/// Mood history covers the trailing week.
pub const HISTORY_WINDOW_DAYS: i64 = 7;

/// Records the user's mood for the calendar day of `request.date` (or of
/// `now` when no date is given). A second log on the same day overwrites the
/// first entry's mood and date and keeps its id.
pub async fn log_mood(
    store: &dyn Store,
    request: LogMoodRequest,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> AppResult<MoodEntry> {
    let candidate = MoodEntry {
        id: Uuid::new_v4(),
        user_id: request.user_id,
        mood: request.mood,
        date: request.date.unwrap_or(now),
    };
    let window = DayWindow::containing(candidate.date, offset)
        .ok_or_else(|| AppError::Validation("date is out of range".into()))?;

    let stored = store.upsert_mood_for_day(&candidate, &window).await?;

    if stored.id == candidate.id {
        tracing::debug!(user_id = %stored.user_id, day = %window.day, "Mood entry created");
    } else {
        tracing::debug!(
            user_id = %stored.user_id,
            day = %window.day,
            entry_id = %stored.id,
            "Mood entry updated"
        );
    }

    Ok(stored)
}

/// Entries dated within the last `HISTORY_WINDOW_DAYS` days, newest first.
pub async fn mood_history(
    store: &dyn Store,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<Vec<MoodEntry>> {
    let since = now - Duration::days(HISTORY_WINDOW_DAYS);
    Ok(store.find_moods_since(user_id, since).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    }

    fn log(user_id: Uuid, mood: &str, date: Option<DateTime<Utc>>) -> LogMoodRequest {
        LogMoodRequest {
            user_id,
            mood: mood.into(),
            date,
        }
    }

    #[tokio::test]
    async fn test_same_day_logs_keep_one_entry() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let now = noon();

        let first = log_mood(&store, log(user_id, "happy", None), utc(), now)
            .await
            .unwrap();
        let second = log_mood(
            &store,
            log(user_id, "happy", None),
            utc(),
            now + Duration::hours(1),
        )
        .await
        .unwrap();
        let third = log_mood(
            &store,
            log(user_id, "sad", None),
            utc(),
            now + Duration::hours(2),
        )
        .await
        .unwrap();

        assert_eq!(first.date, now);
        assert_eq!(second.id, first.id);
        assert_eq!(third.id, first.id);
        assert_eq!(third.mood, "sad");
        assert_eq!(third.date, now + Duration::hours(2));

        let stored = store
            .find_moods_since(user_id, now - Duration::days(30))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].mood, "sad");
        assert_eq!(stored[0].id, first.id);
    }

    #[tokio::test]
    async fn test_explicit_dates_on_different_days_create_separate_entries() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let now = noon();

        let today = log_mood(&store, log(user_id, "calm", Some(now)), utc(), now)
            .await
            .unwrap();
        let yesterday = log_mood(
            &store,
            log(user_id, "tired", Some(now - Duration::days(1))),
            utc(),
            now,
        )
        .await
        .unwrap();

        assert_ne!(today.id, yesterday.id);
        assert_eq!(mood_history(&store, user_id, now).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_day_boundary_follows_reference_offset() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        // 21:30 and 22:30 UTC fall on different local days at UTC+02:00.
        let before = Utc.with_ymd_and_hms(2025, 6, 10, 21, 30, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 6, 10, 22, 30, 0).unwrap();

        let a = log_mood(&store, log(user_id, "ok", Some(before)), plus_two, after)
            .await
            .unwrap();
        let b = log_mood(&store, log(user_id, "good", Some(after)), plus_two, after)
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_users_do_not_share_day_entries() {
        let store = MemoryStore::new();
        let now = noon();

        let a = log_mood(&store, log(Uuid::new_v4(), "happy", None), utc(), now)
            .await
            .unwrap();
        let b = log_mood(&store, log(Uuid::new_v4(), "happy", None), utc(), now)
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_history_window_and_order() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let now = noon();

        for (days_ago, mood) in [(8, "eight"), (6, "six"), (1, "one"), (0, "today")] {
            log_mood(
                &store,
                log(user_id, mood, Some(now - Duration::days(days_ago))),
                utc(),
                now,
            )
            .await
            .unwrap();
        }
        log_mood(&store, log(Uuid::new_v4(), "stranger", Some(now)), utc(), now)
            .await
            .unwrap();

        let moods: Vec<String> = mood_history(&store, user_id, now)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.mood)
            .collect();

        assert_eq!(moods, vec!["today", "one", "six"]);
    }

    #[tokio::test]
    async fn test_history_includes_exact_window_start() {
        let store = MemoryStore::new();
        let on_edge = Uuid::new_v4();
        let past_edge = Uuid::new_v4();
        let now = noon();
        let edge = now - Duration::days(HISTORY_WINDOW_DAYS);

        log_mood(&store, log(on_edge, "edge", Some(edge)), utc(), now)
            .await
            .unwrap();
        log_mood(
            &store,
            log(past_edge, "just outside", Some(edge - Duration::seconds(1))),
            utc(),
            now,
        )
        .await
        .unwrap();

        let history = mood_history(&store, on_edge, now).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].mood, "edge");
        assert!(mood_history(&store, past_edge, now).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_date_at_end_of_range_is_rejected() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();

        let err = log_mood(
            &store,
            log(user_id, "happy", Some(DateTime::<Utc>::MAX_UTC)),
            utc(),
            noon(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(store
            .find_moods_since(user_id, DateTime::<Utc>::MIN_UTC)
            .await
            .unwrap()
            .is_empty());
    }
}
