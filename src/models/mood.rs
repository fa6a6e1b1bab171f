use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogMoodRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "mood is required"))]
    pub mood: String,
    pub date: Option<DateTime<Utc>>,
}

/// Half-open calendar-day interval `[start, end)` in the reference timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub day: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// The reference-timezone day holding `instant`, or `None` when the day
    /// or its bounds fall outside the representable range.
    pub fn containing(instant: DateTime<Utc>, offset: FixedOffset) -> Option<Self> {
        let shift = Duration::seconds(i64::from(offset.local_minus_utc()));
        let day = instant.naive_utc().checked_add_signed(shift)?.date();
        let start = day
            .and_time(NaiveTime::MIN)
            .checked_sub_signed(shift)?
            .and_utc();
        let end = start.checked_add_signed(Duration::days(1))?;

        Some(Self { day, start, end })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}
