use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One night of sleep, unique per (user_id, date). `total_minutes` and
/// `score` are always derived by the engine at upsert time and are never
/// accepted from the client, so a stored score always equals what the
/// calculator would produce for the stored inputs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SleepLog {
    pub id: Uuid,
    pub user_id: i64,
    pub date: NaiveDate,
    pub bedtime: NaiveTime,
    pub wake_time: NaiveTime,
    pub total_minutes: i32,
    pub quality: i32,
    pub wake_ups: i32,
    pub symptoms: Vec<String>,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full submission for one night. Clock times arrive as "HH:MM" strings and
/// are validated in the handler before the engine sees them.
#[derive(Debug, Deserialize)]
pub struct UpsertSleepLogRequest {
    pub date: Option<NaiveDate>,
    pub bedtime: String,
    pub wake_time: String,
    pub quality: i32,
    pub wake_ups: Option<i32>,
    pub symptoms: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SleepLogQuery {
    pub limit: Option<i64>,
}
