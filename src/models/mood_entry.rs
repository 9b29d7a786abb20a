use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub mood: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub entry_date: NaiveDate,
    pub user_id: Uuid,
}
