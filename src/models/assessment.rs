use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub assessment_type: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}
