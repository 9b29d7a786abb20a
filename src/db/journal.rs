//! Mood entries, activity logs and assessment results. All append-only.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::activity_log::ActivityLog;
use crate::models::assessment::AssessmentResult;
use crate::models::mood_entry::MoodEntry;

/// `entry_date` defaults to the database's current date.
pub async fn insert_mood_entry(
    db: &PgPool,
    user_id: Uuid,
    mood: &str,
    note: Option<&str>,
    entry_date: Option<NaiveDate>,
) -> AppResult<MoodEntry> {
    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        INSERT INTO mood_entries (id, user_id, mood, note, entry_date)
        VALUES ($1, $2, $3, $4, COALESCE($5, CURRENT_DATE))
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(mood)
    .bind(note)
    .bind(entry_date)
    .fetch_one(db)
    .await?;

    Ok(entry)
}

pub async fn list_mood_entries(db: &PgPool, user_id: Uuid) -> AppResult<Vec<MoodEntry>> {
    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1
        ORDER BY entry_date DESC, created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(entries)
}

pub async fn insert_activity(db: &PgPool, user_id: Uuid, activity: &str) -> AppResult<ActivityLog> {
    let log = sqlx::query_as::<_, ActivityLog>(
        r#"
        INSERT INTO activity_logs (id, user_id, activity)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(activity)
    .fetch_one(db)
    .await?;

    Ok(log)
}

pub async fn insert_assessment(
    db: &PgPool,
    user_id: Uuid,
    assessment_type: &str,
    score: i32,
) -> AppResult<AssessmentResult> {
    let result = sqlx::query_as::<_, AssessmentResult>(
        r#"
        INSERT INTO assessment_results (id, user_id, assessment_type, score)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(assessment_type)
    .bind(score)
    .fetch_one(db)
    .await?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, users::create_user};

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL
    async fn test_mood_entry_defaults_and_ordering() {
        let db = test_pool().await;
        let email = format!("mood-{}@example.com", Uuid::new_v4());
        let user = create_user(&db, "Mood", &email, "hash").await.unwrap();

        let older = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        insert_mood_entry(&db, user.id, "low", Some("rough day"), Some(older)).await.unwrap();
        let today = insert_mood_entry(&db, user.id, "good", None, None).await.unwrap();

        assert!(today.note.is_none());
        let entries = list_mood_entries(&db, user.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].mood, "good");
        assert_eq!(entries[1].entry_date, older);
    }

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL
    async fn test_records_require_existing_user() {
        let db = test_pool().await;
        let orphan = insert_activity(&db, Uuid::new_v4(), "breathing").await;
        assert!(orphan.is_err());
    }

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL
    async fn test_activity_and_assessment_roundtrip() {
        let db = test_pool().await;
        let email = format!("log-{}@example.com", Uuid::new_v4());
        let user = create_user(&db, "Log", &email, "hash").await.unwrap();

        let log = insert_activity(&db, user.id, "journaling").await.unwrap();
        assert_eq!(log.user_id, user.id);

        let result = insert_assessment(&db, user.id, "anxiety", 9).await.unwrap();
        assert_eq!(result.assessment_type, "anxiety");
        assert_eq!(result.score, 9);
    }
}
