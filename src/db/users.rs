use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::user::User;

/// Insert a user with a freshly generated chat code.
pub async fn create_user(
    db: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> AppResult<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, password_hash, chat_code)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(Uuid::new_v4())
    .fetch_one(db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email already registered".into())
        } else {
            AppError::Database(e)
        }
    })
}

pub async fn find_user_by_email(db: &PgPool, email: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn require_user_by_email(db: &PgPool, email: &str) -> AppResult<User> {
    find_user_by_email(db, email)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn unique_email() -> String {
        format!("user-{}@example.com", Uuid::new_v4())
    }

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL
    async fn test_duplicate_email_is_conflict() {
        let db = test_pool().await;
        let email = unique_email();

        create_user(&db, "First", &email, "hash").await.unwrap();
        let second = create_user(&db, "Second", &email, "hash").await;

        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL
    async fn test_each_user_gets_distinct_chat_code() {
        let db = test_pool().await;

        let a = create_user(&db, "A", &unique_email(), "hash").await.unwrap();
        let b = create_user(&db, "B", &unique_email(), "hash").await.unwrap();

        assert_ne!(a.chat_code, b.chat_code);
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL
    async fn test_lookup_by_email() {
        let db = test_pool().await;
        let email = unique_email();
        let created = create_user(&db, "Lookup", &email, "hash").await.unwrap();

        let found = require_user_by_email(&db, &email).await.unwrap();
        assert_eq!(found.id, created.id);

        let missing = require_user_by_email(&db, "nobody@example.com").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
