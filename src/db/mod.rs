pub mod journal;
pub mod pool;
pub mod schema;
pub mod users;

pub use pool::create_pool;

/// Pool for tests that need a live database (`DATABASE_URL`).
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let db = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");
    assert!(schema::init_schema(&db, "test").await);
    db
}
