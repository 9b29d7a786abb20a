use sqlx::PgPool;

/// Create any missing tables.
///
/// A failure here, including an unreachable or missing database, is logged
/// and swallowed so the process keeps serving. Returns whether the schema
/// check succeeded.
pub async fn init_schema(db: &PgPool, database_name: &str) -> bool {
    match sqlx::migrate!("./migrations").run(db).await {
        Ok(()) => {
            tracing::info!(database = %database_name, "Database tables checked/created");
            true
        }
        Err(e) => {
            tracing::error!(
                database = %database_name,
                error = %e,
                "Error creating tables; ensure the database exists"
            );
            false
        }
    }
}
