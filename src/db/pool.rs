use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connections kept open while idle.
pub const BASE_CONNECTIONS: u32 = 10;
/// Extra connections opened under load on top of the base.
pub const OVERFLOW_CONNECTIONS: u32 = 20;
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
pub const RECYCLE_AFTER: Duration = Duration::from_secs(1800);

pub fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .min_connections(BASE_CONNECTIONS)
        .max_connections(BASE_CONNECTIONS + OVERFLOW_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .max_lifetime(RECYCLE_AFTER)
        .test_before_acquire(true)
}

/// Builds the pool without opening a connection. Only a malformed URL fails
/// here; an unreachable server surfaces on first use.
pub fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    pool_options().connect_lazy(database_url)
}
