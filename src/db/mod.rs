pub mod models;
pub mod repo;
pub mod seed;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::time::Duration;

use crate::error::AppResult;

/// Opens the pool. An in-memory database only exists inside the connection
/// that created it, so memory URLs get a single connection that is never
/// recycled.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = if database_url.contains(":memory:") || database_url.contains("mode=memory") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    options.connect(database_url).await
}

/// Creates the schema and, when asked, loads the demo data.
pub async fn init(pool: &SqlitePool, seed_demo_data: bool) -> AppResult<()> {
    repo::create_schema(pool).await?;
    if seed_demo_data {
        seed::seed_demo_data(pool).await?;
    }
    Ok(())
}
