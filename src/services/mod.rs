pub mod auth;
pub mod payments;
pub mod settings;
pub mod tournaments;
pub mod users;

/// Fresh in-memory database with the demo data loaded.
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = crate::db::connect("sqlite::memory:").await.unwrap();
    crate::db::init(&pool, true).await.unwrap();
    pool
}
