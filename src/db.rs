use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Single pool for the whole service; the sleep-log workload is small and
/// read-heavy, 20 connections is plenty.
pub async fn create_pool(database_url: &str) -> PgPool {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(database_url)
        .await
        .expect("Failed to create database pool")
}
