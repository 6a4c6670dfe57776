use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use swimfit_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(database_url, 5, 30).await
}

pub async fn connect_with_config(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&config.url, config.max_connections, config.timeout_secs).await
}

/// Opens the analytics store, creating the database file on first use.
pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    open_pool(database_url, max_connections, timeout_secs, true).await
}

/// Opens an existing store only; a missing database file is a connection error.
pub async fn connect_existing(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    open_pool(&config.url, config.max_connections, config.timeout_secs, false).await
}

async fn open_pool(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
    create_if_missing: bool,
) -> Result<DbPool, sqlx::Error> {
    let options =
        SqliteConnectOptions::from_str(database_url)?.create_if_missing(create_if_missing);

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect_with(options)
        .await
}

pub async fn ping(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

pub async fn table_exists(pool: &DbPool, table: &str) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use swimfit_core::config::DatabaseConfig;
    use tempfile::TempDir;

    use super::{connect_existing, connect_with_config, ping, table_exists};
    use crate::migrations;

    #[tokio::test]
    async fn in_memory_pool_answers_ping() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            timeout_secs: 5,
        };

        let pool = connect_with_config(&config).await.expect("connect");
        ping(&pool).await.expect("ping");
        assert!(!table_exists(&pool, "fit_analytics").await.expect("inspect"));

        migrations::run_pending(&pool).await.expect("migrate");
        assert!(table_exists(&pool, "fit_analytics").await.expect("inspect"));
    }

    #[tokio::test]
    async fn connect_existing_does_not_create_missing_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("typo.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
            max_connections: 1,
            timeout_secs: 5,
        };

        assert!(connect_existing(&config).await.is_err());
        assert!(!path.exists());

        let created = connect_with_config(&config).await.expect("create");
        created.close().await;
        let reopened = connect_existing(&config).await.expect("reopen existing file");
        ping(&reopened).await.expect("ping");
    }
}
