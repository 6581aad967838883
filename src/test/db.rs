//! Database test utilities.

use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tempfile::TempDir;

use crate::database::MIGRATOR;

/// A migrated SQLite database in its own temporary directory. Each test gets
/// a fresh one; the directory is removed on drop.
pub(crate) struct TestDb {
    // Held for its Drop impl.
    _dir: TempDir,
    pool: SqlitePool,
}

impl TestDb {
    pub(crate) async fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir for test database");

        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("engine.db"))
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("Failed to open test database");

        MIGRATOR
            .run(&pool)
            .await
            .expect("Failed to migrate test database");

        Self { _dir: dir, pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
