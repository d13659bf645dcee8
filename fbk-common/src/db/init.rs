//! Database initialization
//!
//! Opens (creating if needed) the SQLite database and makes sure the feedback
//! schema exists. Safe to call on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Connections in the service pool
pub const MAX_CONNECTIONS: u32 = 10;

/// How long a connection waits on a locked database before failing
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Applied to every pooled connection as it opens. WAL lets list/summary
    // reads proceed while an insert is in flight.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_feedback_table(&pool).await?;

    Ok(pool)
}

/// Create the feedback table
///
/// Enrichment columns are all NULL or all set, and labels are limited to
/// their enumerations, so no writer can persist a partial or invented
/// classification.
pub async fn create_feedback_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL CHECK (length(trim(text)) > 0),
            summary TEXT,
            sentiment TEXT CHECK (sentiment IN ('Positive', 'Neutral', 'Negative')),
            urgency TEXT CHECK (urgency IN ('Low', 'Medium', 'High')),
            created_at TEXT NOT NULL,
            CHECK (
                (summary IS NULL AND sentiment IS NULL AND urgency IS NULL)
                OR (summary IS NOT NULL AND sentiment IS NOT NULL AND urgency IS NOT NULL)
            )
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_feedback_created_at ON feedback(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}
