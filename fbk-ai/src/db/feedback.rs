//! SQLite-backed feedback log

use super::{FeedbackStore, StoreError};
use async_trait::async_trait;
use fbk_common::db::{Analysis, FeedbackRecord, RecordId, Sentiment, Urgency};
use fbk_common::time;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Feedback store on the shared SQLite pool
///
/// `created_at` is computed inside the INSERT as the later of "now" and the
/// newest stored timestamp, so it never decreases in arrival order even if the
/// system clock steps backwards.
#[derive(Clone)]
pub struct SqliteFeedbackStore {
    pool: SqlitePool,
}

impl SqliteFeedbackStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn insert(&self, text: &str, analysis: Option<&Analysis>) -> Result<RecordId, StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::EmptyText);
        }

        let now = time::to_db_timestamp(time::now());

        let result = sqlx::query(
            r#"
            INSERT INTO feedback (text, summary, sentiment, urgency, created_at)
            SELECT ?, ?, ?, ?, MAX(?, COALESCE((SELECT MAX(created_at) FROM feedback), ''))
            "#,
        )
        .bind(text)
        .bind(analysis.map(|a| a.summary.as_str()))
        .bind(analysis.map(|a| a.sentiment.as_str()))
        .bind(analysis.map(|a| a.urgency.as_str()))
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(RecordId(result.last_insert_rowid()))
    }
}

fn record_from_row(row: &SqliteRow) -> Result<FeedbackRecord, StoreError> {
    let id: i64 = row.try_get("id")?;
    let corrupt = |reason: String| StoreError::Corrupt { id, reason };

    let summary: Option<String> = row.try_get("summary")?;
    let sentiment: Option<String> = row.try_get("sentiment")?;
    let urgency: Option<String> = row.try_get("urgency")?;

    let analysis = match (summary, sentiment, urgency) {
        (None, None, None) => None,
        (Some(summary), Some(sentiment), Some(urgency)) => Some(Analysis {
            summary,
            sentiment: sentiment
                .parse::<Sentiment>()
                .map_err(|e| corrupt(e.to_string()))?,
            urgency: urgency
                .parse::<Urgency>()
                .map_err(|e| corrupt(e.to_string()))?,
        }),
        _ => return Err(corrupt("partial enrichment".to_string())),
    };

    let created_at: String = row.try_get("created_at")?;
    let created_at = time::parse_db_timestamp(&created_at)
        .map_err(|e| corrupt(format!("bad created_at '{}': {}", created_at, e)))?;

    Ok(FeedbackRecord {
        id: RecordId(id),
        text: row.try_get("text")?,
        analysis,
        created_at,
    })
}

#[async_trait]
impl FeedbackStore for SqliteFeedbackStore {
    async fn insert_bare(&self, text: &str) -> Result<RecordId, StoreError> {
        let id = self.insert(text, None).await?;
        tracing::debug!(id = %id, "Stored bare feedback");
        Ok(id)
    }

    async fn insert_enriched(&self, text: &str, analysis: &Analysis) -> Result<RecordId, StoreError> {
        let id = self.insert(text, Some(analysis)).await?;
        tracing::debug!(
            id = %id,
            sentiment = %analysis.sentiment,
            urgency = %analysis.urgency,
            "Stored enriched feedback"
        );
        Ok(id)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<String>, StoreError> {
        let texts = sqlx::query_scalar::<_, String>(
            "SELECT text FROM feedback ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(texts)
    }

    async fn list_all(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, text, summary, sentiment, urgency, created_at
            FROM feedback
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }
}
