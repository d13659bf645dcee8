//! Feedback persistence
//!
//! The service only ever appends to the feedback log and reads it back; there
//! is no update or delete path.

pub mod feedback;

pub use feedback::SqliteFeedbackStore;

use async_trait::async_trait;
use fbk_common::db::{Analysis, FeedbackRecord, RecordId};
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Text was empty after trimming
    #[error("Feedback text is empty")]
    EmptyText,

    /// The database rejected or failed the operation
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back to a record
    #[error("Corrupt feedback record {id}: {reason}")]
    Corrupt { id: i64, reason: String },
}

/// Append-only feedback log
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Store a record with only its text
    async fn insert_bare(&self, text: &str) -> Result<RecordId, StoreError>;

    /// Store text and all enrichment fields as one record, atomically
    async fn insert_enriched(&self, text: &str, analysis: &Analysis) -> Result<RecordId, StoreError>;

    /// Up to `limit` most recent texts, newest first
    async fn list_recent(&self, limit: u32) -> Result<Vec<String>, StoreError>;

    /// Every record, newest first
    async fn list_all(&self) -> Result<Vec<FeedbackRecord>, StoreError>;
}
