use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::{
    error::AppError,
    storage::{
        db::SurrealDbClient,
        types::{file_record::FileRecord, StoredObject},
    },
};

/// Stable enumeration order of the catalog: oldest first, creation order on equal timestamps.
const ENUMERATION_ORDER: &str = "ORDER BY uploaded_at ASC, id ASC";

/// Attempts at finding the winning record after an insert lost a uniqueness race.
const CONFLICT_LOOKUP_ATTEMPTS: u32 = 3;

/// Result of an insert-if-absent.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(FileRecord),
    /// Another record already holds this content hash.
    Conflict(FileRecord),
}

/// Metadata about stored files, keyed by content hash and ordered by upload time.
#[async_trait]
pub trait MetadataCatalog: Send + Sync {
    async fn find_by_hash(&self, content_hash: &str) -> Result<Option<FileRecord>, AppError>;

    /// Inserts `record` unless its content hash is already present.
    ///
    /// Must be atomic with respect to concurrent inserts of the same hash.
    async fn insert(&self, record: FileRecord) -> Result<InsertOutcome, AppError>;

    async fn most_recent(&self) -> Result<Option<FileRecord>, AppError>;

    async fn count_all(&self) -> Result<usize, AppError>;

    /// All records in stable enumeration order.
    async fn iterate_all(&self) -> Result<Vec<FileRecord>, AppError>;

    /// The record at `index` in enumeration order.
    async fn nth(&self, index: usize) -> Result<Option<FileRecord>, AppError>;
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: i64,
}

#[async_trait]
impl MetadataCatalog for SurrealDbClient {
    async fn find_by_hash(&self, content_hash: &str) -> Result<Option<FileRecord>, AppError> {
        let record: Option<FileRecord> = self
            .client
            .query("SELECT * FROM type::table($table) WHERE content_hash = $content_hash LIMIT 1")
            .bind(("table", FileRecord::table_name()))
            .bind(("content_hash", content_hash.to_string()))
            .await?
            .take(0)?;

        Ok(record)
    }

    async fn insert(&self, record: FileRecord) -> Result<InsertOutcome, AppError> {
        let content_hash = record.content_hash.clone();

        // The UNIQUE index on content_hash rejects the second of two racing inserts.
        let err = match self.store_item(record).await {
            Ok(Some(stored)) => return Ok(InsertOutcome::Inserted(stored)),
            Ok(None) => {
                return Err(AppError::InternalError(format!(
                    "Insert of file {content_hash} returned no record"
                )))
            }
            Err(err) => err,
        };

        debug!(content_hash = %content_hash, error = %err, "Insert rejected, checking for existing record");

        for attempt in 0..CONFLICT_LOOKUP_ATTEMPTS {
            if let Some(existing) = self.find_by_hash(&content_hash).await? {
                return Ok(InsertOutcome::Conflict(existing));
            }
            sleep(Duration::from_millis(10 * u64::from(attempt + 1))).await;
        }

        warn!(content_hash = %content_hash, "Insert failed without a conflicting record");
        Err(err.into())
    }

    async fn most_recent(&self) -> Result<Option<FileRecord>, AppError> {
        let record: Option<FileRecord> = self
            .client
            .query("SELECT * FROM type::table($table) ORDER BY uploaded_at DESC, id DESC LIMIT 1")
            .bind(("table", FileRecord::table_name()))
            .await?
            .take(0)?;

        Ok(record)
    }

    async fn count_all(&self) -> Result<usize, AppError> {
        let result: Option<CountResult> = self
            .client
            .query("SELECT count() as count FROM type::table($table) GROUP ALL")
            .bind(("table", FileRecord::table_name()))
            .await?
            .take(0)?;

        Ok(result
            .and_then(|r| usize::try_from(r.count).ok())
            .unwrap_or(0))
    }

    async fn iterate_all(&self) -> Result<Vec<FileRecord>, AppError> {
        let records: Vec<FileRecord> = self
            .client
            .query(format!(
                "SELECT * FROM type::table($table) {ENUMERATION_ORDER}"
            ))
            .bind(("table", FileRecord::table_name()))
            .await?
            .take(0)?;

        Ok(records)
    }

    async fn nth(&self, index: usize) -> Result<Option<FileRecord>, AppError> {
        let record: Option<FileRecord> = self
            .client
            .query(format!(
                "SELECT * FROM type::table($table) {ENUMERATION_ORDER} LIMIT 1 START {index}"
            ))
            .bind(("table", FileRecord::table_name()))
            .await?
            .take(0)?;

        Ok(record)
    }
}
