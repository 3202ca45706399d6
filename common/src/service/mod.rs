//! Text file service: ingest with content-hash deduplication and line-level queries.
//!
//! The service is stateless apart from its random source and upload clock; every operation is
//! a fresh read over the [`MetadataCatalog`] and [`BlobStore`] it was built with.

mod ingest;
mod query;

pub use query::{LineResult, RankedLine};

use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::error;

use crate::{
    error::{AppError, CorpusError},
    storage::{
        blob::{BlobRef, BlobStore},
        catalog::MetadataCatalog,
        types::file_record::FileRecord,
    },
    utils::lines::{extract_lines, Line},
};

/// Hands out upload timestamps that never go backwards within this process.
#[derive(Debug, Default)]
struct UploadClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl UploadClock {
    fn now(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let mut now = Utc::now();
        if let Some(previous) = *last {
            if now <= previous {
                now = previous + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now
    }
}

#[derive(Clone)]
pub struct TextFileService {
    catalog: Arc<dyn MetadataCatalog>,
    blobs: Arc<dyn BlobStore>,
    rng: Arc<Mutex<StdRng>>,
    clock: Arc<UploadClock>,
}

impl TextFileService {
    pub fn new(catalog: Arc<dyn MetadataCatalog>, blobs: Arc<dyn BlobStore>) -> Self {
        Self::with_rng(catalog, blobs, StdRng::from_entropy())
    }

    /// Builds a service drawing from a caller-provided random source, e.g. a seeded one.
    pub fn with_rng(
        catalog: Arc<dyn MetadataCatalog>,
        blobs: Arc<dyn BlobStore>,
        rng: StdRng,
    ) -> Self {
        Self {
            catalog,
            blobs,
            rng: Arc::new(Mutex::new(rng)),
            clock: Arc::new(UploadClock::default()),
        }
    }

    /// Raw bytes of a stored file.
    pub async fn get_file_by_id(&self, blob_ref: &BlobRef) -> Result<Bytes, AppError> {
        self.blobs.get(blob_ref).await.inspect_err(|err| {
            if matches!(err.as_corpus(), Some(CorpusError::FileNotFound(_))) {
                error!(blob_ref = %blob_ref, "Blob reference does not resolve");
            }
        })
    }

    /// Number of distinct files stored.
    pub async fn file_count(&self) -> Result<usize, AppError> {
        self.catalog.count_all().await
    }

    /// Loads and splits the blob behind `record`.
    async fn load_lines(&self, record: &FileRecord) -> Result<Vec<Line>, AppError> {
        let bytes = self.blobs.get(&record.blob_ref).await?;
        extract_lines(&bytes).map_err(|err| match err {
            CorpusError::EmptyContent(_) => {
                CorpusError::EmptyContent(record.display_name.clone()).into()
            }
            other => other.into(),
        })
    }

    /// Uniform draw from `0..len`, `None` when `len` is zero.
    fn draw_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Some(rng.gen_range(0..len))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::fixture;
    use super::*;
    use crate::utils::hashing::content_hash;

    #[test]
    fn test_upload_clock_is_strictly_increasing() {
        let clock = UploadClock::default();
        let mut previous = clock.now();
        for _ in 0..1000 {
            let next = clock.now();
            assert!(next > previous);
            previous = next;
        }
    }

    #[tokio::test]
    async fn test_get_file_by_id_returns_bytes() {
        let fx = fixture().await;
        let record = fx
            .service
            .ingest(Bytes::from_static(b"raw bytes\n"), "raw.txt")
            .await
            .expect("ingest");

        let bytes = fx
            .service
            .get_file_by_id(&record.blob_ref)
            .await
            .expect("blob");
        assert_eq!(bytes.as_ref(), b"raw bytes\n");
    }

    #[tokio::test]
    async fn test_get_file_by_id_unknown_ref() {
        let fx = fixture().await;
        let missing = BlobRef::from_hash(&content_hash(b"missing"));

        let result = fx.service.get_file_by_id(&missing).await;
        assert!(matches!(
            result,
            Err(AppError::Corpus(CorpusError::FileNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_draw_index_bounds() {
        let fx = fixture().await;

        assert_eq!(fx.service.draw_index(0), None);
        assert_eq!(fx.service.draw_index(1), Some(0));
        for _ in 0..100 {
            let drawn = fx.service.draw_index(5).expect("non-empty range");
            assert!(drawn < 5);
        }
    }
}
