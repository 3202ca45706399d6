use bytes::Bytes;
use tracing::{info, instrument};

use super::TextFileService;
use crate::{
    error::{AppError, CorpusError},
    storage::{catalog::InsertOutcome, types::file_record::FileRecord},
    utils::hashing::content_hash,
};

impl TextFileService {
    /// Stores a new text file, unless identical content is already stored.
    ///
    /// Fails with [`CorpusError::DuplicateContent`] when a record with the same content hash
    /// exists; nothing is written in that case. Content that is not UTF-8 is rejected with
    /// [`CorpusError::Decoding`].
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn ingest(&self, bytes: Bytes, display_name: &str) -> Result<FileRecord, AppError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::Validation("File name missing".to_string()));
        }

        std::str::from_utf8(&bytes).map_err(CorpusError::from)?;

        let content_hash = content_hash(&bytes);

        if self.catalog.find_by_hash(&content_hash).await?.is_some() {
            info!(content_hash = %content_hash, "File already exists");
            return Err(CorpusError::DuplicateContent(content_hash).into());
        }

        let size_bytes = bytes.len() as u64;
        let blob_ref = self.blobs.put(bytes).await?;

        let record = FileRecord::new(
            content_hash,
            display_name.to_string(),
            blob_ref,
            self.clock.now(),
            size_bytes,
        );

        match self.catalog.insert(record).await? {
            InsertOutcome::Inserted(stored) => {
                info!(
                    content_hash = %stored.content_hash,
                    display_name = %stored.display_name,
                    size_bytes,
                    "Stored new file"
                );
                Ok(stored)
            }
            InsertOutcome::Conflict(existing) => {
                info!(content_hash = %existing.content_hash, "Lost race against identical upload");
                Err(CorpusError::DuplicateContent(existing.content_hash).into())
            }
        }
    }
}
