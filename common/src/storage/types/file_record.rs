use mime_guess::from_path;
use std::path::Path;
use uuid::Uuid;

use crate::{storage::blob::BlobRef, stored_object};

stored_object!(FileRecord, "file", {
    content_hash: String,
    display_name: String,
    blob_ref: BlobRef,
    #[serde(serialize_with = "serialize_datetime", deserialize_with = "deserialize_datetime")]
    uploaded_at: DateTime<Utc>,
    size_bytes: u64,
    mime_type: String
});

impl FileRecord {
    /// Builds a record for freshly stored content.
    ///
    /// The id is a UUID v7, so ids sort in creation order and break ties between records that
    /// share an `uploaded_at` timestamp.
    pub fn new(
        content_hash: String,
        display_name: String,
        blob_ref: BlobRef,
        uploaded_at: DateTime<Utc>,
        size_bytes: u64,
    ) -> Self {
        let mime_type = Self::guess_mime_type(Path::new(&display_name));
        Self {
            id: Uuid::now_v7().to_string(),
            content_hash,
            display_name,
            blob_ref,
            uploaded_at,
            size_bytes,
            mime_type,
        }
    }

    /// Guesses the MIME type based on the file extension.
    fn guess_mime_type(path: &Path) -> String {
        from_path(path)
            .first_or(mime::TEXT_PLAIN)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hashing::content_hash;

    fn record(name: &str, content: &[u8]) -> FileRecord {
        let hash = content_hash(content);
        FileRecord::new(
            hash.clone(),
            name.to_string(),
            BlobRef::from_hash(&hash),
            Utc::now(),
            content.len() as u64,
        )
    }

    #[test]
    fn test_new_record_fields() {
        let file = record("notes.txt", b"hello");
        assert_eq!(file.display_name, "notes.txt");
        assert_eq!(file.blob_ref.as_str(), file.content_hash);
        assert_eq!(file.size_bytes, 5);
        assert_eq!(file.mime_type, "text/plain");
        assert!(Uuid::parse_str(&file.id).is_ok());
    }

    #[test]
    fn test_ids_follow_creation_order() {
        let first = record("a.txt", b"a");
        let second = record("b.txt", b"b");
        assert!(first.id < second.id);
    }

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(
            FileRecord::guess_mime_type(Path::new("data.csv")),
            "text/csv".to_string()
        );
        assert_eq!(
            FileRecord::guess_mime_type(Path::new("README")),
            "text/plain".to_string()
        );
    }
}
