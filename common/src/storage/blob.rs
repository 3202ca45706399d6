use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, utils::hashing::is_content_hash};

/// Opaque handle to a blob held by a [`BlobStore`].
///
/// Blobs are addressed by the SHA256 of their bytes, so two distinct contents never share a
/// reference and re-uploading the same bytes always lands on the same one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(String);

impl BlobRef {
    /// Reference for content with the given SHA256 hex digest.
    pub fn from_hash(content_hash: &str) -> Self {
        Self(content_hash.to_string())
    }

    /// Parses a reference received from outside, rejecting anything that is not a digest.
    pub fn parse(value: &str) -> Option<Self> {
        is_content_hash(value).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Object location with a two-character fan-out: `blobs/ab/abcd...`.
    pub fn location(&self) -> String {
        let prefix = self.0.get(..2).unwrap_or("00");
        format!("blobs/{prefix}/{}", self.0)
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only, content-addressed byte storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` and returns their reference. Writing the same bytes twice is harmless.
    async fn put(&self, bytes: Bytes) -> Result<BlobRef, AppError>;

    /// Reads a blob back, failing with `CorpusError::FileNotFound` for unknown references.
    async fn get(&self, blob_ref: &BlobRef) -> Result<Bytes, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hashing::content_hash;

    #[test]
    fn test_location_fans_out_on_prefix() {
        let hash = content_hash(b"fan out");
        let blob_ref = BlobRef::from_hash(&hash);
        let location = blob_ref.location();
        assert!(location.starts_with(&format!("blobs/{}/", &hash[..2])));
        assert!(location.ends_with(&hash));
    }

    #[test]
    fn test_parse_rejects_non_digests() {
        let hash = content_hash(b"parse");
        assert_eq!(BlobRef::parse(&hash), Some(BlobRef::from_hash(&hash)));
        assert!(BlobRef::parse("../secret").is_none());
        assert!(BlobRef::parse("").is_none());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let blob_ref = BlobRef::from_hash(&content_hash(b"json"));
        let json = serde_json::to_string(&blob_ref).expect("serialize");
        assert_eq!(json, format!("\"{}\"", blob_ref.as_str()));
    }
}
