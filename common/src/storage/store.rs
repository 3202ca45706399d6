use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::{path::Path as ObjPath, ObjectStore};
use tracing::{debug, instrument};

use crate::{
    error::{AppError, CorpusError},
    storage::blob::{BlobRef, BlobStore},
    utils::{
        config::{AppConfig, StorageKind},
        hashing::content_hash,
    },
};

pub type DynStore = Arc<dyn ObjectStore>;

/// Storage manager with persistent state and proper lifecycle management.
#[derive(Clone)]
pub struct StorageManager {
    store: DynStore,
    backend_kind: StorageKind,
    local_base: Option<PathBuf>,
}

impl StorageManager {
    /// Create a new StorageManager with the specified configuration.
    ///
    /// This method validates the configuration and creates the appropriate
    /// storage backend with proper initialization.
    pub async fn new(cfg: &AppConfig) -> object_store::Result<Self> {
        let backend_kind = cfg.storage.clone();
        let (store, local_base) = create_storage_backend(cfg).await?;

        Ok(Self {
            store,
            backend_kind,
            local_base,
        })
    }

    /// Create a StorageManager with a custom storage backend.
    ///
    /// This method is useful for testing scenarios where you want to inject
    /// a specific storage backend.
    pub fn with_backend(store: DynStore, backend_kind: StorageKind) -> Self {
        Self {
            store,
            backend_kind,
            local_base: None,
        }
    }

    /// Get the storage backend kind.
    pub fn backend_kind(&self) -> &StorageKind {
        &self.backend_kind
    }

    /// Access the resolved local base directory when using the local backend.
    pub fn local_base_path(&self) -> Option<&Path> {
        self.local_base.as_deref()
    }

    /// List all objects below the specified prefix.
    pub async fn list(
        &self,
        prefix: Option<&str>,
    ) -> object_store::Result<Vec<object_store::ObjectMeta>> {
        let prefix_path = prefix.map(ObjPath::from);
        self.store.list(prefix_path.as_ref()).try_collect().await
    }

    /// Check if an object exists at the specified location.
    pub async fn exists(&self, location: &str) -> object_store::Result<bool> {
        let path = ObjPath::from(location);
        self.store
            .head(&path)
            .await
            .map(|_| true)
            .or_else(|e| match e {
                object_store::Error::NotFound { .. } => Ok(false),
                _ => Err(e),
            })
    }

    /// Number of blobs currently held.
    pub async fn blob_count(&self) -> object_store::Result<usize> {
        Ok(self.list(Some("blobs")).await?.len())
    }
}

#[async_trait]
impl BlobStore for StorageManager {
    #[instrument(skip_all, fields(size = bytes.len()))]
    async fn put(&self, bytes: Bytes) -> Result<BlobRef, AppError> {
        let blob_ref = BlobRef::from_hash(&content_hash(&bytes));
        let location = blob_ref.location();

        if self.exists(&location).await? {
            debug!(blob_ref = %blob_ref, "Blob already present, skipping write");
            return Ok(blob_ref);
        }

        let payload = object_store::PutPayload::from_bytes(bytes);
        self.store.put(&ObjPath::from(location), payload).await?;
        debug!(blob_ref = %blob_ref, "Stored blob");

        Ok(blob_ref)
    }

    async fn get(&self, blob_ref: &BlobRef) -> Result<Bytes, AppError> {
        let path = ObjPath::from(blob_ref.location());
        let result = match self.store.get(&path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(CorpusError::FileNotFound(blob_ref.to_string()).into())
            }
            Err(e) => return Err(e.into()),
        };
        Ok(result.bytes().await?)
    }
}

/// Create a storage backend based on configuration.
///
/// This factory function handles the creation and initialization of different
/// storage backends with proper error handling and validation.
async fn create_storage_backend(
    cfg: &AppConfig,
) -> object_store::Result<(DynStore, Option<PathBuf>)> {
    match cfg.storage {
        StorageKind::Local => {
            let base = resolve_base_dir(cfg);
            if !base.exists() {
                tokio::fs::create_dir_all(&base).await.map_err(|e| {
                    object_store::Error::Generic {
                        store: "LocalFileSystem",
                        source: e.into(),
                    }
                })?;
            }
            let store = LocalFileSystem::new_with_prefix(base.clone())?;
            Ok((Arc::new(store), Some(base)))
        }
        StorageKind::Memory => {
            let store = InMemory::new();
            Ok((Arc::new(store), None))
        }
    }
}

/// Resolve the absolute base directory used for local storage from config.
///
/// If `data_dir` is relative, it is resolved against the current working directory.
pub fn resolve_base_dir(cfg: &AppConfig) -> PathBuf {
    if cfg.data_dir.starts_with('/') {
        PathBuf::from(&cfg.data_dir)
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(&cfg.data_dir)
    }
}

/// Testing utilities for storage operations.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;

    /// Create a test configuration with memory storage.
    pub fn test_config_memory() -> AppConfig {
        AppConfig {
            data_dir: "/tmp/unused".into(), // Ignored for memory storage
            http_port: 0,
            storage: StorageKind::Memory,
            ..Default::default()
        }
    }

    /// Create a test configuration with local storage rooted at `base`.
    pub fn test_config_local(base: &Path) -> AppConfig {
        AppConfig {
            data_dir: base.to_string_lossy().into_owned(),
            http_port: 0,
            storage: StorageKind::Local,
            ..Default::default()
        }
    }

    /// Memory-backed storage manager for unit tests.
    pub async fn memory_storage() -> StorageManager {
        StorageManager::new(&test_config_memory())
            .await
            .expect("Failed to create test memory storage")
    }
}
