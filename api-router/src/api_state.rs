use std::sync::Arc;

use common::{
    error::AppError,
    service::TextFileService,
    storage::{db::SurrealDbClient, store::StorageManager},
    utils::config::AppConfig,
};

#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<SurrealDbClient>,
    pub config: AppConfig,
    pub files: TextFileService,
}

impl ApiState {
    pub async fn new(config: &AppConfig, storage: StorageManager) -> Result<Self, AppError> {
        let surreal_db_client = Arc::new(
            SurrealDbClient::new(
                &config.surrealdb_address,
                config.surrealdb_username.as_deref(),
                config.surrealdb_password.as_deref(),
                &config.surrealdb_namespace,
                &config.surrealdb_database,
            )
            .await?,
        );

        surreal_db_client.ensure_initialized().await?;

        Ok(Self::from_parts(surreal_db_client, config.clone(), storage))
    }

    /// Wires the file service over an already initialized database and storage.
    pub fn from_parts(db: Arc<SurrealDbClient>, config: AppConfig, storage: StorageManager) -> Self {
        let files = TextFileService::new(db.clone(), Arc::new(storage));

        Self { db, config, files }
    }
}
