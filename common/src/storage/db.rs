use crate::error::AppError;

use super::types::StoredObject;
use surrealdb::{
    engine::any::{connect, Any},
    opt::auth::Root,
    Error, Surreal,
};
use tracing::debug;

#[derive(Clone)]
pub struct SurrealDbClient {
    pub client: Surreal<Any>,
}

impl SurrealDbClient {
    /// # Initialize a new database client
    ///
    /// Signs in as root only when both credentials are supplied, so embedded engines such as
    /// `mem://` work without any user defined.
    pub async fn new(
        address: &str,
        username: Option<&str>,
        password: Option<&str>,
        namespace: &str,
        database: &str,
    ) -> Result<Self, Error> {
        let db = connect(address).await?;

        if let (Some(username), Some(password)) = (username, password) {
            db.signin(Root { username, password }).await?;
        }

        db.use_ns(namespace).use_db(database).await?;

        Ok(SurrealDbClient { client: db })
    }

    /// Defines the tables and indexes the catalog relies on. Safe to run repeatedly.
    pub async fn ensure_initialized(&self) -> Result<(), AppError> {
        self.build_indexes().await?;
        Ok(())
    }

    pub async fn build_indexes(&self) -> Result<(), Error> {
        debug!("Ensuring catalog schema");
        self.client
            .query("DEFINE TABLE IF NOT EXISTS file SCHEMALESS")
            .await?
            .check()?;
        self.client
            .query("DEFINE INDEX IF NOT EXISTS idx_file_content_hash ON TABLE file FIELDS content_hash UNIQUE")
            .await?
            .check()?;
        self.client
            .query("DEFINE INDEX IF NOT EXISTS idx_file_uploaded_at ON TABLE file FIELDS uploaded_at")
            .await?
            .check()?;

        Ok(())
    }

    /// Round trip used by the readiness probe.
    pub async fn ping(&self) -> Result<(), Error> {
        self.client.query("RETURN true").await?.check()?;
        Ok(())
    }

    /// Operation to store a object in SurrealDB, requires the struct to implement StoredObject
    ///
    /// # Arguments
    /// * `item` - The item to be stored
    ///
    /// # Returns
    /// * `Result` - Item or Error
    pub async fn store_item<T>(&self, item: T) -> Result<Option<T>, Error>
    where
        T: StoredObject + Send + Sync + 'static,
    {
        self.client
            .create((T::table_name(), item.get_id()))
            .content(item)
            .await
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl SurrealDbClient {
    /// Create an in-memory SurrealDB client for testing.
    pub async fn memory(namespace: &str, database: &str) -> Result<Self, Error> {
        let db = connect("mem://").await?;

        db.use_ns(namespace).use_db(database).await?;

        Ok(SurrealDbClient { client: db })
    }
}

#[cfg(test)]
mod tests {
    use crate::stored_object;

    use super::*;
    use uuid::Uuid;

    stored_object!(Dummy, "dummy", {
        name: String
    });

    #[tokio::test]
    async fn test_initialization_and_store() {
        let namespace = "test_ns";
        let database = &Uuid::new_v4().to_string(); // ensures isolation per test run
        let db = SurrealDbClient::memory(namespace, database)
            .await
            .expect("Failed to start in-memory surrealdb");

        db.ensure_initialized()
            .await
            .expect("Failed to initialize schema");

        let dummy = Dummy {
            id: "abc".to_string(),
            name: "first".to_string(),
        };

        let stored = db.store_item(dummy.clone()).await.expect("Failed to store");
        assert!(stored.is_some());

        let fetched: Option<Dummy> = db
            .client
            .select((Dummy::table_name(), dummy.id.as_str()))
            .await
            .expect("Failed to fetch");
        assert_eq!(fetched, Some(dummy));
    }

    #[tokio::test]
    async fn test_initialization_is_repeatable() {
        let database = &Uuid::new_v4().to_string();
        let db = SurrealDbClient::memory("test_ns", database)
            .await
            .expect("Failed to start in-memory surrealdb");

        db.ensure_initialized().await.expect("first init");
        db.ensure_initialized().await.expect("second init");
        db.ping().await.expect("ping");
    }

    #[tokio::test]
    async fn test_store_item_rejects_existing_id() {
        let database = &Uuid::new_v4().to_string();
        let db = SurrealDbClient::memory("test_ns", database)
            .await
            .expect("Failed to start in-memory surrealdb");

        let dummy = Dummy {
            id: "same".to_string(),
            name: "first".to_string(),
        };
        db.store_item(dummy.clone()).await.expect("first store");
        assert!(db.store_item(dummy).await.is_err());
    }
}
