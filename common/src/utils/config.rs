use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    Memory,
}

fn default_storage_kind() -> StorageKind {
    StorageKind::Local
}

/// Deployment flavour, selects defaults such as the log filter.
#[derive(Clone, Copy, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeployEnv {
    #[default]
    Development,
    Testing,
    Production,
}

impl DeployEnv {
    /// Filter directive used when `RUST_LOG` is not set.
    pub fn default_log_filter(self) -> &'static str {
        match self {
            Self::Development | Self::Testing => "debug",
            Self::Production => "info",
        }
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_storage_kind")]
    pub storage: StorageKind,
    #[serde(default = "default_surrealdb_address")]
    pub surrealdb_address: String,
    #[serde(default)]
    pub surrealdb_username: Option<String>,
    #[serde(default)]
    pub surrealdb_password: Option<String>,
    #[serde(default = "default_surrealdb_namespace")]
    pub surrealdb_namespace: String,
    #[serde(default = "default_surrealdb_database")]
    pub surrealdb_database: String,
    #[serde(default)]
    pub deploy_env: DeployEnv,
    #[serde(default = "default_cors_allowed_origin")]
    pub cors_allowed_origin: String,
    #[serde(default = "default_upload_max_body_bytes")]
    pub upload_max_body_bytes: usize,
    #[serde(default = "default_longest_count")]
    pub default_longest_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            data_dir: default_data_dir(),
            storage: default_storage_kind(),
            surrealdb_address: default_surrealdb_address(),
            surrealdb_username: None,
            surrealdb_password: None,
            surrealdb_namespace: default_surrealdb_namespace(),
            surrealdb_database: default_surrealdb_database(),
            deploy_env: DeployEnv::default(),
            cors_allowed_origin: default_cors_allowed_origin(),
            upload_max_body_bytes: default_upload_max_body_bytes(),
            default_longest_count: default_longest_count(),
        }
    }
}

fn default_http_port() -> u16 {
    5000
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_surrealdb_address() -> String {
    "mem://".to_string()
}

fn default_surrealdb_namespace() -> String {
    "textvault".to_string()
}

fn default_surrealdb_database() -> String {
    "files".to_string()
}

fn default_cors_allowed_origin() -> String {
    "*".to_string()
}

fn default_upload_max_body_bytes() -> usize {
    10_000_000
}

fn default_longest_count() -> usize {
    100
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_no_sources() {
        let config: AppConfig = Config::builder()
            .build()
            .expect("empty config builds")
            .try_deserialize()
            .expect("defaults deserialize");

        assert_eq!(config.http_port, 5000);
        assert_eq!(config.storage, StorageKind::Local);
        assert_eq!(config.surrealdb_address, "mem://");
        assert_eq!(config.deploy_env, DeployEnv::Development);
        assert_eq!(config.default_longest_count, 100);
        assert!(config.surrealdb_username.is_none());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config: AppConfig = Config::builder()
            .set_override("http_port", 8080)
            .expect("override port")
            .set_override("storage", "memory")
            .expect("override storage")
            .set_override("deploy_env", "production")
            .expect("override env")
            .build()
            .expect("config builds")
            .try_deserialize()
            .expect("config deserializes");

        assert_eq!(config.http_port, 8080);
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.deploy_env, DeployEnv::Production);
        assert_eq!(config.deploy_env.default_log_filter(), "info");
    }
}
