use api_router::{api_state::ApiState, app_router};
use common::{storage::store::StorageManager, utils::config::get_config};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Get config
    let config = get_config()?;

    // Set up tracing, RUST_LOG wins over the environment default
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.deploy_env.default_log_filter()));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok();

    // Create global storage manager
    let storage = StorageManager::new(&config).await?;
    info!(backend = ?storage.backend_kind(), "Storage initialized");

    let api_state = ApiState::new(&config, storage).await?;

    // Create Axum router
    let app = app_router(api_state)?;

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
