use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::{header::InvalidHeaderValue, HeaderValue},
    routing::{get, post},
    Router,
};
use common::utils::config::AppConfig;
use routes::{
    file::{get_blob, longest_lines, random_line, random_line_backward, upload_file},
    health::{healthcheck, hello, live},
    readiness::ready,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api_state;
pub mod error;
mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Endpoints for k8s/systemd probes
    let probes = Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live));

    let files = Router::new()
        .route(
            "/file/upload",
            post(upload_file).layer(DefaultBodyLimit::max(
                app_state.config.upload_max_body_bytes,
            )),
        )
        .route("/file/random", get(random_line))
        .route("/file/random-backward", get(random_line_backward))
        .route("/file/longest", get(longest_lines))
        .route("/file/blob/{blob_ref}", get(get_blob));

    probes.merge(files)
}

/// Unversioned routes served at the root.
pub fn root_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/hello", get(hello))
        .route("/healthcheck", get(healthcheck))
}

/// CORS policy allowing the configured origin, `*` meaning any.
pub fn cors_layer(config: &AppConfig) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = if config.cors_allowed_origin.trim() == "*" {
        AllowOrigin::any()
    } else {
        AllowOrigin::exact(HeaderValue::from_str(config.cors_allowed_origin.trim())?)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// The complete application: versioned API, root routes, CORS and request tracing.
pub fn app_router(app_state: ApiState) -> Result<Router, InvalidHeaderValue> {
    let cors = cors_layer(&app_state.config)?;

    Ok(Router::new()
        .nest("/api/v1", api_routes_v1(&app_state))
        .merge(root_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
