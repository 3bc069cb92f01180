//! Server assembly: wires collaborators into the hub and builds the router.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::config::GatewayConfig;
use crate::persistence::SqlitePersistence;
use crate::recognition::HttpRecognitionClient;
use crate::service::{AllowListGate, ConnectionHub, FanOut, IngestionPipeline};
use crate::storage::FsArtifactStore;
use crate::ws::handler::ws_handler;

/// Builds the axum application.
///
/// REST routes get `http_timeout`; the WebSocket routes do not, since an
/// upgraded connection outlives its request. Artifacts under
/// `artifact_dir` are served read-only at `/images`.
pub fn build_app(state: AppState, artifact_dir: &Path, http_timeout: Duration) -> Router {
    let rest = api::build_router().layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        http_timeout,
    ));

    Router::new()
        .merge(rest)
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .nest_service("/images", ServeDir::new(artifact_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Opens storage, the database and the recognition client, and assembles
/// the shared state plus the fan-out loop the caller must spawn.
///
/// # Errors
///
/// Returns an error if the artifact directory cannot be created, the
/// database cannot be opened or migrated, or the HTTP client fails to build.
pub async fn build_state(config: &GatewayConfig) -> anyhow::Result<(AppState, FanOut)> {
    let artifacts = FsArtifactStore::open(&config.artifact_dir)
        .await
        .context("opening artifact directory")?;

    let persistence = Arc::new(
        SqlitePersistence::connect(
            &config.database_url,
            config.database_max_connections,
            Duration::from_secs(config.database_connect_timeout_secs),
        )
        .await
        .context("opening database")?,
    );

    let recognizer =
        HttpRecognitionClient::new(config.recognition_url.clone(), config.recognition_timeout())
            .context("building recognition client")?;
    tracing::info!(endpoint = recognizer.endpoint(), "recognition client ready");

    let gate = AllowListGate::new(Arc::clone(&persistence) as _, config.plate_match_mode);
    let pipeline = IngestionPipeline::new(
        Arc::new(artifacts),
        Arc::new(recognizer),
        gate,
        Arc::clone(&persistence) as _,
    );

    let (hub, fan_out) = ConnectionHub::new(pipeline, config.hub_settings());
    let state = AppState {
        hub: Arc::new(hub),
        persistence,
    };
    Ok((state, fan_out))
}

/// Runs the gateway until Ctrl-C.
///
/// # Errors
///
/// Returns an error if startup fails (see [`build_state`]) or the listener
/// cannot be bound.
pub async fn run(config: GatewayConfig) -> anyhow::Result<()> {
    let (state, fan_out) = build_state(&config).await?;
    tokio::spawn(fan_out.run());

    let app = build_app(
        state,
        &config.artifact_dir,
        Duration::from_secs(config.http_timeout_secs),
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
