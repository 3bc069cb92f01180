//! Shared harness: a full gateway on an ephemeral port backed by in-memory
//! SQLite, a temp artifact directory and a fake recognition service.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::body::Bytes;
use axum::routing::post;
use plate_gateway::app_state::AppState;
use plate_gateway::domain::MatchMode;
use plate_gateway::persistence::SqlitePersistence;
use plate_gateway::recognition::HttpRecognitionClient;
use plate_gateway::server::build_app;
use plate_gateway::service::{AllowListGate, ConnectionHub, HubSettings, IngestionPipeline};
use plate_gateway::storage::FsArtifactStore;
use tempfile::TempDir;

/// Base64 of `mosaic`, returned as the composite image.
pub const COMPOSITE_B64: &str = "bW9zYWlj";

/// A running gateway.
pub struct Gateway {
    pub addr: SocketAddr,
    pub state: AppState,
    pub artifacts: TempDir,
}

impl Gateway {
    pub fn http(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Waits until the hub holds `n` live connections.
    pub async fn wait_for_connections(&self, n: usize) {
        for _ in 0..200 {
            if self.state.hub.registry().len().await == n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("hub never reached {n} connections");
    }
}

async fn serve(app: axum::Router) -> SocketAddr {
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Starts a fake recognition service that reports `plates` for every upload.
pub async fn fake_recognizer(plates: Vec<&'static str>) -> String {
    slow_recognizer(plates, Duration::ZERO).await
}

/// Like [`fake_recognizer`], but each reply is held back by `delay`.
pub async fn slow_recognizer(plates: Vec<&'static str>, delay: Duration) -> String {
    let app = axum::Router::new().route(
        "/process-image/",
        post(move |_body: Bytes| {
            let plates = plates.clone();
            async move {
                tokio::time::sleep(delay).await;
                Json(serde_json::json!({
                    "mosaic_base64": COMPOSITE_B64,
                    "plate_texts": plates,
                }))
            }
        }),
    );
    let addr = serve(app).await;
    format!("http://{addr}/process-image/")
}

/// Starts a gateway whose recognition calls go to `recognition_url`.
pub async fn start(recognition_url: String) -> Gateway {
    start_with(recognition_url, HubSettings::default()).await
}

/// Starts a gateway with custom hub sizing.
pub async fn start_with(recognition_url: String, settings: HubSettings) -> Gateway {
    let Ok(artifacts) = tempfile::tempdir() else {
        panic!("tempdir failed");
    };
    let Ok(store) = FsArtifactStore::open(artifacts.path()).await else {
        panic!("artifact store failed");
    };
    let Ok(persistence) =
        SqlitePersistence::connect("sqlite::memory:", 1, Duration::from_secs(5)).await
    else {
        panic!("database failed");
    };
    let persistence = Arc::new(persistence);
    let Ok(recognizer) = HttpRecognitionClient::new(recognition_url, Some(Duration::from_secs(5)))
    else {
        panic!("client failed");
    };

    let gate = AllowListGate::new(Arc::clone(&persistence) as _, MatchMode::Exact);
    let pipeline = IngestionPipeline::new(
        Arc::new(store),
        Arc::new(recognizer),
        gate,
        Arc::clone(&persistence) as _,
    );
    let (hub, fan_out) = ConnectionHub::new(pipeline, settings);
    tokio::spawn(fan_out.run());

    let state = AppState {
        hub: Arc::new(hub),
        persistence,
    };
    let app = build_app(state.clone(), artifacts.path(), Duration::from_secs(5));
    let addr = serve(app).await;

    Gateway {
        addr,
        state,
        artifacts,
    }
}
