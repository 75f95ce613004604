//! Health endpoint served by the deployed container
//!
//! Cloud Run routes traffic to `$PORT` and probes `/` and `/health`.

use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::signal;

pub const DEFAULT_PORT: u16 = 8080;

pub const SERVICE_NAME: &str = "cloudops MCP server";

#[derive(Debug, Clone)]
pub struct ServerState {
    pub port: u16,
    pub environment: String,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    environment: String,
    port: u16,
    timestamp: String,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(health).options(preflight).fallback(fallback))
        .route("/health", get(health).options(preflight).fallback(fallback))
        .fallback(fallback)
        .with_state(state)
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    let body = Health {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        environment: state.environment,
        port: state.port,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    ([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(body))
}

async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                "Content-Type, Authorization",
            ),
        ],
    )
}

async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        return preflight().await.into_response();
    }
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found" })),
    )
        .into_response()
}

pub async fn serve(port: u16, environment: String) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(ServerState {
        port,
        environment: environment.clone(),
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%environment, "Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}
