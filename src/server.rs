//! HTTP surface of the agent
//!
//! - `GET /.well-known/agent.json`: agent card
//! - `GET /health`: liveness and a few counters
//! - `GET /metrics`: metrics snapshot as JSON
//! - `POST` on any path: JSON-RPC
//! - `OPTIONS` on any path: CORS preflight
//!
//! RPC bodies are capped at [`MAX_BODY_BYTES`]. Anything else is answered
//! with `405 Method not allowed`. Every response carries permissive CORS
//! headers.

use crate::error::{AgentError, AgentResult};
use crate::observability::metrics::metrics;
use crate::protocol::{AgentCard, Dispatcher};
use bytes::Bytes;
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use warp::http::header::{HeaderMap, HeaderValue};
use warp::http::StatusCode;
use warp::reject::{LengthRequired, PayloadTooLarge};
use warp::{Filter, Rejection, Reply};

/// Largest JSON-RPC body accepted
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

/// Everything the route handlers need
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub card: AgentCard,
    pub llm_configured: bool,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, card: AgentCard, llm_configured: bool) -> Self {
        Self {
            dispatcher,
            card,
            llm_configured,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthStatus<'a> {
    status: &'static str,
    agent: &'a str,
    version: &'a str,
    tasks: usize,
    llm_configured: bool,
    timestamp: u64,
}

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "access-control-allow-origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("Content-Type"),
    );
    headers
}

/// Build the complete route tree
pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let with_state = warp::any().map(move || state.clone());

    let agent_card = warp::get()
        .and(warp::path(".well-known"))
        .and(warp::path("agent.json"))
        .and(warp::path::end())
        .and(with_state.clone())
        .map(|state: Arc<AppState>| warp::reply::json(&state.card));

    let health = warp::get()
        .and(warp::path("health"))
        .and(warp::path::end())
        .and(with_state.clone())
        .map(|state: Arc<AppState>| {
            let status = HealthStatus {
                status: "healthy",
                agent: &state.card.name,
                version: &state.card.version,
                tasks: state.dispatcher.processor().store().len(),
                llm_configured: state.llm_configured,
                timestamp: current_timestamp(),
            };
            warp::reply::json(&status)
        });

    let metrics_route = warp::get()
        .and(warp::path("metrics"))
        .and(warp::path::end())
        .map(|| warp::reply::json(&metrics().get_metrics()));

    let rpc = warp::post()
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_state)
        .and_then(handle_rpc);

    let preflight = warp::options().map(warp::reply);

    agent_card
        .or(health)
        .or(metrics_route)
        .or(rpc)
        .or(preflight)
        .recover(handle_rejection)
        .with(warp::reply::with::headers(cors_headers()))
}

async fn handle_rpc(body: Bytes, state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    let response = state.dispatcher.handle_body(&body).await;
    Ok(warp::reply::json(&response))
}

async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Infallible> {
    let (message, status) = if rejection.find::<PayloadTooLarge>().is_some() {
        ("Payload too large", StatusCode::PAYLOAD_TOO_LARGE)
    } else if rejection.find::<LengthRequired>().is_some() {
        ("Length required", StatusCode::LENGTH_REQUIRED)
    } else {
        ("Method not allowed", StatusCode::METHOD_NOT_ALLOWED)
    };

    debug!(?rejection, status = status.as_u16(), "Request rejected");
    Ok(warp::reply::with_status(message, status))
}

/// Bind `addr` and serve until `shutdown` resolves
pub async fn serve<S>(state: Arc<AppState>, addr: SocketAddr, shutdown: S) -> AgentResult<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (bound, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|e| AgentError::internal_error(format!("failed to bind {addr}: {e}")))?;

    info!(address = %bound, "HTTP server listening");
    info!("Agent card available at http://{bound}/.well-known/agent.json");
    server.await;
    info!("HTTP server stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully..."),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Failed to install signal handlers, falling back to ctrl-c");
            }
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Received ctrl-c, shutting down gracefully...");
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
