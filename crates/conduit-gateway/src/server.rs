// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::{Router, routing::get};
use conduit_core::{Backend, ConduitError, HandlerRegistry};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Handlers by channel type.
    pub registry: Arc<HandlerRegistry>,
    /// Channel lookup and persistence.
    pub backend: Arc<dyn Backend>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(registry: HandlerRegistry, backend: Arc<dyn Backend>) -> Self {
        Self {
            registry: Arc::new(registry),
            backend,
            start_time: Instant::now(),
        }
    }
}

/// Gateway server configuration (mirrors `ServerConfig` from conduit-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// First path segment of every receive URL.
    pub path_prefix: String,
}

/// Build the gateway router.
///
/// Routes:
/// - GET|POST /{prefix}/{channel_type}/{uuid}/receive (with or without trailing slash)
/// - GET /health
pub fn router(path_prefix: &str, state: GatewayState) -> Router {
    let receive_path = format!("/{path_prefix}/{{channel_type}}/{{uuid}}/receive");
    let receive = get(handlers::receive).post(handlers::receive);

    Router::new()
        .route("/health", get(handlers::health))
        .route(&receive_path, receive.clone())
        .route(&format!("{receive_path}/"), receive)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway and serve until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), ConduitError> {
    let app = router(&config.path_prefix, state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ConduitError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| ConduitError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    #[test]
    fn gateway_state_is_clone() {
        let state = GatewayState::new(HandlerRegistry::new(), Arc::new(MemoryBackend::new()));
        let cloned = state.clone();
        assert!(cloned.registry.is_empty());
    }

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            path_prefix: "c".to_string(),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
    }
}
