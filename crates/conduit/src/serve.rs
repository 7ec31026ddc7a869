// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `conduit serve` command implementation.

use std::sync::Arc;

use conduit_config::ConduitConfig;
use conduit_core::{Backend, ConduitError, Storage};
use conduit_gateway::{GatewayState, MemoryBackend, ServerConfig};
use tracing::{info, warn};

use crate::runtime::Runtime;
use crate::shutdown;

/// Run the gateway until SIGINT/SIGTERM.
pub async fn run_serve(config: ConduitConfig) -> Result<(), ConduitError> {
    conduit_gateway::metrics::register_metrics();

    let runtime = Runtime::from_config(&config)?;
    for channel in runtime.unhandled_channels() {
        warn!(
            channel_uuid = %channel.uuid,
            channel_type = %channel.channel_type,
            "no handler for configured channel, its webhooks will be rejected"
        );
    }

    if let Err(e) = runtime.storage.test().await {
        warn!(root = %runtime.storage.root().display(), error = %e, "attachment storage is not writable");
    }

    info!(
        channels = runtime.channels.len(),
        handlers = runtime.registry.len(),
        "starting gateway"
    );

    let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::with_channels(runtime.channels));
    let state = GatewayState::new(runtime.registry, backend);
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        path_prefix: config.server.path_prefix.clone(),
    };

    let cancel = shutdown::install_signal_handler();
    conduit_gateway::start_server(&server_config, state, cancel).await
}
