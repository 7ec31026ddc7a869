// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared wiring from configuration to live collaborators.

use std::str::FromStr;
use std::sync::Arc;

use conduit_config::ConduitConfig;
use conduit_core::{Channel, ChannelUuid, ConduitError, HandlerRegistry, HttpClient};
use conduit_storage::FsStorage;

/// Everything a command needs to handle traffic.
pub struct Runtime {
    pub client: HttpClient,
    pub registry: HandlerRegistry,
    pub channels: Vec<Arc<Channel>>,
    pub storage: FsStorage,
}

impl Runtime {
    pub fn from_config(config: &ConduitConfig) -> Result<Self, ConduitError> {
        let client = HttpClient::new(&config.http.client_config())
            .map_err(|e| ConduitError::Config(format!("failed to build HTTP client: {e}")))?;

        let mut registry = HandlerRegistry::new();
        conduit_sms::register_all(&mut registry, &client);

        let channels = config
            .build_channels()
            .map_err(|e| ConduitError::Config(e.to_string()))?
            .into_iter()
            .map(Arc::new)
            .collect();

        let storage = FsStorage::new(&config.storage.root, config.storage.base_url.clone());

        Ok(Self {
            client,
            registry,
            channels,
            storage,
        })
    }

    /// The configured channel with this UUID.
    pub fn find_channel(&self, uuid: &str) -> Result<Arc<Channel>, ConduitError> {
        let uuid = ChannelUuid::from_str(uuid.trim())
            .map_err(|e| ConduitError::Config(format!("invalid channel uuid `{uuid}`: {e}")))?;
        self.channels
            .iter()
            .find(|ch| ch.uuid == uuid)
            .cloned()
            .ok_or_else(|| ConduitError::Config(format!("no channel configured with uuid {uuid}")))
    }

    /// Configured channels whose type has no registered handler.
    pub fn unhandled_channels(&self) -> Vec<Arc<Channel>> {
        self.channels
            .iter()
            .filter(|ch| self.registry.get(&ch.channel_type).is_none())
            .cloned()
            .collect()
    }
}
