// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory runtime backend.
//!
//! Holds configured channels, received messages, status updates and
//! finalized channel logs for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use conduit_core::{
    Backend, Channel, ChannelLog, ChannelLogRecord, ChannelType, ChannelUuid, ConduitError, Msg,
    MsgStatus, MsgUuid, SendError, SendResult,
};

#[derive(Default)]
struct State {
    msgs: Vec<Msg>,
    statuses: Vec<MsgStatus>,
    // (channel, external id) -> message that was sent with it
    sent: HashMap<(ChannelUuid, String), MsgUuid>,
    logs: Vec<ChannelLogRecord>,
}

/// A [`Backend`] that keeps everything in memory.
#[derive(Default)]
pub struct MemoryBackend {
    channels: HashMap<(ChannelType, ChannelUuid), Arc<Channel>>,
    state: RwLock<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend serving exactly `channels`.
    pub fn with_channels(channels: impl IntoIterator<Item = Arc<Channel>>) -> Self {
        let channels = channels
            .into_iter()
            .map(|ch| ((ch.channel_type.clone(), ch.uuid), ch))
            .collect();
        Self {
            channels,
            state: RwLock::new(State::default()),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Received messages, in arrival order.
    pub async fn msgs(&self) -> Vec<Msg> {
        self.state.read().await.msgs.clone()
    }

    /// Applied status updates, in arrival order.
    pub async fn statuses(&self) -> Vec<MsgStatus> {
        self.state.read().await.statuses.clone()
    }

    /// Persisted channel logs, in arrival order.
    pub async fn channel_logs(&self) -> Vec<ChannelLogRecord> {
        self.state.read().await.logs.clone()
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("channels", &self.channels.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get_channel(
        &self,
        channel_type: &ChannelType,
        uuid: ChannelUuid,
    ) -> Result<Arc<Channel>, ConduitError> {
        self.channels
            .get(&(channel_type.clone(), uuid))
            .cloned()
            .ok_or_else(|| ConduitError::ChannelNotFound {
                channel_type: channel_type.to_string(),
                uuid: uuid.to_string(),
            })
    }

    async fn write_msg(&self, msg: &Msg) -> Result<(), ConduitError> {
        debug!(msg_uuid = %msg.uuid, channel_uuid = %msg.channel.uuid, "message stored");
        self.state.write().await.msgs.push(msg.clone());
        Ok(())
    }

    async fn write_status_update(&self, status: &MsgStatus) -> Result<(), ConduitError> {
        let mut state = self.state.write().await;
        let key = (status.channel_uuid, status.external_id.clone());
        if !state.sent.contains_key(&key) {
            return Err(ConduitError::MsgNotFound {
                external_id: status.external_id.clone(),
            });
        }
        state.statuses.push(status.clone());
        Ok(())
    }

    async fn mark_sent(
        &self,
        msg: &Msg,
        result: &Result<SendResult, SendError>,
    ) -> Result<(), ConduitError> {
        let Ok(result) = result else {
            return Ok(());
        };
        let mut state = self.state.write().await;
        for external_id in result.external_ids() {
            state
                .sent
                .insert((msg.channel.uuid, external_id.clone()), msg.uuid);
        }
        Ok(())
    }

    async fn write_channel_log(&self, clog: &ChannelLog) -> Result<(), ConduitError> {
        self.state.write().await.logs.push(clog.to_record());
        Ok(())
    }
}
