// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend trait for the runtime that owns channels, messages and logs.

use std::sync::Arc;

use async_trait::async_trait;

use crate::channel_log::ChannelLog;
use crate::error::ConduitError;
use crate::msg::{Msg, MsgStatus};
use crate::traits::handler::{SendError, SendResult};
use crate::types::{Channel, ChannelType, ChannelUuid};

/// Persistence boundary consumed by the gateway.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Look up an active channel by type and UUID.
    async fn get_channel(
        &self,
        channel_type: &ChannelType,
        uuid: ChannelUuid,
    ) -> Result<Arc<Channel>, ConduitError>;

    /// Persist a received message.
    async fn write_msg(&self, msg: &Msg) -> Result<(), ConduitError>;

    /// Apply a status update. Returns [`ConduitError::MsgNotFound`] when the
    /// external id matches no sent message.
    async fn write_status_update(&self, status: &MsgStatus) -> Result<(), ConduitError>;

    /// Record the outcome of a send so later status updates can resolve.
    async fn mark_sent(
        &self,
        msg: &Msg,
        result: &Result<SendResult, SendError>,
    ) -> Result<(), ConduitError>;

    /// Persist a finalized channel log.
    async fn write_channel_log(&self, clog: &ChannelLog) -> Result<(), ConduitError>;
}
