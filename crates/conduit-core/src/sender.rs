// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send orchestration: one outbound message, one finalized channel log.

use std::borrow::Cow;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::attachments::upload_inline_attachments;
use crate::channel_error::ChannelError;
use crate::channel_log::ChannelLog;
use crate::msg::{Attachment, Msg};
use crate::traits::handler::{ChannelHandler, SendError, SendResult};
use crate::traits::storage::Storage;

/// Send `msg` through `handler`.
///
/// Inline attachments are moved to `storage` before the handler sees the
/// message. If `cancel` fires first the in-flight call is dropped and the
/// send fails with [`SendError::ConnectionFailed`], recorded in the log as a
/// `send_cancelled` error. The returned log is always finalized and holds
/// whatever was traced up to that point.
pub async fn send_msg(
    handler: &dyn ChannelHandler,
    msg: &Msg,
    storage: Option<&dyn Storage>,
    cancel: &CancellationToken,
) -> (Result<SendResult, SendError>, ChannelLog) {
    let mut clog = ChannelLog::new_for_send(msg, handler.redact_values(&msg.channel));

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        result = deliver(handler, msg, storage, &mut clog) => Some(result),
    };

    let result = match outcome {
        Some(result) => result,
        None => {
            warn!(msg_uuid = %msg.uuid, channel_uuid = %msg.channel.uuid, "send cancelled");
            clog.error(ChannelError::send_cancelled());
            Err(SendError::ConnectionFailed)
        }
    };

    clog.end();

    match &result {
        Ok(sent) => info!(
            msg_uuid = %msg.uuid,
            channel_type = %msg.channel.channel_type,
            external_id = sent.external_id().unwrap_or(""),
            elapsed_ms = clog.elapsed().as_millis() as u64,
            "message sent"
        ),
        Err(e) => warn!(
            msg_uuid = %msg.uuid,
            channel_type = %msg.channel.channel_type,
            error = %e,
            "message send failed"
        ),
    }

    (result, clog)
}

async fn deliver(
    handler: &dyn ChannelHandler,
    msg: &Msg,
    storage: Option<&dyn Storage>,
    clog: &mut ChannelLog,
) -> Result<SendResult, SendError> {
    let msg = prepare(msg, storage, clog).await?;

    let result = handler.send(&msg, clog).await;
    if let Err(e) = &result {
        if let Some(err) = e.channel_error() {
            clog.error(err);
        }
    }
    result
}

async fn prepare<'a>(
    msg: &'a Msg,
    storage: Option<&dyn Storage>,
    clog: &mut ChannelLog,
) -> Result<Cow<'a, Msg>, SendError> {
    if !msg.channel.role.can_send() {
        return Err(config_error(
            clog,
            format!("channel {} cannot send", msg.channel.uuid),
        ));
    }

    if !msg.attachments.iter().any(Attachment::is_inline) {
        return Ok(Cow::Borrowed(msg));
    }

    match storage {
        Some(storage) => Ok(Cow::Owned(upload_inline_attachments(storage, msg, clog).await?)),
        None => Err(config_error(
            clog,
            "no storage configured for inline attachments".to_string(),
        )),
    }
}

fn config_error(clog: &mut ChannelLog, reason: String) -> SendError {
    let err = SendError::ChannelConfig(reason);
    if let Some(channel_error) = err.channel_error() {
        clog.error(channel_error);
    }
    err
}
