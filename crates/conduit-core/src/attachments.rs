// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moving attachment payloads between vendors and storage.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::channel_error::ChannelError;
use crate::channel_log::ChannelLog;
use crate::error::ConduitError;
use crate::http::{HttpClient, HttpError};
use crate::msg::{Attachment, Msg};
use crate::traits::handler::SendError;
use crate::traits::storage::{Storage, Upload};
use crate::types::Channel;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// File extension for a content type, `bin` when unknown.
pub fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/ogg" => "ogg",
        "audio/mp4" => "m4a",
        "video/mp4" => "mp4",
        "application/pdf" => "pdf",
        "text/plain" => "txt",
        _ => "bin",
    }
}

/// Replace every inline attachment of `msg` with a stored copy.
///
/// Returns a new message whose attachments all point at URLs. A payload
/// that cannot be decoded is logged as `attachment_not_decodable` and fails
/// the message. A storage failure is logged as `attachment_not_stored` and
/// fails the send as a connection failure so the runtime may retry it.
pub async fn upload_inline_attachments(
    storage: &dyn Storage,
    msg: &Msg,
    clog: &mut ChannelLog,
) -> Result<Msg, SendError> {
    let mut uploads = Vec::new();
    let mut slots = Vec::new();

    for (idx, attachment) in msg.attachments.iter().enumerate() {
        if !attachment.is_inline() {
            continue;
        }
        let body = match attachment.decode_inline() {
            Ok(body) => body,
            Err(e) => {
                clog.error(e);
                return Err(SendError::MessageInvalid(format!(
                    "attachment {idx} is not decodable"
                )));
            }
        };
        let path = format!(
            "attachments/{}/{}/{idx}.{}",
            msg.channel.uuid,
            msg.uuid,
            extension_for(&attachment.content_type)
        );
        uploads.push(Upload::new(path, attachment.content_type.clone(), Bytes::from(body)));
        slots.push(idx);
    }

    if uploads.is_empty() {
        return Ok(msg.clone());
    }

    let batch = storage.batch_put(&mut uploads).await;
    if let Err(e) = batch {
        warn!(storage = storage.name(), error = %e, "attachment batch upload failed");
        for upload in &uploads {
            clog.error(ChannelError::attachment_not_stored(&upload.path));
        }
        return Err(SendError::ConnectionFailed);
    }

    let mut resolved = msg.clone();
    for (idx, upload) in slots.into_iter().zip(uploads) {
        match (upload.url, upload.error) {
            (Some(url), None) => {
                debug!(msg_uuid = %msg.uuid, url = %url, "inline attachment stored");
                resolved.attachments[idx] = Attachment::new(upload.content_type, url);
            }
            (_, error) => {
                warn!(
                    msg_uuid = %msg.uuid,
                    path = %upload.path,
                    error = ?error.map(|e| e.to_string()),
                    "attachment upload failed"
                );
                clog.error(ChannelError::attachment_not_stored(&upload.path));
                return Err(SendError::ConnectionFailed);
            }
        }
    }
    Ok(resolved)
}

/// Failure to fetch a vendor-hosted attachment.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("attachment request failed: {0}")]
    Http(#[from] HttpError),

    #[error("attachment fetch returned status {0}")]
    Status(u16),

    #[error(transparent)]
    Storage(#[from] ConduitError),
}

/// Download an attachment from a vendor and store it.
///
/// Runs under its own `attachment_fetch` log, which is finalized and
/// returned whatever the outcome.
pub async fn fetch_attachment<I, S>(
    client: &HttpClient,
    storage: &dyn Storage,
    channel: Arc<Channel>,
    url: &str,
    redact_values: I,
) -> (Result<Attachment, FetchError>, ChannelLog)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut clog = ChannelLog::new_for_attachment_fetch(Arc::clone(&channel), redact_values);
    let result = fetch_and_store(client, storage, &channel, url, &mut clog).await;
    clog.end();
    (result, clog)
}

async fn fetch_and_store(
    client: &HttpClient,
    storage: &dyn Storage,
    channel: &Channel,
    url: &str,
    clog: &mut ChannelLog,
) -> Result<Attachment, FetchError> {
    let request = client
        .inner()
        .get(url)
        .build()
        .map_err(HttpError::from)?;
    let response = client.execute(request, clog).await?;

    if !(200..300).contains(&response.status) {
        clog.error(ChannelError::response_status_code());
        return Err(FetchError::Status(response.status));
    }

    let content_type = response
        .content_type()
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();

    let path = format!(
        "attachments/{}/{}.{}",
        channel.uuid,
        Uuid::new_v4(),
        extension_for(&content_type)
    );
    let stored_url = storage.put(&path, &content_type, response.body).await?;
    Ok(Attachment::new(content_type, stored_url))
}
