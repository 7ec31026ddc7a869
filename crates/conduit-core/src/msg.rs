// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical messages, attachments and delivery status updates.

use std::sync::Arc;

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::channel_error::ChannelError;
use crate::types::{Channel, ChannelUuid, MsgUuid};
use crate::urn::Urn;

/// A message attachment: a media type plus where to find the media.
///
/// Serialized as `content-type:url`. A `data:` URL carries the payload
/// inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub content_type: String,
    pub url: String,
}

impl Attachment {
    pub fn new(content_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            url: url.into(),
        }
    }

    /// Parse the `content-type:url` form. Returns `None` if either half is empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (content_type, url) = s.split_once(':')?;
        if content_type.is_empty() || url.is_empty() {
            return None;
        }
        Some(Self::new(content_type, url))
    }

    /// The top-level media type, e.g. `image` for `image/jpeg`.
    pub fn media_type(&self) -> &str {
        self.content_type
            .split_once('/')
            .map(|(t, _)| t)
            .unwrap_or(&self.content_type)
    }

    pub fn is_inline(&self) -> bool {
        self.url.starts_with("data:")
    }

    /// Decode an inline `data:` payload.
    ///
    /// Base64 and percent-free plain payloads are supported. Anything else,
    /// including a non-inline attachment, is not decodable.
    pub fn decode_inline(&self) -> Result<Vec<u8>, ChannelError> {
        let rest = self
            .url
            .strip_prefix("data:")
            .ok_or_else(ChannelError::attachment_not_decodable)?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(ChannelError::attachment_not_decodable)?;

        if meta.ends_with(";base64") {
            base64::engine::general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|_| ChannelError::attachment_not_decodable())
        } else if payload.contains('%') {
            Err(ChannelError::attachment_not_decodable())
        } else {
            Ok(payload.as_bytes().to_vec())
        }
    }
}

impl std::fmt::Display for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.content_type, self.url)
    }
}

/// A canonical message, either received from a vendor or handed to a
/// handler for sending.
#[derive(Debug, Clone)]
pub struct Msg {
    pub uuid: MsgUuid,
    pub channel: Arc<Channel>,
    pub urn: Urn,
    pub text: String,
    pub attachments: Vec<Attachment>,
    /// Identifier assigned by the vendor.
    pub external_id: Option<String>,
    pub received_on: Option<DateTime<Utc>>,
}

impl Msg {
    /// A message received from `urn` on `channel`.
    pub fn new_incoming(channel: Arc<Channel>, urn: Urn, text: impl Into<String>) -> Self {
        Self {
            uuid: MsgUuid::new_v4(),
            channel,
            urn,
            text: text.into(),
            attachments: Vec::new(),
            external_id: None,
            received_on: Some(Utc::now()),
        }
    }

    /// A message to be sent to `urn` over `channel`.
    pub fn new_outgoing(channel: Arc<Channel>, urn: Urn, text: impl Into<String>) -> Self {
        Self {
            uuid: MsgUuid::new_v4(),
            channel,
            urn,
            text: text.into(),
            attachments: Vec::new(),
            external_id: None,
            received_on: None,
        }
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        let external_id = external_id.into();
        if !external_id.is_empty() {
            self.external_id = Some(external_id);
        }
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Text followed by one attachment URL per line, for text-only vendors.
    pub fn text_and_attachment_urls(&self) -> String {
        let mut buf = self.text.clone();
        for attachment in &self.attachments {
            buf.push('\n');
            buf.push_str(&attachment.url);
        }
        buf.trim().to_string()
    }
}

/// Delivery states a message can report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MsgStatusValue {
    Pending,
    Queued,
    Wired,
    Sent,
    Delivered,
    Read,
    Failed,
    Errored,
}

/// An update to the delivery state of a previously sent message, keyed by
/// the external id the vendor returned at send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgStatus {
    pub channel_uuid: ChannelUuid,
    pub external_id: String,
    pub status: MsgStatusValue,
    pub created_on: DateTime<Utc>,
}

impl MsgStatus {
    pub fn by_external_id(
        channel: &Channel,
        external_id: impl Into<String>,
        status: MsgStatusValue,
    ) -> Self {
        Self {
            channel_uuid: channel.uuid,
            external_id: external_id.into(),
            status,
            created_on: Utc::now(),
        }
    }
}
