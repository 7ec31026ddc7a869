// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel handler trait implemented by every vendor adapter.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::channel_error::ChannelError;
use crate::channel_log::{ChannelLog, ChannelLogType};
use crate::http_log::TracedRequest;
use crate::msg::{Msg, MsgStatus};
use crate::types::{Channel, ChannelType};

/// An inbound webhook request, fully buffered.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IncomingRequest {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    /// Decode URL-encoded form fields from the query string and body into `T`.
    ///
    /// A field present in both takes the body's value.
    pub fn decode_form<T: DeserializeOwned>(&self) -> Result<T, ReceiveError> {
        let mut fields: Vec<(String, String)> = match self.uri.query() {
            Some(q) => serde_urlencoded::from_str(q)
                .map_err(|e| ReceiveError::Decode(e.to_string()))?,
            None => Vec::new(),
        };

        let body: Vec<(String, String)> = serde_urlencoded::from_bytes(&self.body)
            .map_err(|e| ReceiveError::Decode(e.to_string()))?;
        for (key, value) in body {
            fields.retain(|(k, _)| *k != key);
            fields.push((key, value));
        }

        let merged =
            serde_urlencoded::to_string(&fields).map_err(|e| ReceiveError::Decode(e.to_string()))?;
        serde_urlencoded::from_str(&merged).map_err(|e| ReceiveError::Decode(e.to_string()))
    }

    /// Snapshot for an [`HttpRecorder`](crate::http_log::HttpRecorder).
    pub fn to_traced(&self) -> TracedRequest {
        TracedRequest::new(&self.method, self.uri.to_string(), &self.headers, self.body.clone())
    }
}

/// What a handler made of an inbound request.
#[derive(Debug, Clone)]
pub enum ReceiveOutcome {
    /// New messages from end users.
    Msgs(Vec<Msg>),
    /// Delivery updates for previously sent messages.
    Statuses(Vec<MsgStatus>),
    /// A valid request that carries nothing to persist.
    Ignored(String),
}

impl ReceiveOutcome {
    /// The log type implied by this outcome, for handlers that never set one.
    pub fn log_type(&self) -> ChannelLogType {
        match self {
            ReceiveOutcome::Msgs(_) => ChannelLogType::MsgReceive,
            ReceiveOutcome::Statuses(_) => ChannelLogType::MsgStatus,
            ReceiveOutcome::Ignored(_) => ChannelLogType::Unknown,
        }
    }
}

/// A malformed or unsupported inbound request. Always answered with 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiveError {
    #[error("unable to decode request: {0}")]
    Decode(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("unsupported request: {0}")]
    Unsupported(String),
}

/// Outcome of a successful send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendResult {
    external_ids: Vec<String>,
}

impl SendResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identifier the vendor assigned. Empty ids are ignored.
    pub fn add_external_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !id.is_empty() {
            self.external_ids.push(id);
        }
    }

    pub fn external_ids(&self) -> &[String] {
        &self.external_ids
    }

    /// The first vendor id, used to correlate later status updates.
    pub fn external_id(&self) -> Option<&str> {
        self.external_ids.first().map(String::as_str)
    }
}

/// Classified send failure. The runtime decides retry from the variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// No usable response: transport failure, timeout, cancellation or 5xx.
    #[error("connection to channel failed")]
    ConnectionFailed,

    #[error("channel throttled the request")]
    ConnectionThrottled,

    /// The vendor answered with a non-success status.
    #[error("unexpected response status {status}")]
    ResponseStatus { status: u16 },

    #[error("unable to parse response as {format}")]
    ResponseUnparseable { format: String },

    #[error("unexpected response, expected '{expected}'")]
    ResponseUnexpected { expected: String },

    #[error("channel misconfigured: {0}")]
    ChannelConfig(String),

    #[error("message invalid for channel: {0}")]
    MessageInvalid(String),

    #[error("failed with reason {code}: {description}")]
    FailedWithReason { code: String, description: String },
}

impl SendError {
    /// The error to append to the send log, if the variant carries one.
    ///
    /// Connection-class failures are already visible in the HTTP traces.
    pub fn channel_error(&self) -> Option<ChannelError> {
        match self {
            SendError::ConnectionFailed | SendError::ConnectionThrottled => None,
            SendError::ResponseStatus { .. } => Some(ChannelError::response_status_code()),
            SendError::ResponseUnparseable { format } => {
                Some(ChannelError::response_unparseable(format))
            }
            SendError::ResponseUnexpected { expected } => {
                Some(ChannelError::response_unexpected(expected))
            }
            SendError::ChannelConfig(reason) | SendError::MessageInvalid(reason) => {
                Some(ChannelError::new("", "", reason.clone()))
            }
            SendError::FailedWithReason { code, description } => {
                Some(ChannelError::external(code, description))
            }
        }
    }

    /// Whether the runtime may try again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SendError::ConnectionFailed | SendError::ConnectionThrottled)
    }
}

/// A vendor adapter: parses that vendor's webhooks and delivers messages
/// through its API.
///
/// Handlers are registered once at startup and shared across requests, so
/// they hold no per-request state. Everything observable about a single
/// interaction goes into the `ChannelLog` passed in.
#[async_trait]
pub trait ChannelHandler: Send + Sync {
    /// The vendor type code this handler serves.
    fn channel_type(&self) -> ChannelType;

    /// Human-readable vendor name.
    fn channel_name(&self) -> &str;

    /// Values to mask in every log for `channel`.
    fn redact_values(&self, channel: &Channel) -> Vec<String> {
        channel.secret_values()
    }

    /// Parse an inbound request bound to `channel`.
    async fn receive(
        &self,
        channel: &Arc<Channel>,
        request: &IncomingRequest,
        clog: &mut ChannelLog,
    ) -> Result<ReceiveOutcome, ReceiveError>;

    /// Deliver `msg`, tracing every vendor call into `clog`.
    async fn send(&self, msg: &Msg, clog: &mut ChannelLog) -> Result<SendResult, SendError>;
}
