// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-interaction audit record of HTTP traffic and errors.
//!
//! A [`ChannelLog`] is opened at the start of one interaction with a channel
//! (an incoming webhook, a send, an attachment fetch), appended to while the
//! handler runs, and finalized exactly once with [`ChannelLog::end`]. It is
//! owned by that interaction and passed by `&mut`, so appends never race.
//!
//! Everything appended goes through the log's [`Redactor`] first: no
//! credential configured on the channel reaches a persisted log.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use conduit_security::{Redactor, DEFAULT_MASK};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::channel_error::ChannelError;
use crate::http_log::{HttpLog, HttpRecorder, HttpTrace, REQUEST_BODY_LIMIT, RESPONSE_BODY_LIMIT};
use crate::msg::Msg;
use crate::types::{Channel, ChannelLogUuid, ChannelUuid};

/// The kind of channel interaction being logged.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChannelLogType {
    #[default]
    Unknown,
    MsgSend,
    MsgStatus,
    MsgReceive,
    EventReceive,
    MultiReceive,
    AttachmentFetch,
    TokenRefresh,
    PageSubscribe,
    WebhookVerify,
}

/// HTTP traces and errors generated by one interaction with a channel.
#[derive(Debug)]
pub struct ChannelLog {
    uuid: ChannelLogUuid,
    log_type: ChannelLogType,
    channel: Arc<Channel>,
    http_logs: Vec<HttpLog>,
    errors: Vec<ChannelError>,
    created_on: DateTime<Utc>,
    started: Instant,
    elapsed: Duration,
    attached: bool,
    recorder: Option<HttpRecorder>,
    redactor: Redactor,
}

impl ChannelLog {
    /// Log for an incoming request. The type is often only known once the
    /// handler has parsed the payload, so it may start as
    /// [`ChannelLogType::Unknown`] and be corrected with [`set_type`](Self::set_type).
    pub fn new_for_incoming<I, S>(
        log_type: ChannelLogType,
        channel: Arc<Channel>,
        recorder: HttpRecorder,
        redact_values: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(log_type, channel, Some(recorder), redact_values)
    }

    /// Log for sending `msg`.
    pub fn new_for_send<I, S>(msg: &Msg, redact_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(ChannelLogType::MsgSend, Arc::clone(&msg.channel), None, redact_values)
    }

    /// Log for fetching an attachment from the vendor.
    pub fn new_for_attachment_fetch<I, S>(channel: Arc<Channel>, redact_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(ChannelLogType::AttachmentFetch, channel, None, redact_values)
    }

    pub fn new<I, S>(log_type: ChannelLogType, channel: Arc<Channel>, redact_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(log_type, channel, None, redact_values)
    }

    fn build<I, S>(
        log_type: ChannelLogType,
        channel: Arc<Channel>,
        recorder: Option<HttpRecorder>,
        redact_values: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            uuid: ChannelLogUuid::new_v4(),
            log_type,
            channel,
            http_logs: Vec::new(),
            errors: Vec::new(),
            created_on: Utc::now(),
            started: Instant::now(),
            elapsed: Duration::ZERO,
            attached: false,
            recorder,
            redactor: Redactor::new(DEFAULT_MASK, redact_values),
        }
    }

    /// Append one HTTP exchange, redacted and truncated.
    pub fn http(&mut self, trace: &HttpTrace) {
        let log = self.trace_to_log(trace);
        debug!(
            log_uuid = %self.uuid,
            url = %log.url,
            status = log.status_code,
            elapsed_ms = log.elapsed_ms,
            "channel log http"
        );
        self.http_logs.push(log);
    }

    /// Append one error, redacted.
    pub fn error(&mut self, err: ChannelError) {
        let err = err.redact(&self.redactor);
        debug!(log_uuid = %self.uuid, code = err.code(), message = err.message(), "channel log error");
        self.errors.push(err);
    }

    /// Append a generic failure as an error with no code.
    #[deprecated(note = "record a typed ChannelError with `error` instead")]
    pub fn raw_error(&mut self, err: &dyn std::error::Error) {
        self.error(ChannelError::new("", "", err.to_string()));
    }

    /// Finalize the log.
    ///
    /// For incoming requests the recorder's trace is placed first so the
    /// triggering request is always the first exchange in the log. Callers
    /// invoke this once per interaction.
    pub fn end(&mut self) {
        if let Some(recorder) = self.recorder.take() {
            let log = self.trace_to_log(recorder.trace());
            self.http_logs.insert(0, log);
        }
        self.elapsed = self.started.elapsed();
    }

    /// True if any error was recorded or any exchange failed (no response,
    /// or a status outside 2xx/3xx).
    pub fn is_error(&self) -> bool {
        !self.errors.is_empty() || self.http_logs.iter().any(HttpLog::is_error)
    }

    pub fn uuid(&self) -> ChannelLogUuid {
        self.uuid
    }

    pub fn log_type(&self) -> ChannelLogType {
        self.log_type
    }

    pub fn set_type(&mut self, log_type: ChannelLogType) {
        self.log_type = log_type;
    }

    pub fn channel(&self) -> &Arc<Channel> {
        &self.channel
    }

    pub fn attached(&self) -> bool {
        self.attached
    }

    /// Mark the log as durably persisted. There is no way back.
    pub fn set_attached(&mut self) {
        self.attached = true;
    }

    pub fn http_logs(&self) -> &[HttpLog] {
        &self.http_logs
    }

    pub fn errors(&self) -> &[ChannelError] {
        &self.errors
    }

    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    /// The pending recorder of an incoming log, until [`end`](Self::end) consumes it.
    pub fn recorder_mut(&mut self) -> Option<&mut HttpRecorder> {
        self.recorder.as_mut()
    }

    /// Snapshot for persistence.
    pub fn to_record(&self) -> ChannelLogRecord {
        ChannelLogRecord {
            uuid: self.uuid,
            log_type: self.log_type,
            channel_uuid: self.channel.uuid,
            http_logs: self.http_logs.clone(),
            errors: self.errors.clone(),
            is_error: self.is_error(),
            created_on: self.created_on,
            elapsed_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn trace_to_log(&self, trace: &HttpTrace) -> HttpLog {
        HttpLog::new(trace, REQUEST_BODY_LIMIT, RESPONSE_BODY_LIMIT, &self.redactor)
    }
}

/// The persisted form of a finalized [`ChannelLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLogRecord {
    pub uuid: ChannelLogUuid,
    #[serde(rename = "type")]
    pub log_type: ChannelLogType,
    pub channel_uuid: ChannelUuid,
    pub http_logs: Vec<HttpLog>,
    pub errors: Vec<ChannelError>,
    pub is_error: bool,
    pub created_on: DateTime<Utc>,
    pub elapsed_ms: u64,
}
