// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! BongoLive (`BL`) SMS aggregator handler.
//!
//! Inbound messages and delivery reports share one webhook and are told
//! apart by `msgtype`. Outbound messages are a form POST to the vendor's
//! send endpoint, answered with a JSON `results` array.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, warn};

use conduit_core::http::classify_status;
use conduit_core::types::{CONFIG_PASSWORD, CONFIG_SEND_URL, CONFIG_USERNAME};
use conduit_core::{
    Channel, ChannelHandler, ChannelLog, ChannelLogType, ChannelType, HttpClient, IncomingRequest,
    Msg, MsgStatus, MsgStatusValue, ReceiveError, ReceiveOutcome, SendError, SendResult, Urn,
};

/// Vendor type code.
pub const CHANNEL_TYPE: &str = "BL";

/// Production send endpoint.
pub const DEFAULT_SEND_URL: &str = "https://api.blsmsgw.com:8443/bin/send.json";

const MSGTYPE_STATUS: &str = "5";

/// Map a delivery report `status` to a canonical status.
fn status_for(code: &str) -> Option<MsgStatusValue> {
    match code {
        "1" => Some(MsgStatusValue::Delivered),
        "2" | "8" => Some(MsgStatusValue::Sent),
        "3" | "4" | "5" | "6" | "7" | "9" => Some(MsgStatusValue::Errored),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReceiveForm {
    msgtype: String,
    id: String,
    dlrid: String,
    message: String,
    sourceaddr: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    results: Vec<SendResponseResult>,
}

#[derive(Debug, Deserialize)]
struct SendResponseResult {
    #[serde(default)]
    status: serde_json::Value,
    #[serde(default)]
    msgid: serde_json::Value,
}

/// Render a JSON scalar as the string the vendor meant.
fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// BongoLive channel handler.
#[derive(Debug, Clone)]
pub struct BongoLiveHandler {
    client: HttpClient,
    send_url: String,
}

impl BongoLiveHandler {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            send_url: DEFAULT_SEND_URL.to_string(),
        }
    }

    /// Overrides the default send URL (for testing with wiremock).
    ///
    /// A `send_url` in the channel's own config still takes precedence.
    pub fn with_send_url(mut self, url: impl Into<String>) -> Self {
        self.send_url = url.into();
        self
    }

    fn receive_msg(
        &self,
        channel: &Arc<Channel>,
        form: ReceiveForm,
        clog: &mut ChannelLog,
    ) -> Result<ReceiveOutcome, ReceiveError> {
        clog.set_type(ChannelLogType::MsgReceive);

        if form.sourceaddr.is_empty() {
            return Err(ReceiveError::MissingField("sourceaddr"));
        }
        let urn = Urn::from_tel(&form.sourceaddr, channel.country.as_deref()).map_err(|_| {
            ReceiveError::InvalidValue {
                field: "sourceaddr",
                value: form.sourceaddr.clone(),
            }
        })?;

        let msg = Msg::new_incoming(Arc::clone(channel), urn, form.message).with_external_id(form.id);
        debug!(channel_uuid = %channel.uuid, msg_uuid = %msg.uuid, "bongolive message received");
        Ok(ReceiveOutcome::Msgs(vec![msg]))
    }

    fn receive_status(
        &self,
        channel: &Arc<Channel>,
        form: ReceiveForm,
        clog: &mut ChannelLog,
    ) -> Result<ReceiveOutcome, ReceiveError> {
        clog.set_type(ChannelLogType::MsgStatus);

        if form.dlrid.is_empty() {
            return Err(ReceiveError::MissingField("dlrid"));
        }
        let status = status_for(&form.status).ok_or_else(|| ReceiveError::InvalidValue {
            field: "status",
            value: form.status.clone(),
        })?;

        Ok(ReceiveOutcome::Statuses(vec![MsgStatus::by_external_id(
            channel, form.dlrid, status,
        )]))
    }
}

#[async_trait]
impl ChannelHandler for BongoLiveHandler {
    fn channel_type(&self) -> ChannelType {
        ChannelType::new(CHANNEL_TYPE)
    }

    fn channel_name(&self) -> &str {
        "BongoLive"
    }

    async fn receive(
        &self,
        channel: &Arc<Channel>,
        request: &IncomingRequest,
        clog: &mut ChannelLog,
    ) -> Result<ReceiveOutcome, ReceiveError> {
        let form: ReceiveForm = request.decode_form()?;

        match form.msgtype.as_str() {
            "" | "0" | "1" => self.receive_msg(channel, form, clog),
            MSGTYPE_STATUS => self.receive_status(channel, form, clog),
            other => Err(ReceiveError::InvalidValue {
                field: "msgtype",
                value: other.to_string(),
            }),
        }
    }

    async fn send(&self, msg: &Msg, clog: &mut ChannelLog) -> Result<SendResult, SendError> {
        let channel = &msg.channel;
        let username = channel
            .string_config(CONFIG_USERNAME)
            .ok_or_else(|| SendError::ChannelConfig("missing username".to_string()))?;
        let password = channel
            .string_config(CONFIG_PASSWORD)
            .ok_or_else(|| SendError::ChannelConfig("missing password".to_string()))?;
        let send_url = channel.string_config_or(CONFIG_SEND_URL, &self.send_url);

        let text = msg.text_and_attachment_urls();
        let form = [
            ("USERNAME", username.as_str()),
            ("PASSWORD", password.as_str()),
            ("SOURCEADDR", channel.address.as_str()),
            ("DESTADDR", msg.urn.path().trim_start_matches('+')),
            ("DLR", "1"),
            ("MESSAGE", text.as_str()),
            ("CHARCODE", "2"),
        ];
        let body = serde_urlencoded::to_string(form)
            .map_err(|e| SendError::MessageInvalid(e.to_string()))?;

        let request = self
            .client
            .inner()
            .post(&send_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(body)
            .build()
            .map_err(|e| SendError::ChannelConfig(format!("invalid send URL: {e}")))?;

        let response = classify_status(self.client.execute(request, clog).await)?;

        let parsed: SendResponse = serde_json::from_slice(&response.body).map_err(|_| {
            SendError::ResponseUnparseable {
                format: "JSON".to_string(),
            }
        })?;

        let first = parsed.results.first().ok_or_else(|| SendError::ResponseUnexpected {
            expected: "0".to_string(),
        })?;
        let status = scalar(&first.status);
        if status != "0" {
            warn!(msg_uuid = %msg.uuid, status = %status, "bongolive rejected message");
            return Err(SendError::ResponseUnexpected {
                expected: "0".to_string(),
            });
        }

        let mut result = SendResult::new();
        result.add_external_id(scalar(&first.msgid));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_canonical_values() {
        assert_eq!(status_for("1"), Some(MsgStatusValue::Delivered));
        assert_eq!(status_for("2"), Some(MsgStatusValue::Sent));
        assert_eq!(status_for("8"), Some(MsgStatusValue::Sent));
        for code in ["3", "4", "5", "6", "7", "9"] {
            assert_eq!(status_for(code), Some(MsgStatusValue::Errored), "{code}");
        }
        assert_eq!(status_for("12"), None);
        assert_eq!(status_for(""), None);
    }

    #[test]
    fn scalar_accepts_strings_and_numbers() {
        assert_eq!(scalar(&serde_json::json!("0")), "0");
        assert_eq!(scalar(&serde_json::json!(123)), "123");
        assert_eq!(scalar(&serde_json::Value::Null), "");
    }
}
