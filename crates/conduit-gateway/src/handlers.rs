// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Handles the vendor webhook endpoint and GET /health.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use conduit_core::{
    Channel, ChannelLog, ChannelLogType, ChannelType, ChannelUuid, ConduitError, HttpRecorder,
    IncomingRequest, ReceiveOutcome,
};

use crate::metrics;
use crate::server::GatewayState;

pub const MSG_ACCEPTED: &str = "Message Accepted";
pub const STATUS_ACCEPTED: &str = "Status Update Accepted";
pub const IGNORED: &str = "Ignored";
pub const ERROR: &str = "Error";

/// Body written back to the vendor. Diagnostic detail stays in the channel log.
#[derive(Debug, Serialize)]
pub struct ReceiveResponse {
    pub message: &'static str,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    /// Channel types with a registered handler, sorted.
    pub channel_types: Vec<String>,
}

struct Reply {
    status: StatusCode,
    message: &'static str,
    outcome: &'static str,
}

impl Reply {
    fn new(status: StatusCode, message: &'static str, outcome: &'static str) -> Self {
        Self {
            status,
            message,
            outcome,
        }
    }
}

fn render(status: StatusCode, message: &'static str) -> (StatusCode, HeaderMap, Bytes) {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let body = Bytes::from(serde_json::to_vec(&ReceiveResponse { message }).unwrap_or_default());
    (status, headers, body)
}

/// A rejection that happens before a channel is known, so nothing is logged
/// to a channel log.
fn reject(channel_type: &ChannelType, status: StatusCode, outcome: &'static str) -> Response {
    metrics::record_receive(channel_type.as_str(), outcome);
    render(status, ERROR).into_response()
}

/// POST|GET /{prefix}/{channel_type}/{uuid}/receive
///
/// Resolves the handler and channel, lets the handler interpret the
/// request, writes what it produced and persists the finalized channel log.
pub async fn receive(
    State(state): State<GatewayState>,
    Path((channel_type, uuid)): Path<(String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let channel_type = ChannelType::new(&channel_type);

    let Some(handler) = state.registry.get(&channel_type) else {
        warn!(%channel_type, "no handler registered for channel type");
        return reject(&channel_type, StatusCode::NOT_FOUND, "unknown_handler");
    };

    let Ok(channel_uuid) = ChannelUuid::from_str(&uuid) else {
        debug!(%channel_type, uuid = %uuid, "invalid channel uuid");
        return reject(&channel_type, StatusCode::BAD_REQUEST, "invalid_channel");
    };

    let channel = match state.backend.get_channel(&channel_type, channel_uuid).await {
        Ok(channel) => channel,
        Err(e) => {
            debug!(%channel_type, uuid = %channel_uuid, error = %e, "channel lookup failed");
            return reject(&channel_type, StatusCode::BAD_REQUEST, "invalid_channel");
        }
    };

    if !channel.role.can_receive() {
        debug!(%channel_type, uuid = %channel.uuid, "channel does not receive");
        return reject(&channel_type, StatusCode::BAD_REQUEST, "receive_disabled");
    }

    let request = IncomingRequest::new(method, uri, headers, body);
    let mut clog = ChannelLog::new_for_incoming(
        ChannelLogType::Unknown,
        Arc::clone(&channel),
        HttpRecorder::new(request.to_traced()),
        handler.redact_values(&channel),
    );

    let reply = match handler.receive(&channel, &request, &mut clog).await {
        Ok(outcome) => {
            if clog.log_type() == ChannelLogType::Unknown {
                clog.set_type(outcome.log_type());
            }
            write_outcome(&state, &channel, outcome).await
        }
        Err(e) => {
            debug!(%channel_type, channel_uuid = %channel.uuid, error = %clog.redactor().redact(&e.to_string()), "request rejected by handler");
            // TODO: record a typed request validation code once ChannelError grows one
            #[allow(deprecated)]
            clog.raw_error(&e);
            Reply::new(StatusCode::BAD_REQUEST, ERROR, "rejected")
        }
    };

    let (status, response_headers, response_body) = render(reply.status, reply.message);
    if let Some(recorder) = clog.recorder_mut() {
        recorder.respond(status.as_u16(), &response_headers, response_body.clone());
    }
    clog.end();

    match state.backend.write_channel_log(&clog).await {
        Ok(()) => clog.set_attached(),
        Err(e) => error!(channel_log_uuid = %clog.uuid(), error = %e, "failed to persist channel log"),
    }

    metrics::record_receive(channel_type.as_str(), reply.outcome);
    info!(
        %channel_type,
        channel_uuid = %channel.uuid,
        log_type = %clog.log_type(),
        status = status.as_u16(),
        elapsed_ms = clog.elapsed().as_millis() as u64,
        "webhook handled"
    );

    (status, response_headers, response_body).into_response()
}

async fn write_outcome(state: &GatewayState, channel: &Channel, outcome: ReceiveOutcome) -> Reply {
    match outcome {
        ReceiveOutcome::Msgs(msgs) => {
            for msg in &msgs {
                if let Err(e) = state.backend.write_msg(msg).await {
                    error!(msg_uuid = %msg.uuid, error = %e, "failed to write message");
                    return Reply::new(StatusCode::INTERNAL_SERVER_ERROR, ERROR, "backend_error");
                }
            }
            Reply::new(StatusCode::OK, MSG_ACCEPTED, "msg")
        }
        ReceiveOutcome::Statuses(statuses) => {
            for status in &statuses {
                match state.backend.write_status_update(status).await {
                    Ok(()) => {}
                    Err(ConduitError::MsgNotFound { external_id }) => {
                        warn!(
                            channel_uuid = %channel.uuid,
                            external_id = %external_id,
                            status = %status.status,
                            "status update for unknown message"
                        );
                        metrics::record_status_unresolved(channel.channel_type.as_str());
                    }
                    Err(e) => {
                        error!(external_id = %status.external_id, error = %e, "failed to write status update");
                        return Reply::new(StatusCode::INTERNAL_SERVER_ERROR, ERROR, "backend_error");
                    }
                }
            }
            Reply::new(StatusCode::OK, STATUS_ACCEPTED, "status")
        }
        ReceiveOutcome::Ignored(reason) => {
            debug!(channel_uuid = %channel.uuid, reason = %reason, "request ignored");
            Reply::new(StatusCode::OK, IGNORED, "ignored")
        }
    }
}

/// GET /health
pub async fn health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let channel_types = state
        .registry
        .list()
        .iter()
        .map(|h| h.channel_type().to_string())
        .collect();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
        channel_types,
    })
}
