// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for inbound webhook requests and their channel logs.

use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method, Uri};

use conduit_core::{Channel, ChannelLog, ChannelLogType, HttpRecorder, IncomingRequest};

/// A URL-encoded form `POST` to `uri`.
pub fn form_request(uri: &str, body: &str) -> IncomingRequest {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    IncomingRequest::new(Method::POST, parse_uri(uri), headers, Bytes::from(body.to_string()))
}

/// A bodiless `GET` to `uri`.
pub fn get_request(uri: &str) -> IncomingRequest {
    IncomingRequest::new(Method::GET, parse_uri(uri), HeaderMap::new(), Bytes::new())
}

fn parse_uri(uri: &str) -> Uri {
    uri.parse()
        .unwrap_or_else(|e| panic!("invalid test URI {uri:?}: {e}"))
}

/// An incoming-request log for `request` on `channel`, redacting its secrets.
pub fn incoming_log(channel: &Arc<Channel>, request: &IncomingRequest) -> ChannelLog {
    ChannelLog::new_for_incoming(
        ChannelLogType::Unknown,
        Arc::clone(channel),
        HttpRecorder::new(request.to_traced()),
        channel.secret_values(),
    )
}
