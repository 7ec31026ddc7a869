// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP exchange capture.
//!
//! An [`HttpTrace`] is the raw record of one request/response exchange. It is
//! only ever persisted as an [`HttpLog`], which is redacted and has its bodies
//! truncated. An [`HttpRecorder`] captures the inbound request that started an
//! incoming interaction together with the response the gateway wrote back.

use std::time::{Duration, Instant};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use conduit_security::Redactor;
use http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Maximum request body bytes kept in an [`HttpLog`].
pub const REQUEST_BODY_LIMIT: usize = 2048;

/// Maximum response body bytes kept in an [`HttpLog`].
pub const RESPONSE_BODY_LIMIT: usize = 50_000;

const TRUNCATION_MARKER: &str = "...";

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// The request half of an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl TracedRequest {
    pub fn new(method: &http::Method, url: impl Into<String>, headers: &HeaderMap, body: Bytes) -> Self {
        Self {
            method: method.as_str().to_string(),
            url: url.into(),
            headers: header_pairs(headers),
            body,
        }
    }

    /// Capture an outgoing reqwest request. Streaming bodies are recorded empty.
    pub fn from_reqwest(request: &reqwest::Request) -> Self {
        let body = request
            .body()
            .and_then(|b| b.as_bytes())
            .map(Bytes::copy_from_slice)
            .unwrap_or_default();
        Self::new(request.method(), request.url().as_str(), request.headers(), body)
    }
}

/// The response half of an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl TracedResponse {
    pub fn new(status: u16, headers: &HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers: header_pairs(headers),
            body,
        }
    }
}

/// A raw, unredacted HTTP exchange. `response` is `None` when the request
/// never got one (connection refused, timeout, cancellation).
#[derive(Debug, Clone)]
pub struct HttpTrace {
    pub request: TracedRequest,
    pub response: Option<TracedResponse>,
    pub started_on: DateTime<Utc>,
    pub elapsed: Duration,
    pub retries: u32,
}

impl HttpTrace {
    pub fn new(request: TracedRequest) -> Self {
        Self {
            request,
            response: None,
            started_on: Utc::now(),
            elapsed: Duration::ZERO,
            retries: 0,
        }
    }

    /// The response status, or 0 if there was no response.
    pub fn status_code(&self) -> u16 {
        self.response.as_ref().map(|r| r.status).unwrap_or(0)
    }
}

/// The persisted, redacted and size-bounded form of an [`HttpTrace`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpLog {
    pub url: String,
    pub status_code: u16,
    pub request: String,
    pub response: String,
    pub elapsed_ms: u64,
    pub retries: u32,
    pub created_on: DateTime<Utc>,
}

impl HttpLog {
    /// Build a log entry from a trace. Redaction runs before truncation so a
    /// secret cut by the body limit cannot leave a readable prefix behind.
    pub fn new(
        trace: &HttpTrace,
        request_limit: usize,
        response_limit: usize,
        redactor: &Redactor,
    ) -> Self {
        let req = &trace.request;
        let request = dump(
            &format!("{} {} HTTP/1.1", req.method, req.url),
            &req.headers,
            &req.body,
            request_limit,
            redactor,
        );

        let response = match &trace.response {
            Some(resp) => {
                let reason = http::StatusCode::from_u16(resp.status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("");
                dump(
                    format!("HTTP/1.1 {} {reason}", resp.status).trim_end(),
                    &resp.headers,
                    &resp.body,
                    response_limit,
                    redactor,
                )
            }
            None => String::new(),
        };

        Self {
            url: redactor.redact(&req.url),
            status_code: trace.status_code(),
            request,
            response,
            elapsed_ms: u64::try_from(trace.elapsed.as_millis()).unwrap_or(u64::MAX),
            retries: trace.retries,
            created_on: trace.started_on,
        }
    }

    /// Whether this exchange failed: no response, or a status outside 2xx/3xx.
    pub fn is_error(&self) -> bool {
        !(200..400).contains(&self.status_code)
    }
}

fn dump(
    start_line: &str,
    headers: &[(String, String)],
    body: &[u8],
    body_limit: usize,
    redactor: &Redactor,
) -> String {
    let mut head = String::from(start_line);
    head.push_str("\r\n");
    for (name, value) in headers {
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");

    let mut out = redactor.redact(&head);
    out.push_str(&truncate(&redactor.redact_bytes(body), body_limit));
    out
}

/// Truncate to at most `limit` bytes on a char boundary, marking the cut.
fn truncate(s: &str, limit: usize) -> String {
    if s.len() <= limit {
        return s.to_string();
    }
    let mut end = limit;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{TRUNCATION_MARKER}", &s[..end])
}

/// Records the inbound request of an incoming interaction and, once the
/// gateway has answered, the response it wrote.
#[derive(Debug)]
pub struct HttpRecorder {
    trace: HttpTrace,
    started: Instant,
}

impl HttpRecorder {
    pub fn new(request: TracedRequest) -> Self {
        Self {
            trace: HttpTrace::new(request),
            started: Instant::now(),
        }
    }

    /// Record the response written back to the caller.
    pub fn respond(&mut self, status: u16, headers: &HeaderMap, body: Bytes) {
        self.trace.response = Some(TracedResponse::new(status, headers, body));
        self.trace.elapsed = self.started.elapsed();
    }

    pub fn trace(&self) -> &HttpTrace {
        &self.trace
    }

    pub fn into_trace(self) -> HttpTrace {
        self.trace
    }
}
