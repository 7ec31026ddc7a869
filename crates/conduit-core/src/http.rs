// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound HTTP client that traces every attempt into a channel log.

use std::time::{Duration, Instant};

use bytes::Bytes;
use http::HeaderMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::channel_log::ChannelLog;
use crate::http_log::{HttpTrace, TracedRequest, TracedResponse};
use crate::traits::handler::SendError;

/// Settings for the shared outbound client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("Conduit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Transport-level failure: no usable response was received.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpError::Timeout
        } else if e.is_connect() {
            HttpError::Connect(e.to_string())
        } else {
            HttpError::Request(e.to_string())
        }
    }
}

/// A fully read vendor response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Shared HTTP client for channel handlers.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &HttpClientConfig) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_defaults() -> Result<Self, HttpError> {
        Self::new(&HttpClientConfig::default())
    }

    /// The underlying client, for building requests.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Execute `request`, recording exactly one trace in `clog`.
    ///
    /// Any response, whatever its status, is returned as `Ok`; interpreting
    /// the status is the handler's job. Dropping the returned future aborts
    /// the call and records nothing.
    pub async fn execute(
        &self,
        request: reqwest::Request,
        clog: &mut ChannelLog,
    ) -> Result<HttpResponse, HttpError> {
        let mut trace = HttpTrace::new(TracedRequest::from_reqwest(&request));
        let started = Instant::now();

        debug!(method = %request.method(), url = %clog.redactor().redact(request.url().as_str()), "outbound request");

        let result = match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status().as_u16();
                let headers = response.headers().clone();
                match response.bytes().await {
                    Ok(body) => {
                        trace.response = Some(TracedResponse::new(status, &headers, body.clone()));
                        Ok(HttpResponse {
                            status,
                            headers,
                            body,
                        })
                    }
                    Err(e) => Err(HttpError::from(e)),
                }
            }
            Err(e) => Err(HttpError::from(e)),
        };

        trace.elapsed = started.elapsed();
        if let Err(e) = &result {
            warn!(error = %clog.redactor().redact(&e.to_string()), "outbound request failed");
        }
        clog.http(&trace);
        result
    }
}

/// Map a transport result onto the send error classes.
///
/// Transport failures and 5xx responses are connection-class failures; any
/// other status outside 2xx/3xx means the vendor rejected the request.
pub fn classify_status(result: Result<HttpResponse, HttpError>) -> Result<HttpResponse, SendError> {
    match result {
        Err(_) => Err(SendError::ConnectionFailed),
        Ok(resp) if resp.status >= 500 => Err(SendError::ConnectionFailed),
        Ok(resp) if resp.status == 429 => Err(SendError::ConnectionThrottled),
        Ok(resp) if !resp.is_success() => Err(SendError::ResponseStatus { status: resp.status }),
        Ok(resp) => Ok(resp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_log::ChannelLogType;
    use crate::types::{Channel, ChannelUuid};
    use std::sync::Arc;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn clog() -> ChannelLog {
        let ch = Arc::new(Channel::new(ChannelUuid::new_v4(), "BL", "2020"));
        ChannelLog::new(ChannelLogType::MsgSend, ch, ["pass1"])
    }

    fn response(status: u16) -> Result<HttpResponse, HttpError> {
        Ok(HttpResponse {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        })
    }

    #[tokio::test]
    async fn execute_records_trace() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(body_string("PASSWORD=pass1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = HttpClient::with_defaults().unwrap();
        let request = client
            .inner()
            .post(format!("{}/send", server.uri()))
            .body("PASSWORD=pass1")
            .build()
            .unwrap();

        let mut log = clog();
        let resp = client.execute(request, &mut log).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, Bytes::from_static(b"ok"));

        assert_eq!(log.http_logs().len(), 1);
        let entry = &log.http_logs()[0];
        assert_eq!(entry.status_code, 200);
        assert!(entry.request.ends_with("PASSWORD=**********"));
        assert!(entry.response.ends_with("ok"));
    }

    #[tokio::test]
    async fn connection_refused_records_status_zero() {
        // Bind then drop a server so the port is closed.
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };

        let client = HttpClient::with_defaults().unwrap();
        let request = client.inner().get(format!("{uri}/gone")).build().unwrap();

        let mut log = clog();
        let result = client.execute(request, &mut log).await;
        assert!(result.is_err());
        assert_eq!(log.http_logs().len(), 1);
        assert_eq!(log.http_logs()[0].status_code, 0);
        assert!(log.is_error());
    }

    #[test]
    fn classify_maps_statuses() {
        assert!(classify_status(response(200)).is_ok());
        assert!(classify_status(response(302)).is_ok());
        assert_eq!(
            classify_status(response(403)).unwrap_err(),
            SendError::ResponseStatus { status: 403 }
        );
        assert_eq!(
            classify_status(response(429)).unwrap_err(),
            SendError::ConnectionThrottled
        );
        assert_eq!(
            classify_status(response(501)).unwrap_err(),
            SendError::ConnectionFailed
        );
        assert_eq!(
            classify_status(Err(HttpError::Timeout)).unwrap_err(),
            SendError::ConnectionFailed
        );
    }
}
