// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel handler for deterministic testing.
//!
//! `MockHandler` returns a preset receive outcome and captures every message
//! passed to `send()` for assertions.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use conduit_core::{
    Channel, ChannelHandler, ChannelLog, ChannelType, IncomingRequest, Msg, ReceiveError,
    ReceiveOutcome, SendError, SendResult,
};

type ReceiveFn =
    dyn Fn(&Arc<Channel>, &IncomingRequest) -> Result<ReceiveOutcome, ReceiveError> + Send + Sync;

fn ignore_all(
    _channel: &Arc<Channel>,
    _request: &IncomingRequest,
) -> Result<ReceiveOutcome, ReceiveError> {
    Ok(ReceiveOutcome::Ignored("mock".to_string()))
}

/// A handler whose behavior is set by the test.
pub struct MockHandler {
    channel_type: ChannelType,
    on_receive: Box<ReceiveFn>,
    send_result: Mutex<Result<SendResult, SendError>>,
    sent: Arc<Mutex<Vec<Msg>>>,
}

impl MockHandler {
    /// A handler for `channel_type` that ignores every request and whose
    /// sends succeed without an external id.
    pub fn new(channel_type: &str) -> Self {
        Self {
            channel_type: ChannelType::new(channel_type),
            on_receive: Box::new(ignore_all),
            send_result: Mutex::new(Ok(SendResult::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Compute receive outcomes with `f`.
    pub fn on_receive<F>(mut self, f: F) -> Self
    where
        F: Fn(&Arc<Channel>, &IncomingRequest) -> Result<ReceiveOutcome, ReceiveError>
            + Send
            + Sync
            + 'static,
    {
        self.on_receive = Box::new(f);
        self
    }

    /// Result returned by every subsequent `send()`.
    pub async fn set_send_result(&self, result: Result<SendResult, SendError>) {
        *self.send_result.lock().await = result;
    }

    /// Messages passed to `send()` so far.
    pub async fn sent_messages(&self) -> Vec<Msg> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl ChannelHandler for MockHandler {
    fn channel_type(&self) -> ChannelType {
        self.channel_type.clone()
    }

    fn channel_name(&self) -> &str {
        "Mock"
    }

    async fn receive(
        &self,
        channel: &Arc<Channel>,
        request: &IncomingRequest,
        _clog: &mut ChannelLog,
    ) -> Result<ReceiveOutcome, ReceiveError> {
        (self.on_receive)(channel, request)
    }

    async fn send(&self, msg: &Msg, _clog: &mut ChannelLog) -> Result<SendResult, SendError> {
        self.sent.lock().await.push(msg.clone());
        self.send_result.lock().await.clone()
    }
}
