// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Conduit messaging gateway.
//!
//! This crate defines the canonical channel and message model, the closed
//! catalog of channel errors, the channel log pipeline that records and
//! redacts every vendor interaction, and the traits vendor adapters,
//! storage backends and the runtime implement.

pub mod attachments;
pub mod channel_error;
pub mod channel_log;
pub mod error;
pub mod http;
pub mod http_log;
pub mod msg;
pub mod registry;
pub mod sender;
pub mod traits;
pub mod types;
pub mod urn;

// Re-export key items at crate root for ergonomic imports.
pub use channel_error::ChannelError;
pub use channel_log::{ChannelLog, ChannelLogRecord, ChannelLogType};
pub use error::ConduitError;
pub use http::{HttpClient, HttpClientConfig, HttpError, HttpResponse};
pub use http_log::{HttpLog, HttpRecorder, HttpTrace};
pub use msg::{Attachment, Msg, MsgStatus, MsgStatusValue};
pub use registry::HandlerRegistry;
pub use sender::send_msg;
pub use types::{Channel, ChannelLogUuid, ChannelRole, ChannelType, ChannelUuid, MsgUuid};
pub use urn::{Urn, UrnScheme};

pub use traits::{
    Backend, ChannelHandler, IncomingRequest, ReceiveError, ReceiveOutcome, SendError, SendResult,
    Storage, StoredObject, Upload,
};
