// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Conduit gateway runtime.
//!
//! Vendor-facing failures are not modelled here: adapters report those as
//! [`ChannelError`](crate::channel_error::ChannelError) values on the channel
//! log and as [`SendError`](crate::traits::handler::SendError) /
//! [`ReceiveError`](crate::traits::handler::ReceiveError) outcomes.

use thiserror::Error;

/// The primary error type used by runtime collaborators (storage, backend, registry).
#[derive(Debug, Error)]
pub enum ConduitError {
    /// Configuration errors (missing channel config, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (I/O, credentials, backend unreachable).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Nothing is stored at the requested path.
    #[error("storage object not found: {path}")]
    StorageNotFound { path: String },

    /// No channel with this type and UUID is known to the runtime.
    #[error("channel not found: {channel_type}/{uuid}")]
    ChannelNotFound { channel_type: String, uuid: String },

    /// No handler is registered for this channel type.
    #[error("no handler registered for channel type {channel_type}")]
    HandlerNotFound { channel_type: String },

    /// A status update referenced an external id the runtime does not know.
    #[error("no message found with external id {external_id}")]
    MsgNotFound { external_id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConduitError {
    /// Wrap any error as a storage failure.
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage {
            source: Box::new(source),
        }
    }
}
