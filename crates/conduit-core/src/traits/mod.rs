// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the gateway's extension points.
//!
//! All traits use `#[async_trait]` so they can be held as trait objects.

pub mod backend;
pub mod handler;
pub mod storage;

pub use backend::Backend;
pub use handler::{
    ChannelHandler, IncomingRequest, ReceiveError, ReceiveOutcome, SendError, SendResult,
};
pub use storage::{Storage, StoredObject, Upload};
