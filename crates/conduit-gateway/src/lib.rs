// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Conduit messaging core.
//!
//! Exposes one webhook endpoint per channel
//! (`/{prefix}/{channel_type}/{uuid}/receive`), dispatches it to the
//! registered [`ChannelHandler`](conduit_core::ChannelHandler), writes the
//! resulting messages and status updates through a
//! [`Backend`](conduit_core::Backend) and persists the finalized channel log.

pub mod backend;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use backend::MemoryBackend;
pub use server::{GatewayState, ServerConfig, router, start_server};
