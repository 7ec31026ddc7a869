// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Conduit integration tests.
//!
//! Provides fixtures and mock collaborators for fast, deterministic tests
//! without external services.
//!
//! # Components
//!
//! - [`TestChannel`] - Builder for channel fixtures
//! - [`MemoryStorage`] - In-memory storage with failure injection
//! - [`MockHandler`] - Handler with preset outcomes and captured sends
//! - [`form_request`], [`get_request`], [`incoming_log`] - Inbound request fixtures

pub mod channel;
pub mod mock_handler;
pub mod request;
pub mod storage;

pub use channel::{TestChannel, TEST_CHANNEL_UUID};
pub use mock_handler::MockHandler;
pub use request::{form_request, get_request, incoming_log};
pub use storage::{MemoryStorage, MEMORY_BASE_URL};
