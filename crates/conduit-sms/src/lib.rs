// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS aggregator channel handlers for the Conduit gateway.

pub mod bongolive;

use std::sync::Arc;

use conduit_core::{HandlerRegistry, HttpClient};

pub use bongolive::BongoLiveHandler;

/// Register every handler in this crate, sharing `client`.
pub fn register_all(registry: &mut HandlerRegistry, client: &HttpClient) {
    registry.register(Arc::new(BongoLiveHandler::new(client.clone())));
}
