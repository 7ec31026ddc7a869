// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment storage backends for the Conduit gateway.
//!
//! Object-store backends live outside this workspace; this crate provides
//! the local disk implementation used in development and single-node setups.

pub mod disk;

pub use disk::{content_type_for, FsStorage};
