// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential redaction for the Conduit messaging gateway.
//!
//! Every channel log passes its HTTP traces and error messages through a
//! [`Redactor`] built from the channel's configured secrets before anything
//! is persisted.

pub mod redact;

pub use redact::{Redactor, DEFAULT_MASK};
