// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured, redactable errors produced by channel handlers.
//!
//! The catalog is closed: handlers build errors only through the
//! constructors below, and downstream classification keys on [`ChannelError::code`].

use std::fmt;

use conduit_security::Redactor;
use serde::{Deserialize, Serialize};

pub const CODE_RESPONSE_STATUS_CODE: &str = "response_status_code";
pub const CODE_RESPONSE_UNPARSEABLE: &str = "response_unparseable";
pub const CODE_RESPONSE_UNEXPECTED: &str = "response_unexpected";
pub const CODE_RESPONSE_VALUE_MISSING: &str = "response_value_missing";
pub const CODE_RESPONSE_VALUE_UNEXPECTED: &str = "response_value_unexpected";
pub const CODE_MEDIA_UNSUPPORTED: &str = "media_unsupported";
pub const CODE_ATTACHMENT_NOT_DECODABLE: &str = "attachment_not_decodable";
pub const CODE_ATTACHMENT_NOT_STORED: &str = "attachment_not_stored";
pub const CODE_SEND_CANCELLED: &str = "send_cancelled";
pub const CODE_EXTERNAL: &str = "external";

/// An error recorded against a channel interaction.
///
/// Immutable once built; [`redact`](Self::redact) returns a new value so an
/// error can be constructed before the final set of secrets is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelError {
    code: String,
    ext_code: String,
    message: String,
}

impl ChannelError {
    pub(crate) fn new(
        code: impl Into<String>,
        ext_code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            ext_code: ext_code.into(),
            message: message.into(),
        }
    }

    /// The vendor responded with an unexpected HTTP status.
    pub fn response_status_code() -> Self {
        Self::new(CODE_RESPONSE_STATUS_CODE, "", "Unexpected response status code.")
    }

    /// The response body could not be parsed as `format` (e.g. `JSON`).
    pub fn response_unparseable(format: &str) -> Self {
        Self::new(
            CODE_RESPONSE_UNPARSEABLE,
            "",
            format!("Unable to parse response as {format}."),
        )
    }

    /// The response did not match an expected literal or shape.
    pub fn response_unexpected(expected: &str) -> Self {
        Self::new(
            CODE_RESPONSE_UNEXPECTED,
            "",
            format!("Expected response to be '{expected}'."),
        )
    }

    /// A required field was absent from the response.
    pub fn response_value_missing(key: &str) -> Self {
        Self::new(
            CODE_RESPONSE_VALUE_MISSING,
            "",
            format!("Unable to find '{key}' response."),
        )
    }

    /// A response field held a value outside `expected`.
    pub fn response_value_unexpected(key: &str, expected: &[&str]) -> Self {
        let expected = expected
            .iter()
            .map(|e| format!("'{e}'"))
            .collect::<Vec<_>>()
            .join(" or ");
        Self::new(
            CODE_RESPONSE_VALUE_UNEXPECTED,
            "",
            format!("Expected '{key}' in response to be {expected}."),
        )
    }

    /// An attachment's media type cannot be sent on this channel.
    pub fn media_unsupported(content_type: &str) -> Self {
        Self::new(
            CODE_MEDIA_UNSUPPORTED,
            "",
            format!("Unsupported attachment media type: {content_type}."),
        )
    }

    /// An inline attachment payload failed to decode.
    pub fn attachment_not_decodable() -> Self {
        Self::new(
            CODE_ATTACHMENT_NOT_DECODABLE,
            "",
            "Unable to decode embedded attachment data.",
        )
    }

    /// An inline attachment could not be written to storage.
    pub fn attachment_not_stored(path: &str) -> Self {
        Self::new(
            CODE_ATTACHMENT_NOT_STORED,
            "",
            format!("Unable to store attachment at {path}."),
        )
    }

    /// The send was abandoned before the vendor call completed.
    pub fn send_cancelled() -> Self {
        Self::new(CODE_SEND_CANCELLED, "", "Send cancelled before completion.")
    }

    /// A vendor-native error passed through verbatim.
    pub fn external(code: &str, message: &str) -> Self {
        let message = if message.is_empty() {
            format!("Service specific error: {code}.")
        } else {
            message.to_string()
        };
        Self::new(CODE_EXTERNAL, code, message)
    }

    /// Return a copy with the message passed through `redactor`.
    pub fn redact(&self, redactor: &Redactor) -> Self {
        Self {
            code: self.code.clone(),
            ext_code: self.ext_code.clone(),
            message: redactor.redact(&self.message),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn ext_code(&self) -> &str {
        &self.ext_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ChannelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_codes_and_messages() {
        let e = ChannelError::response_status_code();
        assert_eq!(e.code(), "response_status_code");
        assert_eq!(e.ext_code(), "");
        assert_eq!(e.message(), "Unexpected response status code.");

        assert_eq!(
            ChannelError::response_unparseable("JSON").message(),
            "Unable to parse response as JSON."
        );
        assert_eq!(
            ChannelError::response_unexpected("0").message(),
            "Expected response to be '0'."
        );
        assert_eq!(
            ChannelError::response_value_missing("msgid").message(),
            "Unable to find 'msgid' response."
        );
        assert_eq!(
            ChannelError::response_value_unexpected("status", &["0", "1"]).message(),
            "Expected 'status' in response to be '0' or '1'."
        );
        assert_eq!(
            ChannelError::media_unsupported("video/mp4").message(),
            "Unsupported attachment media type: video/mp4."
        );
        assert_eq!(
            ChannelError::attachment_not_decodable().code(),
            "attachment_not_decodable"
        );
        assert_eq!(
            ChannelError::attachment_not_stored("attachments/a/0.jpg").message(),
            "Unable to store attachment at attachments/a/0.jpg."
        );
        assert_eq!(ChannelError::send_cancelled().code(), "send_cancelled");
    }

    #[test]
    fn external_carries_vendor_code() {
        let e = ChannelError::external("21610", "");
        assert_eq!(e.code(), "external");
        assert_eq!(e.ext_code(), "21610");
        assert_eq!(e.message(), "Service specific error: 21610.");

        let e = ChannelError::external("E42", "Recipient blocked");
        assert_eq!(e.message(), "Recipient blocked");
    }

    #[test]
    fn redact_returns_new_value() {
        let original = ChannelError::external("401", "bad password pass1 for user1");
        let redactor = Redactor::with_default_mask(["pass1"]);
        let redacted = original.redact(&redactor);

        assert_eq!(redacted.message(), "bad password ********** for user1");
        assert_eq!(redacted.ext_code(), "401");
        assert_eq!(original.message(), "bad password pass1 for user1");
    }

    #[test]
    fn display_includes_code() {
        assert_eq!(
            ChannelError::response_status_code().to_string(),
            "response_status_code: Unexpected response status code."
        );
        assert_eq!(ChannelError::new("", "", "boom").to_string(), "boom");
    }
}
