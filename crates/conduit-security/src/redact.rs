// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret redaction for channel logs and error messages.
//!
//! Two complementary mechanisms:
//! 1. **Exact-match**: the secret values configured on a channel (passwords,
//!    tokens), in both their plain and form-encoded spellings.
//! 2. **Regex-based**: credential-bearing HTTP headers, whatever their value.

use std::sync::LazyLock;

use regex::Regex;

/// The mask written in place of every redacted value.
pub const DEFAULT_MASK: &str = "**********";

/// Header lines whose values are always credentials.
static HEADER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?im)^(authorization|proxy-authorization|x-api-key|x-auth-token):[ \t]*[^\r\n]+")
            .expect("header redaction pattern is valid"),
    ]
});

/// Replaces configured secret substrings with a fixed mask.
///
/// Built once per channel log. Values are matched longest first so a secret
/// that contains another secret is masked as a whole.
#[derive(Debug, Clone)]
pub struct Redactor {
    mask: String,
    values: Vec<String>,
}

impl Redactor {
    /// Create a redactor for the given secret values.
    ///
    /// Empty values are ignored. The form-encoded spelling of each value is
    /// registered too, since secrets usually travel in request bodies.
    pub fn new<I, S>(mask: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut all: Vec<String> = Vec::new();
        for value in values {
            let value = value.as_ref();
            if value.is_empty() {
                continue;
            }
            let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
            if encoded != value {
                all.push(encoded);
            }
            all.push(value.to_string());
        }

        all.sort_by_key(|v| std::cmp::Reverse(v.len()));
        all.dedup();

        Self {
            mask: mask.into(),
            values: all,
        }
    }

    /// Create a redactor using [`DEFAULT_MASK`].
    pub fn with_default_mask<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(DEFAULT_MASK, values)
    }

    /// The mask token this redactor writes.
    pub fn mask(&self) -> &str {
        &self.mask
    }

    /// Returns true if no secret values are registered.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Redact all registered values and credential headers from `input`.
    pub fn redact(&self, input: &str) -> String {
        let mut result = input.to_string();

        for value in &self.values {
            if result.contains(value.as_str()) {
                result = result.replace(value.as_str(), &self.mask);
            }
        }

        for pattern in HEADER_PATTERNS.iter() {
            result = pattern
                .replace_all(&result, format!("${{1}}: {}", self.mask).as_str())
                .into_owned();
        }

        result
    }

    /// Redact a raw byte payload, decoding it lossily as UTF-8 first.
    pub fn redact_bytes(&self, input: &[u8]) -> String {
        self.redact(&String::from_utf8_lossy(input))
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::with_default_mask(std::iter::empty::<&str>())
    }
}
