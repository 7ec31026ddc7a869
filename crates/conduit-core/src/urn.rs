// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed contact addresses (`scheme:path`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Supported URN schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum UrnScheme {
    Tel,
    Whatsapp,
    Telegram,
    Ext,
    Mailto,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrnError {
    #[error("invalid URN '{0}': expected scheme:path")]
    Malformed(String),

    #[error("unsupported URN scheme '{0}'")]
    UnknownScheme(String),

    #[error("invalid phone number '{0}'")]
    InvalidPhone(String),
}

/// Numbers shorter than this are treated as short codes and kept local.
const MIN_INTERNATIONAL_DIGITS: usize = 7;

/// Calling codes for the countries we normalize local numbers for.
const CALLING_CODES: &[(&str, &str)] = &[
    ("BI", "257"),
    ("CD", "243"),
    ("CM", "237"),
    ("EC", "593"),
    ("ET", "251"),
    ("GB", "44"),
    ("GH", "233"),
    ("ID", "62"),
    ("IN", "91"),
    ("KE", "254"),
    ("MW", "265"),
    ("MZ", "258"),
    ("NG", "234"),
    ("PK", "92"),
    ("RW", "250"),
    ("SN", "221"),
    ("TZ", "255"),
    ("UG", "256"),
    ("US", "1"),
    ("ZA", "27"),
    ("ZM", "260"),
    ("ZW", "263"),
];

fn calling_code(country: &str) -> Option<&'static str> {
    CALLING_CODES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(country))
        .map(|(_, code)| *code)
}

/// A normalized contact address such as `tel:+254791541111`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Urn {
    scheme: UrnScheme,
    path: String,
}

impl Urn {
    pub fn new(scheme: UrnScheme, path: impl Into<String>) -> Result<Self, UrnError> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(UrnError::Malformed(format!("{scheme}:")));
        }
        Ok(Self { scheme, path })
    }

    /// Build a `tel` URN from a raw phone number as sent by a vendor.
    ///
    /// Numbers with a leading `+` or already starting with the country's
    /// calling code are kept international. Local numbers (optionally with a
    /// trunk `0`) get the calling code of `country` prepended. Short codes stay
    /// as they are.
    pub fn from_tel(raw: &str, country: Option<&str>) -> Result<Self, UrnError> {
        let trimmed = raw.trim();
        let international = trimmed.starts_with('+');
        let digits: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.' | '+'))
            .collect();

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(UrnError::InvalidPhone(raw.to_string()));
        }

        if international {
            return Self::new(UrnScheme::Tel, format!("+{digits}"));
        }

        if digits.len() < MIN_INTERNATIONAL_DIGITS {
            return Self::new(UrnScheme::Tel, digits);
        }

        let path = match country.and_then(calling_code) {
            Some(code) if digits.starts_with(code) && !digits.starts_with('0') => {
                format!("+{digits}")
            }
            Some(code) => format!("+{code}{}", digits.trim_start_matches('0')),
            None => format!("+{digits}"),
        };
        Self::new(UrnScheme::Tel, path)
    }

    pub fn parse(s: &str) -> Result<Self, UrnError> {
        let (scheme, path) = s
            .split_once(':')
            .ok_or_else(|| UrnError::Malformed(s.to_string()))?;
        let scheme = UrnScheme::from_str(&scheme.to_ascii_lowercase())
            .map_err(|_| UrnError::UnknownScheme(scheme.to_string()))?;
        Self::new(scheme, path)
    }

    pub fn scheme(&self) -> UrnScheme {
        self.scheme
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.path)
    }
}

impl FromStr for Urn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Urn {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Urn {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Urn::parse(&s).map_err(serde::de::Error::custom)
    }
}
