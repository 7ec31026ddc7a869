// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifier types and the [`Channel`] entity.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier of a configured channel.
    ChannelUuid
);
uuid_id!(
    /// Unique identifier of a message.
    MsgUuid
);
uuid_id!(
    /// Unique identifier of a channel log.
    ChannelLogUuid
);

/// Vendor type code of a channel (e.g. `BL` for BongoLive).
///
/// Codes are case-insensitive on input and stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ChannelType(String);

impl ChannelType {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ChannelType {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ChannelType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<ChannelType> for String {
    fn from(t: ChannelType) -> Self {
        t.0
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which directions of traffic a channel carries.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChannelRole {
    Send,
    Receive,
    #[default]
    Both,
}

impl ChannelRole {
    pub fn can_send(self) -> bool {
        matches!(self, ChannelRole::Send | ChannelRole::Both)
    }

    pub fn can_receive(self) -> bool {
        matches!(self, ChannelRole::Receive | ChannelRole::Both)
    }
}

/// Channel config key for the vendor account username.
pub const CONFIG_USERNAME: &str = "username";
/// Channel config key for the vendor account password.
pub const CONFIG_PASSWORD: &str = "password";
/// Channel config key for a vendor auth token.
pub const CONFIG_AUTH_TOKEN: &str = "auth_token";
/// Channel config key for a vendor API key.
pub const CONFIG_API_KEY: &str = "api_key";
/// Channel config key for a shared webhook secret.
pub const CONFIG_SECRET: &str = "secret";
/// Channel config key overriding the vendor's send endpoint.
pub const CONFIG_SEND_URL: &str = "send_url";

/// Config keys whose values are credentials and must never be logged.
pub const SECRET_CONFIG_KEYS: &[&str] = &[
    CONFIG_PASSWORD,
    CONFIG_AUTH_TOKEN,
    CONFIG_API_KEY,
    CONFIG_SECRET,
];

/// A configured vendor endpoint: one account or number that sends and/or
/// receives messages.
///
/// Owned by the runtime and shared read-only (`Arc<Channel>`) with handlers
/// for the lifetime of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub uuid: ChannelUuid,
    pub channel_type: ChannelType,
    #[serde(default)]
    pub name: String,
    /// The channel's own address (shortcode, phone number, handle).
    pub address: String,
    /// ISO 3166-1 alpha-2 country code, used to normalize local phone numbers.
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub role: ChannelRole,
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
}

impl Channel {
    pub fn new(uuid: ChannelUuid, channel_type: impl Into<ChannelType>, address: impl Into<String>) -> Self {
        Self {
            uuid,
            channel_type: channel_type.into(),
            name: String::new(),
            address: address.into(),
            country: None,
            role: ChannelRole::Both,
            config: HashMap::new(),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_role(mut self, role: ChannelRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Returns a config value rendered as a string.
    ///
    /// Strings are returned as-is, numbers and booleans are formatted. Empty
    /// strings, nulls, arrays and objects yield `None`.
    pub fn string_config(&self, key: &str) -> Option<String> {
        match self.config.get(key)? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn string_config_or(&self, key: &str, default: &str) -> String {
        self.string_config(key).unwrap_or_else(|| default.to_string())
    }

    /// Values of all standard credential keys set on this channel.
    pub fn secret_values(&self) -> Vec<String> {
        SECRET_CONFIG_KEYS
            .iter()
            .filter_map(|k| self.string_config(k))
            .collect()
    }
}
