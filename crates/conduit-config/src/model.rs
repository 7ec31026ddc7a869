// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Conduit gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use conduit_core::{Channel, ChannelRole, ChannelUuid, HttpClientConfig};
use serde::{Deserialize, Serialize};

use crate::diagnostic::ConfigError;

/// Top-level Conduit configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConduitConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub log: LogConfig,

    /// Outbound vendor HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Attachment storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Channels served by this gateway.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// First path segment of receive URLs: `/{path_prefix}/{type}/{uuid}/receive`.
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path_prefix: default_path_prefix(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_path_prefix() -> String {
    "c".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-request timeout for vendor calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent sent to vendors. Defaults to `Conduit/<version>`.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl HttpConfig {
    pub fn client_config(&self) -> HttpClientConfig {
        let mut config = HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            ..HttpClientConfig::default()
        };
        if let Some(ua) = &self.user_agent {
            config.user_agent = ua.clone();
        }
        config
    }
}

/// Local attachment storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory attachments are written under.
    #[serde(default = "default_storage_root")]
    pub root: String,

    /// Public URL the storage root is served from.
    #[serde(default = "default_storage_base_url")]
    pub base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            base_url: default_storage_base_url(),
        }
    }
}

fn default_storage_root() -> String {
    dirs::data_dir()
        .map(|p| p.join("conduit").join("media"))
        .unwrap_or_else(|| std::path::PathBuf::from("./media"))
        .to_string_lossy()
        .to_string()
}

fn default_storage_base_url() -> String {
    "http://localhost:8080/media".to_string()
}

/// One `[[channels]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    pub uuid: String,

    /// Vendor type code, e.g. `BL`.
    pub channel_type: String,

    #[serde(default)]
    pub name: String,

    /// The channel's own address (shortcode or number).
    pub address: String,

    /// ISO 3166-1 alpha-2 country code.
    #[serde(default)]
    pub country: Option<String>,

    /// `send`, `receive` or `both`.
    #[serde(default = "default_role")]
    pub role: String,

    /// Vendor-specific settings and credentials.
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
}

fn default_role() -> String {
    "both".to_string()
}

impl ChannelConfig {
    /// Build the runtime channel this entry describes.
    pub fn to_channel(&self) -> Result<Channel, ConfigError> {
        let uuid = ChannelUuid::from_str(self.uuid.trim()).map_err(|e| ConfigError::InvalidChannel {
            uuid: self.uuid.clone(),
            field: "uuid",
            reason: format!("not a valid uuid: {e}"),
        })?;
        let role = ChannelRole::from_str(&self.role).map_err(|_| ConfigError::InvalidChannel {
            uuid: self.uuid.clone(),
            field: "role",
            reason: format!("role `{}` must be one of send, receive, both", self.role),
        })?;

        let mut channel = Channel::new(uuid, self.channel_type.as_str(), self.address.clone())
            .with_name(self.name.clone())
            .with_role(role);
        if let Some(country) = &self.country {
            channel = channel.with_country(country.to_ascii_uppercase());
        }
        channel.config = self.config.clone();
        Ok(channel)
    }
}

impl ConduitConfig {
    /// Every configured channel, in file order.
    pub fn build_channels(&self) -> Result<Vec<Channel>, ConfigError> {
        self.channels.iter().map(ChannelConfig::to_channel).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::ChannelType;

    fn bongolive() -> ChannelConfig {
        ChannelConfig {
            uuid: "8eb23e93-5ecb-45ba-b726-3b064e0c56ab".to_string(),
            channel_type: "bl".to_string(),
            name: "Bongo".to_string(),
            address: "2020".to_string(),
            country: Some("ke".to_string()),
            role: "both".to_string(),
            config: HashMap::from([("username".to_string(), serde_json::json!("user1"))]),
        }
    }

    #[test]
    fn defaults_are_sensible() {
        let config = ConduitConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.path_prefix, "c");
        assert_eq!(config.log.level, "info");
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.channels.is_empty());
    }

    #[test]
    fn channel_config_builds_channel() {
        let channel = bongolive().to_channel().unwrap();
        assert_eq!(channel.channel_type, ChannelType::new("BL"));
        assert_eq!(channel.country.as_deref(), Some("KE"));
        assert_eq!(channel.role, ChannelRole::Both);
        assert_eq!(channel.string_config("username").as_deref(), Some("user1"));
    }

    #[test]
    fn bad_role_is_rejected() {
        let mut cfg = bongolive();
        cfg.role = "sideways".to_string();
        assert!(matches!(
            cfg.to_channel(),
            Err(ConfigError::InvalidChannel { field: "role", reason, .. }) if reason.contains("sideways")
        ));
    }

    #[test]
    fn client_config_uses_overrides() {
        let http = HttpConfig {
            timeout_secs: 5,
            user_agent: Some("Test/1".to_string()),
        };
        let client = http.client_config();
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.user_agent, "Test/1");
    }
}
