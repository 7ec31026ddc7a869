// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: listener address shape, a
//! usable path prefix, and well-formed channel entries.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::ConduitConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn invalid(errors: &mut Vec<ConfigError>, message: String) {
    errors.push(ConfigError::Validation { message });
}

/// Validate a deserialized configuration, collecting every failure.
pub fn validate_config(config: &ConduitConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        invalid(&mut errors, "server.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            invalid(
                &mut errors,
                format!("server.host `{host}` is not a valid IP address or hostname"),
            );
        }
    }

    if config.server.port == 0 {
        invalid(&mut errors, "server.port must not be 0".to_string());
    }

    let prefix = &config.server.path_prefix;
    if prefix.is_empty()
        || !prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        invalid(
            &mut errors,
            format!("server.path_prefix `{prefix}` must be a single non-empty path segment"),
        );
    }

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        invalid(
            &mut errors,
            format!(
                "log.level `{}` must be one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        );
    }

    if config.http.timeout_secs == 0 {
        invalid(&mut errors, "http.timeout_secs must be at least 1".to_string());
    }

    if config.storage.root.trim().is_empty() {
        invalid(&mut errors, "storage.root must not be empty".to_string());
    }

    let base_url = &config.storage.base_url;
    match url::Url::parse(base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        Ok(_) => invalid(
            &mut errors,
            format!("storage.base_url `{base_url}` must be an http(s) URL"),
        ),
        Err(e) => invalid(
            &mut errors,
            format!("storage.base_url `{base_url}` is not a valid URL: {e}"),
        ),
    }

    let mut seen = HashSet::new();
    for (i, channel) in config.channels.iter().enumerate() {
        if channel.channel_type.trim().is_empty() {
            invalid(&mut errors, format!("channels[{i}].channel_type must not be empty"));
        }
        if channel.address.trim().is_empty() {
            invalid(&mut errors, format!("channels[{i}].address must not be empty"));
        }
        if let Some(country) = &channel.country {
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
                invalid(
                    &mut errors,
                    format!("channels[{i}].country `{country}` must be a two-letter country code"),
                );
            }
        }
        if let Err(e) = channel.to_channel() {
            errors.push(e);
        }
        if !seen.insert(channel.uuid.trim().to_ascii_lowercase()) {
            invalid(
                &mut errors,
                format!("duplicate channel uuid `{}` in [[channels]] array", channel.uuid),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
