// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./conduit.toml` > `~/.config/conduit/conduit.toml` > `/etc/conduit/conduit.toml`
//! with environment variable overrides via `CONDUIT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ConduitConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/conduit/conduit.toml";
pub(crate) const LOCAL_CONFIG: &str = "conduit.toml";

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("conduit/conduit.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/conduit/conduit.toml` (system-wide)
/// 3. `~/.config/conduit/conduit.toml` (user XDG config)
/// 4. `./conduit.toml` (local directory)
/// 5. `CONDUIT_*` environment variables
pub fn load_config() -> Result<ConduitConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ConduitConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConduitConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ConduitConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConduitConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ConduitConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Env provider mapping `CONDUIT_SECTION_KEY` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys such as
/// `path_prefix` and `timeout_secs` contain underscores.
fn env_provider() -> Env {
    Env::prefixed("CONDUIT_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("server_", "server.", 1)
            .replacen("log_", "log.", 1)
            .replacen("http_", "http.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
