// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builder for test channels.

use std::str::FromStr;
use std::sync::Arc;

use conduit_core::{Channel, ChannelRole, ChannelUuid};

/// UUID used by channel fixtures unless overridden.
pub const TEST_CHANNEL_UUID: &str = "8eb23e93-5ecb-45ba-b726-3b064e0c56ab";

/// Fluent builder for an `Arc<Channel>`.
///
/// ```
/// use conduit_test_utils::TestChannel;
///
/// let channel = TestChannel::new("BL", "2020")
///     .country("KE")
///     .config("username", "user1")
///     .build();
/// assert_eq!(channel.address, "2020");
/// ```
#[derive(Debug, Clone)]
pub struct TestChannel {
    channel: Channel,
}

impl TestChannel {
    /// A channel with the fixture UUID, no country and role `both`.
    pub fn new(channel_type: &str, address: &str) -> Self {
        let uuid = ChannelUuid::from_str(TEST_CHANNEL_UUID).unwrap_or_else(|_| ChannelUuid::new_v4());
        Self {
            channel: Channel::new(uuid, channel_type, address),
        }
    }

    pub fn uuid(mut self, uuid: ChannelUuid) -> Self {
        self.channel.uuid = uuid;
        self
    }

    pub fn country(mut self, country: &str) -> Self {
        self.channel.country = Some(country.to_string());
        self
    }

    pub fn role(mut self, role: ChannelRole) -> Self {
        self.channel.role = role;
        self
    }

    pub fn config(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.channel.config.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Arc<Channel> {
        Arc::new(self.channel)
    }
}
