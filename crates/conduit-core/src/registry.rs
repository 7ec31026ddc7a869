// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handler registry keyed by channel type.
//!
//! Handlers are registered once at startup; request paths only look them up.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::error::ConduitError;
use crate::traits::handler::ChannelHandler;
use crate::types::ChannelType;

/// Registry of compiled-in channel handlers.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<ChannelType, Arc<dyn ChannelHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its own channel type. A later registration
    /// for the same type replaces the earlier one.
    pub fn register(&mut self, handler: Arc<dyn ChannelHandler>) {
        let channel_type = handler.channel_type();
        if self.handlers.contains_key(&channel_type) {
            warn!(channel_type = %channel_type, "replacing registered channel handler");
        }
        self.handlers.insert(channel_type, handler);
    }

    pub fn get(&self, channel_type: &ChannelType) -> Option<Arc<dyn ChannelHandler>> {
        self.handlers.get(channel_type).cloned()
    }

    /// Like [`get`](Self::get), failing with [`ConduitError::HandlerNotFound`].
    pub fn require(&self, channel_type: &ChannelType) -> Result<Arc<dyn ChannelHandler>, ConduitError> {
        self.get(channel_type)
            .ok_or_else(|| ConduitError::HandlerNotFound {
                channel_type: channel_type.to_string(),
            })
    }

    /// All handlers, sorted by channel type.
    pub fn list(&self) -> Vec<Arc<dyn ChannelHandler>> {
        let mut types: Vec<&ChannelType> = self.handlers.keys().collect();
        types.sort();
        types
            .into_iter()
            .filter_map(|t| self.handlers.get(t).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.handlers.keys().map(ChannelType::as_str).collect();
        types.sort_unstable();
        f.debug_struct("HandlerRegistry").field("handlers", &types).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_log::ChannelLog;
    use crate::msg::Msg;
    use crate::traits::handler::{
        IncomingRequest, ReceiveError, ReceiveOutcome, SendError, SendResult,
    };
    use crate::types::Channel;
    use async_trait::async_trait;

    struct Stub(&'static str);

    #[async_trait]
    impl ChannelHandler for Stub {
        fn channel_type(&self) -> ChannelType {
            ChannelType::new(self.0)
        }

        fn channel_name(&self) -> &str {
            self.0
        }

        async fn receive(
            &self,
            _channel: &Arc<Channel>,
            _request: &IncomingRequest,
            _clog: &mut ChannelLog,
        ) -> Result<ReceiveOutcome, ReceiveError> {
            Ok(ReceiveOutcome::Ignored("stub".into()))
        }

        async fn send(&self, _msg: &Msg, _clog: &mut ChannelLog) -> Result<SendResult, SendError> {
            Ok(SendResult::new())
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(Stub("TW")));
        registry.register(Arc::new(Stub("bl")));
        assert_eq!(registry.len(), 2);

        let handler = registry.get(&ChannelType::new("BL")).unwrap();
        assert_eq!(handler.channel_name(), "bl");
        assert!(registry.get(&ChannelType::new("XX")).is_none());
        assert!(matches!(
            registry.require(&ChannelType::new("XX")),
            Err(ConduitError::HandlerNotFound { .. })
        ));
    }

    #[test]
    fn list_is_sorted() {
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(Stub("TW")));
        registry.register(Arc::new(Stub("AT")));
        registry.register(Arc::new(Stub("BL")));

        let types: Vec<String> = registry
            .list()
            .iter()
            .map(|h| h.channel_type().to_string())
            .collect();
        assert_eq!(types, vec!["AT", "BL", "TW"]);
    }

    #[test]
    fn later_registration_replaces() {
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(Stub("BL")));
        registry.register(Arc::new(Stub("bl")));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(&ChannelType::new("BL")).unwrap().channel_name(),
            "bl"
        );
    }
}
