// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `conduit send` command implementation.
//!
//! Sends one message through a configured channel and prints the finalized
//! channel log, which is how an operator checks credentials and vendor
//! responses without running the full gateway.

use conduit_config::ConduitConfig;
use conduit_core::{Attachment, ConduitError, Msg, Storage, Urn, send_msg};

use crate::runtime::Runtime;
use crate::shutdown;

/// Arguments to `conduit send`.
#[derive(Debug, Clone)]
pub struct SendArgs {
    pub channel: String,
    pub urn: String,
    pub text: String,
    /// `content-type:url` pairs.
    pub attachments: Vec<String>,
}

/// Build the outgoing message described by `args`.
pub fn build_msg(runtime: &Runtime, args: &SendArgs) -> Result<Msg, ConduitError> {
    let channel = runtime.find_channel(&args.channel)?;
    let urn = Urn::parse(&args.urn)
        .map_err(|e| ConduitError::Config(format!("invalid URN `{}`: {e}", args.urn)))?;

    let mut msg = Msg::new_outgoing(channel, urn, args.text.clone());
    for raw in &args.attachments {
        let attachment = Attachment::parse(raw).ok_or_else(|| {
            ConduitError::Config(format!("invalid attachment `{raw}`, expected content-type:url"))
        })?;
        msg = msg.with_attachment(attachment);
    }
    Ok(msg)
}

pub async fn run_send(config: &ConduitConfig, args: SendArgs) -> Result<(), ConduitError> {
    let runtime = Runtime::from_config(config)?;
    let msg = build_msg(&runtime, &args)?;
    let handler = runtime.registry.require(&msg.channel.channel_type)?;

    let cancel = shutdown::install_signal_handler();
    let (result, clog) = send_msg(
        handler.as_ref(),
        &msg,
        Some(&runtime.storage as &dyn Storage),
        &cancel,
    )
    .await;

    let record = serde_json::to_string_pretty(&clog.to_record())
        .map_err(|e| ConduitError::Internal(format!("failed to render channel log: {e}")))?;
    println!("{record}");

    match result {
        Ok(sent) => {
            println!("sent {} (external id: {})", msg.uuid, sent.external_id().unwrap_or("-"));
            Ok(())
        }
        Err(e) => Err(ConduitError::Internal(format!("send failed: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[[channels]]
uuid = "8eb23e93-5ecb-45ba-b726-3b064e0c56ab"
channel_type = "BL"
address = "2020"
country = "KE"
config = { username = "user1", password = "pass1" }
"#;

    fn args() -> SendArgs {
        SendArgs {
            channel: "8eb23e93-5ecb-45ba-b726-3b064e0c56ab".to_string(),
            urn: "tel:+250788383383".to_string(),
            text: "Simple Message".to_string(),
            attachments: vec!["image/jpeg:https://foo.bar/image.jpg".to_string()],
        }
    }

    fn runtime() -> Runtime {
        let config = conduit_config::load_and_validate_str(CONFIG).unwrap();
        Runtime::from_config(&config).unwrap()
    }

    #[test]
    fn builds_message_with_attachments() {
        let msg = build_msg(&runtime(), &args()).unwrap();
        assert_eq!(msg.urn.to_string(), "tel:+250788383383");
        assert_eq!(msg.attachments.len(), 1);
        assert_eq!(msg.attachments[0].url, "https://foo.bar/image.jpg");
        assert_eq!(msg.channel.string_config("username").as_deref(), Some("user1"));
    }

    #[test]
    fn rejects_malformed_input() {
        let runtime = runtime();

        let mut bad_urn = args();
        bad_urn.urn = "nonsense".to_string();
        assert!(build_msg(&runtime, &bad_urn).is_err());

        let mut bad_attachment = args();
        bad_attachment.attachments = vec!["no-separator".to_string()];
        assert!(build_msg(&runtime, &bad_attachment).is_err());
    }
}
