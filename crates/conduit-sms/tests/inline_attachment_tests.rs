// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inline attachments are moved to storage before an SMS handler sees the
//! message, and storage failures fail the send with an error in the log.

use std::collections::HashMap;
use std::sync::Arc;

use conduit_core::{
    Attachment, Channel, HttpClient, Msg, SendError, SendResult, Storage, Urn, send_msg,
};
use conduit_sms::BongoLiveHandler;
use conduit_test_utils::{MEMORY_BASE_URL, MemoryStorage, MockHandler, TestChannel};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_DATA: &str = "data:image/png;base64,iVBORw0KGgo=";
const TEXT_DATA: &str = "data:text/plain;base64,aGVsbG8=";

fn channel() -> Arc<Channel> {
    TestChannel::new("BL", "2020")
        .country("KE")
        .config("username", "user1")
        .config("password", "pass1")
        .build()
}

fn msg_with_inline(channel: Arc<Channel>) -> Msg {
    Msg::new_outgoing(channel, Urn::parse("tel:+250788383383").unwrap(), "See attached")
        .with_attachment(Attachment::new("image/jpeg", "https://foo.bar/image.jpg"))
        .with_attachment(Attachment::new("image/png", PNG_DATA))
        .with_attachment(Attachment::new("text/plain", TEXT_DATA))
}

fn stored_path(msg: &Msg, idx: usize, ext: &str) -> String {
    format!("attachments/{}/{}/{idx}.{ext}", msg.channel.uuid, msg.uuid)
}

#[tokio::test]
async fn handler_sees_stored_urls() {
    let storage = MemoryStorage::new();
    let handler = MockHandler::new("BL");
    let mut sent = SendResult::new();
    sent.add_external_id("ext-1");
    handler.set_send_result(Ok(sent)).await;
    let msg = msg_with_inline(channel());

    let (result, clog) = send_msg(
        &handler,
        &msg,
        Some(&storage as &dyn Storage),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(result.unwrap().external_id(), Some("ext-1"));
    assert!(!clog.is_error());

    let delivered = handler.sent_messages().await;
    assert_eq!(delivered.len(), 1);
    let urls: Vec<&str> = delivered[0]
        .attachments
        .iter()
        .map(|a| a.url.as_str())
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://foo.bar/image.jpg".to_string(),
            format!("{MEMORY_BASE_URL}/{}", stored_path(&msg, 1, "png")),
            format!("{MEMORY_BASE_URL}/{}", stored_path(&msg, 2, "txt")),
        ]
    );

    assert_eq!(
        storage.paths().await,
        vec![stored_path(&msg, 1, "png"), stored_path(&msg, 2, "txt")]
    );
    let text = storage.object(&stored_path(&msg, 2, "txt")).await.unwrap();
    assert_eq!(text.content_type, "text/plain");
    assert_eq!(&text.body[..], b"hello");
}

#[tokio::test]
async fn failed_slot_fails_send_and_marks_log() {
    let storage = MemoryStorage::new();
    storage.fail_paths_containing("/2.txt").await;
    let handler = MockHandler::new("BL");
    let msg = msg_with_inline(channel());

    let (result, clog) = send_msg(
        &handler,
        &msg,
        Some(&storage as &dyn Storage),
        &CancellationToken::new(),
    )
    .await;

    let err = result.unwrap_err();
    assert_eq!(err, SendError::ConnectionFailed);
    assert!(err.is_retryable());
    assert!(clog.is_error());
    assert_eq!(clog.errors().len(), 1);
    assert_eq!(clog.errors()[0].code(), "attachment_not_stored");
    assert!(clog.errors()[0].message().contains(&stored_path(&msg, 2, "txt")));
    assert_eq!(handler.sent_count().await, 0);
}

#[tokio::test]
async fn unreachable_storage_fails_send_and_marks_log() {
    let storage = MemoryStorage::new();
    storage.set_unreachable(true).await;
    let handler = MockHandler::new("BL");
    let msg = msg_with_inline(channel());

    let (result, clog) = send_msg(
        &handler,
        &msg,
        Some(&storage as &dyn Storage),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(result.unwrap_err(), SendError::ConnectionFailed);
    assert!(clog.is_error());
    let codes: Vec<&str> = clog.errors().iter().map(|e| e.code()).collect();
    assert_eq!(codes, vec!["attachment_not_stored", "attachment_not_stored"]);
    assert!(clog.http_logs().is_empty());
    assert!(storage.paths().await.is_empty());
    assert_eq!(handler.sent_count().await, 0);
}

#[tokio::test]
async fn bongolive_message_carries_stored_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bin/send.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"results": [{"status": "0", "msgid": "77"}]})),
        )
        .mount(&server)
        .await;
    let handler = BongoLiveHandler::new(HttpClient::with_defaults().unwrap())
        .with_send_url(format!("{}/bin/send.json", server.uri()));
    let storage = MemoryStorage::new();
    let msg = Msg::new_outgoing(channel(), Urn::parse("tel:+250788383383").unwrap(), "Photo")
        .with_attachment(Attachment::new("image/png", PNG_DATA));

    let (result, _) = send_msg(
        &handler,
        &msg,
        Some(&storage as &dyn Storage),
        &CancellationToken::new(),
    )
    .await;
    assert_eq!(result.unwrap().external_id(), Some("77"));

    let requests = server.received_requests().await.unwrap();
    let form: HashMap<String, String> = serde_urlencoded::from_bytes(&requests[0].body).unwrap();
    assert_eq!(
        form["MESSAGE"],
        format!("Photo\n{MEMORY_BASE_URL}/{}", stored_path(&msg, 0, "png"))
    );
}
