// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! BongoLive receive and send behavior against fixture requests and a
//! wiremock vendor endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use conduit_core::{
    Attachment, Channel, ChannelHandler, ChannelLogType, HttpClient, Msg, MsgStatusValue,
    ReceiveError, ReceiveOutcome, SendError, Urn, send_msg,
};
use conduit_sms::BongoLiveHandler;
use conduit_test_utils::{TestChannel, form_request, get_request, incoming_log};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECEIVE_URL: &str = "/c/bl/8eb23e93-5ecb-45ba-b726-3b064e0c56ab/receive/";

fn handler() -> BongoLiveHandler {
    BongoLiveHandler::new(HttpClient::with_defaults().unwrap())
}

fn receive_channel() -> Arc<Channel> {
    TestChannel::new("BL", "2020").country("KE").build()
}

fn send_channel() -> Arc<Channel> {
    TestChannel::new("BL", "2020")
        .country("KE")
        .config("username", "user1")
        .config("password", "pass1")
        .build()
}

fn outgoing(channel: Arc<Channel>) -> Msg {
    Msg::new_outgoing(
        channel,
        Urn::parse("tel:+250788383383").unwrap(),
        "Simple Message ☺",
    )
    .with_attachment(Attachment::parse("image/jpeg:https://foo.bar/image.jpg").unwrap())
}

async fn receive(
    body: &str,
) -> (
    Result<ReceiveOutcome, ReceiveError>,
    conduit_core::ChannelLog,
) {
    let channel = receive_channel();
    let request = form_request(RECEIVE_URL, body);
    let mut clog = incoming_log(&channel, &request);
    let result = handler().receive(&channel, &request, &mut clog).await;
    (result, clog)
}

// --- Receive ---

#[tokio::test]
async fn receive_valid_message() {
    let (result, clog) =
        receive("msgtype=1&id=12345678&message=Msg&sourceaddr=254791541111").await;

    let ReceiveOutcome::Msgs(msgs) = result.unwrap() else {
        panic!("expected messages");
    };
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].text, "Msg");
    assert_eq!(msgs[0].urn.to_string(), "tel:+254791541111");
    assert_eq!(msgs[0].external_id.as_deref(), Some("12345678"));
    assert!(msgs[0].received_on.is_some());
    assert_eq!(clog.log_type(), ChannelLogType::MsgReceive);
}

#[tokio::test]
async fn receive_without_msgtype_is_a_message() {
    let (result, _) = receive("id=12345678&message=Msg&sourceaddr=254791541111").await;

    let ReceiveOutcome::Msgs(msgs) = result.unwrap() else {
        panic!("expected messages");
    };
    assert_eq!(msgs[0].text, "Msg");
}

#[tokio::test]
async fn receive_missing_sourceaddr_is_rejected() {
    let (result, _) = receive("msgtype=1&id=12345678&message=Msg").await;
    assert_eq!(result.unwrap_err(), ReceiveError::MissingField("sourceaddr"));
}

#[tokio::test]
async fn receive_empty_form_is_rejected() {
    let (result, _) = receive("&").await;
    assert_eq!(result.unwrap_err(), ReceiveError::MissingField("sourceaddr"));
}

#[tokio::test]
async fn receive_delivery_report() {
    let (result, clog) = receive("msgtype=5&dlrid=12345&status=1").await;

    let ReceiveOutcome::Statuses(statuses) = result.unwrap() else {
        panic!("expected statuses");
    };
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].external_id, "12345");
    assert_eq!(statuses[0].status, MsgStatusValue::Delivered);
    assert_eq!(clog.log_type(), ChannelLogType::MsgStatus);
}

#[tokio::test]
async fn receive_unknown_status_is_rejected() {
    let (result, _) = receive("msgtype=5&dlrid=12345&status=12").await;
    assert_eq!(
        result.unwrap_err(),
        ReceiveError::InvalidValue {
            field: "status",
            value: "12".to_string()
        }
    );
}

#[tokio::test]
async fn receive_unknown_msgtype_is_rejected() {
    let (result, _) = receive("msgtype=3&id=12345&status=1").await;
    assert!(matches!(
        result.unwrap_err(),
        ReceiveError::InvalidValue { field: "msgtype", .. }
    ));
}

#[tokio::test]
async fn receive_reads_query_parameters() {
    let channel = receive_channel();
    let uri = format!("{RECEIVE_URL}?msgtype=5&dlrid=777&status=2");
    let request = form_request(&uri, "");
    let mut clog = incoming_log(&channel, &request);

    let result = handler().receive(&channel, &request, &mut clog).await;
    let ReceiveOutcome::Statuses(statuses) = result.unwrap() else {
        panic!("expected statuses");
    };
    assert_eq!(statuses[0].external_id, "777");
    assert_eq!(statuses[0].status, MsgStatusValue::Sent);
}

#[tokio::test]
async fn receive_get_delivery_report() {
    let channel = receive_channel();
    let request = get_request(&format!("{RECEIVE_URL}?msgtype=5&dlrid=888&status=3"));
    let mut clog = incoming_log(&channel, &request);

    let result = handler().receive(&channel, &request, &mut clog).await;
    let ReceiveOutcome::Statuses(statuses) = result.unwrap() else {
        panic!("expected statuses");
    };
    assert_eq!(statuses[0].external_id, "888");
    assert_eq!(statuses[0].status, MsgStatusValue::Errored);
}

// --- Send ---

async fn mock_vendor(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bin/send.json"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

fn vendor_handler(server: &MockServer) -> BongoLiveHandler {
    handler().with_send_url(format!("{}/bin/send.json", server.uri()))
}

#[tokio::test]
async fn send_posts_expected_form_and_returns_external_id() {
    let server = mock_vendor(
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({"results": [{"status": "0", "msgid": "123"}]})),
    )
    .await;
    let handler = vendor_handler(&server);
    let msg = outgoing(send_channel());

    let (result, clog) = send_msg(&handler, &msg, None, &CancellationToken::new()).await;

    assert_eq!(result.unwrap().external_id(), Some("123"));
    assert!(!clog.is_error());
    assert_eq!(clog.http_logs().len(), 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let form: HashMap<String, String> = serde_urlencoded::from_bytes(&requests[0].body).unwrap();
    assert_eq!(form["USERNAME"], "user1");
    assert_eq!(form["PASSWORD"], "pass1");
    assert_eq!(form["SOURCEADDR"], "2020");
    assert_eq!(form["DESTADDR"], "250788383383");
    assert_eq!(form["DLR"], "1");
    assert_eq!(form["MESSAGE"], "Simple Message ☺\nhttps://foo.bar/image.jpg");
    assert_eq!(form["CHARCODE"], "2");
}

#[tokio::test]
async fn send_never_logs_the_password() {
    let server = mock_vendor(
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({"results": [{"status": "0", "msgid": "123"}]})),
    )
    .await;
    let handler = vendor_handler(&server);
    let msg = outgoing(send_channel());

    let (_, clog) = send_msg(&handler, &msg, None, &CancellationToken::new()).await;

    let record = serde_json::to_string(&clog.to_record()).unwrap();
    assert!(!record.contains("pass1"));
    assert!(clog.http_logs()[0].request.contains("PASSWORD=**********"));
}

#[tokio::test]
async fn send_rejected_status_is_unexpected_response() {
    let server = mock_vendor(
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": [{"status": "3"}]})),
    )
    .await;
    let handler = vendor_handler(&server);
    let msg = outgoing(send_channel());

    let (result, clog) = send_msg(&handler, &msg, None, &CancellationToken::new()).await;

    assert_eq!(
        result.unwrap_err(),
        SendError::ResponseUnexpected {
            expected: "0".to_string()
        }
    );
    assert_eq!(clog.errors().len(), 1);
    assert_eq!(clog.errors()[0].code(), "response_unexpected");
}

#[tokio::test]
async fn send_empty_results_is_unexpected_response() {
    let server = mock_vendor(
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})),
    )
    .await;
    let handler = vendor_handler(&server);
    let msg = outgoing(send_channel());

    let (result, _) = send_msg(&handler, &msg, None, &CancellationToken::new()).await;
    assert!(matches!(result, Err(SendError::ResponseUnexpected { .. })));
}

#[tokio::test]
async fn send_non_json_body_is_unparseable() {
    let server = mock_vendor(ResponseTemplate::new(200).set_body_string("OK")).await;
    let handler = vendor_handler(&server);
    let msg = outgoing(send_channel());

    let (result, clog) = send_msg(&handler, &msg, None, &CancellationToken::new()).await;

    assert_eq!(
        result.unwrap_err(),
        SendError::ResponseUnparseable {
            format: "JSON".to_string()
        }
    );
    assert_eq!(clog.errors()[0].code(), "response_unparseable");
}

#[tokio::test]
async fn send_client_error_is_response_status() {
    let server = mock_vendor(ResponseTemplate::new(403)).await;
    let handler = vendor_handler(&server);
    let msg = outgoing(send_channel());

    let (result, clog) = send_msg(&handler, &msg, None, &CancellationToken::new()).await;

    assert_eq!(result.unwrap_err(), SendError::ResponseStatus { status: 403 });
    assert_eq!(clog.errors()[0].code(), "response_status_code");
    assert_eq!(clog.http_logs()[0].status_code, 403);
}

#[tokio::test]
async fn send_server_error_is_connection_failure() {
    let server = mock_vendor(ResponseTemplate::new(501).set_body_string("Bad Gateway")).await;
    let handler = vendor_handler(&server);
    let msg = outgoing(send_channel());

    let (result, clog) = send_msg(&handler, &msg, None, &CancellationToken::new()).await;

    let err = result.unwrap_err();
    assert_eq!(err, SendError::ConnectionFailed);
    assert!(err.is_retryable());
    assert!(clog.errors().is_empty());
    assert_eq!(clog.http_logs().len(), 1);
}

#[tokio::test]
async fn send_connection_refused_is_connection_failure() {
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let handler = handler().with_send_url(format!("{uri}/bin/send.json"));
    let msg = outgoing(send_channel());

    let (result, clog) = send_msg(&handler, &msg, None, &CancellationToken::new()).await;

    assert_eq!(result.unwrap_err(), SendError::ConnectionFailed);
    assert_eq!(clog.http_logs().len(), 1);
    assert_eq!(clog.http_logs()[0].status_code, 0);
    assert!(clog.is_error());
}

#[tokio::test]
async fn send_without_credentials_is_config_error() {
    let handler = handler();
    let channel = TestChannel::new("BL", "2020").country("KE").build();
    let msg = outgoing(channel);

    let (result, clog) = send_msg(&handler, &msg, None, &CancellationToken::new()).await;

    assert!(matches!(result, Err(SendError::ChannelConfig(_))));
    assert!(clog.http_logs().is_empty());
}

#[tokio::test]
async fn channel_send_url_overrides_handler_default() {
    let server = mock_vendor(
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({"results": [{"status": "0", "msgid": 99}]})),
    )
    .await;
    let channel = TestChannel::new("BL", "2020")
        .config("username", "user1")
        .config("password", "pass1")
        .config("send_url", format!("{}/bin/send.json", server.uri()))
        .build();
    let msg = outgoing(channel);

    let (result, _) = send_msg(&handler(), &msg, None, &CancellationToken::new()).await;
    assert_eq!(result.unwrap().external_id(), Some("99"));
}
