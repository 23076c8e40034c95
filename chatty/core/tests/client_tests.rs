//! HTTP client tests against a mock streaming endpoint

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chatty_core::{
    ChannelSink, ChatBackend, ChatClient, ChatSession, EndpointConfig, MessageRole, RevealConfig,
    RevealEvent, RevealScheduler, StreamConsumerLoop, StreamError,
};

fn client_for(server: &MockServer) -> ChatClient {
    client_with_timeout(server, Duration::from_secs(5))
}

fn client_with_timeout(server: &MockServer, timeout: Duration) -> ChatClient {
    ChatClient::new(&EndpointConfig {
        url: format!("{}/stream", server.uri()),
        timeout,
    })
    .unwrap()
}

fn fast_loop() -> StreamConsumerLoop {
    StreamConsumerLoop::new(RevealScheduler::new(Duration::ZERO))
}

fn drain(rx: &mut tokio::sync::mpsc::Receiver<RevealEvent>) -> Vec<RevealEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_streamed_body_is_revealed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({ "content": "hi" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hey!"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut source = client.open_stream("hi").await.unwrap();
    let (mut sink, mut rx) = ChannelSink::channel(16);

    let report = fast_loop()
        .run(source.as_mut(), &mut sink, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.text, "Hey!");
    assert_eq!(
        drain(&mut rx),
        vec![
            RevealEvent::Partial("H".into()),
            RevealEvent::Partial("He".into()),
            RevealEvent::Partial("Hey".into()),
            RevealEvent::Partial("Hey!".into()),
            RevealEvent::End,
        ]
    );
}

#[tokio::test]
async fn test_empty_body_only_ends() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut source = client.open_stream("anything").await.unwrap();
    let (mut sink, mut rx) = ChannelSink::channel(4);

    let report = fast_loop()
        .run(source.as_mut(), &mut sink, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.text, "");
    assert_eq!(drain(&mut rx), vec![RevealEvent::End]);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model offline"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.open_stream("hi").await.err().unwrap();

    match err {
        StreamError::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "model offline");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_invalid_utf8_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'o', b'k', 0xff, 0xfe]))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut source = client.open_stream("hi").await.unwrap();
    let (mut sink, mut rx) = ChannelSink::channel(16);

    let err = fast_loop()
        .run(source.as_mut(), &mut sink, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, StreamError::Malformed(_)));
    assert_eq!(
        drain(&mut rx),
        vec![
            RevealEvent::Partial("o".into()),
            RevealEvent::Partial("ok".into()),
        ]
    );
}

#[tokio::test]
async fn test_reveal_may_outlast_timeout() {
    let body = format!("{}bb", "a".repeat(30));
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
        .mount(&server)
        .await;

    // 32 reveals at 50ms take well over the 1s timeout
    let client = client_with_timeout(&server, Duration::from_secs(1));
    let consumer = StreamConsumerLoop::from_config(&RevealConfig {
        reveal_interval_ms: 50,
    });
    let mut source = client.open_stream("long please").await.unwrap();
    let (mut sink, mut rx) = ChannelSink::channel(64);

    let started = std::time::Instant::now();
    let report = consumer
        .run(source.as_mut(), &mut sink, &CancellationToken::new())
        .await
        .unwrap();

    assert!(started.elapsed() > Duration::from_secs(1));
    assert_eq!(report.text, body);
    assert_eq!(drain(&mut rx).last(), Some(&RevealEvent::End));
}

#[tokio::test]
async fn test_silent_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = client_with_timeout(&server, Duration::from_millis(200));
    let err = client.open_stream("hello?").await.err().unwrap();

    assert!(matches!(err, StreamError::Transport(_)));
}

#[tokio::test]
async fn test_session_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream"))
        .and(body_json(json!({ "content": "ping" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let mut session = ChatSession::new(client_for(&server), fast_loop());
    let (mut sink, _rx) = ChannelSink::channel(16);

    session
        .send("ping", &mut sink, &CancellationToken::new())
        .await
        .unwrap();

    let roles: Vec<_> = session.history().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![MessageRole::User, MessageRole::Assistant]);
    assert_eq!(session.last_reply().unwrap().content, "pong");
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(client_for(&server).health_check().await);

    let unreachable = ChatClient::new(&EndpointConfig {
        url: "http://127.0.0.1:1/stream".into(),
        timeout: Duration::from_secs(1),
    })
    .unwrap();
    assert!(!unreachable.health_check().await);
}
