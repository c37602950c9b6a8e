//! Event stream consumer against a mock SSE backend
//!
//! The mock serves one finite SSE body; the retry delay is set long enough
//! that no reconnect happens inside the test window, so each message is
//! observed exactly once.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pwrlvl_console::{
    spawn_event_stream, DurableSubscription, EventLevel, EventLog, ProgressionTracker,
    SseSubscription,
};

const SSE_BODY: &str = concat!(
    ":keepalive\n",
    "data: {\"ts\": 1700000000.0, \"level\": \"INFO\", \"msg\": \"server up\"}\n",
    "\n",
    ":keepalive\n",
    "data: {\"ts\": 1700000001.0, \"level\": \"SCAN\", \"msg\": \"scan started\"}\n",
    "\n",
    "data: this line is not json\n",
    "\n",
    "data: {\"ts\": 1700000002.0, \"level\": \"XP\", \"msg\": \"LEVEL UP\", ",
    "\"data\": {\"level_up\": true, \"level\": 2, \"title\": \"ACOLYTE\"}}\n",
    "\n",
);

async fn sse_server(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_raw(body.as_bytes().to_vec(), "text/event-stream"),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn subscription_yields_data_payloads_only() {
    let server = sse_server(SSE_BODY).await;
    let mut subscription = SseSubscription::new(&server.uri(), Duration::from_secs(60));

    let first = subscription.next_message().await.unwrap();
    assert!(first.contains("server up"));
    let second = subscription.next_message().await.unwrap();
    assert!(second.contains("scan started"));
    // Comment and blank lines were dropped by the framing layer; the bad
    // JSON line is still delivered (decoding is the dispatcher's job).
    let third = subscription.next_message().await.unwrap();
    assert_eq!(third, "this line is not json");
}

#[tokio::test]
async fn consumer_fills_log_and_notifies_tracker() {
    let server = sse_server(SSE_BODY).await;
    let subscription = SseSubscription::new(&server.uri(), Duration::from_secs(60));

    let log = EventLog::with_capacity(300);
    let tracker = ProgressionTracker::new();
    let handle = spawn_event_stream(subscription, log.clone(), tracker.clone());

    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.shutdown();
    handle.join().await;

    let entries = log.snapshot();
    // Three well-formed records; the non-JSON payload was discarded.
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].level, EventLevel::Info);
    assert_eq!(entries[1].level, EventLevel::Scan);
    assert_eq!(entries[2].level, EventLevel::Xp);

    assert_eq!(tracker.state().level, 2);
    assert_eq!(tracker.state().title, "ACOLYTE");
    assert_eq!(tracker.take_level_up(), Some(2));
}

#[tokio::test]
async fn heartbeat_only_stream_produces_nothing() {
    let server = sse_server(":keepalive\n\n:keepalive\n\n").await;
    let subscription = SseSubscription::new(&server.uri(), Duration::from_secs(60));

    let log = EventLog::with_capacity(300);
    let handle = spawn_event_stream(subscription, log.clone(), ProgressionTracker::new());

    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.shutdown();
    handle.join().await;

    assert!(log.is_empty());
}

#[tokio::test]
async fn subscription_reconnects_after_stream_end() {
    // Short retry: after the finite body ends the transport re-requests the
    // endpoint. Two connections observed means the durable subscription
    // survived the "disconnect" without caller intervention.
    let server = sse_server("data: {\"ts\": 1.0, \"level\": \"INFO\", \"msg\": \"hello\"}\n\n").await;
    let subscription = SseSubscription::new(&server.uri(), Duration::from_millis(30));

    let log = EventLog::with_capacity(300);
    let handle = spawn_event_stream(subscription, log.clone(), ProgressionTracker::new());

    tokio::time::sleep(Duration::from_millis(250)).await;
    handle.shutdown();
    handle.join().await;

    let connections = server.received_requests().await.unwrap().len();
    assert!(connections >= 2, "expected reconnects, saw {connections}");
    assert!(!log.is_empty());
}

#[tokio::test]
async fn consumer_stops_when_subscription_closes() {
    struct Closed;
    #[async_trait::async_trait]
    impl DurableSubscription for Closed {
        async fn next_message(&mut self) -> Option<String> {
            None
        }
    }

    let handle = spawn_event_stream(
        Closed,
        EventLog::with_capacity(10),
        ProgressionTracker::new(),
    );
    // Joins on its own; no shutdown needed.
    handle.join().await;
}
