//! Persistent event stream consumer
//!
//! One long-lived subscription to the backend's `/events` push channel.
//! The transport owns reconnection; the dispatcher above it only decodes
//! records and fans them out to the bounded log and the progression
//! tracker. Malformed payloads and keep-alive comments are expected noise
//! and are discarded without so much as a log line.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::event_log::{EventLog, EventRecord};
use crate::progression::ProgressionTracker;

/// A push-channel connection that survives transient network loss without
/// caller intervention.
///
/// `next_message` yields raw payload strings in delivery order, each exactly
/// once; `None` means the subscription is permanently closed (only test
/// doubles and process teardown ever reach that).
#[async_trait]
pub trait DurableSubscription: Send {
    async fn next_message(&mut self) -> Option<String>;
}

/// Extract the payload of an SSE `data:` line.
///
/// Comment lines (`:keepalive`), blank lines, and field lines other than
/// `data` carry no payload.
fn data_payload(line: &[u8]) -> Option<String> {
    let line = match line.strip_suffix(b"\r") {
        Some(stripped) => stripped,
        None => line,
    };
    let rest = line.strip_prefix(b"data:")?;
    let rest = rest.strip_prefix(b" ").unwrap_or(rest);
    String::from_utf8(rest.to_vec()).ok()
}

/// SSE subscription over `GET /events` with built-in reconnect.
///
/// Line framing follows the relay pattern: buffer raw bytes, split on LF,
/// strip a trailing CR. On connection failure or stream end it sleeps the
/// retry delay and reconnects; messages already delivered are never
/// replayed because the backend streams live events only.
pub struct SseSubscription {
    http: reqwest::Client,
    url: String,
    retry: Duration,
    stream: Option<BoxStream<'static, reqwest::Result<bytes::Bytes>>>,
    buffer: Vec<u8>,
    pending: VecDeque<String>,
}

impl SseSubscription {
    pub fn new(base_url: &str, retry: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: format!("{base_url}/events"),
            retry,
            stream: None,
            buffer: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    async fn connect(&mut self) {
        loop {
            match self.http.get(&self.url).send().await {
                Ok(response) if response.status().is_success() => {
                    self.buffer.clear();
                    self.stream = Some(response.bytes_stream().boxed());
                    tracing::debug!(url = %self.url, "event stream connected");
                    return;
                }
                Ok(response) => {
                    tracing::debug!(url = %self.url, status = %response.status(), "event stream rejected");
                }
                Err(error) => {
                    tracing::debug!(url = %self.url, %error, "event stream connect failed");
                }
            }
            tokio::time::sleep(self.retry).await;
        }
    }

    fn drain_lines(&mut self) {
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(payload) = data_payload(&line[..line.len() - 1]) {
                self.pending.push_back(payload);
            }
        }
    }
}

#[async_trait]
impl DurableSubscription for SseSubscription {
    async fn next_message(&mut self) -> Option<String> {
        loop {
            if let Some(payload) = self.pending.pop_front() {
                return Some(payload);
            }
            let stream = match self.stream.as_mut() {
                Some(stream) => stream,
                None => {
                    self.connect().await;
                    continue;
                }
            };
            match stream.next().await {
                Some(Ok(bytes)) => {
                    self.buffer.extend_from_slice(&bytes);
                    self.drain_lines();
                }
                Some(Err(error)) => {
                    tracing::debug!(%error, "event stream read failed, reconnecting");
                    self.stream = None;
                    tokio::time::sleep(self.retry).await;
                }
                None => {
                    tracing::debug!("event stream ended, reconnecting");
                    self.stream = None;
                    tokio::time::sleep(self.retry).await;
                }
            }
        }
    }
}

/// Handle to the running stream consumer task.
#[derive(Debug)]
pub struct EventStreamHandle {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl EventStreamHandle {
    /// Close the subscription. Idempotent; the underlying connection is
    /// torn down exactly once.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Wait for the consumer task to finish (after `shutdown`, or after the
    /// subscription closes on its own).
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

/// Decode one payload and fan it out. Malformed payloads are heartbeat
/// noise, silently discarded.
fn dispatch(payload: &str, log: &EventLog, tracker: &ProgressionTracker) {
    let Ok(record) = serde_json::from_str::<EventRecord>(payload) else {
        return;
    };
    if record.is_level_up() {
        tracker.observe_event(&record);
    }
    log.append(record);
}

/// Spawn the long-lived consumer over any durable subscription.
///
/// Runs until `shutdown()` or until the subscription yields `None`.
pub fn spawn_event_stream<S>(
    mut subscription: S,
    log: EventLog,
    tracker: ProgressionTracker,
) -> EventStreamHandle
where
    S: DurableSubscription + 'static,
{
    let token = CancellationToken::new();
    let child = token.clone();
    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = child.cancelled() => break,
                message = subscription.next_message() => match message {
                    Some(payload) => dispatch(&payload, &log, &tracker),
                    None => break,
                }
            }
        }
        tracing::debug!("event stream consumer stopped");
    });
    EventStreamHandle { token, handle }
}
