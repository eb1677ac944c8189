use std::{sync::mpsc::Sender, time::Duration};

use futures::StreamExt;
use thiserror::Error;
use tokio::{runtime::Handle, task::JoinHandle};

use crate::{
    domain::events::{AppEvent, PushSignal},
    server::sse::SseDecoder,
    usecases::contracts::{PushConnector, ReconnectTimer},
};

const PUSH_TRANSPORT_SUBSCRIBING: &str = "PUSH_TRANSPORT_SUBSCRIBING";
const PUSH_TRANSPORT_FAILED: &str = "PUSH_TRANSPORT_FAILED";
const PUSH_TRANSPORT_EVENT_DROPPED: &str = "PUSH_TRANSPORT_EVENT_DROPPED";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("stream read failed: {0}")]
    Read(#[source] reqwest::Error),
    #[error("event stream ended")]
    Ended,
}

/// Server-sent-events subscription running on the shared tokio runtime.
///
/// Every signal is forwarded to the shell event queue tagged with the
/// generation of the subscription that produced it.
pub struct SsePushTransport {
    runtime: Handle,
    client: reqwest::Client,
    events: Sender<AppEvent>,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl SsePushTransport {
    pub fn new(runtime: Handle, client: reqwest::Client, events: Sender<AppEvent>) -> Self {
        Self {
            runtime,
            client,
            events,
            generation: 0,
            task: None,
        }
    }
}

impl PushConnector for SsePushTransport {
    fn connect(&mut self, uri: &str) -> u64 {
        self.close();
        self.generation += 1;
        let generation = self.generation;

        tracing::debug!(code = PUSH_TRANSPORT_SUBSCRIBING, uri = %uri, generation, "opening event stream");

        let client = self.client.clone();
        let events = self.events.clone();
        let uri = uri.to_owned();
        self.task = Some(self.runtime.spawn(async move {
            let reason = match run_subscription(&client, &uri, generation, &events).await {
                Ok(()) => return,
                Err(error) => error.to_string(),
            };

            tracing::warn!(code = PUSH_TRANSPORT_FAILED, generation, reason = %reason, "event stream failed");
            forward(&events, PushSignal::Failed { generation, reason });
        }));

        generation
    }

    fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SsePushTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Reads the stream until it fails. Returns `Ok` only when the shell is gone.
async fn run_subscription(
    client: &reqwest::Client,
    uri: &str,
    generation: u64,
    events: &Sender<AppEvent>,
) -> Result<(), TransportError> {
    let response = client
        .get(uri)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(TransportError::Connect)?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status(status.as_u16()));
    }

    if !forward(events, PushSignal::Opened { generation }) {
        return Ok(());
    }

    let mut decoder = SseDecoder::default();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(TransportError::Read)?;
        for event in decoder.push(&chunk) {
            if !event.is_message() {
                continue;
            }

            let data = event.data;
            if !forward(events, PushSignal::Payload { generation, data }) {
                return Ok(());
            }
        }
    }

    Err(TransportError::Ended)
}

fn forward(events: &Sender<AppEvent>, signal: PushSignal) -> bool {
    if events.send(AppEvent::Push(signal)).is_err() {
        tracing::debug!(code = PUSH_TRANSPORT_EVENT_DROPPED, "shell event queue closed");
        return false;
    }
    true
}

/// One-shot timer that posts [`AppEvent::ReconnectDue`]. Scheduling again
/// replaces the pending deadline.
pub struct TokioReconnectTimer {
    runtime: Handle,
    events: Sender<AppEvent>,
    pending: Option<JoinHandle<()>>,
}

impl TokioReconnectTimer {
    pub fn new(runtime: Handle, events: Sender<AppEvent>) -> Self {
        Self {
            runtime,
            events,
            pending: None,
        }
    }
}

impl ReconnectTimer for TokioReconnectTimer {
    fn schedule(&mut self, delay: Duration) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        let events = self.events.clone();
        self.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(AppEvent::ReconnectDue);
        }));
    }
}

impl Drop for TokioReconnectTimer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
