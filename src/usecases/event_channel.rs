//! Push subscription lifecycle: validation of inbound records and
//! reconnect-with-backoff.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::{
    domain::{
        connection::{Backoff, ConnectionState},
        events::PushSignal,
        message::{MessageColor, MessageId},
        renderer::Renderer,
        room_store::{NoticeKind, RoomStore},
    },
    usecases::contracts::{PushConnector, ReconnectTimer},
};

const PUSH_CHANNEL_OPENED: &str = "PUSH_CHANNEL_OPENED";
const PUSH_CHANNEL_LOST: &str = "PUSH_CHANNEL_LOST";
const PUSH_CHANNEL_MALFORMED_EVENT: &str = "PUSH_CHANNEL_MALFORMED_EVENT";
const PUSH_CHANNEL_STALE_SIGNAL: &str = "PUSH_CHANNEL_STALE_SIGNAL";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEvent {
    #[error("payload is not a valid record: {0}")]
    InvalidJson(String),
    #[error("payload is missing '{0}'")]
    MissingField(&'static str),
}

/// A push record that carries every required field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRecord {
    pub room: String,
    pub username: String,
    pub message: String,
    pub color: MessageColor,
}

#[derive(Debug, Deserialize)]
struct RawPushRecord {
    room: Option<String>,
    username: Option<String>,
    message: Option<String>,
    color: Option<String>,
}

impl PushRecord {
    pub fn parse(data: &str) -> Result<Self, MalformedEvent> {
        let raw: RawPushRecord = serde_json::from_str(data)
            .map_err(|error| MalformedEvent::InvalidJson(error.to_string()))?;

        Ok(Self {
            room: required(raw.room, "room")?,
            username: required(raw.username, "username")?,
            message: required(raw.message, "message")?,
            color: MessageColor::from_wire(raw.color.as_deref()),
        })
    }
}

/// Blank values count as missing.
fn required(value: Option<String>, field: &'static str) -> Result<String, MalformedEvent> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(MalformedEvent::MissingField(field))
}

/// Owns the live subscription and its `Connecting -> Connected ->
/// Reconnecting(delay)` state machine.
#[derive(Debug)]
pub struct EventChannel {
    uri: String,
    state: ConnectionState,
    backoff: Backoff,
    generation: Option<u64>,
}

impl EventChannel {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            state: ConnectionState::Connecting,
            backoff: Backoff::default(),
            generation: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Starts a subscription to the configured uri.
    pub fn open(&mut self, connector: &mut dyn PushConnector) {
        self.state = ConnectionState::Connecting;
        self.generation = Some(connector.connect(&self.uri));
        tracing::debug!(uri = %self.uri, generation = ?self.generation, "push subscription requested");
    }

    /// Routes one transport signal. Signals from closed subscriptions are
    /// ignored.
    pub fn handle_signal<R: Renderer>(
        &mut self,
        signal: PushSignal,
        store: &mut RoomStore<R>,
        connector: &mut dyn PushConnector,
        timer: &mut dyn ReconnectTimer,
        debug: bool,
    ) {
        if self.generation != Some(signal.generation()) {
            tracing::debug!(
                code = PUSH_CHANNEL_STALE_SIGNAL,
                generation = signal.generation(),
                "ignoring signal from closed push subscription"
            );
            return;
        }

        match signal {
            PushSignal::Opened { .. } => self.on_open(store),
            PushSignal::Payload { data, .. } => {
                if let Err(error) = self.on_payload(&data, store) {
                    if debug {
                        store.notice(NoticeKind::Debug, &format!("dropped push event: {error}"));
                    }
                }
            }
            PushSignal::Failed { reason, .. } => {
                self.on_transport_error(&reason, store, connector, timer);
            }
        }
    }

    pub fn on_open<R: Renderer>(&mut self, store: &mut RoomStore<R>) {
        self.state = ConnectionState::Connected;
        self.backoff.reset();
        tracing::info!(code = PUSH_CHANNEL_OPENED, uri = %self.uri, "connected to event stream");
        store.notice(NoticeKind::Status, "connected to event stream");
    }

    /// Validates `data` and appends it. Malformed payloads are dropped and
    /// never affect the subscription.
    pub fn on_payload<R: Renderer>(
        &mut self,
        data: &str,
        store: &mut RoomStore<R>,
    ) -> Result<MessageId, MalformedEvent> {
        let record = PushRecord::parse(data).inspect_err(|error| {
            tracing::debug!(
                code = PUSH_CHANNEL_MALFORMED_EVENT,
                error = %error,
                "dropping malformed push event"
            );
        })?;

        Ok(store.append(
            &record.room,
            &record.username,
            &record.message,
            record.color,
        ))
    }

    /// Closes the broken subscription and schedules the next attempt.
    /// Returns the scheduled delay, or `None` if a retry is already pending.
    pub fn on_transport_error<R: Renderer>(
        &mut self,
        reason: &str,
        store: &mut RoomStore<R>,
        connector: &mut dyn PushConnector,
        timer: &mut dyn ReconnectTimer,
    ) -> Option<Duration> {
        if matches!(self.state, ConnectionState::Reconnecting { .. }) {
            return None;
        }

        let delay = self.backoff.next_delay();
        self.state = ConnectionState::Reconnecting { delay };
        self.generation = None;
        connector.close();
        timer.schedule(delay);

        tracing::warn!(
            code = PUSH_CHANNEL_LOST,
            reason,
            delay_secs = delay.as_secs(),
            "push channel lost, reconnect scheduled"
        );
        store.notice(
            NoticeKind::Status,
            &format!(
                "connection lost. attempting to reconnect in {}s",
                delay.as_secs()
            ),
        );
        Some(delay)
    }

    /// Fires when the backoff timer elapses.
    pub fn on_reconnect_due(&mut self, connector: &mut dyn PushConnector) {
        if matches!(self.state, ConnectionState::Reconnecting { .. }) {
            self.open(connector);
        }
    }
}
