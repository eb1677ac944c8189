use std::time::Duration;

use anyhow::Result;

use crate::domain::{
    connection::ConnectionState, events::AppEvent, message::Message, shell_state::ShellState,
};

pub trait AppEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>>;
}

pub trait ShellOrchestrator {
    fn state(&self) -> &ShellState;
    fn view(&self) -> ShellView<'_>;
    fn handle_event(&mut self, event: AppEvent) -> Result<()>;
}

/// Read-only snapshot the terminal view draws from.
#[derive(Debug, Clone)]
pub struct ShellView<'a> {
    pub shell: &'a ShellState,
    pub rooms: Vec<&'a str>,
    pub active_room: &'a str,
    pub connection: ConnectionState,
    pub username: &'a str,
    pub debug: bool,
    pub messages: &'a [Message],
}

/// Outgoing chat message as the server expects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMessage {
    pub room: String,
    pub username: String,
    pub message: String,
    pub color: String,
}

/// Server HTTP surface, dispatched fire-and-forget.
///
/// Implementations must return immediately; each outcome is delivered later
/// as an [`AppEvent::Api`] on the shell's event queue.
pub trait ServerApi {
    fn register_user(&self, old_username: &str, new_username: &str);
    fn post_message(&self, message: PostMessage);
    fn list_rooms(&self);
    fn list_online_users(&self);
    fn fetch_history(&self, room: &str);
}

/// Opens and closes push subscriptions.
///
/// Each `connect` starts a new generation; signals from older generations
/// are stale once a newer one has been opened.
pub trait PushConnector {
    fn connect(&mut self, uri: &str) -> u64;
    fn close(&mut self);
}

/// Schedules a single [`AppEvent::ReconnectDue`] after `delay`.
pub trait ReconnectTimer {
    fn schedule(&mut self, delay: Duration);
}
