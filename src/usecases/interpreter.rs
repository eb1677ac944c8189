//! Executes parsed input against the room store, the session and the server.

use std::collections::HashMap;

use crate::{
    domain::{
        connection::ConnectionState,
        events::ApiResponse,
        message::{MessageColor, MessageId},
        renderer::Renderer,
        room_store::{NoticeKind, RoomStore},
        session::SessionConfig,
    },
    usecases::{
        commands::{self, Command, ParseError, HELP_LINES},
        contracts::ServerApi,
        send_message::prepare_post,
    },
};

pub const SYSTEM_AUTHOR: &str = "System";

const INTERPRETER_INPUT_REJECTED: &str = "INTERPRETER_INPUT_REJECTED";
const INTERPRETER_MESSAGE_DROPPED: &str = "INTERPRETER_MESSAGE_DROPPED";
const INTERPRETER_REQUEST_FAILED: &str = "INTERPRETER_REQUEST_FAILED";

/// Progress of the one-time history load of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryState {
    /// Request in flight. `welcome` is the local greeting the history replaces.
    Requested { welcome: Option<MessageId> },
    Loaded,
}

pub struct CommandInterpreter<A: ServerApi> {
    api: A,
    session: SessionConfig,
    history: HashMap<String, HistoryState>,
}

impl<A: ServerApi> CommandInterpreter<A> {
    pub fn new(api: A, session: SessionConfig) -> Self {
        Self {
            api,
            session,
            history: HashMap::new(),
        }
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Activates `room`, creating it with a welcome line when unknown, and
    /// requests its history the first time it is shown.
    pub fn enter_room<R: Renderer>(&mut self, room: &str, store: &mut RoomStore<R>) {
        let created = store.ensure_room(room);
        store.set_active(room);
        if self.history.contains_key(room) {
            return;
        }

        let welcome = created.then(|| {
            store.append(
                room,
                SYSTEM_AUTHOR,
                &format!("Welcome to {room}!"),
                MessageColor::Derived,
            )
        });
        self.history
            .insert(room.to_owned(), HistoryState::Requested { welcome });
        self.api.fetch_history(room);
    }

    /// Handles one submitted input line.
    pub fn submit<R: Renderer>(
        &mut self,
        input: &str,
        store: &mut RoomStore<R>,
        connection: ConnectionState,
    ) {
        match commands::parse(input) {
            Ok(command) => self.execute(command, store, connection),
            Err(ParseError::Empty) => {}
            Err(error) => {
                tracing::debug!(code = INTERPRETER_INPUT_REJECTED, error = %error, "directive rejected");
                store.notice(NoticeKind::Status, &error.to_string());
            }
        }
    }

    pub fn execute<R: Renderer>(
        &mut self,
        command: Command,
        store: &mut RoomStore<R>,
        connection: ConnectionState,
    ) {
        match command {
            Command::Chat { text } => self.send_chat(&text, store, connection),
            Command::Remove { id } => {
                if !store.remove(id) {
                    store.notice(
                        NoticeKind::Status,
                        &format!("no visible message with id {id}"),
                    );
                }
            }
            Command::RemoveRange { lower, upper } => {
                let removed = store.remove_range(lower, upper);
                self.debug_notice(
                    store,
                    &format!("removed {} message(s) in [{lower}, {upper})", removed.len()),
                );
            }
            Command::Mute { username } => {
                store.mute(&username);
                store.notice(NoticeKind::Status, &format!("muted {username}"));
            }
            Command::Unmute { username } => {
                let text = if store.unmute(&username) {
                    format!("unmuted {username}")
                } else {
                    format!("{username} was not muted")
                };
                store.notice(NoticeKind::Status, &text);
            }
            Command::Color { color } => {
                let text = match &color {
                    Some(value) => format!("message color set to {value}"),
                    None => "message color reset".to_owned(),
                };
                self.session.set_color_override(color);
                store.notice(NoticeKind::Status, &text);
            }
            Command::Debug => {
                let enabled = self.session.toggle_debug();
                let state = if enabled { "on" } else { "off" };
                store.notice(NoticeKind::Status, &format!("debug mode {state}"));
            }
            Command::Clear => store.clear_view(),
            Command::Help => {
                for line in HELP_LINES {
                    store.notice(NoticeKind::Status, line);
                }
            }
            Command::Online => self.api.list_online_users(),
            Command::Rooms => self.api.list_rooms(),
            Command::Join { room } => self.enter_room(&room, store),
            Command::Nick { username } => {
                self.session.set_username(&username);
                store.notice(NoticeKind::Status, &format!("username set to {username}"));
            }
        }
    }

    /// Applies the outcome of an earlier request. Notices land in whichever
    /// room is active now.
    pub fn apply_response<R: Renderer>(&mut self, response: ApiResponse, store: &mut RoomStore<R>) {
        match response {
            ApiResponse::Registered { username, result } => match result {
                Ok(()) => {
                    let old = self.session.registered_username().to_owned();
                    self.session.mark_registered(&username);
                    self.debug_notice(
                        store,
                        &format!("old_username: {old}, new_username: {username}"),
                    );
                    self.debug_notice(store, &format!("registered username {username}"));
                }
                Err(error) => {
                    self.report_failure(store, &format!("failed to register username {username}: {error}"))
                }
            },
            ApiResponse::MessagePosted { room, result } => match result {
                Ok(()) => self.debug_notice(store, &format!("message delivered to {room}")),
                Err(error) => self.report_failure(store, &format!("failed to send message: {error}")),
            },
            ApiResponse::RoomsListed(result) => match result {
                Ok(rooms) => {
                    let created = rooms.iter().filter(|room| store.ensure_room(room)).count();
                    self.debug_notice(
                        store,
                        &format!("server lists {} room(s), {created} new", rooms.len()),
                    );
                }
                Err(error) => self.report_failure(store, &format!("failed to fetch rooms: {error}")),
            },
            ApiResponse::OnlineUsersListed(result) => match result {
                Ok(users) if users.is_empty() => {
                    store.notice(NoticeKind::Status, "no users online");
                }
                Ok(users) => {
                    store.notice(NoticeKind::Status, &format!("online: {}", users.join(", ")));
                }
                Err(error) => self.report_failure(store, &format!("failed to fetch users: {error}")),
            },
            ApiResponse::HistoryFetched { room, result } => match result {
                Ok(entries) => {
                    let welcome = match self.history.insert(room.clone(), HistoryState::Loaded) {
                        Some(HistoryState::Requested { welcome }) => welcome,
                        _ => None,
                    };
                    tracing::debug!(room = %room, count = entries.len(), "applying room history");
                    store.merge_history(&room, &entries, welcome);
                }
                Err(error) => {
                    // Retried on the next activation of the room.
                    self.history.remove(&room);
                    self.report_failure(store, &format!("failed to load history for {room}: {error}"))
                }
            },
        }
    }

    fn send_chat<R: Renderer>(
        &mut self,
        text: &str,
        store: &mut RoomStore<R>,
        connection: ConnectionState,
    ) {
        let Ok(post) = prepare_post(store.active_room(), &self.session, text) else {
            return;
        };

        if self.session.needs_registration() {
            self.api
                .register_user(self.session.registered_username(), &post.username);
        }

        if !connection.is_connected() {
            tracing::info!(
                code = INTERPRETER_MESSAGE_DROPPED,
                connection = connection.as_label(),
                "chat message dropped while offline"
            );
            store.notice(NoticeKind::Status, "not connected; message dropped");
            return;
        }

        self.api.post_message(post);
    }

    fn debug_notice<R: Renderer>(&self, store: &mut RoomStore<R>, text: &str) {
        if self.session.debug() {
            store.notice(NoticeKind::Debug, text);
        }
    }

    fn report_failure<R: Renderer>(&self, store: &mut RoomStore<R>, text: &str) {
        tracing::warn!(code = INTERPRETER_REQUEST_FAILED, details = text, "server request failed");
        store.notice(NoticeKind::Status, text);
    }
}
