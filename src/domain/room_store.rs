//! In-memory source of truth for rooms, messages and the active-room pointer.

use std::collections::BTreeSet;

use chrono::Local;

use super::{
    events::HistoryEntry,
    message::{Message, MessageColor, MessageId},
    renderer::Renderer,
};

pub const STATUS_AUTHOR: &str = "[STATUS]";
pub const DEBUG_AUTHOR: &str = "[DEBUG]";

/// Kind of locally generated notice line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Status,
    Debug,
}

impl NoticeKind {
    pub fn author(self) -> &'static str {
        match self {
            Self::Status => STATUS_AUTHOR,
            Self::Debug => DEBUG_AUTHOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Room {
    name: String,
    messages: Vec<Message>,
}

impl Room {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            messages: Vec::new(),
        }
    }
}

/// Rooms keep creation order, which is also the order shown in the room list.
#[derive(Debug)]
pub struct RoomStore<R: Renderer> {
    rooms: Vec<Room>,
    active: usize,
    next_id: MessageId,
    /// Ids below this were cleared from the active view and are not rendered.
    view_floor: MessageId,
    muted: BTreeSet<String>,
    renderer: R,
}

impl<R: Renderer> RoomStore<R> {
    /// Creates a store whose only room, `initial_room`, is active.
    pub fn new(initial_room: &str, renderer: R) -> Self {
        Self {
            rooms: vec![Room::new(initial_room)],
            active: 0,
            next_id: 0,
            view_floor: 0,
            muted: BTreeSet::new(),
            renderer,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn active_room(&self) -> &str {
        &self.rooms[self.active].name
    }

    pub fn room_names(&self) -> impl Iterator<Item = &str> {
        self.rooms.iter().map(|room| room.name.as_str())
    }

    pub fn contains_room(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Stored log of `room`, including muted authors.
    #[cfg(test)]
    pub fn messages(&self, room: &str) -> Option<&[Message]> {
        self.position(room)
            .map(|index| self.rooms[index].messages.as_slice())
    }

    /// Creates `name` if it does not exist yet. Returns `true` on creation.
    pub fn ensure_room(&mut self, name: &str) -> bool {
        if self.contains_room(name) {
            return false;
        }

        self.rooms.push(Room::new(name));
        tracing::debug!(room = name, "room created");
        true
    }

    /// Makes `name` the active room and redraws its log.
    ///
    /// Unknown names and the already active room are no-ops.
    pub fn set_active(&mut self, name: &str) -> bool {
        let Some(index) = self.position(name) else {
            return false;
        };
        if index == self.active {
            return false;
        }

        self.active = index;
        self.redraw();
        true
    }

    /// Stores a message and signals it when it belongs to the active room and
    /// its author is not muted.
    pub fn append(
        &mut self,
        room: &str,
        username: &str,
        text: &str,
        color: MessageColor,
    ) -> MessageId {
        self.ensure_room(room);
        let index = self.position(room).unwrap_or(self.active);

        let id = self.next_id;
        self.next_id += 1;

        let message = Message {
            id,
            room: room.to_owned(),
            username: username.to_owned(),
            text: text.to_owned(),
            color,
            received_at: Local::now(),
        };

        if index == self.active && !self.muted.contains(username) {
            self.renderer.append(&message);
        }
        self.rooms[index].messages.push(message);

        id
    }

    /// Rebuilds the log of `room` with `history` as its base.
    ///
    /// Live messages the history already contains are dropped and the rest
    /// follow it. Every message gets a fresh id so ids keep increasing along
    /// the log. `superseded` names a local placeholder that only survives an
    /// empty history; an empty history leaves the log untouched.
    pub fn merge_history(
        &mut self,
        room: &str,
        history: &[HistoryEntry],
        superseded: Option<MessageId>,
    ) {
        self.ensure_room(room);
        if history.is_empty() {
            return;
        }
        let Some(index) = self.position(room) else {
            return;
        };

        let mut live = std::mem::take(&mut self.rooms[index].messages);
        if let Some(placeholder) = superseded {
            live.retain(|message| message.id != placeholder);
        }
        for entry in history {
            let duplicate = live.iter().position(|message| {
                message.username == entry.username && message.text == entry.message
            });
            if let Some(duplicate) = duplicate {
                live.remove(duplicate);
            }
        }

        let received_at = Local::now();
        let mut merged = Vec::with_capacity(history.len() + live.len());
        for entry in history {
            merged.push(Message {
                id: self.next_id,
                room: room.to_owned(),
                username: entry.username.clone(),
                text: entry.message.clone(),
                color: entry.color.clone(),
                received_at,
            });
            self.next_id += 1;
        }
        for mut message in live {
            message.id = self.next_id;
            self.next_id += 1;
            merged.push(message);
        }
        self.rooms[index].messages = merged;

        if index == self.active {
            self.redraw();
        }
    }

    /// Appends a locally generated notice to the active room.
    pub fn notice(&mut self, kind: NoticeKind, text: &str) -> MessageId {
        let room = self.active_room().to_owned();
        self.append(&room, kind.author(), text, MessageColor::Derived)
    }

    /// Deletes the rendered message `id` from the active room.
    ///
    /// Only messages currently on screen can be removed: ids from other rooms,
    /// from muted authors or cleared from the view are left alone.
    pub fn remove(&mut self, id: MessageId) -> bool {
        if id < self.view_floor {
            return false;
        }

        let log = &mut self.rooms[self.active].messages;
        let Ok(index) = log.binary_search_by_key(&id, |message| message.id) else {
            return false;
        };
        if self.muted.contains(&log[index].username) {
            return false;
        }

        log.remove(index);
        self.renderer.remove(id);
        true
    }

    /// Deletes rendered messages of the active room with `lower <= id < upper`.
    ///
    /// Walks the log in ascending id order starting at `lower` and stops at the
    /// first id not below `upper`. Returns the removed ids in ascending order.
    pub fn remove_range(&mut self, lower: MessageId, upper: MessageId) -> Vec<MessageId> {
        let log = &mut self.rooms[self.active].messages;
        let mut removed = Vec::new();
        let lower = lower.max(self.view_floor);
        let mut index = log.partition_point(|message| message.id < lower);

        while index < log.len() {
            let message = &log[index];
            if message.id >= upper {
                break;
            }
            if self.muted.contains(&message.username) {
                index += 1;
                continue;
            }

            removed.push(message.id);
            log.remove(index);
        }

        for id in &removed {
            self.renderer.remove(*id);
        }
        removed
    }

    /// Empties the displayed log without touching storage. The stored log is
    /// shown again the next time the room is activated.
    pub fn clear_view(&mut self) {
        self.view_floor = self.next_id;
        self.renderer.replace_view(&[]);
    }

    pub fn mute(&mut self, username: &str) -> bool {
        self.muted.insert(username.to_owned())
    }

    pub fn unmute(&mut self, username: &str) -> bool {
        self.muted.remove(username)
    }

    #[cfg(test)]
    pub fn is_muted(&self, username: &str) -> bool {
        self.muted.contains(username)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.rooms.iter().position(|room| room.name == name)
    }

    /// Re-renders the whole stored log of the active room.
    fn redraw(&mut self) {
        self.view_floor = 0;
        let visible: Vec<Message> = self.rooms[self.active]
            .messages
            .iter()
            .filter(|message| !self.muted.contains(&message.username))
            .cloned()
            .collect();
        self.renderer.replace_view(&visible);
    }
}
