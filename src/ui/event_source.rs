use std::{
    sync::mpsc::{Receiver, TryRecvError},
    time::Duration,
};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{
    domain::events::{AppEvent, KeyInput},
    usecases::contracts::AppEventSource,
};

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);
const EVENT_QUEUE_CLOSED: &str = "UI_EVENT_QUEUE_CLOSED";

/// Merges terminal input with events posted by background network tasks.
///
/// Queued background events are drained before the terminal is polled so a
/// burst of pushed messages never waits behind the poll timeout.
pub struct TerminalEventSource {
    background: Receiver<AppEvent>,
    queue_closed: bool,
}

impl TerminalEventSource {
    pub fn new(background: Receiver<AppEvent>) -> Self {
        Self {
            background,
            queue_closed: false,
        }
    }

    fn next_background(&mut self) -> Option<AppEvent> {
        if self.queue_closed {
            return None;
        }

        match self.background.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!(code = EVENT_QUEUE_CLOSED, "background event queue closed");
                self.queue_closed = true;
                None
            }
        }
    }
}

impl AppEventSource for TerminalEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>> {
        if let Some(event) = self.next_background() {
            return Ok(Some(event));
        }

        if !event::poll(EVENT_POLL_TIMEOUT)? {
            return Ok(Some(AppEvent::Tick));
        }

        match event::read()? {
            Event::Key(key) => Ok(map_key(key)),
            _ => Ok(None),
        }
    }
}

fn map_key(key: KeyEvent) -> Option<AppEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
        return Some(AppEvent::QuitRequested);
    }

    let name = match key.code {
        KeyCode::Enter => "enter".to_owned(),
        KeyCode::Tab => "tab".to_owned(),
        KeyCode::BackTab => "backtab".to_owned(),
        KeyCode::Backspace => "backspace".to_owned(),
        KeyCode::Delete => "delete".to_owned(),
        KeyCode::Left => "left".to_owned(),
        KeyCode::Right => "right".to_owned(),
        KeyCode::Home => "home".to_owned(),
        KeyCode::End => "end".to_owned(),
        KeyCode::Char(ch) => ch.to_string(),
        _ => return None,
    };

    Some(AppEvent::InputKey(KeyInput::new(name, ctrl)))
}

#[cfg(test)]
pub struct MockEventSource {
    queue: std::collections::VecDeque<AppEvent>,
}

#[cfg(test)]
impl MockEventSource {
    pub fn from(events: Vec<AppEvent>) -> Self {
        Self {
            queue: events.into(),
        }
    }
}

#[cfg(test)]
impl AppEventSource for MockEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>> {
        Ok(self.queue.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn escape_and_ctrl_c_request_quit() {
        assert_eq!(
            map_key(key(KeyCode::Esc, KeyModifiers::NONE)),
            Some(AppEvent::QuitRequested)
        );
        assert_eq!(
            map_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(AppEvent::QuitRequested)
        );
    }

    #[test]
    fn plain_q_is_typed_not_quit() {
        assert_eq!(
            map_key(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(AppEvent::InputKey(KeyInput::new("q", false)))
        );
    }

    #[test]
    fn editing_keys_map_to_names() {
        assert_eq!(
            map_key(key(KeyCode::Enter, KeyModifiers::NONE)),
            Some(AppEvent::InputKey(KeyInput::new("enter", false)))
        );
        assert_eq!(
            map_key(key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(AppEvent::InputKey(KeyInput::new("backtab", false)))
        );
        assert_eq!(map_key(key(KeyCode::F(5), KeyModifiers::NONE)), None);
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut release = key(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;

        assert_eq!(map_key(release), None);
    }

    #[test]
    fn background_events_are_delivered_first() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::ReconnectDue).expect("queue open");
        let mut source = TerminalEventSource::new(rx);

        assert_eq!(source.next_background(), Some(AppEvent::ReconnectDue));
        assert_eq!(source.next_background(), None);
    }

    #[test]
    fn closed_background_queue_is_remembered() {
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);
        let mut source = TerminalEventSource::new(rx);

        assert_eq!(source.next_background(), None);
        assert!(source.queue_closed);
    }
}
