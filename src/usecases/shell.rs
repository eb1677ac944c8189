use anyhow::Result;

use crate::{
    domain::{
        displayed_log::DisplayedLog,
        events::{AppEvent, KeyInput},
        message::MessageColor,
        room_store::RoomStore,
        session::SessionConfig,
        shell_state::ShellState,
    },
    usecases::{
        commands::Command,
        contracts::{PushConnector, ReconnectTimer, ServerApi, ShellOrchestrator, ShellView},
        event_channel::EventChannel,
        interpreter::{CommandInterpreter, SYSTEM_AUTHOR},
    },
};

const WELCOME_TEXT: &str = "Welcome to the chat!";

/// The single execution context: every state mutation happens inside
/// [`ShellOrchestrator::handle_event`], one event at a time.
pub struct ChatOrchestrator<A, C, T>
where
    A: ServerApi,
    C: PushConnector,
    T: ReconnectTimer,
{
    state: ShellState,
    store: RoomStore<DisplayedLog>,
    channel: EventChannel,
    interpreter: CommandInterpreter<A>,
    connector: C,
    timer: T,
}

impl<A, C, T> ChatOrchestrator<A, C, T>
where
    A: ServerApi,
    C: PushConnector,
    T: ReconnectTimer,
{
    pub fn new(
        initial_room: &str,
        events_uri: &str,
        session: SessionConfig,
        api: A,
        connector: C,
        timer: T,
    ) -> Self {
        Self {
            state: ShellState::default(),
            store: RoomStore::new(initial_room, DisplayedLog::default()),
            channel: EventChannel::new(events_uri),
            interpreter: CommandInterpreter::new(api, session),
            connector,
            timer,
        }
    }

    /// Greets the user, subscribes to the push channel and asks the server
    /// for the initial room's history and its room list.
    pub fn start(&mut self) {
        let room = self.store.active_room().to_owned();
        self.store
            .append(&room, SYSTEM_AUTHOR, WELCOME_TEXT, MessageColor::Derived);
        self.interpreter.enter_room(&room, &mut self.store);
        self.channel.open(&mut self.connector);
        self.interpreter
            .execute(Command::Rooms, &mut self.store, self.channel.state());
    }

    #[cfg(test)]
    pub fn store(&self) -> &RoomStore<DisplayedLog> {
        &self.store
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        self.interpreter.api()
    }

    fn handle_key(&mut self, key: KeyInput) {
        match key.key.as_str() {
            "enter" => {
                let line = self.state.message_input_mut().take();
                self.interpreter
                    .submit(&line, &mut self.store, self.channel.state());
            }
            "tab" => self.cycle_room(true),
            "backtab" => self.cycle_room(false),
            "backspace" => self.state.message_input_mut().backspace(),
            "delete" => self.state.message_input_mut().delete(),
            "left" => self.state.message_input_mut().move_left(),
            "right" => self.state.message_input_mut().move_right(),
            "home" => self.state.message_input_mut().move_home(),
            "end" => self.state.message_input_mut().move_end(),
            other if !key.ctrl => {
                let mut chars = other.chars();
                if let (Some(ch), None) = (chars.next(), chars.next()) {
                    self.state.message_input_mut().insert_char(ch);
                }
            }
            _ => {}
        }
    }

    fn cycle_room(&mut self, forward: bool) {
        let rooms: Vec<String> = self.store.room_names().map(str::to_owned).collect();
        let Some(current) = rooms
            .iter()
            .position(|room| room == self.store.active_room())
        else {
            return;
        };

        let next = if forward {
            (current + 1) % rooms.len()
        } else {
            (current + rooms.len() - 1) % rooms.len()
        };
        self.interpreter.enter_room(&rooms[next], &mut self.store);
    }
}

impl<A, C, T> ShellOrchestrator for ChatOrchestrator<A, C, T>
where
    A: ServerApi,
    C: PushConnector,
    T: ReconnectTimer,
{
    fn state(&self) -> &ShellState {
        &self.state
    }

    fn view(&self) -> ShellView<'_> {
        ShellView {
            shell: &self.state,
            rooms: self.store.room_names().collect(),
            active_room: self.store.active_room(),
            connection: self.channel.state(),
            username: self.interpreter.session().username(),
            debug: self.interpreter.session().debug(),
            messages: self.store.renderer().messages(),
        }
    }

    fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Tick => {}
            AppEvent::QuitRequested => {
                self.connector.close();
                self.state.stop();
            }
            AppEvent::InputKey(key) => self.handle_key(key),
            AppEvent::Push(signal) => {
                let debug = self.interpreter.session().debug();
                self.channel.handle_signal(
                    signal,
                    &mut self.store,
                    &mut self.connector,
                    &mut self.timer,
                    debug,
                );
            }
            AppEvent::ReconnectDue => self.channel.on_reconnect_due(&mut self.connector),
            AppEvent::Api(response) => self.interpreter.apply_response(response, &mut self.store),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        domain::{
            connection::ConnectionState,
            events::{ApiResponse, PushSignal},
        },
        usecases::{
            event_channel::test_doubles::{FakeConnector, FakeTimer},
            interpreter::test_doubles::{ApiCall, RecordingServerApi},
        },
    };

    type TestOrchestrator = ChatOrchestrator<RecordingServerApi, FakeConnector, FakeTimer>;

    fn started() -> TestOrchestrator {
        let mut orchestrator = ChatOrchestrator::new(
            "lobby",
            "http://chat.test/events",
            SessionConfig::new("bob"),
            RecordingServerApi::default(),
            FakeConnector::default(),
            FakeTimer::default(),
        );
        orchestrator.start();
        orchestrator
    }

    fn handle(orchestrator: &mut TestOrchestrator, event: AppEvent) {
        orchestrator
            .handle_event(event)
            .expect("event must be handled");
    }

    fn type_line(orchestrator: &mut TestOrchestrator, line: &str) {
        for ch in line.chars() {
            handle(
                orchestrator,
                AppEvent::InputKey(KeyInput::new(ch.to_string(), false)),
            );
        }
        handle(
            orchestrator,
            AppEvent::InputKey(KeyInput::new("enter", false)),
        );
    }

    fn push(orchestrator: &mut TestOrchestrator, data: &str) {
        let generation = orchestrator.connector.current_generation();
        handle(
            orchestrator,
            AppEvent::Push(PushSignal::Payload {
                generation,
                data: data.to_owned(),
            }),
        );
    }

    fn open(orchestrator: &mut TestOrchestrator) {
        let generation = orchestrator.connector.current_generation();
        handle(
            orchestrator,
            AppEvent::Push(PushSignal::Opened { generation }),
        );
    }

    fn shown(orchestrator: &TestOrchestrator) -> Vec<String> {
        orchestrator
            .view()
            .messages
            .iter()
            .map(|message| format!("{}: {}", message.username, message.text))
            .collect()
    }

    #[test]
    fn start_welcomes_subscribes_and_lists_rooms() {
        let orchestrator = started();

        assert_eq!(shown(&orchestrator), vec!["System: Welcome to the chat!"]);
        assert_eq!(
            orchestrator.connector.connected,
            vec!["http://chat.test/events"]
        );
        assert_eq!(
            orchestrator.interpreter.api().calls(),
            vec![ApiCall::FetchHistory("lobby".to_owned()), ApiCall::ListRooms]
        );
        assert_eq!(orchestrator.view().connection, ConnectionState::Connecting);
    }

    #[test]
    fn stops_on_quit_event_and_closes_subscription() {
        let mut orchestrator = started();

        handle(&mut orchestrator, AppEvent::QuitRequested);

        assert!(!orchestrator.state().is_running());
        assert_eq!(orchestrator.connector.closes, 1);
    }

    #[test]
    fn typed_message_is_posted_once_connected() {
        let mut orchestrator = started();
        open(&mut orchestrator);

        type_line(&mut orchestrator, "hi all");

        let calls = orchestrator.interpreter.api().calls();
        assert!(matches!(
            calls.last(),
            Some(ApiCall::Post(post)) if post.message == "hi all" && post.room == "lobby"
        ));
        assert!(orchestrator.state().message_input().is_empty());
    }

    #[test]
    fn typed_message_is_dropped_before_connection_opens() {
        let mut orchestrator = started();

        type_line(&mut orchestrator, "too early");

        assert!(!orchestrator
            .interpreter
            .api()
            .calls()
            .iter()
            .any(|call| matches!(call, ApiCall::Post(_))));
        assert_eq!(
            shown(&orchestrator).last().map(String::as_str),
            Some("[STATUS]: not connected; message dropped")
        );
    }

    #[test]
    fn mute_directive_hides_inbound_messages_from_view() {
        let mut orchestrator = started();
        open(&mut orchestrator);
        type_line(&mut orchestrator, "/mute alice");

        push(
            &mut orchestrator,
            r#"{"room":"lobby","username":"alice","message":"hidden"}"#,
        );

        assert!(!shown(&orchestrator).iter().any(|line| line.contains("hidden")));
        let stored = orchestrator.store().messages("lobby").unwrap_or_default();
        assert!(stored.iter().any(|message| message.text == "hidden"));
    }

    #[test]
    fn tab_cycles_rooms_in_creation_order() {
        let mut orchestrator = started();
        handle(
            &mut orchestrator,
            AppEvent::Api(ApiResponse::RoomsListed(Ok(vec![
                "lobby".to_owned(),
                "rust".to_owned(),
                "music".to_owned(),
            ]))),
        );

        handle(&mut orchestrator, AppEvent::InputKey(KeyInput::new("tab", false)));
        assert_eq!(orchestrator.view().active_room, "rust");

        handle(
            &mut orchestrator,
            AppEvent::InputKey(KeyInput::new("backtab", false)),
        );
        handle(
            &mut orchestrator,
            AppEvent::InputKey(KeyInput::new("backtab", false)),
        );
        assert_eq!(orchestrator.view().active_room, "music");
    }

    #[test]
    fn tab_into_listed_room_requests_history_once() {
        let mut orchestrator = started();
        handle(
            &mut orchestrator,
            AppEvent::Api(ApiResponse::RoomsListed(Ok(vec![
                "lobby".to_owned(),
                "rust".to_owned(),
            ]))),
        );

        for _ in 0..3 {
            handle(&mut orchestrator, AppEvent::InputKey(KeyInput::new("tab", false)));
        }

        let fetches: Vec<_> = orchestrator
            .api()
            .calls()
            .into_iter()
            .filter(|call| matches!(call, ApiCall::FetchHistory(_)))
            .collect();
        assert_eq!(
            fetches,
            vec![
                ApiCall::FetchHistory("lobby".to_owned()),
                ApiCall::FetchHistory("rust".to_owned()),
            ]
        );
    }

    #[test]
    fn transport_failure_then_timer_reconnects() {
        let mut orchestrator = started();
        open(&mut orchestrator);
        let generation = orchestrator.connector.current_generation();

        handle(
            &mut orchestrator,
            AppEvent::Push(PushSignal::Failed {
                generation,
                reason: "eof".to_owned(),
            }),
        );
        assert_eq!(orchestrator.timer.scheduled, vec![Duration::from_secs(1)]);

        handle(&mut orchestrator, AppEvent::ReconnectDue);
        assert_eq!(orchestrator.connector.connected.len(), 2);
        assert_eq!(orchestrator.view().connection, ConnectionState::Connecting);
    }

    #[test]
    fn remove_range_typed_in_shell_updates_view() {
        let mut orchestrator = started();
        open(&mut orchestrator);
        for index in 0..6 {
            push(
                &mut orchestrator,
                &format!(r#"{{"room":"lobby","username":"carol","message":"m{index}"}}"#),
            );
        }

        // ids 0 and 1 are the welcome line and the connected notice.
        type_line(&mut orchestrator, "/remove_range 3 7");

        let ids: Vec<_> = orchestrator
            .view()
            .messages
            .iter()
            .map(|message| message.id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 7]);
    }
}
