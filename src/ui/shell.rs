use anyhow::Result;

use crate::usecases::{
    context::AppContext,
    contracts::{AppEventSource, ShellOrchestrator},
};

use super::{terminal::TerminalSession, view};

pub fn start(
    context: &AppContext,
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
) -> Result<()> {
    tracing::info!(
        log_level = %context.config.logging.level,
        server = %context.config.server.base_url,
        "starting TUI shell"
    );

    let mut terminal = TerminalSession::new()?;
    run(event_source, orchestrator, |orchestrator| {
        terminal.draw(|frame| view::render(frame, &orchestrator.view()))
    })
}

/// Draws, then handles one event, until the orchestrator stops.
fn run<D>(
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
    mut draw: D,
) -> Result<()>
where
    D: FnMut(&dyn ShellOrchestrator) -> Result<()>,
{
    while orchestrator.state().is_running() {
        draw(&*orchestrator)?;

        if let Some(event) = event_source.next_event()? {
            orchestrator.handle_event(event)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            events::{AppEvent, KeyInput, PushSignal},
            session::SessionConfig,
        },
        ui::event_source::MockEventSource,
        usecases::{
            event_channel::test_doubles::{FakeConnector, FakeTimer},
            interpreter::test_doubles::{ApiCall, RecordingServerApi},
            shell::ChatOrchestrator,
        },
    };

    type TestOrchestrator = ChatOrchestrator<RecordingServerApi, FakeConnector, FakeTimer>;

    fn orchestrator() -> TestOrchestrator {
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

    fn typed(text: &str) -> Vec<AppEvent> {
        text.chars()
            .map(|ch| AppEvent::InputKey(KeyInput::new(ch.to_string(), false)))
            .chain(std::iter::once(AppEvent::InputKey(KeyInput::new(
                "enter", false,
            ))))
            .collect()
    }

    #[test]
    fn mock_source_produces_quit_event() {
        let mut source = MockEventSource::from(vec![AppEvent::QuitRequested]);
        let event = source.next_event().expect("must read mock event");

        assert_eq!(event, Some(AppEvent::QuitRequested));
    }

    #[test]
    fn loop_stops_on_quit_and_draws_each_iteration() {
        let mut source = MockEventSource::from(vec![AppEvent::Tick, AppEvent::QuitRequested]);
        let mut orchestrator = orchestrator();
        let mut draws = 0;

        run(&mut source, &mut orchestrator, |_| {
            draws += 1;
            Ok(())
        })
        .expect("loop must finish");

        assert!(!orchestrator.state().is_running());
        assert_eq!(draws, 2);
    }

    #[test]
    fn typed_line_is_posted_once_connected() {
        let mut events = vec![AppEvent::Push(PushSignal::Opened { generation: 1 })];
        events.extend(typed("hi"));
        events.push(AppEvent::QuitRequested);
        let mut source = MockEventSource::from(events);
        let mut orchestrator = orchestrator();

        run(&mut source, &mut orchestrator, |_| Ok(())).expect("loop must finish");

        assert!(orchestrator.state().message_input().is_empty());
        assert!(orchestrator
            .api()
            .calls()
            .iter()
            .any(|call| matches!(call, ApiCall::Post(post) if post.message == "hi")));
    }
}
