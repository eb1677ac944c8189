use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::{
    domain::{connection::ConnectionState, message::Message},
    usecases::contracts::ShellView,
};

use super::{message_input::render_message_input, styles};

const ROOM_PANEL_PERCENT: u16 = 20;
const TIME_FORMAT: &str = "%H:%M";

pub fn render(frame: &mut Frame<'_>, view: &ShellView<'_>) {
    let [content_area, status_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(frame.area());

    let [rooms_area, messages_with_input_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(ROOM_PANEL_PERCENT),
            Constraint::Percentage(100 - ROOM_PANEL_PERCENT),
        ])
        .areas(content_area);

    // 3 lines for input: 1 border + 1 text + 1 border
    let [messages_area, input_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .areas(messages_with_input_area);

    render_room_list(frame, rooms_area, view);
    render_messages(frame, messages_area, view);
    render_message_input(frame, input_area, view.shell.message_input());

    let status = Paragraph::new(status_line(view)).style(styles::status_bar_style());
    frame.render_widget(status, status_area);
}

fn render_room_list(frame: &mut Frame<'_>, area: Rect, view: &ShellView<'_>) {
    let items: Vec<ListItem<'static>> = view
        .rooms
        .iter()
        .map(|room| {
            let style = if *room == view.active_room {
                styles::active_room_style()
            } else {
                styles::room_style()
            };
            ListItem::new(Line::from(Span::styled((*room).to_owned(), style)))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(format!("Rooms ({})", view.rooms.len()))
            .borders(Borders::ALL)
            .border_style(styles::panel_border_style()),
    );
    frame.render_widget(list, area);
}

fn render_messages(frame: &mut Frame<'_>, area: Rect, view: &ShellView<'_>) {
    let items: Vec<ListItem<'static>> = view
        .messages
        .iter()
        .map(|message| ListItem::new(message_line(message)))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(format!("#{}", view.active_room))
            .borders(Borders::ALL)
            .border_style(styles::panel_border_style()),
    );

    // Keep the newest message in view.
    let mut list_state = ListState::default();
    list_state.select(view.messages.len().checked_sub(1));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn message_line(message: &Message) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{} ", message.received_at.format(TIME_FORMAT)),
            styles::message_time_style(),
        ),
        Span::styled(format!("{:>4} ", message.id), styles::message_id_style()),
        Span::styled(
            format!("{}:", message.username),
            styles::author_style(&message.display_color()),
        ),
        Span::styled(format!(" {}", message.text), styles::message_text_style()),
    ])
}

fn status_line(view: &ShellView<'_>) -> String {
    let connection = match view.connection {
        ConnectionState::Reconnecting { delay } => {
            format!("{} in {}s", view.connection.as_label(), delay.as_secs())
        }
        state => state.as_label().to_owned(),
    };
    let debug = if view.debug { " | debug" } else { "" };

    format!(
        "{connection} | user: {} | room: {}{debug} | Tab: next room | Esc: quit",
        view.username, view.active_room
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{Local, TimeZone};
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::domain::{message::MessageColor, shell_state::ShellState};

    fn message(id: u64, username: &str, text: &str) -> Message {
        Message {
            id,
            room: "lobby".to_owned(),
            username: username.to_owned(),
            text: text.to_owned(),
            color: MessageColor::Derived,
            received_at: Local
                .with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
                .single()
                .expect("valid local time"),
        }
    }

    fn view<'a>(shell: &'a ShellState, messages: &'a [Message]) -> ShellView<'a> {
        ShellView {
            shell,
            rooms: vec!["lobby", "rust"],
            active_room: "lobby",
            connection: ConnectionState::Connected,
            username: "bob",
            debug: false,
            messages,
        }
    }

    fn line_to_string(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn message_line_shows_time_id_author_and_text() {
        let line = message_line(&message(7, "bob", "hello"));

        assert_eq!(line_to_string(&line), "09:30    7 bob: hello");
    }

    #[test]
    fn message_author_uses_derived_color() {
        let line = message_line(&message(1, "bob", "hello"));

        assert_eq!(
            line.spans[2].style.fg,
            styles::parse_css_color("#b57d01")
        );
    }

    #[test]
    fn status_line_shows_connection_user_and_room() {
        let shell = ShellState::default();
        let line = status_line(&view(&shell, &[]));

        assert!(line.starts_with("CONNECTED | user: bob | room: lobby"));
        assert!(!line.contains("debug"));
    }

    #[test]
    fn status_line_shows_reconnect_delay_and_debug() {
        let shell = ShellState::default();
        let mut view = view(&shell, &[]);
        view.connection = ConnectionState::Reconnecting {
            delay: Duration::from_secs(8),
        };
        view.debug = true;

        let line = status_line(&view);

        assert!(line.starts_with("RECONNECTING in 8s"));
        assert!(line.contains("| debug"));
    }

    #[test]
    fn renders_rooms_and_messages_into_frame() {
        let shell = ShellState::default();
        let messages = vec![message(0, "System", "Welcome to the chat!")];
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).expect("test terminal");

        terminal
            .draw(|frame| render(frame, &view(&shell, &messages)))
            .expect("frame must draw");

        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Rooms (2)"));
        assert!(screen.contains("rust"));
        assert!(screen.contains("System: Welcome to the chat!"));
        assert!(screen.contains("CONNECTED"));
    }
}
