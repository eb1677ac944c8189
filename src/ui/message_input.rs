//! Message input field rendering.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::message_input_state::MessageInputState;

use super::styles;

const PLACEHOLDER_TEXT: &str = "Type a message or /help...";

const PROMPT_SYMBOL: &str = "> ";

pub fn render_message_input(frame: &mut Frame<'_>, area: Rect, input_state: &MessageInputState) {
    let line = build_input_line(input_state);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::panel_border_style()),
    );
    frame.render_widget(paragraph, area);

    let cursor_x = area
        .x
        .saturating_add(1)
        .saturating_add(PROMPT_SYMBOL.len() as u16)
        .saturating_add(input_state.cursor_column().min(u16::MAX as usize) as u16)
        .min(area.right().saturating_sub(2));
    let cursor_y = area.y.saturating_add(1);
    frame.set_cursor_position((cursor_x, cursor_y));
}

fn build_input_line(input_state: &MessageInputState) -> Line<'static> {
    let prompt = Span::styled(PROMPT_SYMBOL.to_owned(), styles::input_prompt_style());

    if input_state.is_empty() {
        return Line::from(vec![
            prompt,
            Span::styled(PLACEHOLDER_TEXT.to_owned(), styles::input_placeholder_style()),
        ]);
    }

    Line::from(vec![
        prompt,
        Span::styled(input_state.text().to_owned(), styles::input_text_style()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn shows_placeholder_when_empty() {
        let text = line_text(&build_input_line(&MessageInputState::default()));

        assert!(text.starts_with(PROMPT_SYMBOL));
        assert!(text.contains(PLACEHOLDER_TEXT));
    }

    #[test]
    fn shows_typed_text() {
        let mut state = MessageInputState::default();
        state.insert_char('H');
        state.insert_char('i');

        let text = line_text(&build_input_line(&state));

        assert_eq!(text, "> Hi");
    }
}
