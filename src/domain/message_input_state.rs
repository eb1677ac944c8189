//! Editable input line for chat messages and directives.

use unicode_width::UnicodeWidthChar;

/// The chat server rejects message bodies of 65536 bytes or more; characters
/// are capped well below that.
const MAX_INPUT_CHARS: usize = 16_384;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageInputState {
    text: String,
    /// Character index, not byte.
    cursor: usize,
}

impl MessageInputState {
    pub fn text(&self) -> &str {
        &self.text
    }

    #[cfg(test)]
    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    /// Terminal column of the cursor, honoring wide characters.
    pub fn cursor_column(&self) -> usize {
        self.text
            .chars()
            .take(self.cursor)
            .map(|ch| ch.width().unwrap_or(0))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns false when the line is already at its length limit.
    pub fn insert_char(&mut self, ch: char) -> bool {
        if self.text.chars().count() >= MAX_INPUT_CHARS {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
        true
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        self.remove_at_cursor();
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.remove_at_cursor();
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Hands out the current line and leaves the input empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    fn remove_at_cursor(&mut self) {
        let start = self.byte_index(self.cursor);
        let end = self.byte_index(self.cursor + 1);
        self.text.drain(start..end);
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(byte_index, _)| byte_index)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> MessageInputState {
        let mut state = MessageInputState::default();
        for ch in text.chars() {
            state.insert_char(ch);
        }
        state
    }

    #[test]
    fn inserts_at_cursor() {
        let mut state = typed("/mte");
        state.move_left();
        state.move_left();
        state.insert_char('u');

        assert_eq!(state.text(), "/mute");
        assert_eq!(state.cursor_position(), 3);
    }

    #[test]
    fn backspace_and_delete_respect_bounds() {
        let mut state = typed("ab");
        state.move_home();
        state.backspace();
        assert_eq!(state.text(), "ab");

        state.delete();
        assert_eq!(state.text(), "b");

        state.move_end();
        state.delete();
        state.backspace();
        assert!(state.is_empty());
    }

    #[test]
    fn edits_multibyte_text_by_character() {
        let mut state = typed("Привет");
        state.backspace();
        state.move_home();
        state.delete();

        assert_eq!(state.text(), "риве");
    }

    #[test]
    fn cursor_column_counts_wide_characters_twice() {
        let state = typed("a漢b");

        assert_eq!(state.cursor_position(), 3);
        assert_eq!(state.cursor_column(), 4);
    }

    #[test]
    fn take_returns_text_and_resets() {
        let mut state = typed("hello");

        assert_eq!(state.take(), "hello");
        assert!(state.is_empty());
        assert_eq!(state.cursor_position(), 0);
    }

    #[test]
    fn rejects_input_beyond_limit() {
        let mut state = MessageInputState::default();
        for _ in 0..MAX_INPUT_CHARS {
            assert!(state.insert_char('x'));
        }

        assert!(!state.insert_char('y'));
    }
}
