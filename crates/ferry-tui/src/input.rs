//! Input state and key handling for the TUI.
//!
//! This module owns all text input state (buffer, cursor) and handles
//! character-level key events. Command parsing happens here on Enter.

use ferry_app::AppEvent;

use crate::commands;

/// Key input events from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Character input.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Escape key.
    Esc,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Home key.
    Home,
    /// End key.
    End,
}

/// Input state for the TUI.
///
/// Manages the text input buffer and cursor position. The cursor counts
/// characters, not bytes.
#[derive(Debug, Default)]
pub struct InputState {
    /// Text buffer for user input.
    buffer: String,
    /// Cursor position, in characters.
    cursor: usize,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the input buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Handle a key input event.
    ///
    /// Editing keys return [`AppEvent::Tick`] so the view is redrawn; Enter
    /// returns the event for the parsed line. `None` if nothing changed.
    pub fn handle_key(&mut self, key: KeyInput) -> Option<AppEvent> {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
            },
            KeyInput::Backspace => {
                if self.cursor == 0 {
                    return None;
                }
                self.cursor -= 1;
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
            },
            KeyInput::Delete => {
                if self.cursor >= self.len() {
                    return None;
                }
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
            },
            KeyInput::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyInput::Home => self.cursor = 0,
            KeyInput::End => self.cursor = self.len(),
            KeyInput::Enter => return self.handle_enter(),
            KeyInput::Esc => return Some(AppEvent::Quit),
        }
        Some(AppEvent::Tick)
    }

    /// Handle Enter key: parse the line into an app event.
    fn handle_enter(&mut self) -> Option<AppEvent> {
        let text = std::mem::take(&mut self.buffer);
        self.cursor = 0;

        if text.trim().is_empty() {
            return Some(AppEvent::Tick);
        }
        Some(commands::parse(&text).into_event())
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(input: &mut InputState, text: &str) {
        for c in text.chars() {
            input.handle_key(KeyInput::Char(c));
        }
    }

    #[test]
    fn char_input_adds_to_buffer() {
        let mut input = InputState::new();
        type_str(&mut input, "hi");

        assert_eq!(input.buffer(), "hi");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn backspace_removes_char() {
        let mut input = InputState::new();
        type_str(&mut input, "ab");
        input.handle_key(KeyInput::Backspace);

        assert_eq!(input.buffer(), "a");
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn multibyte_editing() {
        let mut input = InputState::new();
        type_str(&mut input, "héllo");
        input.handle_key(KeyInput::Home);
        input.handle_key(KeyInput::Right);
        input.handle_key(KeyInput::Delete);
        input.handle_key(KeyInput::Char('e'));

        assert_eq!(input.buffer(), "hello");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn enter_sends_message_and_clears_buffer() {
        let mut input = InputState::new();
        type_str(&mut input, "test");

        let event = input.handle_key(KeyInput::Enter);

        assert!(matches!(event, Some(AppEvent::SendText { content }) if content == "test"));
        assert!(input.buffer().is_empty());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn enter_parses_commands() {
        let mut input = InputState::new();
        type_str(&mut input, "/send");

        assert!(matches!(input.handle_key(KeyInput::Enter), Some(AppEvent::StartTransfer)));
    }

    #[test]
    fn cursor_movement() {
        let mut input = InputState::new();
        type_str(&mut input, "abc");

        input.handle_key(KeyInput::Home);
        assert_eq!(input.cursor(), 0);

        input.handle_key(KeyInput::End);
        assert_eq!(input.cursor(), 3);

        input.handle_key(KeyInput::Left);
        assert_eq!(input.cursor(), 2);

        input.handle_key(KeyInput::Right);
        input.handle_key(KeyInput::Right);
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn esc_quits() {
        let mut input = InputState::new();
        assert!(matches!(input.handle_key(KeyInput::Esc), Some(AppEvent::Quit)));
    }
}
