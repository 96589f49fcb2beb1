//! Line editor for name prompts (create, rename).

use burrow_ops::validate_name;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Editable single-line buffer with a cursor.
///
/// The cursor is a character index, so multi-byte names edit correctly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    buffer: String,
    cursor: usize,
    original: Option<String>,
    error: Option<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` in the buffer and the cursor at the end.
    pub fn with_initial(value: &str) -> Self {
        Self {
            buffer: value.to_string(),
            cursor: value.chars().count(),
            original: Some(value.to_string()),
            error: None,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    /// Whether the buffer differs from the initial value.
    pub fn has_changed(&self) -> bool {
        self.original.as_deref() != Some(self.buffer.as_str())
    }

    /// Check the buffer as a single path component.
    pub fn validate(&self) -> Result<(), String> {
        validate_name(self.buffer.trim()).map_err(|e| e.to_string())
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map_or(self.buffer.len(), |(i, _)| i)
    }

    fn len_chars(&self) -> usize {
        self.buffer.chars().count()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
        self.error = None;

        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => InputResult::Submit(self.buffer.trim().to_string()),
            (KeyCode::Esc, _) => InputResult::Cancel,
            (KeyCode::Backspace, _) => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
                InputResult::Continue
            }
            (KeyCode::Delete, _) => {
                if self.cursor < self.len_chars() {
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
                InputResult::Continue
            }
            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                InputResult::Continue
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.len_chars());
                InputResult::Continue
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                InputResult::Continue
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len_chars();
                InputResult::Continue
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.buffer.clear();
                self.cursor = 0;
                InputResult::Continue
            }
            (KeyCode::Char('k'), KeyModifiers::CONTROL) => {
                let at = self.byte_index(self.cursor);
                self.buffer.truncate(at);
                InputResult::Continue
            }
            (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                let end = self.byte_index(self.cursor);
                let start = self.buffer[..end]
                    .trim_end()
                    .rfind(char::is_whitespace)
                    .map_or(0, |i| i + 1);
                self.buffer.replace_range(start..end, "");
                self.cursor = self.buffer[..start].chars().count();
                InputResult::Continue
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                let at = self.byte_index(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
                InputResult::Continue
            }
            _ => InputResult::Continue,
        }
    }
}

/// Result of handling input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Cancel,
    /// Submitted value, trimmed.
    Submit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = InputState::new();
        for c in "notes".chars() {
            input.handle_key(key(KeyCode::Char(c)));
        }
        input.handle_key(key(KeyCode::Backspace));

        assert_eq!(input.buffer(), "note");
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn test_insert_in_middle_of_multibyte_name() {
        let mut input = InputState::with_initial("héllo");
        input.handle_key(key(KeyCode::Home));
        input.handle_key(key(KeyCode::Right));
        input.handle_key(key(KeyCode::Right));
        input.handle_key(key(KeyCode::Char('X')));

        assert_eq!(input.buffer(), "héXllo");
        assert!(input.has_changed());
    }

    #[test]
    fn test_ctrl_w_deletes_previous_word() {
        let mut input = InputState::with_initial("my new file");
        input.handle_key(ctrl('w'));
        assert_eq!(input.buffer(), "my new ");
        assert_eq!(input.cursor(), 7);
    }

    #[test]
    fn test_ctrl_k_and_ctrl_u() {
        let mut input = InputState::with_initial("report.txt");
        input.handle_key(ctrl('a'));
        for _ in 0..6 {
            input.handle_key(key(KeyCode::Right));
        }
        input.handle_key(ctrl('k'));
        assert_eq!(input.buffer(), "report");

        input.handle_key(ctrl('u'));
        assert_eq!(input.buffer(), "");
    }

    #[test]
    fn test_submit_trims_and_cancel() {
        let mut input = InputState::with_initial(" a.txt ");
        assert_eq!(
            input.handle_key(key(KeyCode::Enter)),
            InputResult::Submit("a.txt".into())
        );
        assert_eq!(input.handle_key(key(KeyCode::Esc)), InputResult::Cancel);
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        assert!(InputState::with_initial("ok.txt").validate().is_ok());
        assert!(InputState::with_initial("a/b").validate().is_err());
        assert!(InputState::with_initial("..").validate().is_err());
        assert!(InputState::with_initial("  ").validate().is_err());
    }
}
