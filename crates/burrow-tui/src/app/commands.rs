//! `:` command line handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Command line buffer with history browsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandInput {
    buffer: String,
    /// Position while browsing history; `None` means editing a fresh line.
    history_index: Option<usize>,
}

impl CommandInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Handle a key. `history` holds previously successful commands, oldest
    /// first.
    pub fn handle_key(&mut self, key: KeyEvent, history: &[String]) -> CommandKeyResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => {
                let command = self.buffer.trim().to_string();
                self.buffer.clear();
                self.history_index = None;
                CommandKeyResult::Execute(command)
            }
            (KeyCode::Esc, _) => CommandKeyResult::Cancel,
            (KeyCode::Backspace, _) => {
                if self.buffer.pop().is_none() {
                    return CommandKeyResult::Cancel;
                }
                self.history_index = None;
                CommandKeyResult::Continue
            }
            (KeyCode::Up, _) | (KeyCode::Char('p'), KeyModifiers::CONTROL) => {
                self.step_history(history, -1)
            }
            (KeyCode::Down, _) | (KeyCode::Char('n'), KeyModifiers::CONTROL) => {
                self.step_history(history, 1)
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.buffer.clear();
                self.history_index = None;
                CommandKeyResult::Continue
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.buffer.push(c);
                self.history_index = None;
                CommandKeyResult::Continue
            }
            _ => CommandKeyResult::Continue,
        }
    }

    /// Move through history. Stepping past the newest entry yields an empty
    /// buffer; stepping beyond either end is rejected.
    fn step_history(&mut self, history: &[String], delta: isize) -> CommandKeyResult {
        let len = history.len();
        if len == 0 {
            return CommandKeyResult::OutOfRange;
        }
        let current = self.history_index.unwrap_or(len);
        let Some(next) = current.checked_add_signed(delta).filter(|&i| i <= len) else {
            return CommandKeyResult::OutOfRange;
        };

        self.history_index = Some(next);
        self.buffer = history.get(next).cloned().unwrap_or_default();
        CommandKeyResult::Continue
    }
}

/// Result of handling a key in command mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKeyResult {
    Continue,
    Cancel,
    /// Run the trimmed command line.
    Execute(String),
    /// History step beyond either end.
    OutOfRange,
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// Nothing was typed.
    Empty,
    /// `!` with no command after it.
    EmptyShell,
    /// `!cmd`: run `cmd` through the shell.
    Shell(String),
    Unknown(String),
}

/// Parse a trimmed command line.
pub fn parse_command(command: &str) -> CommandAction {
    let command = command.trim();
    if command.is_empty() {
        return CommandAction::Empty;
    }
    match command.strip_prefix('!').map(str::trim) {
        Some("") => CommandAction::EmptyShell,
        Some(shell) => CommandAction::Shell(shell.to_string()),
        None => CommandAction::Unknown(command.to_string()),
    }
}
