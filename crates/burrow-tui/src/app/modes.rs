//! Key handling for the text-entry and popup modes.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::event::help_line_count;

use super::commands::{parse_command, CommandAction, CommandKeyResult};
use super::constants::PAGE_SIZE;
use super::input::InputResult;
use super::state::Mode;
use super::App;

/// What a filter keystroke does to the navigator.
enum FilterStep {
    /// Apply the pattern while still typing.
    Live(String),
    /// Keep the pattern and leave filter mode.
    Commit(String),
    /// Drop the pattern and leave filter mode.
    Clear,
}

impl App {
    pub(super) fn handle_filter_key(&mut self, key: KeyEvent) {
        let Mode::Filter { buffer } = &mut self.mode else {
            return;
        };

        let step = match key.code {
            KeyCode::Esc | KeyCode::Char('/') => FilterStep::Clear,
            KeyCode::Enter => {
                FilterStep::Commit(buffer.strip_prefix('/').unwrap_or(buffer.as_str()).to_string())
            }
            KeyCode::Backspace => {
                if buffer.as_str() == "/" {
                    FilterStep::Clear
                } else {
                    buffer.pop();
                    if buffer.is_empty() {
                        buffer.push('/');
                        FilterStep::Live(String::new())
                    } else {
                        FilterStep::Live(buffer.clone())
                    }
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if buffer.as_str() == "/" {
                    buffer.clear();
                }
                buffer.push(c);
                FilterStep::Live(buffer.clone())
            }
            _ => return,
        };

        self.selected = 0;
        match step {
            FilterStep::Live(pattern) => self.navigator.set_filter(Some(&pattern)),
            FilterStep::Commit(pattern) => {
                self.navigator.set_filter(Some(&pattern));
                self.mode = Mode::default();
                if pattern.is_empty() {
                    self.set_status("Filter cleared");
                } else {
                    self.set_status(format!("Filter: {pattern}"));
                }
            }
            FilterStep::Clear => {
                self.navigator.set_filter(None);
                self.mode = Mode::default();
                self.set_status("Filter cleared");
            }
        }
    }

    pub(super) fn handle_command_key(&mut self, key: KeyEvent) {
        let Mode::Command(input) = &mut self.mode else {
            return;
        };

        match input.handle_key(key, &self.command_history) {
            CommandKeyResult::Continue => {}
            CommandKeyResult::OutOfRange => self.flash = true,
            CommandKeyResult::Cancel => {
                self.mode = Mode::default();
                self.set_status("Command cancelled");
            }
            CommandKeyResult::Execute(line) => {
                self.mode = Mode::default();
                debug!(command = %line, "Executing command");
                match parse_command(&line) {
                    CommandAction::Empty => self.set_status("No command entered"),
                    CommandAction::EmptyShell => self.set_error("Empty shell command"),
                    CommandAction::Shell(command) => self.run_shell(&command),
                    CommandAction::Unknown(other) => {
                        self.set_error(format!("Unknown command: {other}"));
                    }
                }
            }
        }
    }

    pub(super) fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Mode::Prompt(prompt) = &mut self.mode else {
            return;
        };

        let (kind, name) = match prompt.input.handle_key(key) {
            InputResult::Continue => return,
            InputResult::Cancel => {
                self.mode = Mode::default();
                self.set_status("Cancelled");
                return;
            }
            InputResult::Submit(name) => {
                if let Err(e) = prompt.input.validate() {
                    prompt.input.set_error(e);
                    return;
                }
                (prompt.kind.clone(), name)
            }
        };

        match self.apply_prompt(&kind, &name) {
            Ok(select) => {
                self.mode = Mode::default();
                if let Some(path) = select {
                    self.select_path(&path);
                }
            }
            Err(e) => {
                if let Mode::Prompt(prompt) = &mut self.mode {
                    prompt.input.set_error(e.to_string());
                }
            }
        }
    }

    pub(super) fn handle_help_key(&mut self, key: KeyEvent) {
        let Mode::Help { scroll } = &mut self.mode else {
            return;
        };
        let max = help_line_count().saturating_sub(1);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => *scroll = (*scroll + 1).min(max),
            KeyCode::Char('k') | KeyCode::Up => *scroll = scroll.saturating_sub(1),
            KeyCode::PageDown => *scroll = (*scroll + PAGE_SIZE).min(max),
            KeyCode::PageUp => *scroll = scroll.saturating_sub(PAGE_SIZE),
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => self.mode = Mode::default(),
            _ => {}
        }
    }

    pub(super) fn handle_job_key(&mut self, key: KeyEvent) {
        let Mode::JobOutput { scroll } = &mut self.mode else {
            return;
        };
        let max = self
            .job
            .as_ref()
            .map_or(0, |job| job.lines().len().saturating_sub(1));
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => *scroll = (*scroll + 1).min(max),
            KeyCode::Char('k') | KeyCode::Up => *scroll = scroll.saturating_sub(1),
            KeyCode::PageDown => *scroll = (*scroll + PAGE_SIZE).min(max),
            KeyCode::PageUp => *scroll = scroll.saturating_sub(PAGE_SIZE),
            KeyCode::Char('q') | KeyCode::Esc => {
                // Output may have arrived since the last tick
                let was_running = self.job.as_ref().is_some_and(|job| job.is_running());
                self.poll_job();
                let mut finished_now = false;
                if let Some(job) = self.job.take() {
                    if job.is_running() {
                        job.cancel();
                    } else {
                        finished_now = was_running;
                    }
                }
                self.mode = Mode::default();
                if !finished_now {
                    self.status.clear();
                }
            }
            _ => {}
        }
    }
}
