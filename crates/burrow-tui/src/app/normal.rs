//! Normal-mode key handling: pending sequences, leader commands and repeat.

use std::path::{Path, PathBuf};
use std::time::Instant;

use burrow_core::{FileInfo, SortMode, WorkspaceTarget};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::event::KeyAction;
use crate::opener::{LaunchError, OpenOutcome};
use crate::ui::pretty_path;

use super::commands::CommandInput;
use super::constants::DOUBLE_ESCAPE_THRESHOLD;
use super::input::InputState;
use super::leader::{LeaderCommand, LeaderMatch};
use super::state::{
    since, AfterSuspend, Mode, Pending, Prompt, PromptKind, SuspendRequest, VisualRange,
};
use super::App;

impl App {
    /// Handle a key in Normal mode, recording the key trail for `.`.
    pub(super) fn handle_normal_key(&mut self, key: KeyEvent, now: Instant) {
        if !self.repeating {
            self.key_trail.push(key);
        }
        self.record_repeat = false;

        self.interpret_normal_key(key, now);

        if self.record_repeat && !self.repeating {
            self.last_repeatable = std::mem::take(&mut self.key_trail);
        }
        let pending = self.mode.normal().is_some_and(|normal| !normal.is_idle());
        if !pending {
            self.key_trail.clear();
        }
    }

    fn interpret_normal_key(&mut self, key: KeyEvent, now: Instant) {
        let pending = self
            .mode
            .normal()
            .map(|normal| normal.pending.clone())
            .unwrap_or_default();

        match pending {
            Pending::Leader { buffer, .. } => {
                self.handle_leader_key(buffer, key, now);
                return;
            }
            Pending::Operator { kind, .. } => {
                self.set_pending(Pending::None);
                if KeyAction::from_key_event(key) == KeyAction::Operator(kind) {
                    self.run_operator(kind);
                    return;
                }
                if key.code == KeyCode::Esc {
                    return;
                }
                // Not part of the operator: handle it on its own
                if !self.repeating {
                    self.key_trail = vec![key];
                }
            }
            Pending::None => {}
        }

        if let KeyCode::Char(c) = key.code {
            if c == self.config.leader_key && !key.modifiers.contains(KeyModifiers::CONTROL) {
                self.set_pending(Pending::Leader {
                    buffer: String::new(),
                    armed_at: now,
                });
                return;
            }
        }

        let action = KeyAction::from_key_event(key);
        if action != KeyAction::Cancel {
            self.last_escape = None;
        }
        self.perform(action, now);
    }

    fn perform(&mut self, action: KeyAction, now: Instant) {
        match action {
            KeyAction::MoveUp => self.move_wrapping(-1),
            KeyAction::MoveDown => self.move_wrapping(1),
            KeyAction::JumpUp => self.jump(false),
            KeyAction::JumpDown => self.jump(true),
            KeyAction::Parent => self.go_parent(),
            KeyAction::Open => self.open_selected(),
            KeyAction::Confirm => {
                if self.picker.is_some() {
                    self.confirm_pick();
                } else {
                    self.open_selected();
                }
            }
            KeyAction::HistoryBack => self.step_history(false),
            KeyAction::HistoryForward => self.step_history(true),
            KeyAction::BookmarkPrev => self.step_bookmark(false),
            KeyAction::BookmarkNext => self.step_bookmark(true),
            KeyAction::Home => self.go_home(),
            KeyAction::ToggleMark => self.toggle_mark(),
            KeyAction::Visual => self.toggle_visual(),
            KeyAction::Operator(kind) => self.set_pending(Pending::Operator {
                kind,
                armed_at: now,
            }),
            KeyAction::Paste => self.paste(),
            KeyAction::Delete => self.request_delete(),
            KeyAction::Filter => {
                self.exit_visual();
                if self.navigator.filter().is_some() {
                    self.navigator.set_filter(None);
                    self.set_status("Filter cleared");
                } else {
                    self.mode = Mode::Filter {
                        buffer: "/".to_string(),
                    };
                }
            }
            KeyAction::CommandMode => {
                self.mode = Mode::Command(CommandInput::new());
            }
            KeyAction::ClearFilter => {
                self.exit_visual();
                self.navigator.set_filter(None);
                let removed = self.navigator.clear_expansions();
                self.selected = 0;
                self.set_status(format!("Filter and {removed} expansion(s) cleared"));
            }
            KeyAction::ToggleHelp => self.mode = Mode::Help { scroll: 0 },
            KeyAction::Terminal => {
                let cwd = self.navigator.current_dir().to_path_buf();
                self.launch_terminal(&cwd, None);
            }
            KeyAction::Repeat => self.repeat_last(now),
            KeyAction::Cancel => self.cancel(now),
            KeyAction::Quit => {
                self.shutdown();
                self.set_status("Quit");
                self.should_quit = true;
            }
            KeyAction::None => {}
        }
    }

    pub(super) fn set_pending(&mut self, pending: Pending) {
        if let Some(normal) = self.mode.normal_mut() {
            normal.pending = pending;
        }
    }

    fn handle_leader_key(&mut self, mut buffer: String, key: KeyEvent, now: Instant) {
        let c = match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => c,
            _ => {
                self.set_pending(Pending::None);
                return;
            }
        };
        buffer.push(c);

        let found = match self.leader_table.lookup(&buffer) {
            LeaderMatch::Exact(command) => Some(Some(command.clone())),
            LeaderMatch::Prefix => Some(None),
            LeaderMatch::NoMatch => None,
        };
        let Some(found) = found else {
            debug!(sequence = %buffer, "No leader command");
            self.set_pending(Pending::None);
            return;
        };

        match found {
            Some(command) => {
                self.set_pending(Pending::None);
                if command.is_repeatable() {
                    self.record_repeat = true;
                }
                self.run_leader_command(command);
            }
            None => self.set_pending(Pending::Leader {
                buffer,
                armed_at: now,
            }),
        }
    }

    pub(super) fn visual(&self) -> Option<VisualRange> {
        self.mode.normal().and_then(|normal| normal.visual)
    }

    pub(super) fn exit_visual(&mut self) {
        if let Some(normal) = self.mode.normal_mut() {
            normal.visual = None;
        }
    }

    /// Move the active end of the visual range to the cursor.
    pub(super) fn sync_visual(&mut self) {
        let selected = self.selected;
        if let Some(visual) = self.mode.normal_mut().and_then(|n| n.visual.as_mut()) {
            visual.active = selected;
        }
    }

    fn toggle_visual(&mut self) {
        if self.items.is_empty() {
            self.exit_visual();
            return;
        }
        match self.visual() {
            Some(range) => {
                let (start, end) = range.bounds();
                let paths: Vec<PathBuf> = self.items[start..=end.min(self.items.len() - 1)]
                    .iter()
                    .map(|entry| entry.path.clone())
                    .collect();
                let count = paths.len();
                self.marks.extend(paths);
                self.exit_visual();
                self.set_status(format!("Pinned {count} item(s)"));
            }
            None => {
                let selected = self.selected;
                if let Some(normal) = self.mode.normal_mut() {
                    normal.visual = Some(VisualRange::new(selected));
                }
            }
        }
    }

    fn toggle_mark(&mut self) {
        let Some(path) = self.selected_entry().map(|entry| entry.path.clone()) else {
            return;
        };
        if !self.marks.remove(&path) {
            self.marks.insert(path);
        }
        self.selected = (self.selected + 1) % self.items.len();
        self.exit_visual();
        self.record_repeat = true;
    }

    fn cancel(&mut self, now: Instant) {
        if self.visual().is_some() {
            self.exit_visual();
            self.last_escape = None;
            return;
        }

        let double = self
            .last_escape
            .is_some_and(|previous| since(now, previous) <= DOUBLE_ESCAPE_THRESHOLD);
        if double {
            self.last_escape = None;
            match self.navigator.reset_to_home() {
                Ok(()) => {
                    self.selected = 0;
                    self.set_status("Returned to ~");
                }
                Err(e) => self.set_error(e.to_string()),
            }
            return;
        }

        self.last_escape = Some(now);
        self.navigator.set_filter(None);
        let current = self.navigator.current_dir().to_path_buf();
        self.navigator.collapse_expansions_under(&current);
        self.set_status(format!("Collapsed {}", FileInfo::name_of(&current)));
    }

    fn repeat_last(&mut self, now: Instant) {
        if self.repeating {
            return;
        }
        if self.last_repeatable.is_empty() {
            self.set_error("Nothing to repeat");
            return;
        }

        let keys = self.last_repeatable.clone();
        debug!(keys = keys.len(), "Repeating last command");
        self.repeating = true;
        for key in keys {
            self.dispatch_key(key, now);
            self.refresh_items();
        }
        self.repeating = false;
        self.record_repeat = false;
    }

    fn run_leader_command(&mut self, command: LeaderCommand) {
        debug!(?command, "Running leader command");
        let scope = self
            .navigator
            .compute_context_scope(&self.items, self.selected);

        match command {
            LeaderCommand::ScopeTop | LeaderCommand::ScopeBottom => {
                if self.items.is_empty() {
                    return;
                }
                let (first, last) = scope.range.unwrap_or((0, self.items.len() - 1));
                self.selected = if command == LeaderCommand::ScopeTop {
                    first
                } else {
                    last
                };
                self.sync_visual();
            }
            LeaderCommand::Sort(mode) => self.apply_sort(scope.dir.as_deref(), mode),
            LeaderCommand::CreateFile | LeaderCommand::CreateDir => {
                let dir = scope
                    .dir
                    .unwrap_or_else(|| self.navigator.current_dir().to_path_buf());
                let kind = if command == LeaderCommand::CreateFile {
                    PromptKind::CreateFile { dir }
                } else {
                    PromptKind::CreateDir { dir }
                };
                self.mode = Mode::Prompt(Prompt {
                    kind,
                    input: InputState::new(),
                });
            }
            LeaderCommand::Rename => {
                let Some(entry) = self.selected_entry().cloned() else {
                    self.set_error("Nothing to rename");
                    return;
                };
                self.mode = Mode::Prompt(Prompt {
                    kind: PromptKind::Rename { path: entry.path },
                    input: InputState::with_initial(&entry.name),
                });
            }
            LeaderCommand::ToggleBookmark => {
                let shown = pretty_path(self.navigator.current_dir(), self.navigator.home());
                if self.navigator.toggle_bookmark() {
                    self.set_status(format!("Bookmarked {shown}"));
                } else {
                    self.set_status(format!("Unbookmarked {shown}"));
                }
            }
            LeaderCommand::ClearMarks => {
                if self.marks.is_empty() {
                    self.set_status("No marks to clear");
                } else {
                    self.marks.clear();
                    self.set_status("Cleared marks");
                }
            }
            LeaderCommand::ClearClipboard => {
                self.clipboard.cleanup();
                self.set_status("Clipboard cleared");
            }
            LeaderCommand::ToggleExpansion => self.toggle_expansion(),
            LeaderCommand::CollapseAll => {
                if self.navigator.clear_expansions() > 0 {
                    self.set_status("Collapsed all expansions");
                } else {
                    self.set_status("No expansions to collapse");
                }
            }
            LeaderCommand::ExpandAll => match self.navigator.expand_all() {
                0 => self.set_status("No directories expanded"),
                added => self.set_status(format!("Expanded {added} directories")),
            },
            LeaderCommand::ToggleHidden => {
                self.exit_visual();
                if self.navigator.toggle_hidden() {
                    self.set_status("Showing dotfiles");
                } else {
                    self.set_status("Hiding dotfiles");
                }
            }
            LeaderCommand::EditConfig => self.edit_config(),
            LeaderCommand::OpenFile(token) => {
                if let Some(path) = self.config.file_shortcuts.get(&token).cloned() {
                    self.open_file(&path);
                }
            }
            LeaderCommand::JumpDir(token) => {
                if let Some(path) = self.config.dir_shortcuts.get(&token).cloned() {
                    self.enter_directory(&path);
                }
            }
            LeaderCommand::TerminalAt(token) => {
                if let Some(path) = self.config.dir_shortcuts.get(&token).cloned() {
                    self.launch_terminal(&path, None);
                }
            }
            LeaderCommand::Workspace(token) => self.launch_workspace(&token),
        }
    }

    fn apply_sort(&mut self, dir: Option<&Path>, mode: SortMode) {
        self.navigator.set_sort(dir, mode);
        match dir {
            Some(dir) => self.set_status(format!(
                "Sort: {} ({})",
                mode.label(),
                FileInfo::name_of(dir)
            )),
            None => self.set_status(format!("Sort: {}", mode.label())),
        }
    }

    /// Toggle the selected directory, or the parent of the selected file.
    fn toggle_expansion(&mut self) {
        let Some(entry) = self.selected_entry().cloned() else {
            return;
        };
        let target = if entry.is_dir {
            entry.path
        } else {
            match entry.path.parent() {
                Some(parent) if parent != self.navigator.current_dir() => parent.to_path_buf(),
                _ => return,
            }
        };

        let name = FileInfo::name_of(&target);
        if self.navigator.toggle_expansion(&target) {
            self.set_status(format!("Expanded {name}"));
        } else {
            self.select_path(&target);
            self.sync_visual();
            self.set_status(format!("Collapsed {name}"));
        }
    }

    fn edit_config(&mut self) {
        let Some(path) = self.config_path.clone() else {
            self.set_error("No config file location");
            return;
        };
        match self.opener.open(&path, &self.config) {
            Ok(OpenOutcome::Foreground(argv)) => {
                let cwd = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.navigator.current_dir().to_path_buf());
                self.pending_suspend = Some(SuspendRequest {
                    commands: vec![argv],
                    cwd,
                    after: AfterSuspend::ReloadConfig,
                });
            }
            Ok(_) => self.set_status("Opened config"),
            Err(e) => self.set_error(e.to_string()),
        }
    }

    fn launch_workspace(&mut self, token: &str) {
        let Some(shortcut) = self.config.workspace_shortcuts.get(token).cloned() else {
            return;
        };
        info!(token, "Launching workspace");
        let cwd = self.navigator.current_dir().to_path_buf();

        match shortcut.external {
            Some(WorkspaceTarget::Path(path)) => self.launch_terminal(&path, None),
            Some(WorkspaceTarget::Commands(commands)) => {
                for argv in &commands {
                    if let Err(e) = self.opener.spawn_detached(argv, &cwd) {
                        self.set_error(e.to_string());
                        break;
                    }
                }
            }
            None => {}
        }

        match shortcut.internal {
            Some(WorkspaceTarget::Path(path)) => {
                self.enter_directory(&path);
            }
            Some(WorkspaceTarget::Commands(commands)) => {
                self.pending_suspend = Some(SuspendRequest {
                    commands,
                    cwd,
                    after: AfterSuspend::Nothing,
                });
            }
            None => {}
        }
    }

    pub(super) fn launch_terminal(&mut self, cwd: &Path, command: Option<&[String]>) {
        match self.terminal.launch(cwd, command, &self.config) {
            Ok(program) => self.set_status(format!("Opened terminal: {program}")),
            Err(LaunchError::NoTerminal) => self.set_error("No terminal found"),
            Err(e) => self.set_error(e.to_string()),
        }
    }
}
