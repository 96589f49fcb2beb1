//! Cursor movement, directory changes and file opening.

use std::path::{Path, PathBuf};

use burrow_core::{Entry, FileInfo};
use tracing::{debug, info};

use crate::opener::OpenOutcome;

use super::state::{AfterSuspend, PickerKind, SuspendRequest};
use super::App;

impl App {
    /// Move the cursor by `delta` rows, wrapping at both ends.
    pub(super) fn move_wrapping(&mut self, delta: isize) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + delta).rem_euclid(len as isize) as usize;
        self.sync_visual();
    }

    /// Move a tenth of the list, clamped at the ends.
    pub(super) fn jump(&mut self, down: bool) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let step = (len / 10).max(1);
        self.selected = if down {
            (self.selected + step).min(len - 1)
        } else {
            self.selected.saturating_sub(step)
        };
        self.sync_visual();
    }

    /// Change directory, resetting the cursor and dropping the visual range.
    pub(super) fn enter_directory(&mut self, path: &Path) -> bool {
        match self.navigator.change_directory(path, true) {
            Ok(()) => {
                self.exit_visual();
                self.selected = 0;
                true
            }
            Err(e) => {
                self.set_error(e.to_string());
                false
            }
        }
    }

    pub(super) fn go_parent(&mut self) {
        let from = self.navigator.current_dir().to_path_buf();
        match self.navigator.go_parent() {
            Ok(true) => {
                self.exit_visual();
                self.selected = 0;
                self.select_path(&from);
            }
            Ok(false) => self.set_status("Already at the root"),
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub(super) fn open_selected(&mut self) {
        let Some(entry) = self.selected_entry().cloned() else {
            return;
        };
        if entry.is_dir {
            self.enter_directory(&entry.path);
        } else {
            self.open_file(&entry.path);
        }
    }

    /// Open a file with its handler.
    pub(super) fn open_file(&mut self, path: &Path) {
        let name = FileInfo::name_of(path);
        let cwd = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.navigator.current_dir().to_path_buf());

        match self.opener.open(path, &self.config) {
            Ok(OpenOutcome::Foreground(argv)) => {
                debug!(path = %path.display(), program = ?argv.first(), "Suspending for foreground program");
                self.pending_suspend = Some(SuspendRequest {
                    commands: vec![argv],
                    cwd,
                    after: AfterSuspend::Nothing,
                });
            }
            Ok(OpenOutcome::InTerminal(argv)) => {
                match self.terminal.launch(&cwd, Some(argv.as_slice()), &self.config) {
                    Ok(program) => self.set_status(format!("Opened {name} in {program}")),
                    Err(e) => self.set_error(e.to_string()),
                }
            }
            Ok(OpenOutcome::Detached(program)) => {
                self.set_status(format!("Opened {name} with {program}"));
            }
            Ok(OpenOutcome::System) => self.set_status(format!("Opened {name}")),
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub(super) fn step_history(&mut self, forward: bool) {
        let result = if forward {
            self.navigator.history_forward()
        } else {
            self.navigator.history_back()
        };
        match result {
            Ok(true) => {
                self.exit_visual();
                self.selected = 0;
            }
            Ok(false) if forward => self.set_status("Already at newest directory"),
            Ok(false) => self.set_status("Already at oldest directory"),
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub(super) fn step_bookmark(&mut self, forward: bool) {
        let result = if forward {
            self.navigator.bookmark_next()
        } else {
            self.navigator.bookmark_prev()
        };
        match result {
            Ok(true) => {
                self.exit_visual();
                self.selected = 0;
                self.set_status(if forward {
                    "Bookmark forward"
                } else {
                    "Bookmark back"
                });
            }
            Ok(false) if forward => self.set_status("No next bookmark"),
            Ok(false) => self.set_status("No previous bookmark"),
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub(super) fn go_home(&mut self) {
        let home = self.navigator.home().to_path_buf();
        if self.enter_directory(&home) {
            self.set_status("Returned to ~");
        }
    }

    /// Confirm a pick: the mark set in multi mode, otherwise the cursor row.
    pub(super) fn confirm_pick(&mut self) {
        let Some(picker) = self.picker.clone() else {
            return;
        };

        let from_marks = picker.multi && !self.marks.is_empty();
        let candidates: Vec<Entry> = if from_marks {
            self.marks
                .iter()
                .filter_map(|path| self.entry_for(path))
                .collect()
        } else {
            self.selected_entry().cloned().into_iter().collect()
        };

        if !from_marks && picker.kind == PickerKind::Files {
            if let Some(dir) = candidates.first().filter(|entry| entry.is_dir) {
                let path = dir.path.clone();
                self.enter_directory(&path);
                return;
            }
        }

        if candidates.is_empty() {
            self.set_error("Nothing to pick");
            return;
        }
        if let Some(rejected) = candidates.iter().find(|entry| !picker.accepts(entry)) {
            self.set_error(format!("Cannot pick {}", rejected.name));
            return;
        }

        let picked: Vec<PathBuf> = candidates.into_iter().map(|entry| entry.path).collect();
        info!(count = picked.len(), "Picked");
        self.picked = Some(picked);
        self.shutdown();
        self.should_quit = true;
    }
}
