//! Deletion behind a confirmation prompt.

use std::collections::BTreeSet;
use std::path::PathBuf;

use burrow_core::Entry;
use crossterm::event::{KeyCode, KeyEvent};
use tracing::{info, warn};

use super::state::{ConfirmDelete, Mode, NormalState, Pending, TargetSource};
use super::App;

impl App {
    /// Ask for confirmation before deleting the current targets.
    pub(super) fn request_delete(&mut self) {
        let (targets, source) = self.resolve_targets();
        if targets.is_empty() {
            self.set_error("Nothing to delete");
            return;
        }
        let previous = NormalState {
            pending: Pending::None,
            ..self.mode.normal().cloned().unwrap_or_default()
        };
        self.mode = Mode::Confirm(ConfirmDelete {
            targets,
            source,
            previous,
        });
    }

    pub(super) fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Mode::Confirm(confirm) = std::mem::take(&mut self.mode) {
                    self.delete_confirmed(confirm);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                if let Mode::Confirm(confirm) = std::mem::take(&mut self.mode) {
                    self.mode = Mode::Normal(confirm.previous);
                    self.set_status("Cancelled");
                }
            }
            _ => {}
        }
    }

    fn delete_confirmed(&mut self, confirm: ConfirmDelete) {
        let ConfirmDelete {
            targets,
            source,
            previous,
        } = confirm;
        let fs = std::sync::Arc::clone(self.navigator.fs());

        let mut deleted: Vec<&Entry> = Vec::with_capacity(targets.len());
        let mut first_error = None;
        for entry in &targets {
            match fs.delete(&entry.path) {
                Ok(()) => deleted.push(entry),
                Err(e) => {
                    warn!(path = %entry.path.display(), error = %e, "Delete failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        info!(deleted = deleted.len(), requested = targets.len(), "Deleted");

        let parents: Vec<PathBuf> = deleted
            .iter()
            .filter_map(|entry| entry.path.parent())
            .map(|parent| parent.to_path_buf())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        self.navigator.notify_directory_changed(&parents);
        self.marks
            .retain(|mark| !deleted.iter().any(|entry| mark.starts_with(&entry.path)));

        self.mode = match source {
            TargetSource::Selection => Mode::Normal(previous),
            TargetSource::Visual | TargetSource::Marks => Mode::default(),
        };
        if source == TargetSource::Marks && first_error.is_none() {
            self.marks.clear();
        }

        match (first_error, deleted.as_slice()) {
            (None, [single]) => self.set_status(format!("Deleted {}", single.name)),
            (None, all) => self.set_status(format!("Deleted {} items", all.len())),
            (Some(e), done) => self.set_error(format!(
                "Deleted {} of {} items: {e}",
                done.len(),
                targets.len()
            )),
        }
    }
}
