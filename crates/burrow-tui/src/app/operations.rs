//! Clipboard, create/rename and shell command operations.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use burrow_core::{Entry, FileInfo, FsError, FsResult};
use burrow_ops::{start_job, unique_name_in, JobStatus, YankItem};
use tracing::{debug, info, warn};

use super::state::{Mode, OperatorKind, PromptKind, TargetSource};
use super::App;

impl App {
    /// Row for `path`, from the display list or a fresh stat.
    pub(super) fn entry_for(&self, path: &Path) -> Option<Entry> {
        if let Some(entry) = self.items.iter().find(|entry| entry.path == path) {
            return Some(entry.clone());
        }
        match self.navigator.fs().stat(path) {
            Ok(info) => Some(Entry::from_info(&info, 0)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Marked path is gone");
                None
            }
        }
    }

    /// Operation targets: the visual range, else the marks, else the cursor row.
    /// Rows inside another target directory are left out; that directory
    /// carries them.
    pub(super) fn resolve_targets(&self) -> (Vec<Entry>, TargetSource) {
        let (targets, source) = self.collect_targets();
        (outermost(targets), source)
    }

    fn collect_targets(&self) -> (Vec<Entry>, TargetSource) {
        if let Some(range) = self.visual() {
            let (start, end) = range.bounds();
            let targets = self
                .items
                .iter()
                .skip(start)
                .take(end + 1 - start)
                .cloned()
                .collect();
            return (targets, TargetSource::Visual);
        }
        if !self.marks.is_empty() {
            let targets = self
                .marks
                .iter()
                .filter_map(|path| self.entry_for(path))
                .collect();
            return (targets, TargetSource::Marks);
        }
        let targets = self.selected_entry().cloned().into_iter().collect();
        (targets, TargetSource::Selection)
    }

    /// Forget the marks or visual range a completed operation consumed.
    pub(super) fn consume_targets(&mut self, source: TargetSource) {
        match source {
            TargetSource::Visual => self.exit_visual(),
            TargetSource::Marks => self.marks.clear(),
            TargetSource::Selection => {}
        }
    }

    /// `yy` stages a copy, `dd` stages a cut.
    pub(super) fn run_operator(&mut self, kind: OperatorKind) {
        let (targets, source) = self.resolve_targets();
        if targets.is_empty() {
            self.set_error("Nothing selected");
            return;
        }

        let cut = kind == OperatorKind::Delete;
        let items: Vec<YankItem> = targets
            .iter()
            .map(|entry| YankItem::new(&entry.path, &entry.name, entry.is_dir))
            .collect();
        let result = self.clipboard.yank_multiple(&items, cut);

        if cut {
            let parents = parent_dirs(targets.iter().map(|entry| entry.path.as_path()));
            self.navigator.notify_directory_changed(&parents);
        }

        match result {
            Ok(count) => {
                let verb = self
                    .clipboard
                    .kind()
                    .map(|kind| kind.to_string())
                    .unwrap_or_default();
                self.consume_targets(source);
                self.set_status(format!("{verb} {count} item(s) to clipboard"));
            }
            Err(e) => {
                warn!(error = %e, cut, "Staging failed");
                self.set_error(e.to_string());
            }
        }
    }

    /// Directory `p` pastes into.
    fn paste_destination(&self) -> PathBuf {
        match self.selected_entry() {
            Some(entry) if entry.is_dir => entry.path.clone(),
            Some(entry) => entry
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.navigator.current_dir().to_path_buf()),
            None => self.navigator.current_dir().to_path_buf(),
        }
    }

    pub(super) fn paste(&mut self) {
        if !self.clipboard.has_entries() {
            self.set_error("Clipboard is empty");
            return;
        }
        let dest = self.paste_destination();
        let result = self.clipboard.paste(&dest, None);
        self.navigator.notify_directory_changed(&[dest]);

        match result {
            Ok(pasted) => {
                self.record_repeat = true;
                self.set_status(format!("Pasted {} item(s)", pasted.len()));
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Carry out a submitted create/rename prompt. Returns the path to
    /// select, or None if nothing changed.
    pub(super) fn apply_prompt(&mut self, kind: &PromptKind, name: &str) -> FsResult<Option<PathBuf>> {
        let fs = Arc::clone(self.navigator.fs());
        match kind {
            PromptKind::CreateFile { dir } | PromptKind::CreateDir { dir } => {
                let unique = unique_name_in(fs.as_ref(), dir, name);
                let path = dir.join(&unique);
                if matches!(kind, PromptKind::CreateDir { .. }) {
                    fs.create_dir(&path)?;
                    self.set_status(format!("Created {unique}/"));
                } else {
                    fs.create_file(&path)?;
                    self.set_status(format!("Created {unique}"));
                }
                info!(path = %path.display(), "Created");
                self.navigator.notify_directory_changed(&[dir.clone()]);
                Ok(Some(path))
            }
            PromptKind::Rename { path } => {
                let old_name = FileInfo::name_of(path);
                if name == old_name {
                    self.set_status("Name unchanged");
                    return Ok(None);
                }
                let parent = path
                    .parent()
                    .ok_or_else(|| FsError::invalid("Cannot rename the root"))?
                    .to_path_buf();
                let unique = unique_name_in(fs.as_ref(), &parent, name);
                let target = parent.join(&unique);
                fs.rename(path, &target)?;
                info!(from = %path.display(), to = %target.display(), "Renamed");

                self.rebase_marks(path, &target);
                self.navigator.notify_directory_changed(&[parent]);
                self.set_status(format!("Renamed {old_name} to {unique}"));
                Ok(Some(target))
            }
        }
    }

    /// Point marks at or below `from` at their new location under `to`.
    fn rebase_marks(&mut self, from: &Path, to: &Path) {
        let moved: Vec<PathBuf> = self
            .marks
            .iter()
            .filter(|mark| mark.starts_with(from))
            .cloned()
            .collect();
        for mark in moved {
            self.marks.remove(&mark);
            if let Ok(rest) = mark.strip_prefix(from) {
                self.marks.insert(to.join(rest));
            }
        }
    }

    /// Start `command` in the current directory and show its output.
    pub(super) fn run_shell(&mut self, command: &str) {
        let cwd = self.navigator.current_dir().to_path_buf();
        if let Some(previous) = self.job.take() {
            previous.cancel();
        }
        match start_job(command, &cwd) {
            Ok(job) => {
                self.set_status(format!("! {command}"));
                self.job = Some(job);
                self.mode = Mode::JobOutput { scroll: 0 };
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Drain job output. Returns true if anything changed.
    pub(super) fn poll_job(&mut self) -> bool {
        let Some(job) = self.job.as_mut() else {
            return false;
        };
        let was_running = job.is_running();
        if !job.poll() {
            return false;
        }
        if !was_running || job.is_running() {
            return true;
        }

        let command = job.command().to_string();
        let status = match job.status() {
            JobStatus::Finished(code) => format!("! {command} (exit {code})"),
            JobStatus::Failed(reason) => format!("! {command} (failed: {reason})"),
            JobStatus::Running => return true,
        };
        let succeeded = job.succeeded();
        info!(command = %command, succeeded, "Shell command finished");

        if succeeded {
            let line = format!("!{command}");
            if self.command_history.last() != Some(&line) {
                self.command_history.push(line);
            }
            self.navigator.notify_directory_changed(&[]);
            self.set_status(status);
        } else {
            self.set_error(status);
        }
        true
    }
}

/// Drop every entry that lies below another entry of the list.
fn outermost(targets: Vec<Entry>) -> Vec<Entry> {
    let roots: Vec<PathBuf> = targets.iter().map(|entry| entry.path.clone()).collect();
    targets
        .into_iter()
        .filter(|entry| {
            !roots
                .iter()
                .any(|root| *root != entry.path && entry.path.starts_with(root))
        })
        .collect()
}

/// Distinct parent directories of `paths`.
fn parent_dirs<'a>(paths: impl Iterator<Item = &'a Path>) -> Vec<PathBuf> {
    paths
        .filter_map(Path::parent)
        .map(Path::to_path_buf)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
