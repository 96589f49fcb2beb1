//! Application state types and enums.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use burrow_core::Entry;
use strum::{Display, EnumString};

use super::commands::CommandInput;
use super::constants::{LEADER_TIMEOUT, OPERATOR_TIMEOUT};
use super::input::InputState;

/// Input mode. Visual selection only exists inside [`Mode::Normal`].
#[derive(Debug, Clone)]
pub enum Mode {
    Normal(NormalState),
    /// Typing a filter pattern. Starts as a lone `/` that the first typed
    /// character replaces.
    Filter { buffer: String },
    /// Typing a `:` command.
    Command(CommandInput),
    /// Typing a name for create/rename.
    Prompt(Prompt),
    /// Waiting for y/n before deleting.
    Confirm(ConfirmDelete),
    Help { scroll: usize },
    /// Shell command output popup.
    JobOutput { scroll: usize },
}

impl Default for Mode {
    fn default() -> Self {
        Self::Normal(NormalState::default())
    }
}

impl Mode {
    /// Short label for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal(state) if state.visual.is_some() => "VISUAL",
            Self::Normal(_) => "NORMAL",
            Self::Filter { .. } => "FILTER",
            Self::Command(_) => "COMMAND",
            Self::Prompt(_) => "INPUT",
            Self::Confirm(_) => "CONFIRM",
            Self::Help { .. } => "HELP",
            Self::JobOutput { .. } => "OUTPUT",
        }
    }

    pub fn normal(&self) -> Option<&NormalState> {
        match self {
            Self::Normal(state) => Some(state),
            _ => None,
        }
    }

    pub fn normal_mut(&mut self) -> Option<&mut NormalState> {
        match self {
            Self::Normal(state) => Some(state),
            _ => None,
        }
    }
}

/// Normal-mode sub-state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalState {
    pub visual: Option<VisualRange>,
    pub pending: Pending,
}

impl NormalState {
    pub fn is_idle(&self) -> bool {
        self.pending == Pending::None
    }

    /// Current leader buffer, if a leader sequence is being typed.
    pub fn leader_buffer(&self) -> Option<&str> {
        match &self.pending {
            Pending::Leader { buffer, .. } => Some(buffer),
            _ => None,
        }
    }
}

/// Anchor/active pair of an in-progress visual selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualRange {
    pub anchor: usize,
    pub active: usize,
}

impl VisualRange {
    pub fn new(index: usize) -> Self {
        Self {
            anchor: index,
            active: index,
        }
    }

    /// Closed interval `[min, max]`.
    pub fn bounds(&self) -> (usize, usize) {
        (self.anchor.min(self.active), self.anchor.max(self.active))
    }

    pub fn contains(&self, index: usize) -> bool {
        let (start, end) = self.bounds();
        (start..=end).contains(&index)
    }

    /// Keep both ends inside a list of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        let last = len.saturating_sub(1);
        self.anchor = self.anchor.min(last);
        self.active = self.active.min(last);
    }
}

/// Half-typed command awaiting more keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Pending {
    #[default]
    None,
    Operator {
        kind: OperatorKind,
        armed_at: Instant,
    },
    Leader {
        buffer: String,
        armed_at: Instant,
    },
}

impl Pending {
    /// Whether the pending state timed out at `now`.
    pub fn expired(&self, now: Instant) -> bool {
        let (armed_at, timeout) = match self {
            Self::None => return false,
            Self::Operator { armed_at, .. } => (*armed_at, OPERATOR_TIMEOUT),
            Self::Leader { armed_at, .. } => (*armed_at, LEADER_TIMEOUT),
        };
        now.saturating_duration_since(armed_at) > timeout
    }
}

/// Operator armed by the first `y` or `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Yank,
    Delete,
}

impl OperatorKind {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'y' => Some(Self::Yank),
            'd' => Some(Self::Delete),
            _ => None,
        }
    }
}

/// What a name prompt will do on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    CreateFile { dir: PathBuf },
    CreateDir { dir: PathBuf },
    Rename { path: PathBuf },
}

impl PromptKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::CreateFile { .. } => "New file",
            Self::CreateDir { .. } => "New directory",
            Self::Rename { .. } => "Rename",
        }
    }
}

/// A name prompt.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: InputState,
}

/// Where the delete targets came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    Visual,
    Marks,
    Selection,
}

/// A delete waiting for confirmation.
///
/// Cancelling restores `previous` so marks and the visual range are left
/// exactly as they were.
#[derive(Debug, Clone)]
pub struct ConfirmDelete {
    pub targets: Vec<Entry>,
    pub source: TargetSource,
    pub previous: NormalState,
}

/// What picker mode may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PickerKind {
    Files,
    Dirs,
    #[default]
    Any,
}

/// Picker-mode constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickerOptions {
    pub kind: PickerKind,
    /// Allowed extensions, lower-case without the dot. Empty allows all.
    pub extensions: Vec<String>,
    /// Allow returning the whole mark set.
    pub multi: bool,
}

impl PickerOptions {
    /// Whether `entry` may be picked. The extension filter applies to files.
    pub fn accepts(&self, entry: &Entry) -> bool {
        match self.kind {
            PickerKind::Files if entry.is_dir => return false,
            PickerKind::Dirs if !entry.is_dir => return false,
            _ => {}
        }
        entry.is_dir || self.extension_allowed(&entry.path)
    }

    fn extension_allowed(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
    }
}

/// Work to do after the UI has been suspended for a foreground program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSuspend {
    Nothing,
    ReloadConfig,
}

/// Request to run programs in the foreground with the UI suspended.
///
/// Commands run one after another and stop at the first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspendRequest {
    pub commands: Vec<Vec<String>>,
    pub cwd: PathBuf,
    pub after: AfterSuspend,
}

/// Time elapsed since `earlier`, zero if the clock went backwards.
pub fn since(now: Instant, earlier: Instant) -> Duration {
    now.saturating_duration_since(earlier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_bounds_are_ordered() {
        let range = VisualRange {
            anchor: 5,
            active: 2,
        };
        assert_eq!(range.bounds(), (2, 5));
        assert!(range.contains(2));
        assert!(!range.contains(6));
    }

    #[test]
    fn test_pending_expiry() {
        let start = Instant::now();
        let pending = Pending::Operator {
            kind: OperatorKind::Delete,
            armed_at: start,
        };
        assert!(!pending.expired(start + Duration::from_millis(999)));
        assert!(pending.expired(start + Duration::from_millis(1001)));

        let leader = Pending::Leader {
            buffer: String::new(),
            armed_at: start,
        };
        assert!(!leader.expired(start + Duration::from_millis(1500)));
        assert!(leader.expired(start + Duration::from_millis(2001)));
        assert!(!Pending::None.expired(start + Duration::from_secs(60)));
    }

    #[test]
    fn test_picker_constraints() {
        let picker = PickerOptions {
            kind: PickerKind::Files,
            extensions: vec!["rs".into()],
            multi: false,
        };
        assert!(picker.accepts(&Entry::new("main.RS", false, "/p/main.RS", 0)));
        assert!(!picker.accepts(&Entry::new("notes.md", false, "/p/notes.md", 0)));
        assert!(!picker.accepts(&Entry::new("src", true, "/p/src", 0)));

        let dirs = PickerOptions {
            kind: PickerKind::Dirs,
            ..PickerOptions::default()
        };
        assert!(dirs.accepts(&Entry::new("src", true, "/p/src", 0)));
        assert!(!dirs.accepts(&Entry::new("a.txt", false, "/p/a.txt", 0)));
    }

    #[test]
    fn test_picker_kind_parses() {
        assert_eq!("dirs".parse::<PickerKind>().unwrap(), PickerKind::Dirs);
        assert_eq!(PickerKind::Files.to_string(), "files");
    }
}
