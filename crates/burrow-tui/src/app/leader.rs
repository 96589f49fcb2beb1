//! Leader command table.
//!
//! Sequences typed after the leader key are matched against a sorted map, so
//! "is this a prefix of some command" is a single range query. The table is
//! built from the configuration snapshot and only rebuilt on reload.

use std::collections::BTreeMap;
use std::ops::Bound;

use burrow_core::{SortMode, UserConfig};
use tracing::{debug, warn};

/// A command reachable through the leader key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderCommand {
    ScopeTop,
    ScopeBottom,
    Sort(SortMode),
    CreateFile,
    CreateDir,
    Rename,
    ToggleBookmark,
    ClearMarks,
    ClearClipboard,
    ToggleExpansion,
    CollapseAll,
    ExpandAll,
    ToggleHidden,
    EditConfig,
    /// Open the file shortcut with this token.
    OpenFile(String),
    /// Change to the directory shortcut with this token.
    JumpDir(String),
    /// Open a terminal in the directory shortcut with this token.
    TerminalAt(String),
    /// Launch the workspace shortcut with this token.
    Workspace(String),
}

impl LeaderCommand {
    /// Whether `.` may replay this command.
    pub fn is_repeatable(&self) -> bool {
        matches!(
            self,
            Self::ToggleExpansion
                | Self::ExpandAll
                | Self::ToggleHidden
                | Self::EditConfig
                | Self::CreateFile
                | Self::CreateDir
                | Self::Rename
                | Self::ToggleBookmark
        )
    }
}

const FIXED: &[(&str, LeaderCommand)] = &[
    ("j", LeaderCommand::ScopeBottom),
    ("k", LeaderCommand::ScopeTop),
    ("sa", LeaderCommand::Sort(SortMode::Alpha)),
    ("sma", LeaderCommand::Sort(SortMode::MtimeAsc)),
    ("smd", LeaderCommand::Sort(SortMode::MtimeDesc)),
    ("cl", LeaderCommand::ClearClipboard),
    ("nf", LeaderCommand::CreateFile),
    ("nd", LeaderCommand::CreateDir),
    ("rn", LeaderCommand::Rename),
    ("b", LeaderCommand::ToggleBookmark),
    ("cm", LeaderCommand::ClearMarks),
    ("xr", LeaderCommand::ToggleExpansion),
    ("dot", LeaderCommand::ToggleHidden),
    ("xc", LeaderCommand::CollapseAll),
    ("xar", LeaderCommand::ExpandAll),
    ("conf", LeaderCommand::EditConfig),
];

/// Outcome of matching a typed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderMatch<'a> {
    Exact(&'a LeaderCommand),
    /// Strict prefix of at least one command.
    Prefix,
    NoMatch,
}

/// Sequence → command map.
#[derive(Debug, Clone, Default)]
pub struct LeaderTable {
    commands: BTreeMap<String, LeaderCommand>,
}

impl LeaderTable {
    /// Fixed commands plus one entry per configured shortcut token.
    pub fn from_config(config: &UserConfig) -> Self {
        let mut commands = BTreeMap::new();

        let dynamic = config
            .file_shortcuts
            .keys()
            .map(|t| (format!("fo{t}"), LeaderCommand::OpenFile(t.clone())))
            .chain(
                config
                    .dir_shortcuts
                    .keys()
                    .map(|t| (format!("do{t}"), LeaderCommand::JumpDir(t.clone()))),
            )
            .chain(
                config
                    .dir_shortcuts
                    .keys()
                    .map(|t| (format!("to{t}"), LeaderCommand::TerminalAt(t.clone()))),
            )
            .chain(
                config
                    .workspace_shortcuts
                    .keys()
                    .map(|t| (format!("w{t}"), LeaderCommand::Workspace(t.clone()))),
            );
        commands.extend(dynamic);

        for (sequence, command) in FIXED {
            if let Some(shadowed) = commands.insert(sequence.to_string(), command.clone()) {
                warn!(sequence, ?shadowed, "Shortcut collides with a built-in leader command");
            }
        }

        debug!(count = commands.len(), "Built leader table");
        Self { commands }
    }

    pub fn lookup(&self, sequence: &str) -> LeaderMatch<'_> {
        if let Some(command) = self.commands.get(sequence) {
            return LeaderMatch::Exact(command);
        }
        let next = self
            .commands
            .range::<str, _>((Bound::Excluded(sequence), Bound::Unbounded))
            .next();
        match next {
            Some((key, _)) if key.starts_with(sequence) => LeaderMatch::Prefix,
            _ => LeaderMatch::NoMatch,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All entries in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LeaderCommand)> {
        self.commands.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn table_with_shortcuts() -> LeaderTable {
        let mut config = UserConfig::default();
        config.dir_shortcuts.insert("ga".into(), PathBuf::from("/git"));
        config.dir_shortcuts.insert("t".into(), PathBuf::from("/tmp"));
        config.file_shortcuts.insert("n".into(), PathBuf::from("/notes.md"));
        LeaderTable::from_config(&config)
    }

    #[test]
    fn test_exact_prefix_and_miss() {
        let table = LeaderTable::from_config(&UserConfig::default());

        assert_eq!(table.lookup("s"), LeaderMatch::Prefix);
        assert_eq!(table.lookup("sm"), LeaderMatch::Prefix);
        assert_eq!(
            table.lookup("smd"),
            LeaderMatch::Exact(&LeaderCommand::Sort(SortMode::MtimeDesc))
        );
        assert_eq!(table.lookup("n"), LeaderMatch::Prefix);
        assert_eq!(table.lookup("nx"), LeaderMatch::NoMatch);
        assert_eq!(table.lookup("q"), LeaderMatch::NoMatch);
    }

    #[test]
    fn test_exact_wins_over_longer_commands() {
        let table = LeaderTable::from_config(&UserConfig::default());
        assert_eq!(table.lookup("xa"), LeaderMatch::Prefix);
        assert_eq!(table.lookup("xr"), LeaderMatch::Exact(&LeaderCommand::ToggleExpansion));
    }

    #[test]
    fn test_shortcut_entries_are_merged() {
        let table = table_with_shortcuts();
        assert_eq!(
            table.lookup("doga"),
            LeaderMatch::Exact(&LeaderCommand::JumpDir("ga".into()))
        );
        assert_eq!(
            table.lookup("toga"),
            LeaderMatch::Exact(&LeaderCommand::TerminalAt("ga".into()))
        );
        assert_eq!(
            table.lookup("fon"),
            LeaderMatch::Exact(&LeaderCommand::OpenFile("n".into()))
        );
        assert_eq!(table.lookup("dog"), LeaderMatch::Prefix);
    }

    #[test]
    fn test_builtin_wins_on_collision() {
        let table = table_with_shortcuts();
        assert_eq!(table.lookup("dot"), LeaderMatch::Exact(&LeaderCommand::ToggleHidden));
        assert_eq!(table.len(), FIXED.len() + 4);
    }

    #[test]
    fn test_repeatable_commands() {
        assert!(LeaderCommand::ToggleHidden.is_repeatable());
        assert!(LeaderCommand::Rename.is_repeatable());
        assert!(!LeaderCommand::ClearMarks.is_repeatable());
        assert!(!LeaderCommand::Sort(SortMode::Alpha).is_repeatable());
    }
}
