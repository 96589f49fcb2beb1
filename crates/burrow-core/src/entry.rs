//! Display rows, filesystem metadata and sort orders.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr, IntoEnumIterator};

/// A single row of the flattened tree view.
///
/// Entries are immutable snapshots of one listing; they are rebuilt
/// whenever the display list is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    /// File name (last path component).
    pub name: String,
    /// Whether the entry is a directory (symlinks to directories count).
    pub is_dir: bool,
    /// Absolute path.
    pub path: PathBuf,
    /// Nesting depth relative to the navigator's current directory.
    pub depth: usize,
}

impl Entry {
    /// Create a new entry.
    pub fn new(name: impl Into<String>, is_dir: bool, path: impl Into<PathBuf>, depth: usize) -> Self {
        Self {
            name: name.into(),
            is_dir,
            path: path.into(),
            depth,
        }
    }

    /// Build a display row at `depth` from listing metadata.
    pub fn from_info(info: &FileInfo, depth: usize) -> Self {
        Self {
            name: info.name.clone(),
            is_dir: info.is_dir,
            path: info.path.clone(),
            depth,
        }
    }

    /// Whether the name marks the entry as hidden.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// Metadata returned by a directory listing or a stat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub modified: Option<SystemTime>,
}

impl FileInfo {
    /// Extract the file name from a path, falling back to the full path
    /// for roots.
    pub fn name_of(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned())
    }

    /// Whether the name marks the entry as hidden.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// Sort order for a directory listing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumIter,
    EnumString,
    FromRepr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortMode {
    /// Directories first, then case-insensitive name order.
    #[default]
    Alpha,
    /// Oldest modification first.
    MtimeAsc,
    /// Newest modification first.
    MtimeDesc,
}

impl SortMode {
    /// Cycle to the next sort mode.
    pub fn next(self) -> Self {
        let next = (self as usize + 1) % Self::iter().count();
        Self::from_repr(next).unwrap_or_default()
    }

    /// Short label for the status bar.
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::Alpha => "A-Z",
            Self::MtimeAsc => "MT↑",
            Self::MtimeDesc => "MT↓",
        }
    }

    /// Name used in status messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Alpha => "Name",
            Self::MtimeAsc => "Modified ↑",
            Self::MtimeDesc => "Modified ↓",
        }
    }

    /// Compare two listing entries under this order.
    pub fn compare(&self, a: &FileInfo, b: &FileInfo) -> Ordering {
        let by_name = || a.name.to_lowercase().cmp(&b.name.to_lowercase());
        match self {
            Self::Alpha => b.is_dir.cmp(&a.is_dir).then_with(by_name),
            Self::MtimeAsc => a.modified.cmp(&b.modified).then_with(by_name),
            Self::MtimeDesc => b.modified.cmp(&a.modified).then_with(by_name),
        }
    }

    /// Sort a listing in place.
    pub fn sort(&self, items: &mut [FileInfo]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn info(name: &str, is_dir: bool, secs: u64) -> FileInfo {
        FileInfo {
            name: name.to_string(),
            path: PathBuf::from("/p").join(name),
            is_dir,
            modified: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs)),
        }
    }

    fn names(items: &[FileInfo]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_alpha_directories_first_case_insensitive() {
        let mut items = vec![
            info("b.txt", false, 1),
            info("Zeta", true, 1),
            info("A.md", false, 1),
            info("alpha", true, 1),
        ];
        SortMode::Alpha.sort(&mut items);
        assert_eq!(names(&items), vec!["alpha", "Zeta", "A.md", "b.txt"]);
    }

    #[test]
    fn test_mtime_orders_break_ties_by_name() {
        let mut items = vec![info("c", false, 5), info("B", false, 5), info("a", true, 9)];
        SortMode::MtimeAsc.sort(&mut items);
        assert_eq!(names(&items), vec!["B", "c", "a"]);

        SortMode::MtimeDesc.sort(&mut items);
        assert_eq!(names(&items), vec!["a", "B", "c"]);
    }

    #[test]
    fn test_sort_mode_parsing_and_cycle() {
        assert_eq!("mtime_desc".parse::<SortMode>().ok(), Some(SortMode::MtimeDesc));
        assert_eq!(SortMode::Alpha.to_string(), "alpha");
        assert_eq!(SortMode::MtimeDesc.next(), SortMode::Alpha);
    }
}
