//! Tree view model.
//!
//! The navigator owns the current directory, the set of inline-expanded
//! directories, the filter pattern and the sort preferences, and flattens
//! them into an ordered display list. Directory listings are cached per
//! directory and invalidated explicitly after mutations.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use burrow_core::{Entry, FileInfo, FsError, FsResult, SortMode};
use burrow_ops::FileSystem;
use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, info, warn};

/// Characters that make a filter pattern a glob rather than a prefix.
const GLOB_CHARS: [char; 4] = ['*', '?', '[', ']'];

/// Compiled filter pattern, matched case-insensitively against entry names.
#[derive(Debug, Clone)]
pub struct FilterPattern {
    raw: String,
    matcher: NameMatcher,
}

#[derive(Debug, Clone)]
enum NameMatcher {
    Glob(GlobMatcher),
    Prefix(String),
}

impl FilterPattern {
    /// Compile a pattern. Plain text gets an implicit trailing `*`.
    pub fn new(raw: &str) -> Self {
        let pattern = if raw.contains(GLOB_CHARS) {
            raw.to_string()
        } else {
            format!("{raw}*")
        };
        let matcher = match GlobBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(glob) => NameMatcher::Glob(glob.compile_matcher()),
            Err(e) => {
                debug!(pattern = %pattern, error = %e, "Invalid glob, using prefix match");
                NameMatcher::Prefix(raw.to_lowercase())
            }
        };
        Self {
            raw: raw.to_string(),
            matcher,
        }
    }

    /// The pattern as typed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether `name` passes the filter.
    pub fn matches(&self, name: &str) -> bool {
        match &self.matcher {
            NameMatcher::Glob(glob) => glob.is_match(name),
            NameMatcher::Prefix(prefix) => name.to_lowercase().starts_with(prefix),
        }
    }
}

/// The directory a row belongs to and the rows that directory owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextScope {
    /// Nearest enclosing expanded directory.
    pub dir: Option<PathBuf>,
    /// Inclusive row range of that directory's expanded descendants.
    pub range: Option<(usize, usize)>,
}

/// Resolve the context scope of row `selected`.
///
/// An expanded directory is its own context. Any other row belongs to the
/// nearest directory row above it with a smaller depth. Rows at depth 0
/// have no context.
pub fn context_scope(
    items: &[Entry],
    selected: usize,
    is_expanded: impl Fn(&Path) -> bool,
) -> ContextScope {
    let Some(row) = items.get(selected) else {
        return ContextScope::default();
    };

    let dir_index = if row.is_dir && is_expanded(&row.path) {
        Some(selected)
    } else if row.depth == 0 {
        None
    } else {
        (0..selected)
            .rev()
            .find(|&i| items[i].depth < row.depth && items[i].is_dir)
    };
    let Some(dir_index) = dir_index else {
        return ContextScope::default();
    };

    let base = items[dir_index].depth;
    let owned = items[dir_index + 1..]
        .iter()
        .take_while(|e| e.depth > base)
        .count();
    let range = if owned == 0 {
        (dir_index, dir_index)
    } else {
        (dir_index + 1, dir_index + owned)
    };

    ContextScope {
        dir: Some(items[dir_index].path.clone()),
        range: Some(range),
    }
}

/// Flattened, lazily-expanded view of a directory tree.
#[derive(Debug)]
pub struct Navigator {
    fs: Arc<dyn FileSystem>,
    current_dir: PathBuf,
    home: PathBuf,
    cache: HashMap<PathBuf, Vec<FileInfo>>,
    expanded: HashSet<PathBuf>,
    filter: Option<FilterPattern>,
    default_sort: SortMode,
    sort_overrides: HashMap<PathBuf, SortMode>,
    show_hidden: bool,
    history: Vec<PathBuf>,
    history_index: usize,
    bookmarks: Vec<PathBuf>,
    bookmark_index: Option<usize>,
}

impl Navigator {
    /// Create a navigator rooted at `start`, which must be a readable directory.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        start: &Path,
        home: PathBuf,
        default_sort: SortMode,
        show_hidden: bool,
    ) -> FsResult<Self> {
        let current_dir = fs.canonicalize(start)?;
        if !fs.stat(&current_dir)?.is_dir {
            return Err(FsError::invalid(format!(
                "Not a directory: {}",
                current_dir.display()
            )));
        }
        Ok(Self {
            fs,
            history: vec![current_dir.clone()],
            current_dir,
            home,
            cache: HashMap::new(),
            expanded: HashSet::new(),
            filter: None,
            default_sort,
            sort_overrides: HashMap::new(),
            show_hidden,
            history_index: 0,
            bookmarks: Vec::new(),
            bookmark_index: None,
        })
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_ref().map(FilterPattern::as_str)
    }

    pub fn default_sort(&self) -> SortMode {
        self.default_sort
    }

    /// Build the flattened display list.
    ///
    /// Expanded directories that have vanished from disk are dropped from
    /// the expansion set instead of producing error rows.
    pub fn build_display_items(&mut self) -> Vec<Entry> {
        let root = self.current_dir.clone();
        let children = match self.visible_children(&root) {
            Ok(children) => children,
            Err(e) => {
                warn!(dir = %root.display(), error = %e, "Failed to list current directory");
                return Vec::new();
            }
        };
        let children: Vec<FileInfo> = match &self.filter {
            Some(filter) => children
                .into_iter()
                .filter(|info| filter.matches(&info.name))
                .collect(),
            None => children,
        };

        let mut items = Vec::with_capacity(children.len());
        let mut vanished = Vec::new();
        for info in &children {
            self.push_with_children(info, 0, &mut items, &mut vanished);
        }
        for path in vanished {
            debug!(path = %path.display(), "Dropping vanished expansion");
            self.expanded.remove(&path);
        }
        items
    }

    fn push_with_children(
        &mut self,
        info: &FileInfo,
        depth: usize,
        items: &mut Vec<Entry>,
        vanished: &mut Vec<PathBuf>,
    ) {
        items.push(Entry::from_info(info, depth));
        if !info.is_dir || !self.expanded.contains(&info.path) {
            return;
        }
        match self.visible_children(&info.path) {
            Ok(children) => {
                for child in &children {
                    self.push_with_children(child, depth + 1, items, vanished);
                }
            }
            Err(FsError::NotFound { .. }) => vanished.push(info.path.clone()),
            Err(e) => debug!(dir = %info.path.display(), error = %e, "Cannot expand directory"),
        }
    }

    /// Sorted children of `dir` with hidden entries applied.
    fn visible_children(&mut self, dir: &Path) -> FsResult<Vec<FileInfo>> {
        let mut items = self.listing(dir)?;
        if !self.show_hidden {
            items.retain(|info| !info.is_hidden());
        }
        self.sort_for(dir).sort(&mut items);
        Ok(items)
    }

    fn listing(&mut self, dir: &Path) -> FsResult<Vec<FileInfo>> {
        if let Some(cached) = self.cache.get(dir) {
            return Ok(cached.clone());
        }
        let items = self.fs.list(dir)?;
        self.cache.insert(dir.to_path_buf(), items.clone());
        Ok(items)
    }

    /// Drop cached listings for `dirs`, or every listing when `dirs` is empty.
    pub fn notify_directory_changed(&mut self, dirs: &[PathBuf]) {
        if dirs.is_empty() {
            self.cache.clear();
        } else {
            for dir in dirs {
                self.cache.remove(dir);
            }
        }
        let fs = Arc::clone(&self.fs);
        self.expanded.retain(|path| fs.exists(path));
    }

    /// Context scope of row `selected` in `items`.
    pub fn compute_context_scope(&self, items: &[Entry], selected: usize) -> ContextScope {
        context_scope(items, selected, |path| self.expanded.contains(path))
    }

    pub fn is_expanded(&self, path: &Path) -> bool {
        self.expanded.contains(path)
    }

    pub fn expansion_count(&self) -> usize {
        self.expanded.len()
    }

    pub fn expand(&mut self, path: &Path) {
        self.expanded.insert(path.to_path_buf());
    }

    /// Toggle inline expansion of `path`. Returns true if it is now expanded.
    pub fn toggle_expansion(&mut self, path: &Path) -> bool {
        if self.expanded.contains(path) {
            self.collapse_branch(path);
            false
        } else {
            self.expanded.insert(path.to_path_buf());
            true
        }
    }

    /// Remove `path` and every expanded descendant of it.
    pub fn collapse_branch(&mut self, path: &Path) -> usize {
        let before = self.expanded.len();
        self.expanded.retain(|p| !p.starts_with(path));
        before - self.expanded.len()
    }

    /// Prune the whole expanded subtree below `path`.
    pub fn collapse_expansions_under(&mut self, path: &Path) -> usize {
        let removed = self.collapse_branch(path);
        if removed > 0 {
            debug!(path = %path.display(), removed, "Collapsed expansions");
        }
        removed
    }

    pub fn clear_expansions(&mut self) -> usize {
        let removed = self.expanded.len();
        self.expanded.clear();
        removed
    }

    /// Expand every directory below the current one, breadth-first.
    ///
    /// Directories are visited once by canonical path, so symlink loops
    /// and links to ancestors are never descended into. Returns the number
    /// of newly expanded directories.
    pub fn expand_all(&mut self) -> usize {
        let mut visited: HashSet<PathBuf> = HashSet::new();
        visited.insert(self.current_dir.clone());
        let mut queue = VecDeque::from([self.current_dir.clone()]);
        let mut added = 0;

        while let Some(dir) = queue.pop_front() {
            let children = match self.visible_children(&dir) {
                Ok(children) => children,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                    continue;
                }
            };
            for child in children.into_iter().filter(|c| c.is_dir) {
                let real = self
                    .fs
                    .canonicalize(&child.path)
                    .unwrap_or_else(|_| child.path.clone());
                if !visited.insert(real) {
                    debug!(path = %child.path.display(), "Already visited, not descending");
                    continue;
                }
                if self.expanded.insert(child.path.clone()) {
                    added += 1;
                }
                queue.push_back(child.path);
            }
        }

        info!(added, root = %self.current_dir.display(), "Expanded all directories");
        added
    }

    pub fn set_filter(&mut self, pattern: Option<&str>) {
        self.filter = pattern.filter(|p| !p.is_empty()).map(FilterPattern::new);
    }

    /// Flip hidden visibility. Expansions are cleared because row identity
    /// changes.
    pub fn toggle_hidden(&mut self) -> bool {
        self.show_hidden = !self.show_hidden;
        self.expanded.clear();
        self.show_hidden
    }

    pub fn sort_for(&self, dir: &Path) -> SortMode {
        self.sort_overrides
            .get(dir)
            .copied()
            .unwrap_or(self.default_sort)
    }

    /// Set the sort for one directory, or the global default when `dir` is None.
    pub fn set_sort(&mut self, dir: Option<&Path>, mode: SortMode) {
        match dir {
            Some(dir) => {
                self.sort_overrides.insert(dir.to_path_buf(), mode);
            }
            None => {
                self.default_sort = mode;
                self.sort_overrides.remove(&self.current_dir);
            }
        }
    }

    /// Enter `path`. The target is canonicalised and must be a listable
    /// directory; on failure nothing changes.
    pub fn change_directory(&mut self, path: &Path, record_history: bool) -> FsResult<()> {
        let target = self.fs.canonicalize(path)?;
        if !self.fs.stat(&target)?.is_dir {
            return Err(FsError::invalid(format!(
                "Not a directory: {}",
                target.display()
            )));
        }
        self.cache.remove(&target);
        self.listing(&target)?;

        if record_history {
            self.history.truncate(self.history_index + 1);
            if self.history.last() != Some(&target) {
                self.history.push(target.clone());
            }
            self.history_index = self.history.len() - 1;
        }

        debug!(from = %self.current_dir.display(), to = %target.display(), "Changed directory");
        self.set_current_dir(target);
        Ok(())
    }

    fn set_current_dir(&mut self, dir: PathBuf) {
        if let Some(index) = self.bookmarks.iter().position(|b| *b == dir) {
            self.bookmark_index = Some(index);
        }
        self.current_dir = dir;
    }

    /// Go to the parent directory. Returns false at the filesystem root.
    pub fn go_parent(&mut self) -> FsResult<bool> {
        match self.current_dir.parent().map(Path::to_path_buf) {
            Some(parent) => self.change_directory(&parent, true).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn history(&self) -> &[PathBuf] {
        &self.history
    }

    /// Step back in history. Returns false when already at the oldest entry.
    pub fn history_back(&mut self) -> FsResult<bool> {
        if self.history_index == 0 {
            return Ok(false);
        }
        let target = self.history[self.history_index - 1].clone();
        self.change_directory(&target, false)?;
        self.history_index -= 1;
        Ok(true)
    }

    /// Step forward in history. Returns false when already at the newest entry.
    pub fn history_forward(&mut self) -> FsResult<bool> {
        if self.history_index + 1 >= self.history.len() {
            return Ok(false);
        }
        let target = self.history[self.history_index + 1].clone();
        self.change_directory(&target, false)?;
        self.history_index += 1;
        Ok(true)
    }

    /// Clear expansions and the filter, then go to the home directory.
    pub fn reset_to_home(&mut self) -> FsResult<()> {
        self.expanded.clear();
        self.filter = None;
        let home = self.home.clone();
        self.change_directory(&home, true)
    }

    pub fn bookmarks(&self) -> &[PathBuf] {
        &self.bookmarks
    }

    pub fn bookmark_index(&self) -> Option<usize> {
        self.bookmark_index
    }

    /// Bookmark the current directory, or remove it if already bookmarked.
    /// Returns true if the directory is now bookmarked.
    pub fn toggle_bookmark(&mut self) -> bool {
        match self.bookmarks.iter().position(|b| *b == self.current_dir) {
            Some(index) => {
                self.bookmarks.remove(index);
                self.bookmark_index = match self.bookmarks.len() {
                    0 => None,
                    len => Some(index.min(len - 1)),
                };
                false
            }
            None => {
                self.bookmarks.push(self.current_dir.clone());
                self.bookmark_index = Some(self.bookmarks.len() - 1);
                true
            }
        }
    }

    /// Move to the previous bookmark. Returns false when there is none.
    pub fn bookmark_prev(&mut self) -> FsResult<bool> {
        match self.bookmark_index {
            Some(index) if index > 0 => self.goto_bookmark(index - 1),
            _ => Ok(false),
        }
    }

    /// Move to the next bookmark. Returns false when there is none.
    pub fn bookmark_next(&mut self) -> FsResult<bool> {
        match self.bookmark_index {
            Some(index) if index + 1 < self.bookmarks.len() => self.goto_bookmark(index + 1),
            _ => Ok(false),
        }
    }

    fn goto_bookmark(&mut self, index: usize) -> FsResult<bool> {
        let target = self.bookmarks[index].clone();
        self.change_directory(&target, true)?;
        self.bookmark_index = Some(index);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_ops::LocalFs;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn navigator(root: &Path) -> Navigator {
        Navigator::new(
            Arc::new(LocalFs),
            root,
            root.to_path_buf(),
            SortMode::Alpha,
            false,
        )
        .unwrap()
    }

    fn canonical(temp: &TempDir) -> PathBuf {
        temp.path().canonicalize().unwrap()
    }

    fn rows(items: &[Entry]) -> Vec<(String, usize)> {
        items.iter().map(|e| (e.name.clone(), e.depth)).collect()
    }

    #[test]
    fn test_alpha_listing_puts_directories_first() {
        let temp = TempDir::new().unwrap();
        let root = canonical(&temp);
        fs::create_dir(root.join("src")).unwrap();
        fs::write(root.join("README.md"), "").unwrap();

        let mut nav = navigator(&root);
        assert_eq!(
            nav.build_display_items(),
            vec![
                Entry::new("src", true, root.join("src"), 0),
                Entry::new("README.md", false, root.join("README.md"), 0),
            ]
        );
    }

    #[test]
    fn test_expanded_children_follow_parent_with_depth() {
        let temp = TempDir::new().unwrap();
        let root = canonical(&temp);
        fs::create_dir_all(root.join("src/foo")).unwrap();
        fs::write(root.join("src/foo/alpha.py"), "").unwrap();
        fs::write(root.join("src/foo/beta.py"), "").unwrap();
        fs::create_dir(root.join("src/bar")).unwrap();

        let mut nav = navigator(&root);
        nav.expand(&root.join("src"));
        nav.expand(&root.join("src/foo"));

        let items = nav.build_display_items();
        assert_eq!(
            rows(&items),
            vec![
                ("src".into(), 0),
                ("bar".into(), 1),
                ("foo".into(), 1),
                ("alpha.py".into(), 2),
                ("beta.py".into(), 2),
            ]
        );
    }

    #[test]
    fn test_context_scope_picks_immediate_parent() {
        let items = vec![
            Entry::new("src", true, "/p/src", 0),
            Entry::new("foo", true, "/p/src/foo", 1),
            Entry::new("alpha.py", false, "/p/src/foo/alpha.py", 2),
            Entry::new("beta.py", false, "/p/src/foo/beta.py", 2),
            Entry::new("bar", true, "/p/src/bar", 1),
        ];
        let expanded: HashSet<PathBuf> =
            [PathBuf::from("/p/src"), PathBuf::from("/p/src/foo")].into();
        let is_expanded = |p: &Path| expanded.contains(p);

        let scope = context_scope(&items, 3, is_expanded);
        assert_eq!(scope.dir, Some(PathBuf::from("/p/src/foo")));
        assert_eq!(scope.range, Some((2, 3)));

        let scope = context_scope(&items, 0, is_expanded);
        assert_eq!(scope.dir, Some(PathBuf::from("/p/src")));
        assert_eq!(scope.range, Some((1, 4)));

        let scope = context_scope(&items, 4, is_expanded);
        assert_eq!(scope.dir, Some(PathBuf::from("/p/src")));
    }

    #[test]
    fn test_context_scope_top_level_file_has_none() {
        let items = vec![
            Entry::new("a", true, "/p/a", 0),
            Entry::new("b.txt", false, "/p/b.txt", 0),
        ];
        assert_eq!(context_scope(&items, 1, |_| false), ContextScope::default());
        assert_eq!(context_scope(&items, 0, |_| false), ContextScope::default());
        assert_eq!(context_scope(&[], 0, |_| false), ContextScope::default());
    }

    #[test]
    fn test_context_scope_of_empty_expanded_dir() {
        let items = vec![Entry::new("empty", true, "/p/empty", 0)];
        let scope = context_scope(&items, 0, |_| true);
        assert_eq!(scope.range, Some((0, 0)));
    }

    #[test]
    fn test_collapse_branch_respects_component_boundaries() {
        let temp = TempDir::new().unwrap();
        let mut nav = navigator(temp.path());
        for p in ["/x/a", "/x/a/b", "/x/a/b/c", "/x/ab"] {
            nav.expand(Path::new(p));
        }

        assert_eq!(nav.collapse_branch(Path::new("/x/a")), 3);
        assert!(nav.is_expanded(Path::new("/x/ab")));
        assert_eq!(nav.expansion_count(), 1);
    }

    #[test]
    fn test_reexpanding_reproduces_children() {
        let temp = TempDir::new().unwrap();
        let root = canonical(&temp);
        fs::create_dir_all(root.join("d/e")).unwrap();
        fs::write(root.join("d/f.txt"), "").unwrap();

        let mut nav = navigator(&root);
        nav.expand(&root.join("d"));
        nav.expand(&root.join("d/e"));
        let before = nav.build_display_items();

        nav.collapse_branch(&root.join("d"));
        assert_eq!(nav.build_display_items().len(), 1);

        nav.expand(&root.join("d"));
        nav.expand(&root.join("d/e"));
        assert_eq!(nav.build_display_items(), before);
    }

    #[test]
    fn test_vanished_expansion_is_dropped() {
        let temp = TempDir::new().unwrap();
        let root = canonical(&temp);
        fs::create_dir(root.join("gone")).unwrap();

        let mut nav = navigator(&root);
        nav.expand(&root.join("gone"));
        nav.build_display_items();

        fs::remove_dir(root.join("gone")).unwrap();
        nav.notify_directory_changed(&[root.clone()]);
        assert!(nav.build_display_items().is_empty());
        assert!(!nav.is_expanded(&root.join("gone")));
    }

    #[test]
    fn test_filter_prefix_and_glob() {
        let temp = TempDir::new().unwrap();
        let root = canonical(&temp);
        for name in ["Main.rs", "mod.rs", "notes.md"] {
            fs::write(root.join(name), "").unwrap();
        }

        let mut nav = navigator(&root);
        nav.set_filter(Some("ma"));
        assert_eq!(rows(&nav.build_display_items()), vec![("Main.rs".into(), 0)]);

        nav.set_filter(Some("*.RS"));
        assert_eq!(nav.build_display_items().len(), 2);

        nav.set_filter(None);
        assert_eq!(nav.build_display_items().len(), 3);
    }

    #[test]
    fn test_filter_applies_to_top_level_only() {
        let temp = TempDir::new().unwrap();
        let root = canonical(&temp);
        fs::create_dir(root.join("docs")).unwrap();
        fs::write(root.join("docs/guide.txt"), "").unwrap();

        let mut nav = navigator(&root);
        nav.expand(&root.join("docs"));
        nav.set_filter(Some("do"));
        assert_eq!(
            rows(&nav.build_display_items()),
            vec![("docs".into(), 0), ("guide.txt".into(), 1)]
        );
    }

    #[test]
    fn test_hidden_toggle_clears_expansions() {
        let temp = TempDir::new().unwrap();
        let root = canonical(&temp);
        fs::write(root.join(".env"), "").unwrap();
        fs::create_dir(root.join("dir")).unwrap();

        let mut nav = navigator(&root);
        nav.expand(&root.join("dir"));
        assert_eq!(nav.build_display_items().len(), 1);

        assert!(nav.toggle_hidden());
        assert_eq!(nav.expansion_count(), 0);
        assert_eq!(nav.build_display_items().len(), 2);
    }

    #[test]
    fn test_per_directory_sort_override() {
        let temp = TempDir::new().unwrap();
        let root = canonical(&temp);
        fs::create_dir(root.join("sub")).unwrap();

        let mut nav = navigator(&root);
        nav.set_sort(Some(&root.join("sub")), SortMode::MtimeDesc);
        assert_eq!(nav.sort_for(&root.join("sub")), SortMode::MtimeDesc);
        assert_eq!(nav.sort_for(&root), SortMode::Alpha);

        nav.set_sort(None, SortMode::MtimeAsc);
        assert_eq!(nav.sort_for(&root), SortMode::MtimeAsc);
    }

    #[cfg(unix)]
    #[test]
    fn test_expand_all_does_not_follow_symlink_loops() {
        let temp = TempDir::new().unwrap();
        let root = canonical(&temp);
        fs::create_dir_all(root.join("a/b")).unwrap();
        std::os::unix::fs::symlink(&root, root.join("a/b/up")).unwrap();

        let mut nav = navigator(&root);
        assert_eq!(nav.expand_all(), 2);
        assert!(nav.is_expanded(&root.join("a/b")));
        assert!(!nav.is_expanded(&root.join("a/b/up")));
        assert_eq!(nav.build_display_items().len(), 3);
    }

    #[test]
    fn test_history_back_and_forward() {
        let temp = TempDir::new().unwrap();
        let root = canonical(&temp);
        fs::create_dir_all(root.join("one/two")).unwrap();

        let mut nav = navigator(&root);
        nav.change_directory(&root.join("one"), true).unwrap();
        nav.change_directory(&root.join("one/two"), true).unwrap();

        assert!(nav.history_back().unwrap());
        assert_eq!(nav.current_dir(), root.join("one"));
        assert!(nav.history_forward().unwrap());
        assert_eq!(nav.current_dir(), root.join("one/two"));
        assert!(!nav.history_forward().unwrap());

        nav.history_back().unwrap();
        nav.change_directory(&root, true).unwrap();
        assert_eq!(nav.history(), [root.clone(), root.join("one"), root.clone()]);
    }

    #[test]
    fn test_change_directory_rejects_files() {
        let temp = TempDir::new().unwrap();
        let root = canonical(&temp);
        fs::write(root.join("file"), "").unwrap();

        let mut nav = navigator(&root);
        let err = nav.change_directory(&root.join("file"), true).unwrap_err();
        assert_eq!(err.kind(), burrow_core::ErrorKind::InvalidInput);
        assert_eq!(nav.current_dir(), root);
    }

    #[test]
    fn test_bookmarks_toggle_and_step() {
        let temp = TempDir::new().unwrap();
        let root = canonical(&temp);
        fs::create_dir(root.join("a")).unwrap();

        let mut nav = navigator(&root);
        assert!(nav.toggle_bookmark());
        nav.change_directory(&root.join("a"), true).unwrap();
        assert!(nav.toggle_bookmark());
        assert_eq!(nav.bookmark_index(), Some(1));

        assert!(nav.bookmark_prev().unwrap());
        assert_eq!(nav.current_dir(), root);
        assert!(!nav.bookmark_prev().unwrap());

        assert!(!nav.toggle_bookmark());
        assert_eq!(nav.bookmarks(), [root.join("a")]);
        assert_eq!(nav.bookmark_index(), Some(0));
    }
}
