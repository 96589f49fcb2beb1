//! Clipboard staging for cut/copy/paste.
//!
//! A yank copies every item into a private staging directory; paste copies
//! from there into the destination. The clipboard is decoupled from the
//! sources, so a cut item is safe in staging even after its source is gone.
//!
//! Cut is copy-then-delete per item, not across the batch: when item N fails
//! to stage, items `0..N` that were cut have already been deleted at their
//! source, and their staged copies are discarded along with the staging
//! directory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use burrow_core::{FsError, FsResult};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::fs::FileSystem;

/// Prefix for staging directories created under the staging root.
pub const STAGING_PREFIX: &str = "burrow-clip-";

/// Whether a batch was cut or copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Cut,
    Copy,
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cut => write!(f, "Cut"),
            Self::Copy => write!(f, "Yanked"),
        }
    }
}

/// An item to stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YankItem {
    pub source: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

impl YankItem {
    pub fn new(source: impl Into<PathBuf>, name: impl Into<String>, is_dir: bool) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
            is_dir,
        }
    }
}

/// One staged item inside the batch's staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    pub temp_path: PathBuf,
    pub original_name: String,
    pub is_dir: bool,
}

/// A staged batch. Owns its staging directory; dropping the batch removes it.
#[derive(Debug)]
pub struct ClipboardBatch {
    kind: BatchKind,
    entries: Vec<StagedEntry>,
    dir: TempDir,
}

impl ClipboardBatch {
    pub fn kind(&self) -> BatchKind {
        self.kind
    }

    pub fn entries(&self) -> &[StagedEntry] {
        &self.entries
    }

    pub fn staging_dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Owner of the current clipboard batch.
#[derive(Debug)]
pub struct ClipboardStaging {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    batch: Option<ClipboardBatch>,
}

impl ClipboardStaging {
    /// Stage under the system temp directory.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_root(fs, std::env::temp_dir())
    }

    /// Stage under an explicit root directory.
    pub fn with_root(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
            batch: None,
        }
    }

    /// The current batch, if any.
    pub fn batch(&self) -> Option<&ClipboardBatch> {
        self.batch.as_ref()
    }

    pub fn has_entries(&self) -> bool {
        self.batch.as_ref().is_some_and(|b| !b.entries.is_empty())
    }

    pub fn entry_count(&self) -> usize {
        self.batch.as_ref().map_or(0, |b| b.entries.len())
    }

    pub fn kind(&self) -> Option<BatchKind> {
        self.batch.as_ref().map(|b| b.kind)
    }

    pub fn staging_dir(&self) -> Option<&Path> {
        self.batch.as_ref().map(ClipboardBatch::staging_dir)
    }

    /// Stage a single item.
    pub fn yank(&mut self, item: YankItem, cut: bool) -> FsResult<usize> {
        self.yank_multiple(&[item], cut)
    }

    /// Stage `items` in order, replacing any previous batch.
    ///
    /// Returns the number of staged items. On failure nothing is staged and
    /// the staging directory is removed; sources cut before the failing item
    /// stay deleted.
    pub fn yank_multiple(&mut self, items: &[YankItem], cut: bool) -> FsResult<usize> {
        if items.is_empty() {
            return Err(FsError::invalid("Nothing to yank"));
        }
        self.cleanup();

        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.root)
            .map_err(|e| FsError::io(&self.root, e))?;

        let mut entries: Vec<StagedEntry> = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let temp_path = dir.path().join(format!("{index:03}_{}", item.name));

            let staged = self.fs.copy(&item.source, &temp_path).and_then(|()| {
                if cut {
                    self.fs.delete(&item.source)
                } else {
                    Ok(())
                }
            });

            if let Err(e) = staged {
                warn!(
                    source = %item.source.display(),
                    error = %e,
                    staged = entries.len(),
                    "Staging failed, rolling back batch"
                );
                self.rollback(&entries, &temp_path, dir);
                return Err(e);
            }

            entries.push(StagedEntry {
                temp_path,
                original_name: item.name.clone(),
                is_dir: item.is_dir,
            });
        }

        let count = entries.len();
        let kind = if cut { BatchKind::Cut } else { BatchKind::Copy };
        info!(count, ?kind, staging = %dir.path().display(), "Clipboard batch staged");
        self.batch = Some(ClipboardBatch { kind, entries, dir });
        Ok(count)
    }

    fn rollback(&self, entries: &[StagedEntry], partial: &Path, dir: TempDir) {
        for entry in entries {
            if let Err(e) = self.fs.delete(&entry.temp_path) {
                debug!(path = %entry.temp_path.display(), error = %e, "Rollback delete failed");
            }
        }
        if self.fs.exists(partial) {
            if let Err(e) = self.fs.delete(partial) {
                debug!(path = %partial.display(), error = %e, "Rollback delete failed");
            }
        }
        if let Err(e) = dir.close() {
            warn!(error = %e, "Failed to remove staging directory");
        }
    }

    /// Copy every staged entry into `dest_dir`, overwriting what is there.
    ///
    /// `new_name` applies only to single-entry batches. The batch is kept, so
    /// the same clipboard can be pasted again elsewhere.
    pub fn paste(&self, dest_dir: &Path, new_name: Option<&str>) -> FsResult<Vec<PathBuf>> {
        let batch = self
            .batch
            .as_ref()
            .filter(|b| !b.entries.is_empty())
            .ok_or_else(|| FsError::invalid("Nothing to paste"))?;

        let single = batch.entries.len() == 1;
        let mut pasted = Vec::with_capacity(batch.entries.len());
        for entry in &batch.entries {
            let name = match new_name {
                Some(name) if single => name,
                _ => entry.original_name.as_str(),
            };
            let dest = dest_dir.join(name);
            if self.fs.exists(&dest) {
                self.fs.delete(&dest)?;
            }
            self.fs.copy(&entry.temp_path, &dest)?;
            pasted.push(dest);
        }

        info!(count = pasted.len(), dest = %dest_dir.display(), "Pasted clipboard batch");
        Ok(pasted)
    }

    /// Drop the current batch and delete its staging directory.
    pub fn cleanup(&mut self) {
        if let Some(batch) = self.batch.take() {
            let path = batch.dir.path().to_path_buf();
            if let Err(e) = batch.dir.close() {
                warn!(path = %path.display(), error = %e, "Failed to remove staging directory");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFs;
    use std::fs;

    fn staging(root: &Path) -> ClipboardStaging {
        ClipboardStaging::with_root(Arc::new(LocalFs), root)
    }

    #[test]
    fn test_yank_then_paste_copy() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().join("stage");
        fs::create_dir(&root).unwrap();
        let src = temp.path().join("a.txt");
        fs::write(&src, "alpha").unwrap();
        let dest = temp.path().join("dest");
        fs::create_dir(&dest).unwrap();

        let mut clip = staging(&root);
        clip.yank(YankItem::new(&src, "a.txt", false), false).unwrap();
        assert_eq!(clip.kind(), Some(BatchKind::Copy));

        clip.paste(&dest, None).unwrap();
        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "alpha");
        assert!(src.exists());
    }

    #[test]
    fn test_identical_names_do_not_collide_in_staging() {
        let temp = tempfile::TempDir::new().unwrap();
        for d in ["x", "y"] {
            fs::create_dir(temp.path().join(d)).unwrap();
            fs::write(temp.path().join(d).join("same.txt"), d).unwrap();
        }

        let mut clip = staging(temp.path());
        let count = clip
            .yank_multiple(
                &[
                    YankItem::new(temp.path().join("x/same.txt"), "same.txt", false),
                    YankItem::new(temp.path().join("y/same.txt"), "same.txt", false),
                ],
                false,
            )
            .unwrap();

        assert_eq!(count, 2);
        let batch = clip.batch().unwrap();
        assert_ne!(batch.entries()[0].temp_path, batch.entries()[1].temp_path);
    }

    #[test]
    fn test_paste_rename_applies_to_single_entry_only() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::write(temp.path().join("a"), "1").unwrap();
        fs::write(temp.path().join("b"), "2").unwrap();
        let dest = temp.path().join("dest");
        fs::create_dir(&dest).unwrap();

        let mut clip = staging(temp.path());
        clip.yank(YankItem::new(temp.path().join("a"), "a", false), false)
            .unwrap();
        clip.paste(&dest, Some("renamed")).unwrap();
        assert!(dest.join("renamed").exists());

        clip.yank_multiple(
            &[
                YankItem::new(temp.path().join("a"), "a", false),
                YankItem::new(temp.path().join("b"), "b", false),
            ],
            false,
        )
        .unwrap();
        clip.paste(&dest, Some("ignored")).unwrap();
        assert!(dest.join("a").exists());
        assert!(dest.join("b").exists());
        assert!(!dest.join("ignored").exists());
    }

    #[test]
    fn test_new_yank_replaces_previous_staging_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::write(temp.path().join("a"), "1").unwrap();

        let mut clip = staging(temp.path());
        clip.yank(YankItem::new(temp.path().join("a"), "a", false), false)
            .unwrap();
        let first = clip.staging_dir().unwrap().to_path_buf();

        clip.yank(YankItem::new(temp.path().join("a"), "a", false), false)
            .unwrap();
        assert!(!first.exists());
        assert!(clip.staging_dir().unwrap().exists());
    }

    #[test]
    fn test_cleanup_removes_staging_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::write(temp.path().join("a"), "1").unwrap();

        let mut clip = staging(temp.path());
        clip.yank(YankItem::new(temp.path().join("a"), "a", false), false)
            .unwrap();
        let dir = clip.staging_dir().unwrap().to_path_buf();

        clip.cleanup();
        assert!(!dir.exists());
        assert!(!clip.has_entries());
        assert!(clip.paste(temp.path(), None).is_err());
    }

    #[test]
    fn test_empty_yank_is_invalid() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut clip = staging(temp.path());
        let err = clip.yank_multiple(&[], true).unwrap_err();
        assert_eq!(err.kind(), burrow_core::ErrorKind::InvalidInput);
    }
}
