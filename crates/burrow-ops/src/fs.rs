//! Filesystem capability surface.
//!
//! Every mutation the navigator performs goes through [`FileSystem`] so the
//! state machine and clipboard can be exercised against fakes in tests.

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use burrow_core::{FileInfo, FsError, FsResult};
use tracing::debug;

use crate::copy::{copy_dir_recursive, copy_file};

/// Synchronous filesystem operations with typed failures.
pub trait FileSystem: Debug + Send + Sync {
    /// List the direct children of `dir`.
    fn list(&self, dir: &Path) -> FsResult<Vec<FileInfo>>;

    /// Metadata for a single path. Symlinks are followed, falling back to the
    /// link itself when dangling.
    fn stat(&self, path: &Path) -> FsResult<FileInfo>;

    /// Create an empty file. Fails with `AlreadyExists` rather than truncating.
    fn create_file(&self, path: &Path) -> FsResult<()>;

    /// Create a directory (parents included).
    fn create_dir(&self, path: &Path) -> FsResult<()>;

    /// Delete a file, a symlink, or a directory recursively.
    fn delete(&self, path: &Path) -> FsResult<()>;

    /// Rename within the same filesystem.
    fn rename(&self, from: &Path, to: &Path) -> FsResult<()>;

    /// Copy a file, or a directory recursively.
    fn copy(&self, from: &Path, to: &Path) -> FsResult<()>;

    /// Move an item, falling back to copy-then-delete across devices.
    fn move_item(&self, from: &Path, to: &Path) -> FsResult<()> {
        match self.rename(from, to) {
            Ok(()) => Ok(()),
            Err(FsError::Io { .. }) => {
                self.copy(from, to)?;
                self.delete(from)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether anything exists at `path` (dangling symlinks included).
    fn exists(&self, path: &Path) -> bool {
        self.stat(path).is_ok()
    }

    /// Resolve to a canonical absolute path.
    fn canonicalize(&self, path: &Path) -> FsResult<PathBuf>;
}

/// The real, local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

fn info_from(path: &Path, metadata: &fs::Metadata) -> FileInfo {
    FileInfo {
        name: FileInfo::name_of(path),
        path: path.to_path_buf(),
        is_dir: metadata.is_dir(),
        modified: metadata.modified().ok(),
    }
}

impl FileSystem for LocalFs {
    fn list(&self, dir: &Path) -> FsResult<Vec<FileInfo>> {
        let entries = fs::read_dir(dir).map_err(|e| FsError::io(dir, e))?;
        let mut items = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FsError::io(dir, e))?;
            match self.stat(&entry.path()) {
                Ok(info) => items.push(info),
                // Entry vanished between readdir and stat.
                Err(FsError::NotFound { .. }) => continue,
                Err(e) => {
                    debug!(path = %entry.path().display(), error = %e, "Skipping unreadable entry");
                }
            }
        }
        Ok(items)
    }

    fn stat(&self, path: &Path) -> FsResult<FileInfo> {
        match fs::metadata(path) {
            Ok(metadata) => Ok(info_from(path, &metadata)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => fs::symlink_metadata(path)
                .map(|metadata| info_from(path, &metadata))
                .map_err(|e| FsError::io(path, e)),
            Err(e) => Err(FsError::io(path, e)),
        }
    }

    fn create_file(&self, path: &Path) -> FsResult<()> {
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map(|_| ())
            .map_err(|e| FsError::io(path, e))
    }

    fn create_dir(&self, path: &Path) -> FsResult<()> {
        if path.exists() {
            return Err(FsError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        fs::create_dir_all(path).map_err(|e| FsError::io(path, e))
    }

    fn delete(&self, path: &Path) -> FsResult<()> {
        let metadata = fs::symlink_metadata(path).map_err(|e| FsError::io(path, e))?;
        if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
        .map_err(|e| FsError::io(path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        fs::rename(from, to).map_err(|e| FsError::io(from, e))
    }

    fn copy(&self, from: &Path, to: &Path) -> FsResult<()> {
        let metadata = fs::metadata(from).map_err(|e| FsError::io(from, e))?;
        if metadata.is_dir() {
            if to.starts_with(from) {
                return Err(FsError::invalid(format!(
                    "Cannot copy {} into itself",
                    from.display()
                )));
            }
            copy_dir_recursive(from, to).map(|_| ())
        } else {
            copy_file(from, to).map(|_| ())
        }
    }

    fn canonicalize(&self, path: &Path) -> FsResult<PathBuf> {
        fs::canonicalize(path).map_err(|e| FsError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_list_and_stat() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("README.md"), "hi").unwrap();

        let mut items = LocalFs.list(temp.path()).unwrap();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "README.md");
        assert!(!items[0].is_dir);
        assert!(items[1].is_dir);
        assert!(items[1].modified.is_some());
    }

    #[test]
    fn test_list_missing_directory_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = LocalFs.list(&temp.path().join("gone")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_create_file_does_not_truncate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.txt");
        fs::write(&path, "keep").unwrap();

        let err = LocalFs.create_file(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep");
    }

    #[test]
    fn test_delete_directory_recursively() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("d");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/f"), "x").unwrap();

        LocalFs.delete(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_copy_into_itself_is_rejected() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("d");
        fs::create_dir(&dir).unwrap();

        let err = LocalFs.copy(&dir, &dir.join("inner")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_move_item() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("a");
        let to = temp.path().join("b");
        fs::write(&from, "x").unwrap();

        LocalFs.move_item(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "x");
    }
}
