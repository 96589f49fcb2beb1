use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use burrow_core::{FileInfo, FsError, FsResult};
use burrow_ops::{ClipboardStaging, FileSystem, LocalFs, YankItem, STAGING_PREFIX};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Local filesystem that refuses to copy one particular source.
#[derive(Debug)]
struct FailingCopyFs {
    fail_on: PathBuf,
}

impl FileSystem for FailingCopyFs {
    fn list(&self, dir: &Path) -> FsResult<Vec<FileInfo>> {
        LocalFs.list(dir)
    }
    fn stat(&self, path: &Path) -> FsResult<FileInfo> {
        LocalFs.stat(path)
    }
    fn create_file(&self, path: &Path) -> FsResult<()> {
        LocalFs.create_file(path)
    }
    fn create_dir(&self, path: &Path) -> FsResult<()> {
        LocalFs.create_dir(path)
    }
    fn delete(&self, path: &Path) -> FsResult<()> {
        LocalFs.delete(path)
    }
    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        LocalFs.rename(from, to)
    }
    fn copy(&self, from: &Path, to: &Path) -> FsResult<()> {
        if from == self.fail_on {
            return Err(FsError::PermissionDenied {
                path: from.to_path_buf(),
            });
        }
        LocalFs.copy(from, to)
    }
    fn canonicalize(&self, path: &Path) -> FsResult<PathBuf> {
        LocalFs.canonicalize(path)
    }
}

fn staging_dirs(root: &Path) -> Vec<PathBuf> {
    fs::read_dir(root)
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with(STAGING_PREFIX))
        })
        .collect()
}

fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let name = path.strip_prefix(dir).unwrap().display().to_string();
        if path.is_dir() {
            for (child, bytes) in snapshot(&path) {
                out.push((format!("{name}/{child}"), bytes));
            }
        } else {
            out.push((name, fs::read(&path).unwrap()));
        }
    }
    out.sort();
    out
}

#[test]
fn test_cut_rollback_keeps_earlier_cuts_deleted() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    let stage_root = temp.path().join("stage");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&stage_root).unwrap();
    for name in ["a", "b", "c"] {
        fs::write(src.join(name), name).unwrap();
    }

    let fs_impl = Arc::new(FailingCopyFs {
        fail_on: src.join("b"),
    });
    let mut clip = ClipboardStaging::with_root(fs_impl, &stage_root);

    let items: Vec<YankItem> = ["a", "b", "c"]
        .iter()
        .map(|n| YankItem::new(src.join(n), *n, false))
        .collect();
    let err = clip.yank_multiple(&items, true).unwrap_err();
    assert!(matches!(err, FsError::PermissionDenied { .. }));

    // Per-item copy-then-delete: A was staged and cut before B failed. The
    // rollback discards A's staged copy, so A is gone from both places.
    assert!(!src.join("a").exists());
    assert!(src.join("b").exists());
    assert!(src.join("c").exists());
    assert!(staging_dirs(&stage_root).is_empty());
    assert!(!clip.has_entries());
}

#[test]
fn test_copy_failure_leaves_sources_untouched() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a"), "a").unwrap();
    fs::write(temp.path().join("b"), "b").unwrap();

    let fs_impl = Arc::new(FailingCopyFs {
        fail_on: temp.path().join("b"),
    });
    let mut clip = ClipboardStaging::with_root(fs_impl, temp.path());
    let items = [
        YankItem::new(temp.path().join("a"), "a", false),
        YankItem::new(temp.path().join("b"), "b", false),
    ];

    assert!(clip.yank_multiple(&items, false).is_err());
    assert!(temp.path().join("a").exists());
    assert!(temp.path().join("b").exists());
    assert!(staging_dirs(temp.path()).is_empty());
}

#[test]
fn test_paste_is_repeatable_into_distinct_directories() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("project");
    fs::create_dir_all(src.join("nested")).unwrap();
    fs::write(src.join("nested/file.txt"), "payload").unwrap();
    fs::write(src.join("top.bin"), [0u8, 1, 2, 3]).unwrap();
    let first = temp.path().join("first");
    let second = temp.path().join("second");
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();

    let mut clip = ClipboardStaging::with_root(Arc::new(LocalFs), temp.path());
    clip.yank(YankItem::new(&src, "project", true), true).unwrap();
    assert!(!src.exists());

    clip.paste(&first, None).unwrap();
    clip.paste(&second, None).unwrap();

    assert_eq!(snapshot(&first), snapshot(&second));
    assert_eq!(
        fs::read_to_string(second.join("project/nested/file.txt")).unwrap(),
        "payload"
    );
    assert!(clip.has_entries());
}

#[test]
fn test_paste_overwrites_existing_destination() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("note.txt"), "new").unwrap();
    let dest = temp.path().join("dest");
    fs::create_dir_all(dest.join("note.txt")).unwrap();
    fs::write(dest.join("note.txt/old"), "old").unwrap();

    let mut clip = ClipboardStaging::with_root(Arc::new(LocalFs), temp.path());
    clip.yank(YankItem::new(temp.path().join("note.txt"), "note.txt", false), false)
        .unwrap();
    let pasted = clip.paste(&dest, None).unwrap();

    assert_eq!(pasted, vec![dest.join("note.txt")]);
    assert_eq!(fs::read_to_string(dest.join("note.txt")).unwrap(), "new");
    assert!(!dest.join("note.txt (1)").exists());
}
