//! Recursive copy helpers.

use std::fs;
use std::path::Path;

use burrow_core::{FsError, FsResult};

/// Copy a single file, returning the number of bytes written.
pub fn copy_file(source: &Path, dest: &Path) -> FsResult<u64> {
    fs::copy(source, dest).map_err(|e| FsError::io(source, e))
}

/// Recursively copy a directory, returning the total bytes copied.
///
/// Symlinks inside the tree are recreated as links rather than followed, so
/// a link pointing at an ancestor cannot make the copy recurse forever.
pub fn copy_dir_recursive(source: &Path, dest: &Path) -> FsResult<u64> {
    fs::create_dir_all(dest).map_err(|e| FsError::io(dest, e))?;

    let mut total_bytes = 0u64;
    let entries = fs::read_dir(source).map_err(|e| FsError::io(source, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| FsError::io(source, e))?;
        let path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| FsError::io(&path, e))?;

        if file_type.is_symlink() {
            copy_symlink(&path, &dest_path)?;
        } else if file_type.is_dir() {
            total_bytes += copy_dir_recursive(&path, &dest_path)?;
        } else {
            total_bytes += copy_file(&path, &dest_path)?;
        }
    }

    Ok(total_bytes)
}

#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> FsResult<()> {
    let target = fs::read_link(source).map_err(|e| FsError::io(source, e))?;
    std::os::unix::fs::symlink(&target, dest).map_err(|e| FsError::io(dest, e))
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, dest: &Path) -> FsResult<()> {
    if source.is_dir() {
        copy_dir_recursive(source, dest).map(|_| ())
    } else {
        copy_file(source, dest).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_recursive() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("a/b")).unwrap();
        fs::write(src.join("top.txt"), "12345").unwrap();
        fs::write(src.join("a/b/deep.txt"), "xyz").unwrap();

        let dest = temp.path().join("dest");
        let bytes = copy_dir_recursive(&src, &dest).unwrap();

        assert_eq!(bytes, 8);
        assert_eq!(fs::read_to_string(dest.join("a/b/deep.txt")).unwrap(), "xyz");
        assert!(src.join("top.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_is_not_followed() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        std::os::unix::fs::symlink(&src, src.join("loop")).unwrap();

        let dest = temp.path().join("dest");
        copy_dir_recursive(&src, &dest).unwrap();

        let link = fs::symlink_metadata(dest.join("loop")).unwrap();
        assert!(link.file_type().is_symlink());
    }

    #[test]
    fn test_copy_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = copy_file(&temp.path().join("nope"), &temp.path().join("x")).unwrap_err();
        assert!(matches!(err, FsError::NotFound { .. }));
    }
}
