//! Name validation and collision-free name generation for create/rename.

use std::path::Path;

use burrow_core::{FsError, FsResult};

use crate::fs::FileSystem;

/// Pick a name in `dir` that does not collide with an existing entry.
///
/// For "file.txt", tries "file (1).txt", "file (2).txt", etc. The counter is
/// inserted before the last extension; dot-files have no extension.
pub fn unique_name(dir: &Path, desired: &str, exists: impl Fn(&Path) -> bool) -> String {
    if !exists(&dir.join(desired)) {
        return desired.to_string();
    }

    let as_path = Path::new(desired);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| desired.to_string());
    let extension = as_path.extension().map(|e| e.to_string_lossy().into_owned());

    (1u64..)
        .map(|i| match &extension {
            Some(ext) => format!("{stem} ({i}).{ext}"),
            None => format!("{stem} ({i})"),
        })
        .find(|candidate| !exists(&dir.join(candidate)))
        .unwrap_or_else(|| desired.to_string())
}

/// [`unique_name`] against a [`FileSystem`].
pub fn unique_name_in(fs: &dyn FileSystem, dir: &Path, desired: &str) -> String {
    unique_name(dir, desired, |p| fs.exists(p))
}

/// Validate a single path component typed by the user.
pub fn validate_name(name: &str) -> FsResult<()> {
    if name.is_empty() {
        return Err(FsError::invalid("Name cannot be empty"));
    }
    if name.len() > 255 {
        return Err(FsError::invalid("Name is too long (max 255 characters)"));
    }
    if name.contains('/') {
        return Err(FsError::invalid("Name cannot contain '/'"));
    }
    if name.contains('\0') {
        return Err(FsError::invalid("Name cannot contain null character"));
    }
    if name == "." || name == ".." {
        return Err(FsError::invalid("'.' and '..' are reserved names"));
    }
    Ok(())
}
