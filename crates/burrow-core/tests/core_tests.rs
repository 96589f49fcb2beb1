use std::fs;

use burrow_core::{
    Entry, ErrorKind, FileInfo, FsError, SortMode, UserConfig, WorkspaceTarget,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_missing_config_file_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let config = UserConfig::load_from(&temp.path().join("nope.toml"));

    assert!(config.warnings.is_empty());
    assert!(config.handlers.is_empty());
    assert_eq!(config.leader_key, ',');
    assert_eq!(config.source, Some(temp.path().join("nope.toml")));
}

#[test]
fn test_shortcuts_validated_against_filesystem() {
    let temp = TempDir::new().unwrap();
    let notes = temp.path().join("notes.md");
    fs::write(&notes, "x").unwrap();
    let projects = temp.path().join("projects");
    fs::create_dir(&projects).unwrap();

    let body = format!(
        r#"
        [file_shortcuts]
        NT = "{notes}"
        bad = "{projects}"
        "no-dash" = "{notes}"

        [dir_shortcuts]
        pr = "{projects}"
        gone = "{missing}"
        "#,
        notes = notes.display(),
        projects = projects.display(),
        missing = temp.path().join("missing").display(),
    );
    let config = UserConfig::load_from(&write_config(&temp, &body));

    let notes = fs::canonicalize(&notes).unwrap();
    let projects = fs::canonicalize(&projects).unwrap();
    assert_eq!(config.file_shortcuts.get("nt"), Some(&notes));
    assert_eq!(config.file_shortcuts.len(), 1);
    assert_eq!(config.dir_shortcuts.get("pr"), Some(&projects));
    assert_eq!(config.dir_shortcuts.len(), 1);
    assert_eq!(config.warnings.len(), 3);
    assert!(config.warnings.iter().any(|w| w.contains("no-dash")));
}

#[test]
fn test_workspace_shortcuts_paths_and_commands() {
    let temp = TempDir::new().unwrap();
    let body = format!(
        r#"
        [workspace_shortcuts.1]
        internal = "{root}"
        external = [["code", "{root}"]]

        [workspace_shortcuts.2]
        external = "ghostty -e htop"

        [workspace_shortcuts.3]
        internal = []
        "#,
        root = temp.path().display(),
    );
    let config = UserConfig::load_from(&write_config(&temp, &body));

    let root = fs::canonicalize(temp.path()).unwrap();
    let ws = config.workspace_shortcuts.get("1").unwrap();
    assert_eq!(ws.internal, Some(WorkspaceTarget::Path(root.clone())));
    assert_eq!(
        ws.external,
        Some(WorkspaceTarget::Commands(vec![vec![
            "code".to_string(),
            temp.path().display().to_string()
        ]]))
    );

    // A bare string is a path; this one does not exist.
    assert!(!config.workspace_shortcuts.contains_key("2"));
    assert!(!config.workspace_shortcuts.contains_key("3"));
    assert!(config.warnings.len() >= 2);
}

#[test]
fn test_entry_from_info() {
    let info = FileInfo {
        name: ".env".to_string(),
        path: "/proj/.env".into(),
        is_dir: false,
        modified: None,
    };
    let entry = Entry::from_info(&info, 2);
    assert_eq!(entry, Entry::new(".env", false, "/proj/.env", 2));
    assert!(entry.is_hidden());
}

#[test]
fn test_sort_mode_default_is_alpha() {
    assert_eq!(SortMode::default(), SortMode::Alpha);
    assert_eq!(SortMode::Alpha.short_label(), "A-Z");
}

#[test]
fn test_error_kinds_from_io() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");
    let err = FsError::io(&missing, fs::read_dir(&missing).unwrap_err());
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("missing"));
}
