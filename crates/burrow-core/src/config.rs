//! User configuration snapshot.
//!
//! The configuration file is TOML. Loading never fails: a missing file yields
//! defaults and every malformed entry is dropped with a human-readable warning
//! collected in [`UserConfig::warnings`].

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::entry::SortMode;

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "BURROW_CONFIG";

/// Handler names the file opener looks up.
pub mod handler_names {
    pub const EDITOR: &str = "editor";
    pub const PDF_VIEWER: &str = "pdf_viewer";
    pub const IMAGE_VIEWER: &str = "image_viewer";
    pub const CSV_VIEWER: &str = "csv_viewer";
    pub const TERMINAL: &str = "terminal";
}

/// A named, ordered list of command templates used to open a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerSpec {
    /// Command templates; `{file}` is replaced by the target path.
    pub commands: Vec<Vec<String>>,
    /// Run in the foreground with the terminal UI suspended.
    pub is_internal: bool,
}

/// One side of a workspace shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceTarget {
    Path(PathBuf),
    Commands(Vec<Vec<String>>),
}

/// A workspace shortcut: what to do inside burrow and what to launch outside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceShortcut {
    pub internal: Option<WorkspaceTarget>,
    pub external: Option<WorkspaceTarget>,
}

/// Immutable configuration snapshot.
///
/// Reloading builds a new snapshot; callers swap their `Arc<UserConfig>`
/// rather than mutating one in place.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct UserConfig {
    /// Show dot-files on startup.
    #[builder(default = "false")]
    pub show_hidden: bool,

    /// Sort order used for directories without an override.
    #[builder(default)]
    pub default_sort: SortMode,

    /// Key that starts a leader sequence.
    #[builder(default = "','")]
    pub leader_key: char,

    #[builder(default)]
    pub handlers: IndexMap<String, HandlerSpec>,

    #[builder(default)]
    pub file_shortcuts: IndexMap<String, PathBuf>,

    #[builder(default)]
    pub dir_shortcuts: IndexMap<String, PathBuf>,

    #[builder(default)]
    pub workspace_shortcuts: IndexMap<String, WorkspaceShortcut>,

    /// Problems found while normalising the file.
    #[builder(default)]
    pub warnings: Vec<String>,

    /// File this snapshot was read from, if any.
    #[builder(default)]
    pub source: Option<PathBuf>,
}

impl UserConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(key) = self.leader_key {
            if key.is_alphanumeric() || key.is_whitespace() {
                return Err(format!("Leader key '{key}' must be a symbol"));
            }
        }
        Ok(())
    }
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            default_sort: SortMode::Alpha,
            leader_key: ',',
            handlers: IndexMap::new(),
            file_shortcuts: IndexMap::new(),
            dir_shortcuts: IndexMap::new(),
            workspace_shortcuts: IndexMap::new(),
            warnings: Vec::new(),
            source: None,
        }
    }
}

impl UserConfig {
    /// Create a new config builder.
    pub fn builder() -> UserConfigBuilder {
        UserConfigBuilder::default()
    }

    /// Default configuration file location.
    ///
    /// `$BURROW_CONFIG` wins, then `<config dir>/burrow/config.toml`.
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|p| p.join("burrow").join("config.toml"))
    }

    /// Load from the default location.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from an explicit file.
    pub fn load_from(path: &Path) -> Self {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read config");
                Self {
                    warnings: vec![format!("Could not read {}: {e}", path.display())],
                    ..Self::default()
                }
            }
        };
        config.source = Some(path.to_path_buf());
        config
    }

    /// Parse and normalise configuration text.
    pub fn from_toml_str(content: &str) -> Self {
        match toml::from_str::<RawConfig>(content) {
            Ok(raw) => raw.normalize(),
            Err(e) => {
                warn!(error = %e, "Config file is not valid TOML");
                Self {
                    warnings: vec![format!("Config ignored (parse error: {})", e.message())],
                    ..Self::default()
                }
            }
        }
    }

    /// Look up a handler by name.
    pub fn handler(&self, name: &str) -> Option<&HandlerSpec> {
        self.handlers.get(name)
    }
}

// Raw on-disk shapes. Everything is optional and loosely typed so that one
// bad entry never rejects the whole file.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    show_hidden: Option<bool>,
    default_sort: Option<String>,
    leader_key: Option<String>,
    handlers: IndexMap<String, RawHandler>,
    file_shortcuts: IndexMap<String, toml::Value>,
    dir_shortcuts: IndexMap<String, toml::Value>,
    workspace_shortcuts: IndexMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCommand {
    Line(String),
    Tokens(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCommands {
    Single(RawCommand),
    Many(Vec<RawCommand>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawHandler {
    Detailed {
        #[serde(alias = "command")]
        commands: RawCommands,
        #[serde(default)]
        is_internal: bool,
    },
    Commands(RawCommands),
}

impl RawCommand {
    fn normalize(self) -> Vec<String> {
        match self {
            Self::Line(line) => split_command_line(&line),
            Self::Tokens(tokens) => tokens.into_iter().filter(|t| !t.is_empty()).collect(),
        }
    }
}

impl RawCommands {
    fn normalize(self) -> Vec<Vec<String>> {
        let all = match self {
            Self::Single(cmd) => vec![cmd.normalize()],
            Self::Many(cmds) => cmds.into_iter().map(RawCommand::normalize).collect(),
        };
        all.into_iter().filter(|c| !c.is_empty()).collect()
    }
}

impl RawConfig {
    fn normalize(self) -> UserConfig {
        let mut warnings = Vec::new();
        let defaults = UserConfig::default();

        let default_sort = match self.default_sort {
            Some(raw) => raw.trim().parse::<SortMode>().unwrap_or_else(|_| {
                warnings.push(format!("default_sort '{raw}' ignored (use alpha, mtime_asc or mtime_desc)"));
                defaults.default_sort
            }),
            None => defaults.default_sort,
        };

        let leader_key = match self.leader_key.as_deref().map(str::trim) {
            None => defaults.leader_key,
            Some(raw) => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_alphanumeric() => c,
                    _ => {
                        warnings.push(format!("leader_key '{raw}' ignored (use a single symbol)"));
                        defaults.leader_key
                    }
                }
            }
        };

        let mut handlers = IndexMap::new();
        for (raw_key, raw_value) in self.handlers {
            let key = raw_key.trim();
            if key.is_empty() {
                continue;
            }
            let (commands, is_internal) = match raw_value {
                RawHandler::Detailed {
                    commands,
                    is_internal,
                } => (commands.normalize(), is_internal),
                RawHandler::Commands(commands) => (commands.normalize(), false),
            };
            if commands.is_empty() {
                warnings.push(format!("handler '{key}' ignored (no commands)"));
                continue;
            }
            handlers.insert(key.to_string(), HandlerSpec { commands, is_internal });
        }

        let file_shortcuts = normalize_path_shortcuts(
            "file_shortcuts",
            self.file_shortcuts,
            Path::is_file,
            "is not an existing file",
            &mut warnings,
        );
        let dir_shortcuts = normalize_path_shortcuts(
            "dir_shortcuts",
            self.dir_shortcuts,
            Path::is_dir,
            "is not an existing directory",
            &mut warnings,
        );
        let workspace_shortcuts =
            normalize_workspace_shortcuts(self.workspace_shortcuts, &mut warnings);

        for w in &warnings {
            debug!(warning = %w, "Config normalisation");
        }

        UserConfig {
            show_hidden: self.show_hidden.unwrap_or(defaults.show_hidden),
            default_sort,
            leader_key,
            handlers,
            file_shortcuts,
            dir_shortcuts,
            workspace_shortcuts,
            warnings,
            source: None,
        }
    }
}

/// Normalise a shortcut token: trimmed, lower-cased, alphanumeric.
fn normalize_token(section: &str, raw_key: &str, warnings: &mut Vec<String>) -> Option<String> {
    let token = raw_key.trim().to_lowercase();
    if token.is_empty() {
        warnings.push(format!("{section} entry ignored (empty key)"));
        return None;
    }
    if !token.chars().all(char::is_alphanumeric) {
        warnings.push(format!("{section} key '{raw_key}' ignored (use alphanumeric tokens)"));
        return None;
    }
    Some(token)
}

fn normalize_path_shortcuts(
    section: &str,
    raw: IndexMap<String, toml::Value>,
    accept: fn(&Path) -> bool,
    reject_reason: &str,
    warnings: &mut Vec<String>,
) -> IndexMap<String, PathBuf> {
    let mut shortcuts = IndexMap::new();
    for (raw_key, raw_value) in raw {
        let Some(token) = normalize_token(section, &raw_key, warnings) else {
            continue;
        };
        let Some(value) = raw_value.as_str() else {
            warnings.push(format!("{section} '{raw_key}' ignored (path must be a string)"));
            continue;
        };
        let Some(path) = normalize_path(value) else {
            warnings.push(format!("{section} '{raw_key}' ignored (empty path)"));
            continue;
        };
        if !accept(&path) {
            warnings.push(format!(
                "{section} '{raw_key}' ignored ({} {reject_reason})",
                path.display()
            ));
            continue;
        }
        shortcuts.insert(token, path);
    }
    shortcuts
}

fn normalize_workspace_shortcuts(
    raw: IndexMap<String, toml::Value>,
    warnings: &mut Vec<String>,
) -> IndexMap<String, WorkspaceShortcut> {
    let mut shortcuts = IndexMap::new();
    for (raw_key, raw_value) in raw {
        let Some(token) = normalize_token("workspace_shortcuts", &raw_key, warnings) else {
            continue;
        };
        let Some(table) = raw_value.as_table() else {
            warnings.push(format!(
                "workspace_shortcuts '{raw_key}' ignored (expected table with paths or commands)"
            ));
            continue;
        };

        let mut entry = WorkspaceShortcut::default();
        for label in ["internal", "external"] {
            let Some(candidate) = table.get(label) else {
                continue;
            };
            let target = match candidate {
                toml::Value::String(s) => match normalize_path(s) {
                    None => {
                        warnings.push(format!("workspace_shortcuts '{raw_key}' {label} ignored (empty path)"));
                        None
                    }
                    Some(path) if !path.exists() => {
                        warnings.push(format!(
                            "workspace_shortcuts '{raw_key}' {label} ignored ({} missing)",
                            path.display()
                        ));
                        None
                    }
                    Some(path) => Some(WorkspaceTarget::Path(path)),
                },
                toml::Value::Array(items) => {
                    let commands = workspace_commands(items);
                    if commands.is_empty() {
                        warnings.push(format!(
                            "workspace_shortcuts '{raw_key}' {label} ignored (no valid commands)"
                        ));
                        None
                    } else {
                        Some(WorkspaceTarget::Commands(commands))
                    }
                }
                _ => {
                    warnings.push(format!("workspace_shortcuts '{raw_key}' {label} ignored (unsupported type)"));
                    None
                }
            };
            match label {
                "internal" => entry.internal = target,
                _ => entry.external = target,
            }
        }

        if entry.internal.is_none() && entry.external.is_none() {
            warnings.push(format!(
                "workspace_shortcuts '{raw_key}' ignored (no valid paths or commands)"
            ));
            continue;
        }
        shortcuts.insert(token, entry);
    }
    shortcuts
}

fn workspace_commands(items: &[toml::Value]) -> Vec<Vec<String>> {
    // A flat list of strings is one command; a list of lists is several.
    if items.iter().all(toml::Value::is_str) {
        let tokens: Vec<String> = items
            .iter()
            .filter_map(toml::Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .collect();
        return if tokens.is_empty() { Vec::new() } else { vec![tokens] };
    }
    items
        .iter()
        .filter_map(|item| match item {
            toml::Value::String(line) => Some(split_command_line(line)),
            toml::Value::Array(tokens) => Some(
                tokens
                    .iter()
                    .filter_map(toml::Value::as_str)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        })
        .filter(|cmd: &Vec<String>| !cmd.is_empty())
        .collect()
}

/// Split a command line on whitespace, honouring single and double quotes.
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Expand a leading `~` and resolve the path to its real location when it
/// exists.
pub fn normalize_path(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let expanded = expand_tilde(trimmed);
    Some(std::fs::canonicalize(&expanded).unwrap_or(expanded))
}

/// Replace a leading `~` with the home directory.
pub fn expand_tilde(value: &str) -> PathBuf {
    match value.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(value),
        },
        _ => PathBuf::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_builder() {
        let config = UserConfig::builder()
            .show_hidden(true)
            .default_sort(SortMode::MtimeDesc)
            .build()
            .unwrap();

        assert!(config.show_hidden);
        assert_eq!(config.default_sort, SortMode::MtimeDesc);
        assert_eq!(config.leader_key, ',');
    }

    #[test]
    fn test_builder_rejects_alphanumeric_leader() {
        assert!(UserConfig::builder().leader_key('a').build().is_err());
    }

    #[test]
    fn test_handler_list_form_defaults_to_external() {
        let config = UserConfig::from_toml_str(
            r#"
            [handlers]
            csv_viewer = [["vixl"]]
            editor = ["vim"]
            "#,
        );
        let csv = config.handler("csv_viewer").unwrap();
        assert_eq!(csv.commands, vec![vec!["vixl".to_string()]]);
        assert!(!csv.is_internal);

        let editor = config.handler("editor").unwrap();
        assert_eq!(editor.commands, vec![vec!["vim".to_string()]]);
    }

    #[test]
    fn test_handler_table_form_respects_is_internal() {
        let config = UserConfig::from_toml_str(
            r#"
            [handlers.csv_viewer]
            commands = [["vixl", "--mode", "grid"]]
            is_internal = true
            "#,
        );
        let spec = config.handler("csv_viewer").unwrap();
        assert_eq!(spec.commands, vec![vec!["vixl", "--mode", "grid"]]);
        assert!(spec.is_internal);
    }

    #[test]
    fn test_handler_string_command_is_split() {
        let config = UserConfig::from_toml_str(
            r#"
            [handlers]
            editor = "nvim -R '{file}'"
            "#,
        );
        assert_eq!(
            config.handler("editor").unwrap().commands,
            vec![vec!["nvim", "-R", "{file}"]]
        );
    }

    #[test]
    fn test_invalid_toml_falls_back_to_defaults() {
        let config = UserConfig::from_toml_str("show_hidden = [");
        assert!(!config.show_hidden);
        assert_eq!(config.warnings.len(), 1);
    }

    #[test]
    fn test_unknown_sort_produces_warning() {
        let config = UserConfig::from_toml_str(r#"default_sort = "size""#);
        assert_eq!(config.default_sort, SortMode::Alpha);
        assert!(config.warnings[0].contains("default_sort"));
    }

    #[test]
    fn test_split_command_line() {
        assert_eq!(split_command_line("a  b"), vec!["a", "b"]);
        assert_eq!(split_command_line(r#"echo "hello world" ''"#), vec!["echo", "hello world", ""]);
        assert!(split_command_line("   ").is_empty());
    }
}
