//! Opening files and terminals with configured external programs.

use std::ffi::OsStr;
use std::fmt::Debug;
use std::path::Path;
use std::process::{Command, Stdio};

use burrow_core::{handler_names, split_command_line, HandlerSpec, UserConfig};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Placeholder replaced by the file path in handler templates.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Placeholder replaced by the command to run in terminal templates.
pub const CMD_PLACEHOLDER: &str = "{cmd}";

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff", "svg", "ico", "heic", "avif",
];

/// Terminals tried, in order, when neither the config nor `$TERMINAL` names one.
const FALLBACK_TERMINALS: &[&str] = &[
    "alacritty",
    "foot",
    "kitty",
    "wezterm",
    "gnome-terminal",
    "xterm",
];

/// Errors raised while launching external programs.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("No handler configured for {0}")]
    NoHandler(String),
    #[error("No terminal found")]
    NoTerminal,
    #[error("Empty command")]
    EmptyCommand,
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// How a file was (or should be) opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A program was started in its own process group.
    Detached(String),
    /// Run this command with the terminal UI suspended.
    Foreground(Vec<String>),
    /// Run this command inside a new terminal window.
    InTerminal(Vec<String>),
    /// Handed to the desktop's default opener.
    System,
}

/// Chooses and starts a program for a file.
pub trait FileOpener: Debug + Send {
    /// Decide how to open `path`. Detached launches happen here; foreground
    /// and terminal commands are returned for the caller to run.
    fn open(&self, path: &Path, config: &UserConfig) -> Result<OpenOutcome, LaunchError>;

    /// Start `argv` in `cwd` without waiting for it.
    fn spawn_detached(&self, argv: &[String], cwd: &Path) -> Result<(), LaunchError>;
}

/// Starts a terminal emulator.
pub trait TerminalLauncher: Debug + Send {
    /// Open a terminal in `cwd`, optionally running `command`. Returns the
    /// terminal program name.
    fn launch(
        &self,
        cwd: &Path,
        command: Option<&[String]>,
        config: &UserConfig,
    ) -> Result<String, LaunchError>;
}

/// Handler name for a file, chosen by extension.
pub fn handler_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("csv" | "parquet") => handler_names::CSV_VIEWER,
        Some("pdf") => handler_names::PDF_VIEWER,
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => handler_names::IMAGE_VIEWER,
        _ => handler_names::EDITOR,
    }
}

/// Substitute `{file}` in a template, appending the path when absent.
pub fn expand_template(template: &[String], file: &Path) -> Vec<String> {
    let file = file.to_string_lossy();
    let mut argv: Vec<String> = template
        .iter()
        .map(|token| token.replace(FILE_PLACEHOLDER, &file))
        .collect();
    if !template.iter().any(|token| token.contains(FILE_PLACEHOLDER)) {
        argv.push(file.into_owned());
    }
    argv
}

fn on_path(program: &str) -> bool {
    which::which(program).is_ok()
}

/// First template of `spec` whose program is installed, expanded for `file`.
fn first_available(spec: &HandlerSpec, file: &Path) -> Option<Vec<String>> {
    spec.commands
        .iter()
        .filter(|template| template.first().is_some_and(|program| on_path(program)))
        .map(|template| expand_template(template, file))
        .next()
}

/// Start `argv` in its own process group with stdio detached.
pub fn spawn_detached(argv: &[String], cwd: &Path) -> Result<(), LaunchError> {
    let (program, args) = argv.split_first().ok_or(LaunchError::EmptyCommand)?;
    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
        program: program.clone(),
        source,
    })?;
    info!(program, pid = child.id(), cwd = %cwd.display(), "Launched detached program");

    // Reap the child so it does not linger as a zombie.
    std::thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(())
}

/// Editor from the environment: `$VISUAL`, then `$EDITOR`, then `vi`.
fn environment_editor() -> Vec<String> {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|value| split_command_line(&value))
        .find(|argv| !argv.is_empty())
        .unwrap_or_else(|| vec!["vi".to_string()])
}

/// [`FileOpener`] driven by the configured handler table.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlerOpener;

impl FileOpener for HandlerOpener {
    fn open(&self, path: &Path, config: &UserConfig) -> Result<OpenOutcome, LaunchError> {
        let name = handler_for(path);
        let spec = config.handler(name);
        debug!(path = %path.display(), handler = name, configured = spec.is_some(), "Opening file");

        if let Some(argv) = spec.and_then(|spec| first_available(spec, path)) {
            let internal = spec.is_some_and(|spec| spec.is_internal);
            return match name {
                _ if internal => Ok(OpenOutcome::Foreground(argv)),
                handler_names::EDITOR => Ok(OpenOutcome::Foreground(argv)),
                handler_names::CSV_VIEWER => Ok(OpenOutcome::InTerminal(argv)),
                _ => {
                    let cwd = path.parent().unwrap_or(Path::new("/"));
                    self.spawn_detached(&argv, cwd)?;
                    Ok(OpenOutcome::Detached(argv[0].clone()))
                }
            };
        }

        if name == handler_names::EDITOR {
            let mut argv = environment_editor();
            argv.push(path.to_string_lossy().into_owned());
            return Ok(OpenOutcome::Foreground(argv));
        }

        match open::that_detached(path) {
            Ok(()) => Ok(OpenOutcome::System),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "System opener failed");
                Err(LaunchError::NoHandler(name.to_string()))
            }
        }
    }

    fn spawn_detached(&self, argv: &[String], cwd: &Path) -> Result<(), LaunchError> {
        spawn_detached(argv, cwd)
    }
}

/// Build the argv for a terminal template.
///
/// A `{cmd}` token is replaced by the command's tokens; without one the
/// command is passed after `-e`.
pub fn terminal_argv(template: &[String], command: Option<&[String]>) -> Vec<String> {
    let has_placeholder = template.iter().any(|t| t == CMD_PLACEHOLDER);
    let mut argv = Vec::with_capacity(template.len() + command.map_or(0, |c| c.len() + 1));
    for token in template {
        if token == CMD_PLACEHOLDER {
            argv.extend(command.into_iter().flatten().cloned());
        } else {
            argv.push(token.clone());
        }
    }
    if let Some(command) = command.filter(|_| !has_placeholder) {
        argv.push("-e".to_string());
        argv.extend(command.iter().cloned());
    }
    argv
}

/// Terminal templates in preference order.
fn terminal_candidates(config: &UserConfig) -> Vec<Vec<String>> {
    let configured = config
        .handler(handler_names::TERMINAL)
        .map(|spec| spec.commands.clone())
        .unwrap_or_default();
    let from_env = std::env::var("TERMINAL")
        .ok()
        .map(|value| split_command_line(&value))
        .filter(|argv| !argv.is_empty());
    let fallbacks = FALLBACK_TERMINALS.iter().map(|t| vec![t.to_string()]);

    configured
        .into_iter()
        .chain(from_env)
        .chain(fallbacks)
        .collect()
}

/// [`TerminalLauncher`] that searches `PATH` for a terminal emulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTerminal;

impl TerminalLauncher for SystemTerminal {
    fn launch(
        &self,
        cwd: &Path,
        command: Option<&[String]>,
        config: &UserConfig,
    ) -> Result<String, LaunchError> {
        let template = terminal_candidates(config)
            .into_iter()
            .find(|t| t.first().is_some_and(|program| on_path(program)))
            .ok_or(LaunchError::NoTerminal)?;
        let argv = terminal_argv(&template, command);
        spawn_detached(&argv, cwd)?;
        Ok(template[0].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_handler_selection_by_extension() {
        assert_eq!(handler_for(Path::new("a.CSV")), handler_names::CSV_VIEWER);
        assert_eq!(handler_for(Path::new("a.parquet")), handler_names::CSV_VIEWER);
        assert_eq!(handler_for(Path::new("doc.pdf")), handler_names::PDF_VIEWER);
        assert_eq!(handler_for(Path::new("pic.jpeg")), handler_names::IMAGE_VIEWER);
        assert_eq!(handler_for(Path::new("main.rs")), handler_names::EDITOR);
        assert_eq!(handler_for(Path::new("Makefile")), handler_names::EDITOR);
    }

    #[test]
    fn test_expand_template() {
        let file = PathBuf::from("/tmp/x.pdf");
        assert_eq!(
            expand_template(&strings(&["zathura", "--fork", "{file}"]), &file),
            strings(&["zathura", "--fork", "/tmp/x.pdf"])
        );
        assert_eq!(
            expand_template(&strings(&["feh"]), &file),
            strings(&["feh", "/tmp/x.pdf"])
        );
        assert_eq!(
            expand_template(&strings(&["sh", "-c", "less {file}"]), &file),
            strings(&["sh", "-c", "less /tmp/x.pdf"])
        );
    }

    #[test]
    fn test_terminal_argv() {
        let cmd = strings(&["htop"]);
        assert_eq!(terminal_argv(&strings(&["foot"]), None), strings(&["foot"]));
        assert_eq!(
            terminal_argv(&strings(&["xterm"]), Some(&cmd)),
            strings(&["xterm", "-e", "htop"])
        );
        assert_eq!(
            terminal_argv(&strings(&["kitty", "{cmd}"]), Some(&cmd)),
            strings(&["kitty", "htop"])
        );
        assert_eq!(
            terminal_argv(&strings(&["kitty", "{cmd}"]), None),
            strings(&["kitty"])
        );
    }

    #[test]
    fn test_configured_editor_runs_in_foreground() {
        let mut config = UserConfig::default();
        config.handlers.insert(
            handler_names::EDITOR.into(),
            HandlerSpec {
                commands: vec![strings(&["definitely-not-installed-xyz"]), strings(&["sh", "{file}"])],
                is_internal: false,
            },
        );

        let outcome = HandlerOpener.open(Path::new("/tmp/notes.txt"), &config).unwrap();
        assert_eq!(
            outcome,
            OpenOutcome::Foreground(strings(&["sh", "/tmp/notes.txt"]))
        );
    }

    #[test]
    fn test_csv_viewer_runs_in_terminal_unless_internal() {
        let mut config = UserConfig::default();
        config.handlers.insert(
            handler_names::CSV_VIEWER.into(),
            HandlerSpec {
                commands: vec![strings(&["sh"])],
                is_internal: false,
            },
        );
        let path = Path::new("/tmp/data.csv");
        assert_eq!(
            HandlerOpener.open(path, &config).unwrap(),
            OpenOutcome::InTerminal(strings(&["sh", "/tmp/data.csv"]))
        );

        if let Some(spec) = config.handlers.get_mut(handler_names::CSV_VIEWER) {
            spec.is_internal = true;
        }
        assert_eq!(
            HandlerOpener.open(path, &config).unwrap(),
            OpenOutcome::Foreground(strings(&["sh", "/tmp/data.csv"]))
        );
    }

    #[test]
    fn test_spawn_detached_rejects_empty_command() {
        assert!(matches!(
            spawn_detached(&[], Path::new("/")),
            Err(LaunchError::EmptyCommand)
        ));
    }
}
