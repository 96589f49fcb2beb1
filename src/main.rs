//! burrow - A keyboard-driven, vim-flavoured terminal file manager.
//!
//! Usage:
//!   burrow [PATH]                    Browse PATH (default: current directory)
//!   burrow --pick files [PATH]       Pick a file and print its path
//!   burrow --pick any --multi        Pick the marked entries
//!   burrow --help                    Show help

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use burrow_core::UserConfig;
use burrow_tui::{PickerKind, PickerOptions, TuiConfig};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "BURROW_LOG";

#[derive(Parser)]
#[command(
    name = "burrow",
    version,
    about = "A keyboard-driven, vim-flavoured terminal file manager",
    long_about = "burrow browses directory trees with vim-style keys: inline \
                  expansion, marks, visual ranges, a staged clipboard and \
                  leader-key commands.\n\n\
                  With --pick it runs as a picker and prints the chosen paths."
)]
struct Cli {
    /// Directory to open (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Run as a picker restricted to files, dirs or any
    #[arg(long, value_name = "KIND")]
    pick: Option<PickerKind>,

    /// Only allow picking files with this extension (repeatable)
    #[arg(long = "ext", value_name = "EXT", requires = "pick")]
    extensions: Vec<String>,

    /// Allow picking every marked entry at once
    #[arg(long, requires = "pick")]
    multi: bool,

    /// Show dot-files on startup
    #[arg(long)]
    show_hidden: bool,

    /// Configuration file (defaults to the user config dir)
    #[arg(long, value_name = "PATH", env = "BURROW_CONFIG")]
    config: Option<PathBuf>,

    /// Write logs here instead of the state directory
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let path = cli.path.canonicalize().context("Invalid path")?;

    let config_path = cli.config.clone().or_else(UserConfig::config_path);
    let mut user_config = match &config_path {
        Some(config_path) => UserConfig::load_from(config_path),
        None => UserConfig::default(),
    };
    if cli.show_hidden {
        user_config.show_hidden = true;
    }
    for warning in &user_config.warnings {
        warn!(%warning, "Config warning");
    }

    let mut config = TuiConfig::new(&path, Arc::new(user_config));
    if let Some(config_path) = config_path {
        config = config.with_config_path(config_path);
    }
    let picking = cli.pick.is_some();
    if let Some(kind) = cli.pick {
        config = config.with_picker(PickerOptions {
            kind,
            extensions: normalize_extensions(&cli.extensions),
            multi: cli.multi,
        });
    }

    info!(path = %path.display(), picking, "Starting burrow");
    let picked = burrow_tui::run(config)?;

    match picked {
        Some(paths) => {
            for path in paths {
                println!("{}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        None if picking => Ok(ExitCode::FAILURE),
        None => Ok(ExitCode::SUCCESS),
    }
}

/// Lower-case extensions without the leading dot.
fn normalize_extensions(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Default log file: `<state or cache dir>/burrow/burrow.log`.
fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("burrow")
        .join("burrow.log")
}

/// Log to a file; the terminal belongs to the UI.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let path = log_file.map_or_else(default_log_path, Path::to_path_buf);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_picker_flags() {
        let cli = Cli::try_parse_from([
            "burrow", "--pick", "files", "--ext", ".RS", "--ext", "toml", "--multi", "/tmp",
        ])
        .unwrap();
        assert_eq!(cli.pick, Some(PickerKind::Files));
        assert!(cli.multi);
        assert_eq!(cli.path, PathBuf::from("/tmp"));
        assert_eq!(normalize_extensions(&cli.extensions), vec!["rs", "toml"]);
    }

    #[test]
    fn test_unknown_pick_kind_is_rejected() {
        assert!(Cli::try_parse_from(["burrow", "--pick", "links"]).is_err());
    }

    #[test]
    fn test_ext_requires_pick() {
        assert!(Cli::try_parse_from(["burrow", "--ext", "rs"]).is_err());
    }

    #[test]
    fn test_default_path_is_current_directory() {
        let cli = Cli::try_parse_from(["burrow"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("."));
        assert!(cli.pick.is_none());
    }
}
