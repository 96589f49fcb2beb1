//! Terminal user interface for burrow.
//!
//! This crate provides the interactive file browser: the tree view model,
//! the modal input state machine and a ratatui renderer.
//!
//! # Overview
//!
//! - **Navigator** - Flattens the current directory and its inline
//!   expansions into a display list, with filtering, sorting, history and
//!   bookmarks
//! - **App** - Vim-style modal input: operator-pending `yy`/`dd`, leader
//!   sequences, visual ranges, marks, filter and command entry
//! - **Openers** - Handler-driven file opening and terminal launching
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use burrow_core::UserConfig;
//! use burrow_tui::TuiConfig;
//!
//! # fn main() -> burrow_tui::AppResult<()> {
//! let config = TuiConfig::new(".", Arc::new(UserConfig::load()));
//! if let Some(paths) = burrow_tui::run(config)? {
//!     println!("{paths:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Keyboard Navigation
//!
//! - `j`/`k` - Move down/up
//! - `h`/`l` - Parent directory / enter or open
//! - `m`, `v` - Mark, visual range
//! - `yy`/`dd`/`p` - Yank, cut, paste
//! - `,` - Leader sequences (`,nf` new file, `,xr` toggle expansion, ...)
//! - `:` - Command line (`:!cmd` runs a shell command)
//! - `?` - Help
//! - `q` - Quit

pub mod app;
mod event;
pub mod navigator;
pub mod opener;
mod theme;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

pub use app::render::{RenderContext, Renderer, TerminalRenderer};
pub use app::state::{PickerKind, PickerOptions};
pub use app::{App, AppResult, Collaborators, TuiConfig};
pub use navigator::Navigator;
pub use opener::{FileOpener, HandlerOpener, LaunchError, OpenOutcome, SystemTerminal, TerminalLauncher};
pub use theme::Theme;

/// Run the TUI until the user quits.
///
/// Returns the picked paths when running as a picker and a pick was made.
pub fn run(config: TuiConfig) -> AppResult<Option<Vec<PathBuf>>> {
    // Shell commands run as tokio tasks
    let rt = tokio::runtime::Runtime::new()?;

    let app = {
        let _guard = rt.enter();
        App::new(config)?
    };

    let mut renderer = TerminalRenderer::new(ratatui::init());
    let result = rt.block_on(app.run(&mut renderer));
    ratatui::restore();

    // Shutdown runtime immediately to cancel background tasks
    rt.shutdown_timeout(Duration::from_millis(100));

    result
}
