//! Main application state and logic.
//!
//! [`App`] is the input state machine: it owns the selection, marks, mode
//! and clipboard, asks the [`Navigator`] for the display list after every
//! key, and talks to the outside world only through the [`FileSystem`],
//! [`FileOpener`], [`TerminalLauncher`] and [`Renderer`] seams.

pub mod commands;
mod constants;
mod deletion;
pub mod input;
pub mod leader;
mod modes;
mod navigation;
mod normal;
mod operations;
pub mod render;
pub mod state;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{Duration, Instant};

use burrow_core::{Entry, UserConfig};
use burrow_ops::{ClipboardStaging, ExecutionJob, FileSystem, LocalFs};
use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::navigator::Navigator;
use crate::opener::{FileOpener, HandlerOpener, SystemTerminal, TerminalLauncher};

use self::constants::TICK_INTERVAL_MS;
use self::leader::LeaderTable;
use self::render::{RenderContext, Renderer};
use self::state::{AfterSuspend, Mode, Pending, PickerOptions, SuspendRequest};

/// Application result type.
pub type AppResult<T> = color_eyre::Result<T>;

/// Startup options for the TUI.
#[derive(Debug, Clone)]
pub struct TuiConfig {
    start_dir: PathBuf,
    user_config: Arc<UserConfig>,
    config_path: Option<PathBuf>,
    picker: Option<PickerOptions>,
    staging_root: Option<PathBuf>,
    home: Option<PathBuf>,
}

impl TuiConfig {
    pub fn new(start_dir: impl Into<PathBuf>, user_config: Arc<UserConfig>) -> Self {
        Self {
            start_dir: start_dir.into(),
            user_config,
            config_path: None,
            picker: None,
            staging_root: None,
            home: None,
        }
    }

    /// File reopened and reloaded by the edit-config command.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Run as a picker with these constraints.
    pub fn with_picker(mut self, picker: PickerOptions) -> Self {
        self.picker = Some(picker);
        self
    }

    /// Directory in which clipboard staging directories are created.
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(root.into());
        self
    }

    /// Directory used by `~` and the double-escape reset.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }
}

/// External services the state machine depends on.
#[derive(Debug)]
pub struct Collaborators {
    pub fs: Arc<dyn FileSystem>,
    pub opener: Box<dyn FileOpener>,
    pub terminal: Box<dyn TerminalLauncher>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            fs: Arc::new(LocalFs),
            opener: Box::new(HandlerOpener),
            terminal: Box::new(SystemTerminal),
        }
    }
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Tree view model.
    navigator: Navigator,
    /// Staged cut/copy batch.
    clipboard: ClipboardStaging,
    /// Current configuration snapshot; replaced wholesale on reload.
    config: Arc<UserConfig>,
    config_path: Option<PathBuf>,
    /// Leader sequences, rebuilt only when the config changes.
    leader_table: LeaderTable,
    opener: Box<dyn FileOpener>,
    terminal: Box<dyn TerminalLauncher>,

    mode: Mode,
    /// Display list as of the last key.
    items: Vec<Entry>,
    selected: usize,
    marks: BTreeSet<PathBuf>,
    status: String,
    /// Highlight the status line as an error until the next key.
    flash: bool,

    /// Shell command started from `:`; dropped when its popup closes.
    job: Option<ExecutionJob>,
    /// Shell commands that exited successfully, oldest first.
    command_history: Vec<String>,

    last_escape: Option<Instant>,
    /// Keys of the Normal-mode command being typed.
    key_trail: Vec<KeyEvent>,
    /// Keys replayed by `.`.
    last_repeatable: Vec<KeyEvent>,
    /// Set by handlers of repeatable commands.
    record_repeat: bool,
    repeating: bool,

    picker: Option<PickerOptions>,
    picked: Option<Vec<PathBuf>>,

    pending_suspend: Option<SuspendRequest>,
    should_quit: bool,
}

impl App {
    /// Create an application on the local filesystem.
    pub fn new(config: TuiConfig) -> AppResult<Self> {
        Self::with_collaborators(config, Collaborators::default())
    }

    /// Create an application with explicit collaborators.
    pub fn with_collaborators(config: TuiConfig, collaborators: Collaborators) -> AppResult<Self> {
        let TuiConfig {
            start_dir,
            user_config,
            config_path,
            picker,
            staging_root,
            home,
        } = config;
        let Collaborators {
            fs,
            opener,
            terminal,
        } = collaborators;

        let home = home
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| start_dir.clone());
        let navigator = Navigator::new(
            Arc::clone(&fs),
            &start_dir,
            home,
            user_config.default_sort,
            user_config.show_hidden,
        )?;
        let clipboard = match staging_root {
            Some(root) => ClipboardStaging::with_root(Arc::clone(&fs), root),
            None => ClipboardStaging::new(Arc::clone(&fs)),
        };
        let leader_table = LeaderTable::from_config(&user_config);
        let config_path = config_path.or_else(|| user_config.source.clone());

        let status = match user_config.warnings.first() {
            Some(first) => format!("Config warning: {first}"),
            None => String::new(),
        };

        let mut app = Self {
            navigator,
            clipboard,
            config: user_config,
            config_path,
            leader_table,
            opener,
            terminal,
            mode: Mode::default(),
            items: Vec::new(),
            selected: 0,
            marks: BTreeSet::new(),
            status,
            flash: false,
            job: None,
            command_history: Vec::new(),
            last_escape: None,
            key_trail: Vec::new(),
            last_repeatable: Vec::new(),
            record_repeat: false,
            repeating: false,
            picker,
            picked: None,
            pending_suspend: None,
            should_quit: false,
        };
        app.refresh_items();

        info!(dir = %app.navigator.current_dir().display(), picker = app.picker.is_some(), "Started");
        Ok(app)
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn items(&self) -> &[Entry] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.items.get(self.selected)
    }

    pub fn marks(&self) -> &BTreeSet<PathBuf> {
        &self.marks
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_flashing(&self) -> bool {
        self.flash
    }

    pub fn clipboard(&self) -> &ClipboardStaging {
        &self.clipboard
    }

    pub fn config(&self) -> &Arc<UserConfig> {
        &self.config
    }

    pub fn leader_table(&self) -> &LeaderTable {
        &self.leader_table
    }

    pub fn job(&self) -> Option<&ExecutionJob> {
        self.job.as_ref()
    }

    pub fn command_history(&self) -> &[String] {
        &self.command_history
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Paths confirmed in picker mode.
    pub fn picked(&self) -> Option<&[PathBuf]> {
        self.picked.as_deref()
    }

    /// Handle a key pressed now.
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.handle_key_at(key, Instant::now());
    }

    /// Handle a key pressed at `now`. Timeouts are measured against `now`.
    pub fn handle_key_at(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.flash = false;
        self.expire_pending(now);
        self.dispatch_key(key, now);
        self.refresh_items();
    }

    fn dispatch_key(&mut self, key: KeyEvent, now: Instant) {
        match self.mode {
            Mode::Normal(_) => self.handle_normal_key(key, now),
            Mode::Filter { .. } => self.handle_filter_key(key),
            Mode::Command(_) => self.handle_command_key(key),
            Mode::Prompt(_) => self.handle_prompt_key(key),
            Mode::Confirm(_) => self.handle_confirm_key(key),
            Mode::Help { .. } => self.handle_help_key(key),
            Mode::JobOutput { .. } => self.handle_job_key(key),
        }
    }

    /// Periodic housekeeping: drain job output and expire pending sequences.
    /// Returns true if anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = self.expire_pending(now);
        let job_changed = self.poll_job();
        expired || job_changed
    }

    fn expire_pending(&mut self, now: Instant) -> bool {
        let Some(normal) = self.mode.normal_mut() else {
            return false;
        };
        if !normal.pending.expired(now) {
            return false;
        }
        debug!(pending = ?normal.pending, "Pending command timed out");
        normal.pending = Pending::None;
        self.key_trail.clear();
        true
    }

    /// Rebuild the display list and keep the cursor and visual range in bounds.
    fn refresh_items(&mut self) {
        self.items = self.navigator.build_display_items();
        let len = self.items.len();
        self.selected = self.selected.min(len.saturating_sub(1));
        if let Some(visual) = self.mode.normal_mut().and_then(|n| n.visual.as_mut()) {
            visual.clamp(len);
        }
    }

    /// Rebuild and put the cursor on `path` if it is listed.
    fn select_path(&mut self, path: &Path) -> bool {
        self.refresh_items();
        match self.items.iter().position(|e| e.path == path) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Show `status` highlighted as an error.
    fn set_error(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.flash = true;
    }

    /// Foreground program the run loop should start with the UI suspended.
    pub fn take_pending_suspend(&mut self) -> Option<SuspendRequest> {
        self.pending_suspend.take()
    }

    /// Called once a suspended foreground program has exited.
    pub fn finish_suspended(&mut self, after: AfterSuspend, success: bool) {
        if !success {
            self.set_error("Program exited with an error");
        }
        if after == AfterSuspend::ReloadConfig {
            self.reload_config();
        }
        self.navigator.notify_directory_changed(&[]);
        self.refresh_items();
    }

    /// Replace the configuration snapshot with a fresh read of the file.
    fn reload_config(&mut self) {
        let Some(path) = self.config_path.clone() else {
            self.set_error("No config file to reload");
            return;
        };
        let config = Arc::new(UserConfig::load_from(&path));
        self.leader_table = LeaderTable::from_config(&config);

        let mut status = format!(
            "Config reloaded from {}",
            crate::ui::pretty_path(&path, self.navigator.home())
        );
        if let Some(first) = config.warnings.first() {
            status.push_str(&format!(" (warn: {first})"));
        }
        info!(path = %path.display(), warnings = config.warnings.len(), "Config reloaded");
        self.config = config;
        self.set_status(status);
    }

    pub fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            navigator: &self.navigator,
            entries: &self.items,
            selected: self.selected,
            marks: &self.marks,
            mode: &self.mode,
            leader_key: self.config.leader_key,
            status: &self.status,
            flash: self.flash,
            clipboard: self
                .clipboard
                .kind()
                .map(|kind| (kind, self.clipboard.entry_count())),
            job: self.job.as_ref(),
            picker: self.picker.as_ref(),
        }
    }

    /// Run until quit. Returns the picked paths in picker mode.
    pub async fn run<R: Renderer>(mut self, renderer: &mut R) -> AppResult<Option<Vec<PathBuf>>> {
        let period = Duration::from_millis(TICK_INTERVAL_MS);
        let mut interval = tokio::time::interval(period);
        let mut events = EventStream::new();
        let mut needs_redraw = true;

        while !self.should_quit {
            if needs_redraw {
                renderer.draw(&self.render_context())?;
                needs_redraw = false;
            }

            tokio::select! {
                biased;

                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => {
                        self.handle_key(key);
                        needs_redraw = true;
                    }
                    Some(Ok(Event::Resize(..))) => needs_redraw = true,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },

                _ = interval.tick() => {
                    if self.tick(Instant::now()) {
                        needs_redraw = true;
                    }
                }
            }

            if let Some(request) = self.take_pending_suspend() {
                // The event stream would compete with the child for stdin
                drop(events);
                renderer.suspend();
                let success = run_foreground(&request);
                renderer.resume()?;
                events = EventStream::new();

                self.finish_suspended(request.after, success);
                needs_redraw = true;
            }
        }

        self.shutdown();
        Ok(self.picked.take())
    }

    fn shutdown(&mut self) {
        if let Some(job) = self.job.take() {
            job.cancel();
        }
        self.clipboard.cleanup();
        info!("Shut down");
    }
}

/// Run each command in turn with the terminal handed over. Returns false
/// if one failed to start or exited unsuccessfully.
fn run_foreground(request: &SuspendRequest) -> bool {
    for argv in &request.commands {
        let Some((program, args)) = argv.split_first() else {
            continue;
        };
        info!(program, cwd = %request.cwd.display(), "Running in foreground");
        match Command::new(program)
            .args(args)
            .current_dir(&request.cwd)
            .status()
        {
            Ok(status) if status.success() => {}
            Ok(status) => {
                warn!(program, ?status, "Foreground program failed");
                return false;
            }
            Err(e) => {
                warn!(program, error = %e, "Failed to start foreground program");
                return false;
            }
        }
    }
    true
}
