//! Application rendering.

use std::collections::BTreeSet;
use std::path::PathBuf;

use burrow_core::Entry;
use burrow_ops::{BatchKind, ExecutionJob};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, StatefulWidget, Widget};
use ratatui::DefaultTerminal;

use crate::navigator::Navigator;
use crate::theme::Theme;
use crate::ui::modals::{CommandLine, DeleteConfirmModal, JobOutputModal, PromptModal};
use crate::ui::{pretty_path, AppLayout, HelpOverlay, TreeState, TreeView};

use super::state::{Mode, Pending, PickerOptions};
use super::AppResult;

/// Draws frames and gives up the terminal while a foreground program runs.
pub trait Renderer {
    fn draw(&mut self, ctx: &RenderContext<'_>) -> AppResult<()>;

    /// Release the terminal so another program can use it.
    fn suspend(&mut self);

    /// Take the terminal back after [`Renderer::suspend`].
    fn resume(&mut self) -> AppResult<()>;
}

/// Read-only view of the state needed to draw one frame.
pub struct RenderContext<'a> {
    pub navigator: &'a Navigator,
    pub entries: &'a [Entry],
    pub selected: usize,
    pub marks: &'a BTreeSet<PathBuf>,
    pub mode: &'a Mode,
    pub leader_key: char,
    pub status: &'a str,
    pub flash: bool,
    pub clipboard: Option<(BatchKind, usize)>,
    pub job: Option<&'a ExecutionJob>,
    pub picker: Option<&'a PickerOptions>,
}

impl RenderContext<'_> {
    fn visual_bounds(&self) -> Option<(usize, usize)> {
        self.mode
            .normal()
            .and_then(|normal| normal.visual)
            .map(|range| range.bounds())
    }
}

/// [`Renderer`] drawing to the real terminal with ratatui.
pub struct TerminalRenderer {
    terminal: Option<DefaultTerminal>,
    theme: Theme,
    tree_state: TreeState,
}

impl TerminalRenderer {
    pub fn new(terminal: DefaultTerminal) -> Self {
        Self {
            terminal: Some(terminal),
            theme: Theme::default(),
            tree_state: TreeState::default(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

impl Renderer for TerminalRenderer {
    fn draw(&mut self, ctx: &RenderContext<'_>) -> AppResult<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            return Ok(());
        };
        let theme = &self.theme;
        let tree_state = &mut self.tree_state;
        terminal.draw(|frame| {
            let area = frame.area();
            render_app(ctx, theme, tree_state, area, frame.buffer_mut());
        })?;
        Ok(())
    }

    fn suspend(&mut self) {
        if self.terminal.take().is_some() {
            ratatui::restore();
        }
    }

    fn resume(&mut self) -> AppResult<()> {
        if self.terminal.is_none() {
            let mut terminal = ratatui::init();
            terminal.clear()?;
            self.terminal = Some(terminal);
        }
        Ok(())
    }
}

/// Main render function for the application.
pub fn render_app(
    ctx: &RenderContext,
    theme: &Theme,
    tree_state: &mut TreeState,
    area: Rect,
    buf: &mut Buffer,
) {
    buf.set_style(area, Style::default().fg(theme.foreground));
    let layout = AppLayout::new(area);

    render_header(ctx, theme, layout.header, buf);

    let empty_message = if ctx.navigator.filter().is_some() {
        "No entries match the filter"
    } else {
        "(empty)"
    };
    let navigator = ctx.navigator;
    TreeView::new(
        ctx.entries,
        ctx.selected,
        ctx.marks,
        |path| navigator.is_expanded(path),
        theme,
    )
    .visual(ctx.visual_bounds())
    .empty_message(empty_message)
    .render(layout.main, buf, tree_state);

    render_footer(ctx, theme, layout.footer, buf);

    // Overlays
    match ctx.mode {
        Mode::Normal(_) => {}
        Mode::Filter { buffer } => {
            let pattern = buffer.strip_prefix('/').unwrap_or(buffer);
            CommandLine::new(theme, "/", pattern)
                .placeholder("glob or prefix")
                .render(layout.footer, buf);
        }
        Mode::Command(input) => {
            CommandLine::new(theme, ":", input.buffer())
                .placeholder("!cmd runs a shell command")
                .render(layout.footer, buf);
        }
        Mode::Prompt(prompt) => {
            PromptModal::new(theme, &prompt.input, prompt.kind.title()).render(area, buf);
        }
        Mode::Confirm(confirm) => {
            DeleteConfirmModal::new(theme, &confirm.targets, ctx.navigator.home())
                .render(area, buf);
        }
        Mode::Help { scroll } => {
            HelpOverlay::new(theme, ctx.leader_key, *scroll).render(area, buf);
        }
        Mode::JobOutput { scroll } => {
            if let Some(job) = ctx.job {
                let header = job.header();
                JobOutputModal::new(theme, &header, job.lines(), *scroll, job.is_running())
                    .render(area, buf);
            }
        }
    }
}

fn render_header(ctx: &RenderContext, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let navigator = ctx.navigator;
    let current = navigator.current_dir();

    let mut spans = vec![
        Span::styled(" burrow ", theme.title),
        Span::styled(
            format!(" {} ", pretty_path(current, navigator.home())),
            theme.header,
        ),
    ];
    if let Some(filter) = navigator.filter() {
        spans.push(Span::styled(
            format!(" /{filter} "),
            Style::default().fg(theme.warning),
        ));
    }
    spans.push(Span::styled(
        format!(" sort:{} ", navigator.sort_for(current).short_label()),
        Style::default().fg(theme.muted),
    ));
    if navigator.show_hidden() {
        spans.push(Span::styled(" .* ", Style::default().fg(theme.muted)));
    }
    if let Some(picker) = ctx.picker {
        let mut label = format!(" pick:{}", picker.kind);
        if !picker.extensions.is_empty() {
            label.push_str(&format!(" [{}]", picker.extensions.join(",")));
        }
        if picker.multi {
            label.push_str(" multi");
        }
        label.push(' ');
        spans.push(Span::styled(label, Style::default().fg(theme.info)));
    }

    Paragraph::new(Line::from(spans))
        .style(theme.header)
        .render(area, buf);
}

fn render_footer(ctx: &RenderContext, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let [left, right] =
        Layout::horizontal([Constraint::Min(10), Constraint::Length(32)]).areas(area);

    let mut spans = vec![Span::styled(
        format!(" {} ", ctx.mode.label()),
        theme.help_key.add_modifier(Modifier::REVERSED),
    )];
    if let Some(normal) = ctx.mode.normal() {
        match &normal.pending {
            Pending::Leader { buffer, .. } => spans.push(Span::styled(
                format!(" {}{buffer} ", ctx.leader_key),
                theme.help_key,
            )),
            Pending::Operator { kind, .. } => spans.push(Span::styled(
                format!(" {kind:?}… "),
                theme.help_key,
            )),
            Pending::None => {}
        }
    }
    let status_style = if ctx.flash { theme.flash } else { theme.footer };
    spans.push(Span::styled(format!(" {} ", ctx.status), status_style));
    Paragraph::new(Line::from(spans))
        .style(theme.footer)
        .render(left, buf);

    let mut counters = Vec::new();
    if !ctx.marks.is_empty() {
        counters.push(format!("{} marked", ctx.marks.len()));
    }
    if let Some((kind, count)) = ctx.clipboard {
        counters.push(format!("{kind}: {count}"));
    }
    if let Some(job) = ctx.job.filter(|job| job.is_running()) {
        counters.push(format!("! {}", job.label()));
    }
    let position = if ctx.entries.is_empty() {
        "0/0".to_string()
    } else {
        format!("{}/{}", ctx.selected + 1, ctx.entries.len())
    };
    counters.push(position);

    Paragraph::new(Line::raw(format!("{} ", counters.join("  "))).right_aligned())
        .style(theme.footer)
        .render(right, buf);
}
