//! Modal dialog widgets.

use std::path::Path;

use burrow_core::Entry;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::app::input::InputState;
use crate::theme::Theme;

use super::{centered_popup, pretty_path, truncate_left};

/// Confirmation dialog for deletion.
pub struct DeleteConfirmModal<'a> {
    theme: &'a Theme,
    targets: &'a [Entry],
    home: &'a Path,
}

impl<'a> DeleteConfirmModal<'a> {
    pub fn new(theme: &'a Theme, targets: &'a [Entry], home: &'a Path) -> Self {
        Self {
            theme,
            targets,
            home,
        }
    }
}

impl Widget for DeleteConfirmModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup_area = centered_popup(area, 60, self.targets.len() as u16 + 7);
        Clear.render(popup_area, buf);

        let block = Block::default()
            .title(" Confirm Deletion ")
            .title_style(
                Style::default()
                    .fg(self.theme.error)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.error));

        let inner = block.inner(popup_area);
        block.render(popup_area, buf);

        let heading = match self.targets {
            [single] => format!("Permanently delete {}?", single.name),
            targets => format!("Permanently delete {} items?", targets.len()),
        };
        let mut lines = vec![
            Line::styled(
                heading,
                Style::default()
                    .fg(self.theme.warning)
                    .add_modifier(Modifier::BOLD),
            ),
            Line::raw(""),
        ];

        let max_items = (inner.height as usize).saturating_sub(4);
        let max_path_len = (inner.width as usize).saturating_sub(4);
        for entry in self.targets.iter().take(max_items) {
            let shown = truncate_left(&pretty_path(&entry.path, self.home), max_path_len);
            let style = if entry.is_dir {
                self.theme.directory
            } else {
                self.theme.file
            };
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(shown, style),
            ]));
        }
        if self.targets.len() > max_items {
            lines.push(Line::styled(
                format!("  ... and {} more", self.targets.len() - max_items),
                Style::default().fg(self.theme.muted),
            ));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled(" y ", self.theme.help_key),
            Span::raw("Confirm  "),
            Span::styled(" n/Esc ", self.theme.help_key),
            Span::raw("Cancel"),
        ]));

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Single-line name prompt (create, rename).
pub struct PromptModal<'a> {
    theme: &'a Theme,
    input: &'a InputState,
    title: &'a str,
}

impl<'a> PromptModal<'a> {
    pub fn new(theme: &'a Theme, input: &'a InputState, title: &'a str) -> Self {
        Self {
            theme,
            input,
            title,
        }
    }
}

impl Widget for PromptModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = if self.input.error().is_some() { 6 } else { 5 };
        let popup_area = centered_popup(area, 50, height);
        Clear.render(popup_area, buf);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(self.theme.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border);

        let inner = block.inner(popup_area);
        block.render(popup_area, buf);

        let buffer = self.input.buffer();
        let cursor = self.input.cursor();
        let max_visible = (inner.width as usize).saturating_sub(3).max(1);
        let start = cursor.saturating_sub(max_visible - 1);

        let before: String = buffer.chars().skip(start).take(cursor - start).collect();
        let at: String = buffer.chars().nth(cursor).map_or(" ".into(), String::from);
        let after: String = buffer
            .chars()
            .skip(cursor + 1)
            .take(max_visible.saturating_sub(cursor - start + 1))
            .collect();

        let mut lines = vec![
            Line::from(vec![
                Span::raw(" "),
                Span::styled(before, self.theme.command_input),
                Span::styled(at, self.theme.command_cursor),
                Span::styled(after, self.theme.command_input),
            ]),
            Line::raw(""),
        ];
        if let Some(error) = self.input.error() {
            lines.push(Line::styled(
                format!(" {error}"),
                Style::default().fg(self.theme.error),
            ));
        }
        lines.push(Line::from(vec![
            Span::styled(" Enter ", self.theme.help_key),
            Span::styled("Confirm  ", self.theme.help_desc),
            Span::styled(" Esc ", self.theme.help_key),
            Span::styled("Cancel", self.theme.help_desc),
        ]));

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Popup showing a shell command's header and streamed output.
pub struct JobOutputModal<'a> {
    theme: &'a Theme,
    header: &'a str,
    lines: &'a [String],
    scroll: usize,
    running: bool,
}

impl<'a> JobOutputModal<'a> {
    pub fn new(
        theme: &'a Theme,
        header: &'a str,
        lines: &'a [String],
        scroll: usize,
        running: bool,
    ) -> Self {
        Self {
            theme,
            header,
            lines,
            scroll,
            running,
        }
    }
}

impl Widget for JobOutputModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width.saturating_sub(8).max(20);
        let height = area.height.saturating_sub(4).max(6);
        let popup_area = centered_popup(area, width, height);
        Clear.render(popup_area, buf);

        let border = if self.running {
            self.theme.border
        } else {
            Style::default().fg(self.theme.info)
        };
        let block = Block::default()
            .title(format!(" {} ", self.header))
            .title_style(self.theme.title)
            .title_bottom(Line::from(" j/k scroll  PgUp/PgDn page  Esc/q close ").right_aligned())
            .borders(Borders::ALL)
            .border_style(border);

        let inner = block.inner(popup_area);
        block.render(popup_area, buf);

        if self.lines.is_empty() {
            let note = if self.running { "(waiting for output)" } else { "(no output)" };
            Paragraph::new(Line::styled(note, Style::default().fg(self.theme.muted)))
                .render(inner, buf);
            return;
        }

        let max_scroll = self.lines.len().saturating_sub(inner.height as usize);
        let start = self.scroll.min(max_scroll);
        let lines: Vec<Line> = self
            .lines
            .iter()
            .skip(start)
            .take(inner.height as usize)
            .map(|line| Line::raw(line.as_str()))
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Bottom-line input for `:` commands and `/` filters.
pub struct CommandLine<'a> {
    theme: &'a Theme,
    prompt: &'a str,
    input: &'a str,
    placeholder: &'a str,
}

impl<'a> CommandLine<'a> {
    pub fn new(theme: &'a Theme, prompt: &'a str, input: &'a str) -> Self {
        Self {
            theme,
            prompt,
            input,
            placeholder: "",
        }
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl Widget for CommandLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let mut spans = vec![Span::styled(self.prompt, self.theme.command_prompt)];
        if self.input.is_empty() {
            spans.push(Span::styled(" ", self.theme.command_cursor));
            spans.push(Span::styled(
                self.placeholder,
                Style::default().fg(self.theme.muted),
            ));
        } else {
            let max = (area.width as usize).saturating_sub(self.prompt.len() + 1);
            spans.push(Span::styled(
                truncate_left(self.input, max),
                self.theme.command_input,
            ));
            spans.push(Span::styled(" ", self.theme.command_cursor));
        }

        Paragraph::new(Line::from(spans))
            .style(self.theme.footer)
            .render(area, buf);
    }
}
