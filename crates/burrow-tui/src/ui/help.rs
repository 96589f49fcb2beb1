//! Key binding reference popup.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::event::{get_help_sections, help_line_count, HelpSection};
use crate::theme::Theme;

use super::centered_popup;

/// Scrollable list of bindings with `<l>` replaced by the leader key.
pub struct HelpOverlay<'a> {
    theme: &'a Theme,
    leader_key: char,
    scroll: usize,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a Theme, leader_key: char, scroll: usize) -> Self {
        Self {
            theme,
            leader_key,
            scroll,
        }
    }

    fn lines(&self, sections: &[HelpSection]) -> Vec<Line<'static>> {
        let leader = self.leader_key.to_string();
        let keys_width = sections
            .iter()
            .flat_map(|s| &s.bindings)
            .map(|b| b.keys.replace("<l>", &leader).chars().count())
            .max()
            .unwrap_or(0);
        let heading = Style::new()
            .fg(self.theme.info)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

        let mut lines = Vec::with_capacity(help_line_count());
        for section in sections {
            lines.push(Line::styled(section.title, heading));
            lines.extend(section.bindings.iter().map(|binding| {
                let keys = binding.keys.replace("<l>", &leader);
                Line::from(vec![
                    Span::styled(format!("  {keys:<keys_width$}"), self.theme.help_key),
                    Span::styled(format!("  {}", binding.description), self.theme.help_desc),
                ])
            }));
            lines.push(Line::default());
        }
        lines
    }
}

impl Widget for HelpOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = centered_popup(area, 60, 30);
        Clear.render(popup, buf);

        let total = help_line_count();
        let visible = popup.height.saturating_sub(2) as usize;
        let scroll = self.scroll.min(total.saturating_sub(visible));

        let block = Block::default()
            .title(format!(" Keys (leader '{}') ", self.leader_key))
            .title_bottom(format!(" {}/{} ", (scroll + visible).min(total), total))
            .title_style(self.theme.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border);
        let inner = block.inner(popup);
        block.render(popup, buf);

        Paragraph::new(self.lines(&get_help_sections()))
            .scroll((scroll as u16, 0))
            .render(inner, buf);
    }
}
