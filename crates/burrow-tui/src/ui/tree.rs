//! Tree view widget for the flattened display list.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use burrow_core::Entry;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, StatefulWidget, Widget};

use crate::theme::Theme;

/// Scroll position of the tree view, kept between frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeState {
    pub offset: usize,
}

impl TreeState {
    /// Adjust the offset so that `selected` is inside a viewport of `height` rows.
    pub fn ensure_visible(&mut self, selected: usize, height: usize) {
        if height == 0 {
            return;
        }
        if selected < self.offset {
            self.offset = selected;
        } else if selected >= self.offset + height {
            self.offset = selected + 1 - height;
        }
    }
}

/// How a row is highlighted, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeRowStyle {
    Selected,
    Visual,
    Marked,
    Plain,
}

/// Tree view widget.
pub struct TreeView<'a> {
    entries: &'a [Entry],
    selected: usize,
    marks: &'a BTreeSet<PathBuf>,
    visual: Option<(usize, usize)>,
    is_expanded: Box<dyn Fn(&Path) -> bool + 'a>,
    empty_message: &'a str,
    theme: &'a Theme,
    block: Option<Block<'a>>,
}

impl<'a> TreeView<'a> {
    pub fn new<F>(
        entries: &'a [Entry],
        selected: usize,
        marks: &'a BTreeSet<PathBuf>,
        is_expanded: F,
        theme: &'a Theme,
    ) -> Self
    where
        F: Fn(&Path) -> bool + 'a,
    {
        Self {
            entries,
            selected,
            marks,
            visual: None,
            is_expanded: Box::new(is_expanded),
            empty_message: "(empty)",
            theme,
            block: None,
        }
    }

    /// Highlight the closed row interval of a visual selection.
    pub fn visual(mut self, bounds: Option<(usize, usize)>) -> Self {
        self.visual = bounds;
        self
    }

    pub fn empty_message(mut self, message: &'a str) -> Self {
        self.empty_message = message;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn row_style(&self, index: usize, entry: &Entry) -> TreeRowStyle {
        if index == self.selected {
            TreeRowStyle::Selected
        } else if self
            .visual
            .is_some_and(|(start, end)| (start..=end).contains(&index))
        {
            TreeRowStyle::Visual
        } else if self.marks.contains(&entry.path) {
            TreeRowStyle::Marked
        } else {
            TreeRowStyle::Plain
        }
    }

    fn name_style(&self, entry: &Entry) -> Style {
        if entry.is_hidden() {
            self.theme.hidden
        } else if entry.is_dir {
            self.theme.directory
        } else {
            self.theme.file
        }
    }
}

/// Box-drawing prefix for every row.
fn tree_prefixes(entries: &[Entry]) -> Vec<String> {
    // Backward pass: a row is the last sibling if no later row at the same
    // depth appears before the parent's subtree ends.
    let mut is_last = vec![false; entries.len()];
    let mut seen: Vec<bool> = Vec::new();
    for (i, entry) in entries.iter().enumerate().rev() {
        seen.resize(entry.depth + 1, false);
        is_last[i] = !seen[entry.depth];
        seen[entry.depth] = true;
    }

    let mut ancestors: Vec<bool> = Vec::new();
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            ancestors.truncate(entry.depth);
            let mut prefix = String::new();
            for &last in ancestors.iter().skip(1) {
                prefix.push_str(if last { "  " } else { "│ " });
            }
            if entry.depth > 0 {
                prefix.push_str(if is_last[i] { "└─" } else { "├─" });
            }
            ancestors.push(is_last[i]);
            prefix
        })
        .collect()
}

impl StatefulWidget for TreeView<'_> {
    type State = TreeState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner_area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner_area.height == 0 || inner_area.width == 0 {
            return;
        }

        if self.entries.is_empty() {
            let line = Line::from(Span::styled(
                format!("  {}", self.empty_message),
                Style::default().fg(self.theme.muted),
            ));
            buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
            return;
        }

        let viewport_height = inner_area.height as usize;
        state.offset = state.offset.min(self.entries.len().saturating_sub(1));
        state.ensure_visible(self.selected, viewport_height);

        let prefixes = tree_prefixes(self.entries);
        let start = state.offset;
        let end = (start + viewport_height).min(self.entries.len());

        for (row, index) in (start..end).enumerate() {
            let entry = &self.entries[index];
            let y = inner_area.y + row as u16;
            let is_marked = self.marks.contains(&entry.path);

            let (mark, mark_style) = if is_marked {
                ("● ", self.theme.marked)
            } else {
                ("  ", Style::default())
            };
            let expand_indicator = match entry.is_dir {
                true if (self.is_expanded)(&entry.path) => "▼ ",
                true => "▶ ",
                false => "  ",
            };

            let mut name_style = self.name_style(entry);
            if is_marked {
                name_style = name_style.add_modifier(Modifier::BOLD);
            }
            let name = if entry.is_dir {
                format!("{}/", entry.name)
            } else {
                entry.name.clone()
            };

            let line = Line::from(vec![
                Span::styled(prefixes[index].as_str(), self.theme.tree_lines),
                Span::styled(mark, mark_style),
                Span::styled(expand_indicator, Style::default().fg(self.theme.muted)),
                Span::styled(name, name_style),
            ]);

            let line = match self.row_style(index, entry) {
                TreeRowStyle::Selected => line.style(self.theme.selected),
                TreeRowStyle::Visual => line.style(self.theme.visual),
                TreeRowStyle::Marked | TreeRowStyle::Plain => line,
            };

            // Fill the whole row so the highlight spans the width
            let row_area = Rect::new(inner_area.x, y, inner_area.width, 1);
            buf.set_style(row_area, line.style);
            Widget::render(line, row_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, is_dir: bool, depth: usize) -> Entry {
        Entry::new(name, is_dir, format!("/p/{name}"), depth)
    }

    #[test]
    fn test_prefixes_follow_nesting() {
        let entries = vec![
            row("src", true, 0),
            row("foo", true, 1),
            row("alpha.py", false, 2),
            row("beta.py", false, 2),
            row("bar", true, 1),
            row("README.md", false, 0),
        ];
        let prefixes = tree_prefixes(&entries);
        assert_eq!(
            prefixes,
            vec!["", "├─", "│ ├─", "│ └─", "└─", ""]
        );
    }

    #[test]
    fn test_ensure_visible_scrolls_both_ways() {
        let mut state = TreeState::default();
        state.ensure_visible(12, 5);
        assert_eq!(state.offset, 8);
        state.ensure_visible(3, 5);
        assert_eq!(state.offset, 3);
        state.ensure_visible(5, 5);
        assert_eq!(state.offset, 3);
    }

    #[test]
    fn test_selected_wins_over_visual_and_marks() {
        let theme = Theme::default();
        let entries = vec![row("a", false, 0), row("b", false, 0), row("c", false, 0)];
        let marks: BTreeSet<PathBuf> = [PathBuf::from("/p/a"), PathBuf::from("/p/c")].into();
        let view = TreeView::new(&entries, 0, &marks, |_| false, &theme).visual(Some((0, 1)));

        assert_eq!(view.row_style(0, &entries[0]), TreeRowStyle::Selected);
        assert_eq!(view.row_style(1, &entries[1]), TreeRowStyle::Visual);
        assert_eq!(view.row_style(2, &entries[2]), TreeRowStyle::Marked);
    }
}
