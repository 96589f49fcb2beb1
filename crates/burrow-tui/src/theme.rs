//! Color theme for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Earth-toned palette the default theme draws from.
mod palette {
    use ratatui::style::Color;

    pub const SOIL: Color = Color::Rgb(28, 25, 23);
    pub const BARK: Color = Color::Rgb(41, 37, 36);
    pub const CLAY: Color = Color::Rgb(68, 64, 60);
    pub const PEBBLE: Color = Color::Rgb(87, 83, 78);
    pub const ASH: Color = Color::Rgb(120, 113, 108);
    pub const SAND: Color = Color::Rgb(168, 162, 158);
    pub const BONE: Color = Color::Rgb(231, 229, 228);
    pub const CHALK: Color = Color::Rgb(250, 250, 249);

    pub const MOSS: Color = Color::Rgb(132, 204, 22);
    pub const RIVER: Color = Color::Rgb(56, 189, 248);
    pub const DUSK: Color = Color::Rgb(59, 7, 100);
    pub const HONEY: Color = Color::Rgb(251, 191, 36);
    pub const EMBER: Color = Color::Rgb(248, 113, 113);
    pub const RUST: Color = Color::Rgb(153, 27, 27);
}

/// Styles used by every widget.
#[derive(Debug, Clone)]
pub struct Theme {
    pub foreground: Color,
    pub muted: Color,

    // Rows
    pub selected: Style,
    pub visual: Style,
    pub marked: Style,
    pub directory: Style,
    pub file: Style,
    pub hidden: Style,
    pub tree_lines: Style,

    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Chrome
    pub border: Style,
    pub title: Style,
    pub header: Style,
    pub footer: Style,
    /// Status bar while flashing an error.
    pub flash: Style,
    pub help_key: Style,
    pub help_desc: Style,

    // Input line
    pub command_prompt: Style,
    pub command_input: Style,
    pub command_cursor: Style,
}

impl Theme {
    pub fn earth() -> Self {
        use palette::*;

        let bold = Modifier::BOLD;
        Self {
            foreground: BONE,
            muted: ASH,

            selected: Style::new().bg(CLAY).fg(CHALK).add_modifier(bold),
            visual: Style::new().bg(DUSK).fg(CHALK),
            marked: Style::new().fg(HONEY).add_modifier(bold),
            directory: Style::new().fg(RIVER).add_modifier(bold),
            file: Style::new().fg(BONE),
            hidden: Style::new().fg(ASH),
            tree_lines: Style::new().fg(PEBBLE),

            warning: HONEY,
            error: EMBER,
            info: MOSS,

            border: Style::new().fg(PEBBLE),
            title: Style::new().fg(MOSS).add_modifier(bold),
            header: Style::new().bg(BARK).fg(BONE),
            footer: Style::new().bg(SOIL).fg(SAND),
            flash: Style::new().bg(RUST).fg(CHALK).add_modifier(bold),
            help_key: Style::new().fg(RIVER).add_modifier(bold),
            help_desc: Style::new().fg(SAND),

            command_prompt: Style::new().fg(MOSS).add_modifier(bold),
            command_input: Style::new().fg(CHALK),
            command_cursor: Style::new().add_modifier(Modifier::REVERSED),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::earth()
    }
}
