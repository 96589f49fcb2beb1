//! Event handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::state::OperatorKind;

/// Key action that can be performed in Normal mode.
///
/// The leader key is configurable and checked before this mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // Navigation
    MoveUp,
    MoveDown,
    /// Jump a tenth of the list up.
    JumpUp,
    /// Jump a tenth of the list down.
    JumpDown,
    Parent,
    /// Enter the selected directory or open the selected file.
    Open,
    /// Enter: confirm a pick in picker mode, otherwise [`KeyAction::Open`].
    Confirm,
    HistoryBack,
    HistoryForward,
    BookmarkPrev,
    BookmarkNext,
    Home,

    // Selection
    ToggleMark,
    Visual,

    // Clipboard and file operations
    /// First or second half of `yy` / `dd`.
    Operator(OperatorKind),
    Paste,
    Delete,

    // Modes
    Filter,
    CommandMode,
    /// Drop the filter and every inline expansion.
    ClearFilter,
    ToggleHelp,

    // Other actions
    Terminal,
    Repeat,
    Cancel,
    Quit,

    // No action
    None,
}

impl KeyAction {
    /// Convert a key event to an action.
    pub fn from_key_event(event: KeyEvent) -> Self {
        match (event.code, event.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
            (KeyCode::Esc, _) => KeyAction::Cancel,

            // Navigation - vim style
            (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::MoveDown,
            (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::MoveUp,
            (KeyCode::Char('h'), KeyModifiers::NONE) => KeyAction::Parent,
            (KeyCode::Char('l'), KeyModifiers::NONE) => KeyAction::Open,
            (KeyCode::Char('j'), KeyModifiers::CONTROL) => KeyAction::JumpDown,
            (KeyCode::Char('k'), KeyModifiers::CONTROL) => KeyAction::JumpUp,

            // Navigation - arrow keys
            (KeyCode::Down, _) => KeyAction::MoveDown,
            (KeyCode::Up, _) => KeyAction::MoveUp,
            (KeyCode::Left, _) => KeyAction::Parent,
            (KeyCode::Right, _) => KeyAction::Open,
            (KeyCode::Enter, _) => KeyAction::Confirm,

            // History and bookmarks
            (KeyCode::Char('H'), _) => KeyAction::HistoryBack,
            (KeyCode::Char('L'), _) => KeyAction::HistoryForward,
            (KeyCode::Char('h'), KeyModifiers::CONTROL) => KeyAction::BookmarkPrev,
            (KeyCode::Char('l'), KeyModifiers::CONTROL) => KeyAction::BookmarkNext,
            // Many terminals send Backspace for Ctrl-h
            (KeyCode::Backspace, KeyModifiers::CONTROL) => KeyAction::BookmarkPrev,
            (KeyCode::Char('~'), _) => KeyAction::Home,

            // Selection
            (KeyCode::Char('m'), KeyModifiers::NONE) => KeyAction::ToggleMark,
            (KeyCode::Char('v'), KeyModifiers::NONE) => KeyAction::Visual,

            // Clipboard operations (vim-style)
            (KeyCode::Char('y'), KeyModifiers::NONE) => KeyAction::Operator(OperatorKind::Yank),
            (KeyCode::Char('d'), KeyModifiers::NONE) => KeyAction::Operator(OperatorKind::Delete),
            (KeyCode::Char('p'), KeyModifiers::NONE) => KeyAction::Paste,
            (KeyCode::Char('x'), KeyModifiers::NONE) => KeyAction::Delete,

            // Modes
            (KeyCode::Char('/'), KeyModifiers::NONE) => KeyAction::Filter,
            (KeyCode::Char(':'), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                KeyAction::CommandMode
            }
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => KeyAction::ClearFilter,
            (KeyCode::Char('?'), _) => KeyAction::ToggleHelp,

            (KeyCode::Char('t'), KeyModifiers::NONE) => KeyAction::Terminal,
            (KeyCode::Char('.'), KeyModifiers::NONE) => KeyAction::Repeat,

            _ => KeyAction::None,
        }
    }
}

/// A section of key bindings for the help display.
pub struct HelpSection {
    pub title: &'static str,
    pub bindings: Vec<KeyBinding>,
}

/// Key binding for display in help.
pub struct KeyBinding {
    pub keys: &'static str,
    pub description: &'static str,
}

/// Get all key bindings organized by section for help display.
///
/// Leader sequences are written with `<l>` standing for the leader key.
pub fn get_help_sections() -> Vec<HelpSection> {
    vec![
        HelpSection {
            title: "Navigation",
            bindings: vec![
                KeyBinding { keys: "j/k ↓/↑", description: "Move down/up (wraps)" },
                KeyBinding { keys: "C-j/C-k", description: "Jump a tenth of the list" },
                KeyBinding { keys: "h ←", description: "Parent directory" },
                KeyBinding { keys: "l → Enter", description: "Enter directory / open file" },
                KeyBinding { keys: "H/L", description: "History back/forward" },
                KeyBinding { keys: "C-h/C-l", description: "Previous/next bookmark" },
                KeyBinding { keys: "~", description: "Home directory" },
                KeyBinding { keys: "<l>k/<l>j", description: "Top/bottom of scope" },
            ],
        },
        HelpSection {
            title: "Selection & Clipboard",
            bindings: vec![
                KeyBinding { keys: "m", description: "Toggle mark" },
                KeyBinding { keys: "v", description: "Visual range / commit" },
                KeyBinding { keys: "yy", description: "Yank to clipboard" },
                KeyBinding { keys: "dd", description: "Cut to clipboard" },
                KeyBinding { keys: "p", description: "Paste" },
                KeyBinding { keys: "x", description: "Delete (asks first)" },
                KeyBinding { keys: "<l>cm", description: "Clear marks" },
                KeyBinding { keys: "<l>cl", description: "Clear clipboard" },
            ],
        },
        HelpSection {
            title: "Files",
            bindings: vec![
                KeyBinding { keys: "<l>nf/<l>nd", description: "New file/directory" },
                KeyBinding { keys: "<l>rn", description: "Rename" },
                KeyBinding { keys: "<l>sa", description: "Sort by name" },
                KeyBinding { keys: "<l>sma/smd", description: "Sort by mtime asc/desc" },
                KeyBinding { keys: "t", description: "Open terminal here" },
            ],
        },
        HelpSection {
            title: "Tree",
            bindings: vec![
                KeyBinding { keys: "<l>xr", description: "Toggle inline expansion" },
                KeyBinding { keys: "<l>xar", description: "Expand all" },
                KeyBinding { keys: "<l>xc", description: "Collapse all" },
                KeyBinding { keys: "<l>dot", description: "Toggle dotfiles" },
                KeyBinding { keys: "/", description: "Filter (glob)" },
                KeyBinding { keys: "C-r", description: "Clear filter/expansions" },
                KeyBinding { keys: "Esc Esc", description: "Reset to home" },
            ],
        },
        HelpSection {
            title: "Shortcuts",
            bindings: vec![
                KeyBinding { keys: "<l>b", description: "Toggle bookmark" },
                KeyBinding { keys: "<l>fo…", description: "Open file shortcut" },
                KeyBinding { keys: "<l>do…", description: "Jump to directory shortcut" },
                KeyBinding { keys: "<l>to…", description: "Terminal at directory shortcut" },
                KeyBinding { keys: "<l>w…", description: "Launch workspace" },
                KeyBinding { keys: "<l>conf", description: "Edit and reload config" },
            ],
        },
        HelpSection {
            title: "Commands",
            bindings: vec![
                KeyBinding { keys: ":!cmd", description: "Run shell command" },
                KeyBinding { keys: ".", description: "Repeat last command" },
                KeyBinding { keys: "?", description: "Toggle this help" },
                KeyBinding { keys: "q C-c", description: "Quit" },
            ],
        },
    ]
}

/// Number of lines the help overlay needs: title, bindings and a spacer
/// per section.
pub fn help_line_count() -> usize {
    get_help_sections()
        .iter()
        .map(|s| s.bindings.len() + 2)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_control_variants_differ_from_plain_keys() {
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::Char('j'), KeyModifiers::NONE)),
            KeyAction::MoveDown
        );
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::Char('j'), KeyModifiers::CONTROL)),
            KeyAction::JumpDown
        );
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::Char('h'), KeyModifiers::CONTROL)),
            KeyAction::BookmarkPrev
        );
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::Char('H'), KeyModifiers::SHIFT)),
            KeyAction::HistoryBack
        );
    }

    #[test]
    fn test_operator_keys() {
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::Char('d'), KeyModifiers::NONE)),
            KeyAction::Operator(OperatorKind::Delete)
        );
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::Char('x'), KeyModifiers::NONE)),
            KeyAction::Delete
        );
    }

    #[test]
    fn test_help_line_count_covers_sections() {
        let sections = get_help_sections();
        let bindings: usize = sections.iter().map(|s| s.bindings.len()).sum();
        assert_eq!(help_line_count(), bindings + 2 * sections.len());
    }
}
