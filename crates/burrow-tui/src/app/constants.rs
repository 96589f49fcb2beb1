//! Application constants.

use std::time::Duration;

/// Time allowed between the two presses of `yy` / `dd`.
pub const OPERATOR_TIMEOUT: Duration = Duration::from_millis(1000);

/// Inactivity allowed while typing a leader sequence.
pub const LEADER_TIMEOUT: Duration = Duration::from_millis(2000);

/// Two presses of Esc within this window return to the home directory.
pub const DOUBLE_ESCAPE_THRESHOLD: Duration = Duration::from_millis(500);

/// Event loop tick interval in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 40;

/// Number of lines to scroll when pressing Page Up/Down in popups.
pub const PAGE_SIZE: usize = 10;
