//! Core types and configuration for burrow.
//!
//! This crate provides the data shared by the filesystem layer and the
//! terminal interface: display rows, sort orders, the error taxonomy and
//! the user configuration snapshot.

mod config;
mod entry;
mod error;

pub use config::{
    expand_tilde, handler_names, normalize_path, split_command_line, HandlerSpec, UserConfig,
    UserConfigBuilder, WorkspaceShortcut, WorkspaceTarget, CONFIG_ENV,
};
pub use entry::{Entry, FileInfo, SortMode};
pub use error::{ErrorKind, FsError, FsResult};
