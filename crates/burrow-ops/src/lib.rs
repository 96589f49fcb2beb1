//! Filesystem operations engine for burrow.
//!
//! This crate provides the synchronous filesystem capability surface used by
//! the navigator, the clipboard staging area behind cut/copy/paste, and the
//! background runner for shell commands.

mod clipboard;
mod copy;
mod fs;
mod job;
mod naming;

pub use clipboard::{
    BatchKind, ClipboardBatch, ClipboardStaging, StagedEntry, YankItem, STAGING_PREFIX,
};
pub use copy::{copy_dir_recursive, copy_file};
pub use fs::{FileSystem, LocalFs};
pub use job::{
    start_job, start_job_with_grace, ExecutionJob, JobError, JobEvent, JobStatus, TERMINATE_GRACE,
};
pub use naming::{unique_name, unique_name_in, validate_name};

/// Default channel buffer size for job output.
pub const OPERATION_CHANNEL_SIZE: usize = 100;
