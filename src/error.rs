//! Fetch and stage error types.

use std::path::PathBuf;
use thiserror::Error;

/// Failure starting or running an external tool.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command failed: {program} (exit code: {code:?})")]
    Exit { program: String, code: Option<i32> },

    #[error("command failed: {program}\nstderr: {stderr}")]
    ExitWithStderr { program: String, stderr: String },
}

/// Errors that can occur while populating or updating a cache entry.
///
/// All of these are fatal; nothing in this crate retries.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The transfer tool could not retrieve the origin URL.
    #[error("download failed: {url}")]
    Network {
        url: String,
        #[source]
        source: RunError,
    },

    /// A required backend tool is not installed.
    #[error("{tool} is required to fetch this source.\n{remedy}")]
    ToolMissing { tool: String, remedy: String },

    /// A VCS command exited nonzero.
    #[error(transparent)]
    Vcs(#[from] RunError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while materializing fetched content.
#[derive(Error, Debug)]
pub enum StageError {
    /// The archive extracted to zero top-level entries — a corrupt or
    /// mis-detected download, never silently treated as success.
    #[error("empty archive: {}", .0.display())]
    EmptyArchive(PathBuf),

    /// The extraction tool exited nonzero.
    #[error("extraction failed: {}", .archive.display())]
    Extraction {
        archive: PathBuf,
        #[source]
        source: RunError,
    },

    /// A VCS checkout/export command exited nonzero.
    #[error(transparent)]
    Vcs(#[from] RunError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
