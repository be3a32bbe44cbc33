//! Error taxonomy for the generation pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while collecting, rendering, writing or watching.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The dotenv file is missing, unreadable or malformed.
    #[error("failed to load env file '{}': {cause}", .path.display())]
    FileLoad {
        /// Path of the dotenv file.
        path: PathBuf,
        /// What went wrong while reading it.
        cause: FileLoadCause,
    },

    /// The environment map could not be encoded as JSON.
    #[error("failed to serialize environment: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An artifact could not be written to disk.
    #[error("failed to {action} '{}': {source}", .path.display())]
    Sink {
        /// Path the sink was operating on.
        path: PathBuf,
        /// The step that failed.
        action: SinkAction,
        #[source]
        source: io::Error,
    },

    /// The configuration record is not usable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The filesystem watch could not be established or was lost.
    #[error("watch subsystem failure: {0}")]
    WatchSubsystem(String),
}

/// Why a dotenv file could not be loaded.
///
/// Parse failures carry the line index only; the offending line may hold a
/// secret and is never echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileLoadCause {
    /// The file does not exist.
    #[error("file not found")]
    NotFound,
    /// The file exists but reading it failed.
    #[error("I/O error ({0})")]
    Io(io::ErrorKind),
    /// A line is not a valid `KEY=VALUE` entry.
    #[error("parse error at line index {0}")]
    Parse(usize),
    /// A `${` reference in the value of this key is never closed.
    #[error("unterminated variable reference in '{0}'")]
    Substitution(String),
    /// Any other dotenv failure.
    #[error("{0}")]
    Other(String),
}

/// Step of a sink write that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkAction {
    /// Creating the parent directories.
    CreateDir,
    /// Opening the file for truncating write.
    Open,
    /// Writing the content.
    Write,
}

impl std::fmt::Display for SinkAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SinkAction::CreateDir => "create directory for",
            SinkAction::Open => "open",
            SinkAction::Write => "write",
        };
        f.write_str(label)
    }
}

impl Error {
    /// Builds a [`Error::FileLoad`] from a dotenvy failure.
    pub(crate) fn from_dotenv(path: PathBuf, err: dotenvy::Error) -> Self {
        let cause = match err {
            dotenvy::Error::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {
                FileLoadCause::NotFound
            }
            dotenvy::Error::Io(io_err) => FileLoadCause::Io(io_err.kind()),
            dotenvy::Error::LineParse(_, idx) => FileLoadCause::Parse(idx),
            // Remaining variants carry no file text.
            other => FileLoadCause::Other(other.to_string()),
        };
        Error::FileLoad { path, cause }
    }

    pub(crate) fn sink(path: impl Into<PathBuf>, action: SinkAction, source: io::Error) -> Self {
        Error::Sink {
            path: path.into(),
            action,
            source,
        }
    }
}
