use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for scopegraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for scopegraph operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured file cap was reached
    #[error("too many files: limit of {limit} reached")]
    TooManyFiles { limit: usize },

    /// An include/import chain exceeded the configured depth bound
    #[error("include depth limit of {limit} exceeded at {path}")]
    IncludeDepth { limit: usize, path: String },

    /// A path could not be used (non-UTF-8, empty, or outside the project)
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// No language could be inferred for a file
    #[error("unknown language for {0}")]
    UnknownLanguage(String),

    /// Tree production failed for a file
    #[error("parse error in {file}: {message}")]
    Parse { file: String, message: String },

    /// Configuration related errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates an invalid path error
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Creates an unknown language error
    pub fn unknown_language(path: impl Into<String>) -> Self {
        Self::UnknownLanguage(path.into())
    }

    /// Creates a parse error
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// The boundary classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::TooManyFiles { .. } => ErrorKind::TooManyFiles,
            Error::IncludeDepth { .. } => ErrorKind::IncludeDepth,
            Error::InvalidPath(_) => ErrorKind::InvalidPath,
            Error::UnknownLanguage(_) => ErrorKind::UnknownLanguage,
            Error::Parse { .. } => ErrorKind::ParseFailed,
            Error::Config(_) => ErrorKind::Config,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Other(_) => ErrorKind::Other,
        }
    }
}

/// Flat error classification visible at the library boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Io,
    TooManyFiles,
    IncludeDepth,
    InvalidPath,
    UnknownLanguage,
    ParseFailed,
    Config,
    InvalidInput,
    Other,
}

/// The most recent failure observed by a project driver.
///
/// Operations report failures through `Result`; the driver additionally
/// caches the latest one so embedding hosts can poll it after a bulk pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RecordedError {
    pub fn from_error(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for RecordedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
