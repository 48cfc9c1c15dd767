use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a survey export from being prepared.
#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("input file {} does not exist", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {} at line {line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("unknown text encoding `{0}`")]
    UnknownEncoding(String),

    #[error("line {line} has {found} fields but the header has {expected}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("column count mismatch: {0}")]
    Shape(String),

    #[error("renaming produced duplicate column names: {}", .0.join(", "))]
    DuplicateColumns(Vec<String>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("project filter must name at least one project or be `all`")]
    EmptyProjectFilter,

    #[error("failed to write {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = PrepareError> = std::result::Result<T, E>;
