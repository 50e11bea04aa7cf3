use std::fmt;

use crate::source::SourceKind;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad column mapping, bad state code, etc.).
    ConfigValidation(String),
    /// A source file does not exist. Raised before any source is parsed.
    SourceUnavailable { source: SourceKind, path: String },
    /// Missing required column in a name-addressed source.
    MissingColumn { source: SourceKind, column: String },
    /// A source file exists but could not be read as a table.
    Read { source: SourceKind, message: String },
    /// Report export failed.
    Write(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::SourceUnavailable { source, path } => {
                write!(f, "source {source} unavailable: file not found: {path}")
            }
            Self::MissingColumn { source, column } => {
                write!(f, "source {source}: missing column '{column}'")
            }
            Self::Read { source, message } => write!(f, "source {source}: {message}"),
            Self::Write(msg) => write!(f, "write error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
