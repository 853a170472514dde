use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by explicit sink operations (sync) and config loading.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("log file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LoggerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoggerError::Io {
            path: path.into(),
            source,
        }
    }
}
