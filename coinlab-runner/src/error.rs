//! Runner-level errors. All fatal: a run that cannot load its config or
//! data has nothing sensible to report.

use std::path::PathBuf;

use coinlab_core::error::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("bad candle data in {path}: {message}")]
    BadData { path: PathBuf, message: String },
}
