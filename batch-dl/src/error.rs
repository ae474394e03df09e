use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("unable to read configuration file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unable to parse configuration file '{}': {msg}", path.display())]
    Parse { path: PathBuf, msg: String },

    #[error("invalid configuration file '{}': {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}
