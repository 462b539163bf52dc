use std::io;

use tether_vt::EngineError;
use thiserror::Error;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal create failed: {0}")]
    Create(#[source] EngineError),
    #[error("terminal feed failed: {0}")]
    Feed(#[source] EngineError),
    #[error("terminal resize failed: {0}")]
    Resize(#[source] EngineError),
    #[error("viewport scroll failed: {0}")]
    Scroll(#[source] EngineError),
    #[error("dump of row {row} failed: {source}")]
    Dump {
        row: u16,
        #[source]
        source: EngineError,
    },
}

/// Errors that can occur when loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found at any standard location.
    #[error("config file not found")]
    NotFound,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
