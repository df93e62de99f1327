//! Error types for Gridpilot core.

use thiserror::Error;

use crate::host::HostError;

/// Errors that can occur in the Gridpilot core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error(transparent)]
    Host(#[from] HostError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
