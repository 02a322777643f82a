//! # Errors
//!
//! Errors raised by the safe window/audio layer and by configuration.
//! Load failures have their own types in [`crate::loader`].

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::loader::LoadError;

/// Errors from the safe binding layer
#[derive(Debug, Error)]
pub enum ShimError {
    #[error(transparent)]
    Load(#[from] Arc<LoadError>),

    #[error("invalid window size {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("pixel buffer holds {actual} pixels, window needs {required}")]
    BufferTooSmall { required: usize, actual: usize },

    #[error("window title contains an interior NUL byte")]
    InvalidTitle,

    #[error("native module failed to open {0}")]
    OpenFailed(&'static str),

    #[error("native module does not export `{0}`")]
    Unsupported(&'static str),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse loader config")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read loader config {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("native loader already initialized")]
    AlreadyInitialized,
}

pub type ShimResult<T> = Result<T, ShimError>;
