//! # Loader Errors
//!
//! A failed load keeps both causes: why the search-path lookup failed and why
//! the bundled fallback failed.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to link a single candidate (a library name or a file path)
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to open `{target}`")]
    Open {
        target: String,
        #[source]
        source: libloading::Error,
    },

    #[error("`{target}` does not export `{symbol}`")]
    MissingSymbol {
        target: String,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("`{target}` rejected: {reason}")]
    Rejected { target: String, reason: String },
}

/// Failure of the bundled-resource fallback
#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("bundled library not found (searched: {})", display_paths(.searched))]
    ResourceMissing { searched: Vec<PathBuf> },

    #[error("failed to read bundled library {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bundled library digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("failed to extract bundled library to a temporary file")]
    Extract {
        #[source]
        source: io::Error,
    },

    #[error("failed to link extracted library")]
    Link(#[source] LinkError),
}

/// Fatal linkage error: neither the primary lookup nor the fallback worked
#[derive(Debug, Error)]
#[error(
    "unable to load native library `{library}`: primary lookup failed ({}); \
     bundled fallback failed ({})",
    chain(.primary),
    chain(.fallback)
)]
pub struct LoadError {
    pub library: String,
    pub primary: LinkError,
    pub fallback: FallbackError,
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render an error with its whole source chain on one line
fn chain(error: &dyn std::error::Error) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
